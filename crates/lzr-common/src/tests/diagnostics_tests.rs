use super::*;

#[test]
fn test_from_code_fills_placeholders() {
    let diag = Diagnostic::from_code(
        "a.kt".to_string(),
        10,
        3,
        diagnostic_codes::CONFLICTING_OVERLOADS,
        &["fun f(): Unit", "fun f(): Int"],
    );
    assert_eq!(diag.category, DiagnosticCategory::Error);
    assert_eq!(diag.message_text, "Conflicting overloads: fun f(): Unit, fun f(): Int");
    assert_eq!((diag.start, diag.length), (10, 3));
}

#[test]
fn test_unknown_code_keeps_arguments() {
    let diag = Diagnostic::from_code("a.kt".to_string(), 0, 0, 9999, &["x", "y"]);
    assert_eq!(diag.message_text, "x y");
    assert_eq!(diag.category, DiagnosticCategory::Error);
}

#[test]
fn test_related_information_is_serialized_only_when_present() {
    let plain = Diagnostic::error("a.kt".to_string(), 0, 1, "m".to_string(), 1);
    let json = plain.to_json().unwrap();
    assert!(!json.contains("related_information"), "{json}");

    let related = plain.with_related("b.kt".to_string(), 4, 2, "see".to_string());
    let json = related.to_json().unwrap();
    assert!(json.contains("\"related_information\""), "{json}");
    assert!(json.contains("b.kt"), "{json}");
}

#[test]
fn test_every_catalog_code_is_unique() {
    for (i, a) in DIAGNOSTIC_MESSAGES.iter().enumerate() {
        for b in &DIAGNOSTIC_MESSAGES[i + 1..] {
            assert_ne!(a.code, b.code, "duplicate code {}", a.code);
        }
    }
    assert_eq!(
        get_diagnostic_category(diagnostic_codes::UNRESOLVED_REFERENCE),
        Some(DiagnosticCategory::Error)
    );
}
