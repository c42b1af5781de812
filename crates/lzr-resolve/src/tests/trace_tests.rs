use super::*;

fn class() -> FqName {
    FqName::new("pkg.C")
}

#[test]
fn report_on_prefers_member_source() {
    let trace = DiagnosticTrace::new("a.kt");
    let source = SourceElement {
        node: NodeId(1),
        span: Span::new(20, 3),
    };
    trace.report_on(Some(source), Span::new(1, 1), diagnostic_codes::CANNOT_INFER_VISIBILITY, &["f"]);
    trace.report_on(None, Span::new(1, 1), diagnostic_codes::CANNOT_INFER_VISIBILITY, &["g"]);
    let diagnostics = trace.diagnostics();
    assert_eq!(diagnostics[0].start, 20);
    assert_eq!(diagnostics[1].start, 1);
    assert_eq!(
        diagnostics[0].message_text,
        "Cannot infer visibility for 'f'. Please specify it explicitly"
    );
}

#[test]
fn clash_priority_ranks_origins() {
    use MemberOrigin::*;
    assert_eq!(clash_priority(&[Other, DefaultImpl]), 0);
    assert_eq!(clash_priority(&[MultifileClass, MultifileClass]), 1);
    assert_eq!(clash_priority(&[Other, MultifileClass]), 2);
    assert_eq!(clash_priority(&[Other, MultifileClassPart]), 3);
    assert_eq!(clash_priority(&[]), 2);
}

#[test]
fn one_clash_per_signature_and_higher_priority_wins() {
    let trace = DiagnosticTrace::new("a.kt");
    let members = vec!["fun a()".to_string(), "fun b()".to_string()];
    trace.report_jvm_clash(&class(), "f()", &[MemberOrigin::Other], Span::new(1, 1), &members);
    trace.report_jvm_clash(&class(), "f()", &[MemberOrigin::DefaultImpl], Span::new(2, 1), &members);
    assert_eq!(trace.count_of(diagnostic_codes::CONFLICTING_JVM_DECLARATIONS), 1);
    assert_eq!(trace.diagnostics()[0].start, 1);

    trace.report_jvm_clash(&class(), "f()", &[MemberOrigin::MultifileClassPart], Span::new(3, 1), &members);
    let diagnostics = trace.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].start, 3);

    trace.report_jvm_clash(&class(), "g()", &[MemberOrigin::Other], Span::new(4, 1), &members);
    assert_eq!(trace.count_of(diagnostic_codes::CONFLICTING_JVM_DECLARATIONS), 2);
}

#[test]
fn equal_priority_keeps_the_first_report() {
    let trace = DiagnosticTrace::new("a.kt");
    trace.report_jvm_clash(&class(), "f()", &[MemberOrigin::Other], Span::new(1, 1), &["x".to_string()]);
    trace.report_jvm_clash(&class(), "f()", &[MemberOrigin::Other], Span::new(9, 1), &["y".to_string()]);
    assert_eq!(trace.diagnostics()[0].start, 1);
}

#[test]
fn take_diagnostics_drains_everything() {
    let trace = DiagnosticTrace::new("a.kt");
    trace.report_at(Span::new(0, 1), diagnostic_codes::UNRESOLVED_REFERENCE, &["Foo"]);
    trace.report_jvm_clash(&class(), "f()", &[], Span::new(1, 1), &[]);
    assert_eq!(trace.take_diagnostics().len(), 2);
    assert!(trace.diagnostics().is_empty());
}
