//! Diagnostic types and the message catalog for member-scope resolution.
//!
//! Resolution never fails on malformed user code. Everything it has to say
//! about such code is a [`Diagnostic`] pushed into a trace and drained later.

use serde::Serialize;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// Related information for a diagnostic (e.g. the other side of a conflict).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A resolution diagnostic with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Related information spans (e.g. the conflicting inherited member)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic from a catalog entry, filling the `{n}` placeholders.
    ///
    /// Unknown codes produce an error diagnostic whose text is the joined arguments.
    #[must_use]
    pub fn from_code(file: String, start: u32, length: u32, code: u32, args: &[&str]) -> Self {
        match get_diagnostic_message(code) {
            Some(message) => Self {
                file,
                start,
                length,
                message_text: format_message(message.message, args),
                category: message.category,
                code,
                related_information: Vec::new(),
            },
            None => Self::error(file, start, length, args.join(" "), code),
        }
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, start: u32, length: u32, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    /// Serialize to a single JSON object (used by tooling that collects traces).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

// =============================================================================
// Message Catalog
// =============================================================================

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const CONFLICTING_OVERLOADS: u32 = 1001;
    pub const CONFLICTING_INHERITED_MEMBERS: u32 = 1002;
    pub const CANNOT_INFER_VISIBILITY: u32 = 1003;
    pub const CONFLICTING_JVM_DECLARATIONS: u32 = 1004;
    pub const CYCLIC_INHERITANCE_HIERARCHY: u32 = 1005;
    pub const UNRESOLVED_REFERENCE: u32 = 1006;
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::CONFLICTING_OVERLOADS,
        category: DiagnosticCategory::Error,
        message: "Conflicting overloads: {0}, {1}",
    },
    DiagnosticMessage {
        code: diagnostic_codes::CONFLICTING_INHERITED_MEMBERS,
        category: DiagnosticCategory::Error,
        message: "'{0}' inherits conflicting members: {1}, {2}",
    },
    DiagnosticMessage {
        code: diagnostic_codes::CANNOT_INFER_VISIBILITY,
        category: DiagnosticCategory::Error,
        message: "Cannot infer visibility for '{0}'. Please specify it explicitly",
    },
    DiagnosticMessage {
        code: diagnostic_codes::CONFLICTING_JVM_DECLARATIONS,
        category: DiagnosticCategory::Error,
        message: "Platform declaration clash: The following declarations have the same JVM signature ({0}): {1}",
    },
    DiagnosticMessage {
        code: diagnostic_codes::CYCLIC_INHERITANCE_HIERARCHY,
        category: DiagnosticCategory::Error,
        message: "There's a cycle in the inheritance hierarchy for '{0}'",
    },
    DiagnosticMessage {
        code: diagnostic_codes::UNRESOLVED_REFERENCE,
        category: DiagnosticCategory::Error,
        message: "Unresolved reference: {0}",
    },
];

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the category for a diagnostic code.
#[must_use]
pub fn get_diagnostic_category(code: u32) -> Option<DiagnosticCategory> {
    get_diagnostic_message(code).map(|m| m.category)
}

#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod tests;
