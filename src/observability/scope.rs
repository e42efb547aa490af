//! ObservationScope for begin/complete logging around multi-step operations
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` or `{name}_FAILED` when closed
//! - Logs `{name}_INCOMPLETE` if dropped without either

use super::logger::Logger;
use crate::model::BlockError;

/// A scope that logs its own begin and end.
///
/// ```ignore
/// let scope = ObservationScope::with_fields("VARIATION_RECONCILE", &[("axis", "culture")]);
/// match run() {
///     Ok(report) => scope.complete_with_fields(&[("warnings", &report.warnings.len().to_string())]),
///     Err(e) => scope.fail(&e),
/// }
/// ```
pub struct ObservationScope {
    name: &'static str,
    closed: bool,
    fields: Vec<(&'static str, String)>,
}

impl ObservationScope {
    /// Opens a scope and logs `{name}_BEGIN`.
    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Opens a scope whose fields are repeated on every line it logs.
    pub fn with_fields(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let scope = Self {
            name,
            closed: false,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
        };
        Logger::info(&format!("{}_BEGIN", name), &scope.field_refs());
        scope
    }

    /// Logs `{name}_COMPLETE`.
    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Logs `{name}_COMPLETE` with extra result fields.
    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.closed = true;
        let mut fields = self.field_refs();
        fields.extend(extra.iter().copied());
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    /// Logs `{name}_FAILED` with the error code and message.
    pub fn fail(mut self, error: &BlockError) {
        self.closed = true;
        let code = error.code().code();
        let reason = error.to_string();
        let mut fields = self.field_refs();
        fields.push(("code", code));
        fields.push(("reason", reason.as_str()));
        Logger::error(&format!("{}_FAILED", self.name), &fields);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.closed {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}
