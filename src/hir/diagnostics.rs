//! Diagnostics: semantic error reporting.
//!
//! Errors found while binding imports are recorded here rather than returned:
//! the import is left partially bound and analysis carries on, so a single
//! run surfaces as many unrelated problems as possible.

use std::sync::Arc;

use crate::base::{LineIndex, Loc};

use super::error::ImportError;
use super::source::FileSet;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub loc: Loc,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0101").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(loc: Loc, message: impl Into<Arc<str>>) -> Self {
        Self {
            loc,
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(loc: Loc, message: impl Into<Arc<str>>) -> Self {
        Self {
            loc,
            severity: Severity::Warning,
            code: None,
            message: message.into(),
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render as `path(line:col): Error: message`.
    ///
    /// Falls back to the file id when the file set does not know the file.
    pub fn render(&self, files: &FileSet) -> String {
        let path = files
            .path(self.loc.file)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.loc.file.to_string());
        let position = files
            .contents(self.loc.file)
            .map(|text| LineIndex::new(&text).line_col(self.loc.range.start()));
        match position {
            Some(pos) => format!("{path}({pos}): {}: {}", self.severity.label(), self.message),
            None => format!("{path}: {}: {}", self.severity.label(), self.message),
        }
    }
}

impl From<(Loc, ImportError)> for Diagnostic {
    fn from((loc, err): (Loc, ImportError)) -> Self {
        Diagnostic::error(loc, err.to_string()).with_code(err.code())
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for import binding.
pub mod codes {
    /// Final import segment names a package.
    pub const NAME_CONFLICT: &str = "E0101";
    /// Selective-import name missing from the imported module.
    pub const BIND_LIST_NOT_FOUND: &str = "E0102";
    /// Bind-list on a static import.
    pub const INVALID_BIND_LIST: &str = "E0103";
    /// Module source could not be located or read.
    pub const UNRESOLVED_MODULE: &str = "E0104";
    /// Module source could not be parsed.
    pub const MODULE_PARSE: &str = "E0105";
    /// Two symbols with one name in one table.
    pub const DUPLICATE_SYMBOL: &str = "E0106";
    /// Module header names a different module than the one loaded.
    pub const MODULE_NAME_MISMATCH: &str = "W0101";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during a compilation.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record an import error at `loc`.
    pub fn import_error(&mut self, loc: Loc, err: ImportError) {
        tracing::debug!(code = err.code(), %err, "import error");
        self.add(Diagnostic::from((loc, err)));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics carrying `code`.
    pub fn with_code(&self, code: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.code.as_deref() == Some(code))
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::base::{FileId, TextRange, TextSize};

    fn loc(file: u32, start: u32) -> Loc {
        Loc::new(FileId::new(file), TextRange::empty(TextSize::from(start)))
    }

    #[test]
    fn test_from_import_error() {
        let diag = Diagnostic::from((loc(0, 0), ImportError::InvalidBindList));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.as_deref(), Some(codes::INVALID_BIND_LIST));
        assert_eq!(&*diag.message, "cannot have an import bind list");
    }

    #[test]
    fn test_collector_counts() {
        let mut collector = DiagnosticCollector::new();
        collector.import_error(loc(0, 0), ImportError::NameConflict);
        collector.import_error(loc(1, 0), ImportError::InvalidBindList);
        collector.add(Diagnostic::warning(loc(0, 0), "warning 1"));

        assert_eq!(collector.error_count(), 2);
        assert_eq!(collector.warning_count(), 1);
        assert!(collector.has_errors());
        assert_eq!(collector.with_code(codes::NAME_CONFLICT).len(), 1);

        let taken = collector.take();
        assert_eq!(taken.len(), 3);
        assert!(!collector.has_errors());
    }

    #[test]
    fn test_render_with_line_col() {
        let files = FileSet::new();
        let file = files.file_id(Path::new("src/app.d"));
        files.set_contents(file, "module app;\nimport missing;\n");

        let diag = Diagnostic::error(
            Loc::new(file, TextRange::empty(TextSize::from(12))),
            "module missing cannot be found",
        );
        assert_eq!(
            diag.render(&files),
            "src/app.d(2:1): Error: module missing cannot be found"
        );
    }

    #[test]
    fn test_render_unknown_file() {
        let files = FileSet::new();
        let diag = Diagnostic::warning(loc(9, 0), "odd");
        assert_eq!(diag.render(&files), "file#9: Warning: odd");
    }
}
