//! Errors raised while binding imports.

use smol_str::SmolStr;
use thiserror::Error;

use super::diagnostics::codes;

/// Everything that can go wrong for a single import directive.
///
/// None of these abort the compilation: they are turned into diagnostics at
/// the import's location and the import is left partially bound.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    /// The final path segment names a package, not a module.
    #[error("package and module have the same name")]
    NameConflict,

    #[error("{name} not found")]
    BindListNotFound { name: SmolStr },

    #[error("cannot have an import bind list")]
    InvalidBindList,

    #[error("module {name} cannot be found")]
    UnresolvedModule { name: SmolStr },

    #[error("module {name} cannot be parsed: {message}")]
    ModuleParse { name: SmolStr, message: String },

    #[error("{kind} {name} conflicts with {existing} {name}")]
    DuplicateSymbol {
        name: SmolStr,
        kind: &'static str,
        existing: &'static str,
    },
}

impl ImportError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::NameConflict => codes::NAME_CONFLICT,
            ImportError::BindListNotFound { .. } => codes::BIND_LIST_NOT_FOUND,
            ImportError::InvalidBindList => codes::INVALID_BIND_LIST,
            ImportError::UnresolvedModule { .. } => codes::UNRESOLVED_MODULE,
            ImportError::ModuleParse { .. } => codes::MODULE_PARSE,
            ImportError::DuplicateSymbol { .. } => codes::DUPLICATE_SYMBOL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ImportError::BindListNotFound { name: "writefln".into() }.to_string(),
            "writefln not found"
        );
        assert_eq!(
            ImportError::DuplicateSymbol {
                name: "std".into(),
                kind: "declaration",
                existing: "import",
            }
            .to_string(),
            "declaration std conflicts with import std"
        );
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            ImportError::NameConflict,
            ImportError::BindListNotFound { name: "x".into() },
            ImportError::InvalidBindList,
            ImportError::UnresolvedModule { name: "x".into() },
            ImportError::ModuleParse { name: "x".into(), message: String::new() },
            ImportError::DuplicateSymbol { name: "x".into(), kind: "", existing: "" },
        ];
        let mut codes: Vec<_> = errors.iter().map(ImportError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
