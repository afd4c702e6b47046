//! High-level IR: packages, modules, imports and their binding.
//!
//! ## Layout
//!
//! ```text
//! session   → one compilation request; owns everything below
//!   ↓
//! module    → two-pass module analysis, unqualified search
//! import    → import binding, selective aliases, lookup forwarding
//! resolve   → dotted-name resolution from inside a module
//!   ↓
//! registry  → package/module arenas, on-demand module loading
//! symbols   → closed symbol set, symbol tables
//!   ↓
//! deps, diagnostics, error, scope, source, ids
//! ```

mod deps;
mod diagnostics;
mod error;
mod ids;
mod import;
mod module;
mod registry;
mod resolve;
mod scope;
mod session;
mod source;
mod symbols;

pub use deps::{DependencyRecord, DepsReport, UNRESOLVED_PATH, escape_path};
pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity, codes};
pub use error::ImportError;
pub use ids::{AliasId, DeclId, ImportId, ModuleId, PackageId};
pub use import::{Import, LoadState};
pub use module::{AnalysisState, ImportScope, Module, SearchFlags};
pub use registry::{LoadContext, Package, Registry, ResolvedPath, TableRef};
pub use resolve::{ResolveResult, Resolver};
pub use scope::{ScopeSnapshot, ScopeStack};
pub use session::{CompileFailed, CompileOutput, Session};
pub use source::FileSet;
pub use symbols::{AliasSymbol, AliasTarget, DeclSymbol, Symbol, SymbolTable};
