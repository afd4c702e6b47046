//! # modlink-base
//!
//! Import resolution core for a module-based compiler front end.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project → Compile options, source locators (file system, in memory)
//!   ↓
//! hir     → Package/module registry, import binding, dependency report
//!   ↓
//! syntax  → Lexer + declaration-level parser
//!   ↓
//! base    → Primitives (FileId, Loc, Name interning)
//! ```
//!
//! A compilation is driven through [`hir::Session`]:
//!
//! ```ignore
//! use modlink::hir::Session;
//! use modlink::project::CompileOptions;
//!
//! let options = CompileOptions::new().import_path("src").module_deps(true);
//! let mut session = Session::with_fs_locator(options);
//! session.add_root("app.main")?;
//! session.analyze();
//! let output = session.finish()?;
//! print!("{}", output.deps.unwrap_or_default());
//! ```

/// Foundation types: FileId, Loc, Name interning
pub mod base;

/// Semantic model: registry, imports, modules, diagnostics
pub mod hir;

/// Options and source discovery
pub mod project;

/// Declaration-level lexer and parser
pub mod syntax;

// Re-export foundation types
pub use base::{FileId, Interner, LineCol, LineIndex, Loc, Name, TextRange, TextSize};
pub use hir::{CompileFailed, CompileOutput, ImportError, Session};
pub use project::CompileOptions;
