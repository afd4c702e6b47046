//! One compilation request.
//!
//! A [`Session`] owns everything the import core needs: the interner, the
//! file set, the package/module registry, the diagnostics collector, the
//! optional dependency report and the source locator. Analysis is
//! single-threaded and re-entrant; nothing here is global.
//!
//! ```ignore
//! let mut session = Session::new(options, locator);
//! let app = session.add_root("app.main")?;
//! session.analyze();
//! let output = session.finish()?;
//! ```

use std::path::Path;

use thiserror::Error;

use crate::base::{Interner, Loc};
use crate::project::{CompileOptions, SourceLocator};

use super::deps::DepsReport;
use super::diagnostics::{Diagnostic, DiagnosticCollector};
use super::error::ImportError;
use super::ids::{ImportId, ModuleId};
use super::registry::{LoadContext, Registry};
use super::resolve::{ResolveResult, Resolver};
use super::scope::{ScopeSnapshot, ScopeStack};
use super::source::FileSet;
use super::symbols::Symbol;

/// Successful result of [`Session::finish`].
#[derive(Clone, Debug, Default)]
pub struct CompileOutput {
    /// Dependency report text, if reporting was enabled.
    pub deps: Option<String>,
    /// Non-error diagnostics.
    pub warnings: Vec<Diagnostic>,
}

/// At least one error diagnostic was recorded.
#[derive(Clone, Debug, Error)]
#[error("compilation failed with {} error(s)", count_errors(.diagnostics))]
pub struct CompileFailed {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileFailed {
    pub fn error_count(&self) -> usize {
        count_errors(&self.diagnostics)
    }
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

pub struct Session {
    pub(crate) interner: Interner,
    pub(crate) files: FileSet,
    pub(crate) registry: Registry,
    pub(crate) diagnostics: DiagnosticCollector,
    pub(crate) deps: Option<DepsReport>,
    pub(crate) scopes: ScopeStack,
    pub(crate) locator: Box<dyn SourceLocator>,
    pub(crate) options: CompileOptions,
    pub(crate) roots: Vec<ModuleId>,
}

impl Session {
    pub fn new(options: CompileOptions, locator: impl SourceLocator + 'static) -> Self {
        let deps = options.module_deps.then(DepsReport::new);
        Self {
            interner: Interner::new(),
            files: FileSet::new(),
            registry: Registry::new(),
            diagnostics: DiagnosticCollector::new(),
            deps,
            scopes: ScopeStack::default(),
            locator: Box::new(locator),
            options,
            roots: Vec::new(),
        }
    }

    /// Session reading modules from the options' import paths.
    pub fn with_fs_locator(options: CompileOptions) -> Self {
        let locator = options.fs_locator();
        Self::new(options, locator)
    }

    // ========================================================================
    // DRIVER
    // ========================================================================

    /// Load `dotted` as a root module: one named on the command line.
    ///
    /// Root modules are their own provenance. The first root is also the
    /// provenance of modules loaded outside of any scope.
    ///
    /// A root that cannot be loaded is also recorded as an error diagnostic,
    /// located at the name as given, so [`Session::finish`] fails.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn add_root(&mut self, dotted: &str) -> Result<ModuleId, ImportError> {
        let result = self.load_root(dotted);
        if let Err(err) = &result {
            let file = self.files.file_id(Path::new(dotted));
            self.diagnostics.import_error(Loc::start_of(file), err.clone());
        }
        result
    }

    fn load_root(&mut self, dotted: &str) -> Result<ModuleId, ImportError> {
        let mut path = self.interner.intern_dotted(dotted);
        let Some(id) = path.pop() else {
            return Err(ImportError::UnresolvedModule { name: dotted.into() });
        };

        let resolved = self.registry.resolve(&self.interner, &path)?;
        let module = match self.registry.table(resolved.table).lookup(id) {
            Some(Symbol::Module(module)) => module,
            Some(Symbol::Package(_) | Symbol::Import(_) | Symbol::Alias(_) | Symbol::Decl(_)) => {
                return Err(ImportError::NameConflict);
            }
            None => {
                let mut cx = LoadContext {
                    interner: &self.interner,
                    files: &self.files,
                    locator: &*self.locator,
                    diagnostics: &mut self.diagnostics,
                };
                let module = self.registry.load_module(&mut cx, &path, id)?;
                self.registry
                    .table_mut(resolved.table)
                    .insert(id, Symbol::Module(module))
                    .map_err(|_| ImportError::NameConflict)?;
                module
            }
        };

        let root = self.registry.module_mut(module);
        if root.imported_from.is_none() {
            root.imported_from = Some(module);
        }
        if !self.roots.contains(&module) {
            self.roots.push(module);
        }
        Ok(module)
    }

    /// Run both semantic passes over every root module.
    ///
    /// Imported modules are analysed on demand from their importers.
    pub fn analyze(&mut self) {
        let roots = self.roots.clone();
        for &root in &roots {
            self.module_semantic(root);
        }
        for &root in &roots {
            self.module_semantic2(root);
        }
        tracing::debug!(
            modules = self.registry.module_count(),
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warning_count(),
            "analysis finished"
        );
    }

    /// Hand out the compilation result.
    ///
    /// Any error diagnostic fails the compilation, even though analysis
    /// itself carried on past it.
    pub fn finish(&mut self) -> Result<CompileOutput, CompileFailed> {
        let diagnostics = self.diagnostics.take();
        if diagnostics.iter().any(Diagnostic::is_error) {
            return Err(CompileFailed { diagnostics });
        }
        Ok(CompileOutput {
            deps: self.deps.take().map(DepsReport::into_string),
            warnings: diagnostics,
        })
    }

    /// Run `f` with `scope` pushed; the scope is popped when `f` returns.
    pub(crate) fn with_scope<R>(&mut self, scope: ScopeSnapshot, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push(scope);
        let result = f(self);
        self.scopes.pop();
        result
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Resolve a possibly dotted name as written inside `module`.
    ///
    /// Works before [`Session::analyze`] for the module's own members and
    /// for names qualified through an import, which is loaded on demand.
    /// Unqualified names from import sets need the semantic pass.
    pub fn lookup(&mut self, module: ModuleId, name: &str) -> ResolveResult {
        self.add_members(module);
        Resolver::new(self, module).resolve(name)
    }

    pub fn module_by_name(&self, qualified: &str) -> Option<ModuleId> {
        self.registry.find_module(qualified)
    }

    /// Render import `id` as source text.
    pub fn render_import(&self, id: ImportId, header_mode: bool) -> String {
        self.registry
            .import(id)
            .render(&self.interner, header_mode, &self.options.default_module)
    }

    /// All diagnostics rendered as `path(line:col): Severity: message`.
    pub fn render_diagnostics(&self) -> Vec<String> {
        self.diagnostics
            .diagnostics()
            .iter()
            .map(|diagnostic| diagnostic.render(&self.files))
            .collect()
    }

    /// Dependency report so far, if reporting is enabled.
    pub fn deps_report(&self) -> Option<&str> {
        self.deps.as_ref().map(DepsReport::as_str)
    }

    /// Location of import `id`.
    pub fn import_loc(&self, id: ImportId) -> Loc {
        self.registry.import(id).loc
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn roots(&self) -> &[ModuleId] {
        &self.roots
    }

    /// Nesting depth of active analysis scopes; zero outside of analysis.
    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }
}
