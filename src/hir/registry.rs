//! Package/module registry.
//!
//! The registry is the single source of truth for packages and modules in a
//! compilation. It owns every node in arenas and hands out ids:
//!
//! - [`Registry::resolve`] walks a dotted package path, creating packages on
//!   first reference.
//! - [`Registry::load_module`] locates, reads and parses a module source the
//!   first time its qualified name is requested, and returns the existing
//!   module every time after that.
//!
//! Memoization by qualified name is what makes circular imports work: both
//! sides of a cycle observe the same [`Module`] and its analysis state.

use std::path::Path;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{FileId, Interner, Loc, Name};
use crate::project::SourceLocator;
use crate::syntax::{Decl, SourceModule, parse_module};

use super::diagnostics::{Diagnostic, DiagnosticCollector, codes};
use super::error::ImportError;
use super::ids::{AliasId, DeclId, ImportId, ModuleId, PackageId};
use super::import::Import;
use super::module::Module;
use super::source::FileSet;
use super::symbols::{AliasSymbol, DeclSymbol, Symbol, SymbolTable};

/// A directory-like namespace node.
#[derive(Clone, Debug)]
pub struct Package {
    pub name: Name,
    pub qualified: SmolStr,
    pub parent: Option<PackageId>,
    /// Child packages and modules by simple name.
    pub members: SymbolTable,
}

/// Which symbol table a path resolved into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TableRef {
    /// The top-level table (modules and packages without a parent).
    Root,
    Package(PackageId),
}

/// Result of walking a package path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Table in which the final (module) segment lives.
    pub table: TableRef,
    /// Outermost package of the path; `None` for an empty path.
    pub root: Option<PackageId>,
    /// Deepest package of the path; `None` for an empty path.
    pub leaf: Option<PackageId>,
}

/// Collaborators needed to compile a module on demand.
pub struct LoadContext<'a> {
    pub interner: &'a Interner,
    pub files: &'a FileSet,
    pub locator: &'a dyn SourceLocator,
    pub diagnostics: &'a mut DiagnosticCollector,
}

#[derive(Debug, Default)]
pub struct Registry {
    root: SymbolTable,
    packages: Vec<Package>,
    modules: Vec<Module>,
    imports: Vec<Import>,
    aliases: Vec<AliasSymbol>,
    decls: Vec<DeclSymbol>,
    by_qualified: FxHashMap<SmolStr, ModuleId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // PATH RESOLUTION
    // ========================================================================

    /// Walk `path`, creating missing packages along the way.
    ///
    /// Fails with [`ImportError::NameConflict`] when a segment is already
    /// taken by something that is not a package.
    pub fn resolve(&mut self, interner: &Interner, path: &[Name]) -> Result<ResolvedPath, ImportError> {
        let mut resolved = ResolvedPath {
            table: TableRef::Root,
            root: None,
            leaf: None,
        };
        let mut qualified = String::new();

        for &segment in path {
            if !qualified.is_empty() {
                qualified.push('.');
            }
            qualified.push_str(&interner.text(segment));

            let package = match self.table(resolved.table).lookup(segment) {
                Some(Symbol::Package(id)) => id,
                Some(Symbol::Module(_) | Symbol::Import(_) | Symbol::Alias(_) | Symbol::Decl(_)) => {
                    return Err(ImportError::NameConflict);
                }
                None => {
                    let id = PackageId::new(self.packages.len() as u32);
                    self.packages.push(Package {
                        name: segment,
                        qualified: SmolStr::new(&qualified),
                        parent: resolved.leaf,
                        members: SymbolTable::new(),
                    });
                    self.table_mut(resolved.table)
                        .insert(segment, Symbol::Package(id))
                        .map_err(|_| ImportError::NameConflict)?;
                    tracing::trace!(package = %qualified, "created package");
                    id
                }
            };

            resolved.root.get_or_insert(package);
            resolved.leaf = Some(package);
            resolved.table = TableRef::Package(package);
        }

        Ok(resolved)
    }

    pub fn table(&self, table: TableRef) -> &SymbolTable {
        match table {
            TableRef::Root => &self.root,
            TableRef::Package(id) => &self.packages[id.slot()].members,
        }
    }

    pub fn table_mut(&mut self, table: TableRef) -> &mut SymbolTable {
        match table {
            TableRef::Root => &mut self.root,
            TableRef::Package(id) => &mut self.packages[id.slot()].members,
        }
    }

    // ========================================================================
    // MODULE LOADING
    // ========================================================================

    /// Locate, read and parse the module `packages.id`, or return the one
    /// already loaded under that qualified name.
    ///
    /// Parsing creates the module's import nodes (replaying their bind-lists)
    /// but runs no semantic analysis.
    #[tracing::instrument(level = "debug", skip_all, fields(id = ?id))]
    pub fn load_module(
        &mut self,
        cx: &mut LoadContext<'_>,
        packages: &[Name],
        id: Name,
    ) -> Result<ModuleId, ImportError> {
        let mut path = packages.to_vec();
        path.push(id);
        let qualified = SmolStr::new(cx.interner.dotted(&path));

        if let Some(&existing) = self.by_qualified.get(&qualified) {
            tracing::trace!(module = %qualified, "module already loaded");
            return Ok(existing);
        }

        let segments: Vec<SmolStr> = path.iter().map(|&name| cx.interner.text(name)).collect();
        let source = cx.locator.locate(&segments).map_err(|err| {
            tracing::debug!(module = %qualified, %err, "cannot locate module");
            ImportError::UnresolvedModule {
                name: qualified.clone(),
            }
        })?;

        let file = cx.files.file_id(&source.path);
        cx.files.set_contents(file, source.text.clone());

        let parsed = parse_module(&source.text).map_err(|err| ImportError::ModuleParse {
            name: qualified.clone(),
            message: err.to_string(),
        })?;

        tracing::debug!(module = %qualified, path = %source.path.display(), "loaded module");
        Ok(self.build_module(cx, qualified, id, file, &source.path, parsed))
    }

    fn build_module(
        &mut self,
        cx: &mut LoadContext<'_>,
        qualified: SmolStr,
        name: Name,
        file: FileId,
        path: &Path,
        parsed: SourceModule,
    ) -> ModuleId {
        let module_id = ModuleId::new(self.modules.len() as u32);
        let pretty = parsed
            .header
            .as_ref()
            .map(|header| SmolStr::new(header.path.join(".")))
            .unwrap_or_else(|| qualified.clone());
        if let Some(header) = parsed.header.as_ref().filter(|_| pretty != qualified) {
            cx.diagnostics.add(
                Diagnostic::warning(
                    Loc::new(file, header.range),
                    format!("module {pretty} is loaded as {qualified}"),
                )
                .with_code(codes::MODULE_NAME_MISMATCH),
            );
        }

        let mut module = Module::new(name, qualified.clone(), pretty, file, path.display().to_string());

        for decl in parsed.decls {
            match decl {
                Decl::Import(decl) => {
                    let loc = Loc::new(file, decl.range);
                    let packages = decl.packages.iter().map(|p| cx.interner.intern(p)).collect();
                    let mut import = Import::new(
                        loc,
                        packages,
                        cx.interner.intern(&decl.id),
                        decl.alias.as_deref().map(|a| cx.interner.intern(a)),
                        decl.is_static,
                        module_id,
                    );
                    import.declared_protection = decl.protection;
                    for (bind_name, bind_alias) in &decl.bindings {
                        let alias = bind_alias.as_deref().map(|a| cx.interner.intern(a));
                        if let Err(err) = import.add_alias(cx.interner.intern(bind_name), alias) {
                            cx.diagnostics.import_error(loc, err);
                            break;
                        }
                    }
                    let import_id = self.alloc_import(import);
                    module.body.push(Symbol::Import(import_id));
                }
                Decl::Item(item) => {
                    let decl_id = self.alloc_decl(DeclSymbol {
                        name: item.name.as_deref().map(|n| cx.interner.intern(n)),
                        kind: item.kind,
                        module: module_id,
                        loc: Loc::new(file, item.range),
                        protection: item.protection,
                    });
                    module.body.push(Symbol::Decl(decl_id));
                }
            }
        }

        self.modules.push(module);
        self.by_qualified.insert(qualified, module_id);
        module_id
    }

    // ========================================================================
    // ARENAS
    // ========================================================================

    pub fn find_module(&self, qualified: &str) -> Option<ModuleId> {
        self.by_qualified.get(qualified).copied()
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.slot()]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.slot()]
    }

    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(i, module)| (ModuleId::new(i as u32), module))
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.slot()]
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn import(&self, id: ImportId) -> &Import {
        &self.imports[id.slot()]
    }

    pub fn import_mut(&mut self, id: ImportId) -> &mut Import {
        &mut self.imports[id.slot()]
    }

    pub(crate) fn alloc_import(&mut self, import: Import) -> ImportId {
        let id = ImportId::new(self.imports.len() as u32);
        self.imports.push(import);
        id
    }

    pub fn alias(&self, id: AliasId) -> &AliasSymbol {
        &self.aliases[id.slot()]
    }

    pub fn alias_mut(&mut self, id: AliasId) -> &mut AliasSymbol {
        &mut self.aliases[id.slot()]
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub(crate) fn alloc_alias(&mut self, alias: AliasSymbol) -> AliasId {
        let id = AliasId::new(self.aliases.len() as u32);
        self.aliases.push(alias);
        id
    }

    pub fn decl(&self, id: DeclId) -> &DeclSymbol {
        &self.decls[id.slot()]
    }

    fn alloc_decl(&mut self, decl: DeclSymbol) -> DeclId {
        let id = DeclId::new(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::codes;
    use crate::project::MemoryLocator;

    #[test]
    fn test_resolve_creates_packages_once() {
        let interner = Interner::new();
        let mut registry = Registry::new();
        let path = interner.intern_dotted("std.c");

        let first = registry.resolve(&interner, &path).unwrap();
        let second = registry.resolve(&interner, &path).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.package_count(), 2);

        let root = registry.package(first.root.unwrap());
        let leaf = registry.package(first.leaf.unwrap());
        assert_eq!(root.qualified, "std");
        assert_eq!(leaf.qualified, "std.c");
        assert_eq!(leaf.parent, first.root);
        assert_eq!(first.table, TableRef::Package(first.leaf.unwrap()));
    }

    #[test]
    fn test_resolve_empty_path() {
        let interner = Interner::new();
        let mut registry = Registry::new();

        let resolved = registry.resolve(&interner, &[]).unwrap();
        assert_eq!(resolved.table, TableRef::Root);
        assert_eq!(resolved.root, None);
        assert_eq!(resolved.leaf, None);
    }

    #[test]
    fn test_load_module_is_memoized() {
        let interner = Interner::new();
        let files = FileSet::new();
        let mut diagnostics = DiagnosticCollector::new();
        let mut locator = MemoryLocator::new();
        locator.add("std.stdio", "module std.stdio; fn writefln;");
        let mut registry = Registry::new();

        let std = interner.intern_dotted("std");
        let stdio = interner.intern("stdio");
        let mut cx = LoadContext {
            interner: &interner,
            files: &files,
            locator: &locator,
            diagnostics: &mut diagnostics,
        };
        let a = registry.load_module(&mut cx, &std, stdio).unwrap();
        let b = registry.load_module(&mut cx, &std, stdio).unwrap();

        assert_eq!(a, b);
        assert_eq!(registry.module_count(), 1);
        assert_eq!(registry.find_module("std.stdio"), Some(a));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_load_module_errors() {
        let interner = Interner::new();
        let files = FileSet::new();
        let mut diagnostics = DiagnosticCollector::new();
        let mut locator = MemoryLocator::new();
        locator.add("broken", "import ;");
        let mut registry = Registry::new();
        let mut cx = LoadContext {
            interner: &interner,
            files: &files,
            locator: &locator,
            diagnostics: &mut diagnostics,
        };

        let missing = registry.load_module(&mut cx, &[], interner.intern("missing"));
        assert_eq!(
            missing,
            Err(ImportError::UnresolvedModule { name: "missing".into() })
        );

        let broken = registry.load_module(&mut cx, &[], interner.intern("broken"));
        assert!(matches!(broken, Err(ImportError::ModuleParse { .. })));
        assert_eq!(registry.module_count(), 0);
    }

    #[test]
    fn test_static_bind_list_reported_once_at_load() {
        let interner = Interner::new();
        let files = FileSet::new();
        let mut diagnostics = DiagnosticCollector::new();
        let mut locator = MemoryLocator::new();
        locator.add("app", "static import std.stdio : a, b, c;");
        let mut registry = Registry::new();
        let mut cx = LoadContext {
            interner: &interner,
            files: &files,
            locator: &locator,
            diagnostics: &mut diagnostics,
        };

        let app = registry.load_module(&mut cx, &[], interner.intern("app")).unwrap();
        let import = registry.module(app).body[0].as_import().unwrap();

        assert_eq!(diagnostics.with_code(codes::INVALID_BIND_LIST).len(), 1);
        assert_eq!(registry.import(import).bind_list().count(), 0);
    }

    #[test]
    fn test_header_mismatch_warns() {
        let interner = Interner::new();
        let files = FileSet::new();
        let mut diagnostics = DiagnosticCollector::new();
        let mut locator = MemoryLocator::new();
        locator.add("app", "module app.main;\nfn main;");
        locator.add("lib", "module lib;");
        let mut registry = Registry::new();
        let mut cx = LoadContext {
            interner: &interner,
            files: &files,
            locator: &locator,
            diagnostics: &mut diagnostics,
        };

        let app = registry.load_module(&mut cx, &[], interner.intern("app")).unwrap();
        registry.load_module(&mut cx, &[], interner.intern("lib")).unwrap();

        assert_eq!(registry.module(app).pretty, "app.main");
        assert_eq!(registry.find_module("app"), Some(app));
        let warnings = diagnostics.with_code(codes::MODULE_NAME_MISMATCH);
        assert_eq!(warnings.len(), 1);
        assert!(!warnings[0].is_error());
        assert_eq!(&*warnings[0].message, "module app.main is loaded as app");
        assert!(!diagnostics.has_errors());
    }
}
