//! Modules and their two-pass analysis.
//!
//! Analysis of one module can synchronously trigger analysis of the modules
//! it imports, which may import it back. Each pass therefore carries an
//! explicit [`AnalysisState`]: a module that is already `Analyzing` is not
//! re-entered, and the caller simply sees it as it is (members already in
//! its table, imports possibly not yet bound).

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{FileId, Loc, Name};
use crate::syntax::{ItemKind, Protection};

use super::error::ImportError;
use super::ids::ModuleId;
use super::scope::ScopeSnapshot;
use super::session::Session;
use super::symbols::{Symbol, SymbolTable};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnalysisState {
    #[default]
    Unanalyzed,
    Analyzing,
    Analyzed,
}

/// A module imported into another module's unqualified lookup.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImportScope {
    pub module: ModuleId,
    pub protection: Protection,
}

/// Flags for [`Session::module_search`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchFlags {
    /// Skip import sets registered as private. Set when searching a module
    /// from outside of it.
    pub ignore_private_imports: bool,
}

impl SearchFlags {
    pub const NONE: Self = Self {
        ignore_private_imports: false,
    };
    pub const IGNORE_PRIVATE_IMPORTS: Self = Self {
        ignore_private_imports: true,
    };
}

/// One compiled translation unit.
#[derive(Clone, Debug)]
pub struct Module {
    /// Final segment of the path the module was loaded under.
    pub name: Name,
    /// Dotted path the module was loaded under; unique per registry.
    pub qualified: SmolStr,
    /// Name from the `module` header, or `qualified` if there is none.
    pub pretty: SmolStr,
    pub file: FileId,
    pub src_path: SmolStr,
    /// Whether the module needs runtime reflection metadata.
    pub needs_module_info: bool,
    /// Root module that first caused this one to be loaded.
    pub imported_from: Option<ModuleId>,
    /// Direct imports in analysis order. Duplicates are allowed.
    pub imported_modules: Vec<ModuleId>,
    /// Top-level symbol table.
    pub members: SymbolTable,
    pub import_scopes: Vec<ImportScope>,
    pub semantic_state: AnalysisState,
    pub semantic2_state: AnalysisState,
    /// Imports and declarations in source order.
    pub(crate) body: Vec<Symbol>,
    members_added: bool,
}

impl Module {
    pub(crate) fn new(
        name: Name,
        qualified: SmolStr,
        pretty: SmolStr,
        file: FileId,
        src_path: impl Into<SmolStr>,
    ) -> Self {
        Self {
            name,
            qualified,
            pretty,
            file,
            src_path: src_path.into(),
            needs_module_info: false,
            imported_from: None,
            imported_modules: Vec::new(),
            members: SymbolTable::new(),
            import_scopes: Vec::new(),
            semantic_state: AnalysisState::Unanalyzed,
            semantic2_state: AnalysisState::Unanalyzed,
            body: Vec::new(),
            members_added: false,
        }
    }

    /// Import directives of this module, in source order.
    pub fn imports(&self) -> impl Iterator<Item = super::ids::ImportId> + '_ {
        self.body.iter().filter_map(|symbol| symbol.as_import())
    }

    /// Register `module` as an import set; a repeat keeps the more visible
    /// protection.
    pub(crate) fn import_scope(&mut self, module: ModuleId, protection: Protection) {
        if let Some(existing) = self.import_scopes.iter_mut().find(|s| s.module == module) {
            if visibility_rank(protection) > visibility_rank(existing.protection) {
                existing.protection = protection;
            }
            return;
        }
        self.import_scopes.push(ImportScope { module, protection });
    }
}

fn visibility_rank(protection: Protection) -> u8 {
    match protection {
        Protection::Undetermined => 0,
        Protection::Private => 1,
        Protection::Package => 2,
        Protection::Default => 3,
        Protection::Public => 4,
    }
}

impl Session {
    /// First semantic pass over `id`.
    ///
    /// Adds every member to the module's table, then binds each import (which
    /// recursively analyses imported modules). Re-entry while the pass is
    /// running is a silent no-op.
    pub(crate) fn module_semantic(&mut self, id: ModuleId) {
        let module = self.registry.module_mut(id);
        match module.semantic_state {
            AnalysisState::Analyzing => {
                tracing::trace!(module = %module.qualified, "analysis in progress; not re-entering");
                return;
            }
            AnalysisState::Analyzed => return,
            AnalysisState::Unanalyzed => {}
        }
        module.semantic_state = AnalysisState::Analyzing;
        tracing::debug!(module = %module.qualified, "semantic");
        let scope = ScopeSnapshot::module(id, module.imported_from);

        self.add_members(id);

        let body = self.registry.module(id).body.clone();
        self.with_scope(scope, |cx| {
            for member in body {
                match member {
                    Symbol::Import(import) => {
                        let declared = cx.registry.import(import).declared_protection;
                        cx.import_semantic(import, &scope.with_declared(declared));
                    }
                    Symbol::Decl(decl) => {
                        if cx.registry.decl(decl).kind == ItemKind::StaticCtor {
                            cx.registry.module_mut(id).needs_module_info = true;
                        }
                    }
                    Symbol::Package(_) | Symbol::Module(_) | Symbol::Alias(_) => {}
                }
            }
        });

        self.registry.module_mut(id).semantic_state = AnalysisState::Analyzed;
    }

    /// Second semantic pass over `id`.
    ///
    /// Class declarations only reveal their reflection-metadata requirement
    /// here, which is why imports re-propagate the flag in this pass.
    pub(crate) fn module_semantic2(&mut self, id: ModuleId) {
        if self.registry.module(id).semantic_state == AnalysisState::Unanalyzed {
            self.module_semantic(id);
        }
        let module = self.registry.module_mut(id);
        match module.semantic2_state {
            AnalysisState::Analyzing => {
                tracing::trace!(module = %module.qualified, "semantic2 in progress; not re-entering");
                return;
            }
            AnalysisState::Analyzed => return,
            AnalysisState::Unanalyzed => {}
        }
        module.semantic2_state = AnalysisState::Analyzing;
        tracing::debug!(module = %module.qualified, "semantic2");
        let scope = ScopeSnapshot::module(id, module.imported_from);

        let body = module.body.clone();
        self.with_scope(scope, |cx| {
            for member in body {
                match member {
                    Symbol::Import(import) => {
                        let declared = cx.registry.import(import).declared_protection;
                        cx.import_semantic2(import, &scope.with_declared(declared));
                    }
                    Symbol::Decl(decl) => {
                        if cx.registry.decl(decl).kind == ItemKind::Class {
                            cx.registry.module_mut(id).needs_module_info = true;
                        }
                    }
                    Symbol::Package(_) | Symbol::Module(_) | Symbol::Alias(_) => {}
                }
            }
        });

        self.registry.module_mut(id).semantic2_state = AnalysisState::Analyzed;
    }

    /// Insert every member of `id` into its symbol table. Runs once.
    pub(crate) fn add_members(&mut self, id: ModuleId) {
        let module = self.registry.module_mut(id);
        if module.members_added {
            return;
        }
        module.members_added = true;

        let body = module.body.clone();
        for member in body {
            match member {
                Symbol::Import(import) => self.import_add_member(import, id),
                Symbol::Decl(decl) => {
                    let decl = self.registry.decl(decl);
                    if let Some(name) = decl.name {
                        let loc = decl.loc;
                        self.insert_member(id, name, member, loc);
                    }
                }
                Symbol::Package(_) | Symbol::Module(_) | Symbol::Alias(_) => {}
            }
        }
    }

    /// Insert into a module's table, reporting a clash at `loc`.
    pub(crate) fn insert_member(&mut self, module: ModuleId, name: Name, symbol: Symbol, loc: Loc) -> bool {
        match self.registry.module_mut(module).members.insert(name, symbol) {
            Ok(()) => true,
            Err(existing) => {
                let err = ImportError::DuplicateSymbol {
                    name: self.interner.text(name),
                    kind: symbol.kind_name(),
                    existing: existing.kind_name(),
                };
                self.diagnostics.import_error(loc, err);
                false
            }
        }
    }

    /// Look `name` up in module `id`: its own table first, then its import
    /// sets in registration order.
    pub fn module_search(&self, id: ModuleId, name: Name, flags: SearchFlags) -> Option<Symbol> {
        self.module_search_all(id, name, flags).into_iter().next()
    }

    /// Every distinct symbol `name` reaches from module `id`.
    ///
    /// More than one result means the name is ambiguous between import sets.
    pub fn module_search_all(&self, id: ModuleId, name: Name, flags: SearchFlags) -> Vec<Symbol> {
        let mut visited = FxHashSet::default();
        let mut found = Vec::new();
        self.search_into(id, name, flags, &mut visited, &mut found);
        found
    }

    fn search_into(
        &self,
        id: ModuleId,
        name: Name,
        flags: SearchFlags,
        visited: &mut FxHashSet<ModuleId>,
        found: &mut Vec<Symbol>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let module = self.registry.module(id);
        if let Some(symbol) = module.members.lookup(name) {
            if !(flags.ignore_private_imports && self.is_private_alias(symbol)) {
                if !found.contains(&symbol) {
                    found.push(symbol);
                }
                return;
            }
        }
        for scope in &module.import_scopes {
            if flags.ignore_private_imports && scope.protection == Protection::Private {
                continue;
            }
            // Inside an imported module only its non-private imports count.
            self.search_into(scope.module, name, SearchFlags::IGNORE_PRIVATE_IMPORTS, visited, found);
        }
    }

    /// Selective imports are private unless declared otherwise.
    fn is_private_alias(&self, symbol: Symbol) -> bool {
        match symbol {
            Symbol::Alias(id) => self.registry.alias(id).import_protection == Protection::Private,
            Symbol::Package(_) | Symbol::Module(_) | Symbol::Import(_) | Symbol::Decl(_) => false,
        }
    }
}
