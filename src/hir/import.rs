//! Import directives and their binding.
//!
//! An [`Import`] is created by the registry when its module is parsed, and
//! bound later by the owning module's semantic passes:
//!
//! 1. *add-member* puts the import (or, with a bind-list, one forwarding
//!    alias per entry) into the importing module's table;
//! 2. *semantic* loads the target, analyses it, registers the import set and
//!    binds the forwarding aliases;
//! 3. *semantic2* re-propagates the reflection-metadata flag.
//!
//! Lookups through an import that has not been bound yet ([`Session::import_search`])
//! trigger loading on the spot.

use smol_str::SmolStr;

use crate::base::{Interner, Loc, Name};
use crate::syntax::Protection;

use super::deps::DependencyRecord;
use super::error::ImportError;
use super::ids::{AliasId, ImportId, ModuleId};
use super::module::SearchFlags;
use super::registry::LoadContext;
use super::scope::ScopeSnapshot;
use super::session::Session;
use super::symbols::{AliasSymbol, AliasTarget, Symbol};

/// Progress of [`Session::import_load`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Pending,
    Loaded,
    /// Loading reported a diagnostic; it is not retried.
    Failed,
}

/// One import directive.
#[derive(Clone, Debug)]
pub struct Import {
    pub loc: Loc,
    /// Package path before the final identifier.
    pub packages: Vec<Name>,
    pub id: Name,
    /// `x` in `import x = a.b;`.
    pub alias: Option<Name>,
    pub is_static: bool,
    /// Module the directive appears in.
    pub owner: ModuleId,
    /// Protection written on the declaration itself, if any.
    pub(crate) declared_protection: Option<Protection>,
    protection: Protection,
    ident: Option<Name>,
    names: Vec<Name>,
    aliases: Vec<Option<Name>>,
    alias_decls: Option<Vec<AliasId>>,
    pkg: Option<Symbol>,
    module: Option<ModuleId>,
    load_state: LoadState,
}

impl Import {
    pub fn new(
        loc: Loc,
        packages: Vec<Name>,
        id: Name,
        alias: Option<Name>,
        is_static: bool,
        owner: ModuleId,
    ) -> Self {
        // `import a.b.c;` is visible as `a`, not `c`.
        let ident = alias.or_else(|| packages.first().copied()).or(Some(id));
        Self {
            loc,
            packages,
            id,
            alias,
            is_static,
            owner,
            declared_protection: None,
            protection: Protection::Undetermined,
            ident,
            names: Vec::new(),
            aliases: Vec::new(),
            alias_decls: None,
            pkg: None,
            module: None,
            load_state: LoadState::Pending,
        }
    }

    /// Append one bind-list entry.
    ///
    /// Static imports cannot carry a bind-list. The first entry makes an
    /// unaliased import anonymous.
    pub fn add_alias(&mut self, name: Name, alias: Option<Name>) -> Result<(), ImportError> {
        if self.is_static {
            return Err(ImportError::InvalidBindList);
        }
        if self.alias.is_none() {
            self.ident = None;
        }
        self.names.push(name);
        self.aliases.push(alias);
        Ok(())
    }

    /// Bind-list entries as `(name, alias)`.
    pub fn bind_list(&self) -> impl Iterator<Item = (Name, Option<Name>)> + '_ {
        self.names.iter().copied().zip(self.aliases.iter().copied())
    }

    pub fn has_bind_list(&self) -> bool {
        !self.names.is_empty()
    }

    /// Name the import is visible under; `None` for an anonymous import.
    pub fn visible_name(&self) -> Option<Name> {
        self.ident
    }

    pub fn kind(&self) -> &'static str {
        if self.is_static { "static import" } else { "import" }
    }

    /// Resolved protection; `Undetermined` until the semantic pass.
    pub fn protection(&self) -> Protection {
        self.protection
    }

    /// Target module, once loaded.
    pub fn module(&self) -> Option<ModuleId> {
        self.module
    }

    /// Symbol lookups are forwarded to: the outermost package of the path,
    /// or the module itself for a path without packages.
    pub fn forward_target(&self) -> Option<Symbol> {
        self.pkg
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Forwarding aliases synthesized from the bind-list, once expanded.
    pub fn alias_decls(&self) -> &[AliasId] {
        self.alias_decls.as_deref().unwrap_or(&[])
    }

    /// What the import stands for when used as a symbol: the target module
    /// for `import x = a.b;`, otherwise the import itself.
    pub fn to_alias(&self, this: ImportId) -> Symbol {
        match (self.alias, self.module) {
            (Some(_), Some(module)) => Symbol::Module(module),
            _ => Symbol::Import(this),
        }
    }

    /// Fresh, unbound copy with the same path, alias, static flag and
    /// bind-list.
    pub fn syntax_copy(&self) -> Import {
        let mut copy = Import::new(
            self.loc,
            self.packages.clone(),
            self.id,
            self.alias,
            self.is_static,
            self.owner,
        );
        copy.declared_protection = self.declared_protection;
        for (name, alias) in self.bind_list() {
            // A bind-list only exists on non-static imports.
            if copy.add_alias(name, alias).is_err() {
                break;
            }
        }
        copy
    }

    /// Render as source: `[static ]import [x = ]a.b.c[:n1,a2=n2];\n`.
    ///
    /// In header mode an import of `default_module` renders as nothing,
    /// since that module is imported implicitly.
    pub fn render(&self, interner: &Interner, header_mode: bool, default_module: &str) -> String {
        let id = interner.text(self.id);
        if header_mode && id == default_module {
            return String::new();
        }

        let mut out = String::new();
        if self.is_static {
            out.push_str("static ");
        }
        out.push_str("import ");
        if let Some(alias) = self.alias {
            out.push_str(&interner.text(alias));
            out.push_str(" = ");
        }
        for &package in &self.packages {
            out.push_str(&interner.text(package));
            out.push('.');
        }
        out.push_str(&id);
        if self.has_bind_list() {
            out.push(':');
            for (i, (name, alias)) in self.bind_list().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                if let Some(alias) = alias {
                    out.push_str(&interner.text(alias));
                    out.push('=');
                }
                out.push_str(&interner.text(name));
            }
        }
        out.push_str(";\n");
        out
    }
}

impl Session {
    /// Insert import `id` into `owner`'s table.
    ///
    /// Without a bind-list the import goes in under its visible name. With
    /// one, the import itself is inserted only if it has an alias, and each
    /// bind-list entry becomes a forwarding alias.
    pub(crate) fn import_add_member(&mut self, id: ImportId, owner: ModuleId) {
        let import = self.registry.import(id);
        let loc = import.loc;
        if !import.has_bind_list() {
            if let Some(name) = import.visible_name() {
                self.insert_member(owner, name, Symbol::Import(id), loc);
            }
            return;
        }
        if let Some(alias) = import.alias {
            self.insert_member(owner, alias, Symbol::Import(id), loc);
        }
        self.expand_into_scope(id, owner);
    }

    /// Synthesize the import's forwarding aliases and insert them into
    /// `owner`'s table. Runs once per import.
    pub(crate) fn expand_into_scope(&mut self, id: ImportId, owner: ModuleId) {
        let import = self.registry.import(id);
        if import.alias_decls.is_some() {
            return;
        }
        let loc = import.loc;
        let protection = import.protection;
        let entries: Vec<_> = import.bind_list().collect();

        let mut decls = Vec::with_capacity(entries.len());
        for (name, alias) in entries {
            let visible = alias.unwrap_or(name);
            let alias_id = self.registry.alloc_alias(AliasSymbol {
                name: visible,
                target_name: name,
                import: id,
                loc,
                import_protection: protection,
                target: AliasTarget::Deferred,
            });
            self.insert_member(owner, visible, Symbol::Alias(alias_id), loc);
            decls.push(alias_id);
        }
        tracing::trace!(import = ?id, count = decls.len(), "expanded bind-list");
        self.registry.import_mut(id).alias_decls = Some(decls);
    }

    /// Resolve and, if needed, load the import's target module.
    ///
    /// Idempotent: once loaded (or failed) the import is never resolved
    /// again. Without a scope, provenance falls back to the first root.
    pub(crate) fn import_load(&mut self, id: ImportId, scope: Option<&ScopeSnapshot>) -> Option<ModuleId> {
        let import = self.registry.import(id);
        match import.load_state {
            LoadState::Loaded => return import.module,
            LoadState::Failed => return None,
            LoadState::Pending => {}
        }
        let loc = import.loc;

        match self.locate_target(id) {
            Ok((pkg, module)) => {
                let target = self.registry.module_mut(module);
                if target.imported_from.is_none() {
                    target.imported_from = scope
                        .and_then(|scope| scope.imported_from)
                        .or_else(|| self.roots.first().copied());
                }
                let import = self.registry.import_mut(id);
                import.pkg = Some(pkg);
                import.module = Some(module);
                import.load_state = LoadState::Loaded;
                Some(module)
            }
            Err(err) => {
                self.diagnostics.import_error(loc, err);
                self.registry.import_mut(id).load_state = LoadState::Failed;
                None
            }
        }
    }

    fn locate_target(&mut self, id: ImportId) -> Result<(Symbol, ModuleId), ImportError> {
        let import = self.registry.import(id);
        let packages = import.packages.clone();
        let name = import.id;

        let resolved = self.registry.resolve(&self.interner, &packages)?;
        let module = match self.registry.table(resolved.table).lookup(name) {
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
                let module = self.registry.load_module(&mut cx, &packages, name)?;
                // The local name may differ from the module's declared one.
                self.registry
                    .table_mut(resolved.table)
                    .insert(name, Symbol::Module(module))
                    .map_err(|_| ImportError::NameConflict)?;
                module
            }
        };

        let pkg = resolved.root.map(Symbol::Package).unwrap_or(Symbol::Module(module));
        Ok((pkg, module))
    }

    /// First semantic pass of import `id` in `scope`.
    #[tracing::instrument(level = "debug", skip_all, fields(import = ?id, module = ?scope.module))]
    pub(crate) fn import_semantic(&mut self, id: ImportId, scope: &ScopeSnapshot) {
        if let Some(target) = self.import_load(id, Some(scope)) {
            self.registry.module_mut(scope.module).imported_modules.push(target);
            self.module_semantic(target);

            let protection = scope.import_protection();
            let import = self.registry.import_mut(id);
            import.protection = protection;
            if import.alias.is_none() && !import.has_bind_list() {
                self.registry
                    .module_mut(scope.module)
                    .import_scope(target, protection);
            }

            if self.registry.module(target).needs_module_info {
                self.registry.module_mut(scope.module).needs_module_info = true;
            }

            self.bind_aliases(id, target, protection);
        }

        self.emit_dependency(id, scope);
    }

    /// Check each bind-list name against `target` and bind its alias, with
    /// `target` as the current scope.
    fn bind_aliases(&mut self, id: ImportId, target: ModuleId, protection: Protection) {
        let import = self.registry.import(id);
        if !import.has_bind_list() {
            return;
        }
        let loc = import.loc;
        let names: Vec<Name> = import.names.clone();
        let decls = import.alias_decls().to_vec();
        let target_scope = ScopeSnapshot::module(target, self.registry.module(target).imported_from);

        self.with_scope(target_scope, |cx| {
            for (i, &name) in names.iter().enumerate() {
                if cx.module_search(target, name, SearchFlags::NONE).is_none() {
                    let err = ImportError::BindListNotFound {
                        name: cx.interner.text(name),
                    };
                    cx.diagnostics.import_error(loc, err);
                }
                if let Some(&alias) = decls.get(i) {
                    cx.registry.alias_mut(alias).import_protection = protection;
                    cx.alias_semantic(alias);
                }
            }
        });
    }

    /// Bind a deferred alias by looking its target name up in the current
    /// scope's module.
    pub(crate) fn alias_semantic(&mut self, id: AliasId) {
        let alias = self.registry.alias(id);
        if alias.target != AliasTarget::Deferred {
            return;
        }
        let Some(scope) = self.scopes.current() else {
            return;
        };
        let target = match self.module_search(scope.module, alias.target_name, SearchFlags::NONE) {
            Some(symbol) => AliasTarget::Bound(symbol),
            None => AliasTarget::Unresolved,
        };
        tracing::trace!(alias = ?id, ?target, "bound alias");
        self.registry.alias_mut(id).target = target;
    }

    /// Second semantic pass of import `id`.
    pub(crate) fn import_semantic2(&mut self, id: ImportId, scope: &ScopeSnapshot) {
        let Some(target) = self.registry.import(id).module else {
            return;
        };
        self.module_semantic2(target);
        if self.registry.module(target).needs_module_info {
            self.registry.module_mut(scope.module).needs_module_info = true;
        }
    }

    /// Look `name` up through import `id`, loading its target first if the
    /// import has not been bound yet.
    pub fn import_search(&mut self, id: ImportId, name: Name, flags: SearchFlags) -> Option<Symbol> {
        if self.registry.import(id).pkg.is_none() {
            if let Some(module) = self.import_load(id, None) {
                self.module_semantic(module);
            }
        }
        match self.registry.import(id).pkg? {
            Symbol::Package(package) => self.registry.package(package).members.lookup(name),
            Symbol::Module(module) => self.module_search(module, name, flags),
            Symbol::Import(_) | Symbol::Alias(_) | Symbol::Decl(_) => None,
        }
    }

    fn emit_dependency(&mut self, id: ImportId, scope: &ScopeSnapshot) {
        if self.deps.is_none() {
            return;
        }
        let importer = self.registry.module(scope.module);
        let import = self.registry.import(id);
        let text = |name: Name| self.interner.text(name);

        let record = DependencyRecord {
            importer: importer.pretty.clone(),
            importer_path: importer.src_path.clone(),
            scope_protection: scope.protection,
            is_static: import.is_static,
            packages: import.packages.iter().map(|&p| text(p)).collect(),
            id: text(import.id),
            target_path: import
                .module
                .map(|module| self.registry.module(module).src_path.clone()),
            alias: import.alias.map(text),
            bindings: import
                .bind_list()
                .map(|(name, alias)| (text(name), alias.map(text)))
                .collect::<Vec<(SmolStr, Option<SmolStr>)>>(),
        };
        if let Some(deps) = self.deps.as_mut() {
            deps.push(&record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;

    fn import(interner: &Interner, path: &str, alias: Option<&str>, is_static: bool) -> Import {
        let mut segments = interner.intern_dotted(path);
        let id = segments.pop().unwrap();
        Import::new(
            Loc::start_of(FileId::new(0)),
            segments,
            id,
            alias.map(|a| interner.intern(a)),
            is_static,
            ModuleId::new(0),
        )
    }

    #[test]
    fn test_visible_name_is_first_segment() {
        let interner = Interner::new();
        let imp = import(&interner, "a.b.c", None, false);
        assert_eq!(imp.visible_name(), Some(interner.intern("a")));

        let imp = import(&interner, "c", None, false);
        assert_eq!(imp.visible_name(), Some(interner.intern("c")));
    }

    #[test]
    fn test_alias_wins_and_survives_bind_list() {
        let interner = Interner::new();
        let mut imp = import(&interner, "a.b.c", Some("x"), false);
        assert_eq!(imp.visible_name(), Some(interner.intern("x")));

        imp.add_alias(interner.intern("f"), None).unwrap();
        assert_eq!(imp.visible_name(), Some(interner.intern("x")));
    }

    #[test]
    fn test_bind_list_makes_import_anonymous() {
        let interner = Interner::new();
        let mut imp = import(&interner, "a.b.c", None, false);
        imp.add_alias(interner.intern("f"), None).unwrap();
        assert_eq!(imp.visible_name(), None);
    }

    #[test]
    fn test_static_rejects_bind_list() {
        let interner = Interner::new();
        let mut imp = import(&interner, "a.b", None, true);
        assert_eq!(
            imp.add_alias(interner.intern("f"), None),
            Err(ImportError::InvalidBindList)
        );
        assert!(!imp.has_bind_list());
        assert_eq!(imp.kind(), "static import");
    }

    #[test]
    fn test_render() {
        let interner = Interner::new();
        let mut imp = import(&interner, "std.stdio", Some("io"), false);
        imp.add_alias(interner.intern("writefln"), None).unwrap();
        imp.add_alias(interner.intern("stdout"), Some(interner.intern("out")))
            .unwrap();
        assert_eq!(
            imp.render(&interner, false, "object"),
            "import io = std.stdio:writefln,out=stdout;\n"
        );

        let imp = import(&interner, "core.thread", None, true);
        assert_eq!(imp.render(&interner, true, "object"), "static import core.thread;\n");
    }

    #[test]
    fn test_render_skips_default_module_in_headers() {
        let interner = Interner::new();
        let imp = import(&interner, "object", None, false);
        assert_eq!(imp.render(&interner, true, "object"), "");
        assert_eq!(imp.render(&interner, false, "object"), "import object;\n");
    }

    #[test]
    fn test_syntax_copy_is_unbound() {
        let interner = Interner::new();
        let mut imp = import(&interner, "std.stdio", None, false);
        imp.add_alias(interner.intern("writefln"), None).unwrap();
        imp.module = Some(ModuleId::new(3));
        imp.load_state = LoadState::Loaded;
        imp.protection = Protection::Public;

        let copy = imp.syntax_copy();
        assert_eq!(copy.module(), None);
        assert_eq!(copy.load_state(), LoadState::Pending);
        assert_eq!(copy.protection(), Protection::Undetermined);
        assert_eq!(copy.bind_list().collect::<Vec<_>>(), imp.bind_list().collect::<Vec<_>>());
        assert_eq!(copy.visible_name(), None);
    }

    #[test]
    fn test_to_alias() {
        let interner = Interner::new();
        let this = ImportId::new(7);

        let mut aliased = import(&interner, "std.stdio", Some("io"), false);
        assert_eq!(aliased.to_alias(this), Symbol::Import(this));
        aliased.module = Some(ModuleId::new(2));
        assert_eq!(aliased.to_alias(this), Symbol::Module(ModuleId::new(2)));

        let mut plain = import(&interner, "std.stdio", None, false);
        plain.module = Some(ModuleId::new(2));
        assert_eq!(plain.to_alias(this), Symbol::Import(this));
    }
}
