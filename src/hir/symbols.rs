//! Symbols and symbol tables.
//!
//! A [`Symbol`] is a closed set of handles: every decision point that cares
//! about what a name refers to matches on it exhaustively.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::base::{Loc, Name};
use crate::syntax::{ItemKind, Protection};

use super::ids::{AliasId, DeclId, ImportId, ModuleId, PackageId};

/// What a name in a symbol table refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Package(PackageId),
    Module(ModuleId),
    Import(ImportId),
    Alias(AliasId),
    Decl(DeclId),
}

impl Symbol {
    pub fn as_module(self) -> Option<ModuleId> {
        match self {
            Symbol::Module(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_import(self) -> Option<ImportId> {
        match self {
            Symbol::Import(id) => Some(id),
            _ => None,
        }
    }

    /// Whether `candidate` may share this symbol's name in one table.
    ///
    /// Only imports tolerate a same-named import: several modules can be
    /// imported under one local name as long as none is used unqualified.
    pub fn overload_insert(self, candidate: Symbol) -> bool {
        match self {
            Symbol::Import(_) => matches!(candidate, Symbol::Import(_)),
            Symbol::Package(_) | Symbol::Module(_) | Symbol::Alias(_) | Symbol::Decl(_) => false,
        }
    }

    /// Human-readable kind, used in diagnostics.
    pub fn kind_name(self) -> &'static str {
        match self {
            Symbol::Package(_) => "package",
            Symbol::Module(_) => "module",
            Symbol::Import(_) => "import",
            Symbol::Alias(_) => "alias",
            Symbol::Decl(_) => "declaration",
        }
    }
}

/// Name → symbol map with duplicate detection.
///
/// Iteration follows insertion order so that anything derived from a table
/// (diagnostics, reports) is deterministic.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: IndexMap<Name, Vec<Symbol>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `symbol` under `name`.
    ///
    /// On a clash the existing symbol decides via [`Symbol::overload_insert`];
    /// if it refuses, the existing symbol is returned as the error.
    /// Re-inserting the very same symbol is a no-op.
    pub fn insert(&mut self, name: Name, symbol: Symbol) -> Result<(), Symbol> {
        match self.entries.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(vec![symbol]);
                Ok(())
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get();
                if existing.contains(&symbol) {
                    return Ok(());
                }
                let first = existing[0];
                if first.overload_insert(symbol) {
                    slot.get_mut().push(symbol);
                    Ok(())
                } else {
                    Err(first)
                }
            }
        }
    }

    /// First symbol inserted under `name`.
    pub fn lookup(&self, name: Name) -> Option<Symbol> {
        self.entries.get(&name).and_then(|symbols| symbols.first().copied())
    }

    /// All symbols sharing `name` (more than one only for imports).
    pub fn lookup_all(&self, name: Name) -> &[Symbol] {
        self.entries.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: Name) -> bool {
        self.entries.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, Symbol)> + '_ {
        self.entries
            .iter()
            .flat_map(|(&name, symbols)| symbols.iter().map(move |&symbol| (name, symbol)))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Binding state of a forwarding alias.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AliasTarget {
    /// Not analysed yet; binds during its import's semantic pass.
    #[default]
    Deferred,
    Bound(Symbol),
    /// Analysed, but the name does not exist in the imported module.
    Unresolved,
}

/// A forwarding alias synthesized from one bind-list entry.
///
/// `import std.stdio : out = stdout;` creates an alias named `out` whose
/// target is "`stdout` inside whatever `std.stdio` turns out to be".
#[derive(Clone, Debug)]
pub struct AliasSymbol {
    /// Name under which the alias is visible in the importing module.
    pub name: Name,
    /// Name looked up inside the imported module.
    pub target_name: Name,
    pub import: ImportId,
    pub loc: Loc,
    /// Protection inherited from the import that created it.
    pub import_protection: Protection,
    pub target: AliasTarget,
}

/// A named declaration that is not an import (function, variable, ...).
#[derive(Clone, Debug)]
pub struct DeclSymbol {
    pub name: Option<Name>,
    pub kind: ItemKind,
    pub module: ModuleId,
    pub loc: Loc,
    pub protection: Option<Protection>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Interner;

    #[test]
    fn test_imports_overload() {
        let interner = Interner::new();
        let std = interner.intern("std");
        let mut table = SymbolTable::new();

        table.insert(std, Symbol::Import(ImportId::new(0))).unwrap();
        table.insert(std, Symbol::Import(ImportId::new(1))).unwrap();

        assert_eq!(table.lookup(std), Some(Symbol::Import(ImportId::new(0))));
        assert_eq!(table.lookup_all(std).len(), 2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_non_import_conflicts() {
        let interner = Interner::new();
        let std = interner.intern("std");
        let mut table = SymbolTable::new();

        table.insert(std, Symbol::Import(ImportId::new(0))).unwrap();
        let err = table.insert(std, Symbol::Decl(DeclId::new(0))).unwrap_err();
        assert_eq!(err, Symbol::Import(ImportId::new(0)));

        let mut table = SymbolTable::new();
        table.insert(std, Symbol::Decl(DeclId::new(0))).unwrap();
        assert!(table.insert(std, Symbol::Import(ImportId::new(0))).is_err());
    }

    #[test]
    fn test_reinsert_same_symbol_is_noop() {
        let interner = Interner::new();
        let name = interner.intern("x");
        let mut table = SymbolTable::new();

        table.insert(name, Symbol::Alias(AliasId::new(4))).unwrap();
        table.insert(name, Symbol::Alias(AliasId::new(4))).unwrap();
        assert_eq!(table.lookup_all(name).len(), 1);
    }

    #[test]
    fn test_iteration_is_insertion_ordered() {
        let interner = Interner::new();
        let mut table = SymbolTable::new();
        for (i, s) in ["zeta", "alpha", "mid"].into_iter().enumerate() {
            table.insert(interner.intern(s), Symbol::Decl(DeclId::new(i as u32))).unwrap();
        }
        let names: Vec<_> = table.iter().map(|(n, _)| interner.text(n)).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
