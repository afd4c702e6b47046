//! Name resolution from inside a module.
//!
//! The first segment of a name is looked up like any unqualified name: the
//! module's own table, then its import sets. Every following segment is
//! looked up *inside* what the previous one resolved to (a package, a module
//! or an import forwarding to one), as seen from outside, so private import
//! sets of the inner modules do not leak.
//!
//! Aliases are followed to what they are bound to, and imports are replaced
//! by what they stand for ([`Import::to_alias`](super::import::Import::to_alias)).

use crate::base::Name;

use super::ids::ModuleId;
use super::module::SearchFlags;
use super::session::Session;
use super::symbols::{AliasTarget, Symbol};

/// Result of resolving a reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Successfully resolved to a single symbol.
    Found(Symbol),
    /// The first segment is reachable through several import sets.
    Ambiguous(Vec<Symbol>),
    /// Could not resolve the reference.
    NotFound,
}

impl ResolveResult {
    /// Get the resolved symbol if unambiguous.
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            ResolveResult::Found(s) => Some(*s),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ResolveResult::Ambiguous(_))
    }
}

/// Resolves names as written inside one module.
///
/// Holds the session mutably: searching through an import that has not been
/// bound yet loads and analyses its target.
pub struct Resolver<'a> {
    session: &'a mut Session,
    module: ModuleId,
}

impl<'a> Resolver<'a> {
    pub fn new(session: &'a mut Session, module: ModuleId) -> Self {
        Self { session, module }
    }

    /// Resolve a dotted name such as `writefln` or `std.stdio.writefln`.
    pub fn resolve(&mut self, name: &str) -> ResolveResult {
        let segments = self.session.interner().intern_dotted(name);
        self.resolve_path(&segments)
    }

    pub fn resolve_path(&mut self, path: &[Name]) -> ResolveResult {
        let Some((&first, rest)) = path.split_first() else {
            return ResolveResult::NotFound;
        };

        let candidates = self
            .session
            .module_search_all(self.module, first, SearchFlags::NONE);
        let mut current = match candidates.as_slice() {
            [] => return ResolveResult::NotFound,
            [single] => *single,
            _ => return ResolveResult::Ambiguous(candidates),
        };
        current = match self.follow(current) {
            Some(symbol) => symbol,
            None => return ResolveResult::NotFound,
        };

        for &segment in rest {
            let next = match current {
                Symbol::Package(package) => self
                    .session
                    .registry()
                    .package(package)
                    .members
                    .lookup(segment),
                Symbol::Module(module) => {
                    self.session
                        .module_search(module, segment, SearchFlags::IGNORE_PRIVATE_IMPORTS)
                }
                Symbol::Import(import) => {
                    self.session
                        .import_search(import, segment, SearchFlags::IGNORE_PRIVATE_IMPORTS)
                }
                Symbol::Alias(_) | Symbol::Decl(_) => None,
            };
            current = match next.and_then(|symbol| self.follow(symbol)) {
                Some(symbol) => symbol,
                None => return ResolveResult::NotFound,
            };
        }

        ResolveResult::Found(current)
    }

    /// Follow bound aliases and apply `to_alias` to imports.
    ///
    /// A still-deferred alias resolves to itself.
    fn follow(&self, mut symbol: Symbol) -> Option<Symbol> {
        let registry = self.session.registry();
        // Alias chains cannot be longer than the number of aliases.
        for _ in 0..=registry.alias_count() {
            symbol = match symbol {
                Symbol::Alias(alias) => match registry.alias(alias).target {
                    AliasTarget::Bound(target) => target,
                    AliasTarget::Deferred => return Some(symbol),
                    AliasTarget::Unresolved => return None,
                },
                Symbol::Import(import) => return Some(registry.import(import).to_alias(import)),
                Symbol::Package(_) | Symbol::Module(_) | Symbol::Decl(_) => return Some(symbol),
            };
        }
        None
    }
}
