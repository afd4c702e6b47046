//! Analysis scopes.

use crate::syntax::Protection;

use super::ids::ModuleId;

/// Read-only view of the scope an import is analysed in.
///
/// The binder never looks at ambient state: everything it needs about its
/// surroundings arrives in one of these.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScopeSnapshot {
    /// The module whose symbol table the scope belongs to.
    pub module: ModuleId,
    pub protection: Protection,
    /// Whether `protection` was written in source (attribute, label, block).
    pub explicit_protection: bool,
    /// Provenance of `module`, inherited by modules it loads first.
    pub imported_from: Option<ModuleId>,
}

impl ScopeSnapshot {
    /// Module-level scope: public but not explicitly so.
    pub fn module(module: ModuleId, imported_from: Option<ModuleId>) -> Self {
        Self {
            module,
            protection: Protection::Public,
            explicit_protection: false,
            imported_from,
        }
    }

    /// The same scope with a declaration's explicit protection applied.
    pub fn with_declared(self, declared: Option<Protection>) -> Self {
        match declared {
            Some(protection) => Self {
                protection,
                explicit_protection: true,
                ..self
            },
            None => self,
        }
    }

    /// Effective protection of an import analysed in this scope.
    ///
    /// Imports are private unless the scope says otherwise.
    pub fn import_protection(&self) -> Protection {
        if self.explicit_protection {
            self.protection
        } else {
            Protection::Private
        }
    }
}

/// Stack of active analysis scopes.
#[derive(Clone, Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeSnapshot>,
}

impl ScopeStack {
    pub fn push(&mut self, scope: ScopeSnapshot) {
        self.frames.push(scope);
    }

    pub fn pop(&mut self) -> Option<ScopeSnapshot> {
        self.frames.pop()
    }

    pub fn current(&self) -> Option<&ScopeSnapshot> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
