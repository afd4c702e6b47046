//! Parsed declarations of one module source.

use smol_str::SmolStr;
use text_size::TextRange;

/// Protection level of a declaration or scope.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Protection {
    /// Not yet computed (imports before their semantic pass).
    #[default]
    Undetermined,
    /// No protection word applies.
    Default,
    Private,
    Package,
    Public,
}

impl Protection {
    /// The keyword as written in source and in dependency records.
    ///
    /// `Undetermined` and `Default` have no keyword and yield `""`.
    pub fn keyword(self) -> &'static str {
        match self {
            Protection::Public => "public",
            Protection::Private => "private",
            Protection::Package => "package",
            Protection::Default | Protection::Undetermined => "",
        }
    }
}

/// A whole parsed module source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceModule {
    /// `module a.b;` header, if present.
    pub header: Option<ModuleHeader>,
    pub decls: Vec<Decl>,
}

impl SourceModule {
    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Import(import) => Some(import),
            Decl::Item(_) => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleHeader {
    /// Dotted module name, one entry per segment.
    pub path: Vec<SmolStr>,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decl {
    Import(ImportDecl),
    Item(ItemDecl),
}

/// One import directive: `[static] import [alias =] a.b.c [: x, y = z];`
///
/// A comma-separated `import a, b;` produces one `ImportDecl` per module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDecl {
    pub range: TextRange,
    /// Protection stated explicitly for this declaration, by attribute,
    /// label or block.
    pub protection: Option<Protection>,
    pub is_static: bool,
    pub alias: Option<SmolStr>,
    /// Package path prefix (everything before the final segment).
    pub packages: Vec<SmolStr>,
    /// Final segment: the module's own name.
    pub id: SmolStr,
    /// Bind-list entries as `(name, alias)`.
    pub bindings: Vec<(SmolStr, Option<SmolStr>)>,
}

/// A named top-level declaration other than an import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemDecl {
    pub range: TextRange,
    pub protection: Option<Protection>,
    pub kind: ItemKind,
    /// `None` for `static this;`.
    pub name: Option<SmolStr>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Function,
    Variable,
    Class,
    /// `static this;` - a module constructor.
    StaticCtor,
}

impl ItemKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ItemKind::Function => "fn",
            ItemKind::Variable => "var",
            ItemKind::Class => "class",
            ItemKind::StaticCtor => "static this",
        }
    }
}
