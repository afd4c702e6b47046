//! Declaration-level surface syntax.
//!
//! Only the parts of a module the import core cares about are parsed: the
//! optional `module` header, import directives with their protection
//! attributes, and named top-level declarations. Bodies are not modelled.

pub mod ast;
mod lexer;
mod parser;

pub use ast::{Decl, ImportDecl, ItemDecl, ItemKind, ModuleHeader, Protection, SourceModule};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{ParseError, parse_module};
