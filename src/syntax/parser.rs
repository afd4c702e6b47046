//! Recursive-descent parser for module declarations.
//!
//! Grammar (declaration level only):
//!
//! ```text
//! module      := header? decl*
//! header      := "module" dotted ";"
//! decl        := protection ":"                     // label
//!              | protection "{" decl* "}"           // block
//!              | protection? "static"? import
//!              | protection? item
//! import      := "import" one ("," one)* ";"
//! one         := (IDENT "=")? dotted (":" bind ("," bind)*)?
//! bind        := IDENT ("=" IDENT)?
//! item        := ("fn" | "var" | "class") IDENT ";" | "static" "this" ";"
//! ```

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use super::ast::{Decl, ImportDecl, ItemDecl, ItemKind, ModuleHeader, Protection, SourceModule};
use super::lexer::{Token, TokenKind, tokenize};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}

/// Parse one module source into its declarations.
pub fn parse_module(src: &str) -> Result<SourceModule, ParseError> {
    let tokens = tokenize(src).map_err(|range| ParseError {
        message: "unrecognized character".to_string(),
        range,
    })?;
    let end = TextSize::from(src.len() as u32);
    let mut parser = Parser {
        tokens,
        pos: 0,
        end,
    };
    parser.module()
}

struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
    end: TextSize,
}

impl<'src> Parser<'src> {
    fn module(&mut self) -> Result<SourceModule, ParseError> {
        let header = if self.at(TokenKind::Module) {
            Some(self.header()?)
        } else {
            None
        };
        let mut decls = Vec::new();
        self.decls(&mut decls, None, false)?;
        Ok(SourceModule { header, decls })
    }

    fn header(&mut self) -> Result<ModuleHeader, ParseError> {
        let start = self.expect(TokenKind::Module)?.range;
        let (path, _) = self.dotted()?;
        let semi = self.expect(TokenKind::Semi)?.range;
        Ok(ModuleHeader {
            path,
            range: start.cover(semi),
        })
    }

    /// Parse declarations until EOF (or `}` when `in_block`).
    fn decls(
        &mut self,
        out: &mut Vec<Decl>,
        mut protection: Option<Protection>,
        in_block: bool,
    ) -> Result<(), ParseError> {
        loop {
            match self.peek_kind() {
                None if in_block => return Err(self.error_here("expected `}`")),
                None => return Ok(()),
                Some(TokenKind::RBrace) if in_block => {
                    self.bump();
                    return Ok(());
                }
                _ => {}
            }

            if let Some(prot) = self.protection_keyword() {
                self.bump();
                match self.peek_kind() {
                    Some(TokenKind::Colon) => {
                        self.bump();
                        protection = Some(prot);
                    }
                    Some(TokenKind::LBrace) => {
                        self.bump();
                        self.decls(out, Some(prot), true)?;
                    }
                    _ => self.decl(out, Some(prot))?,
                }
                continue;
            }

            self.decl(out, protection)?;
        }
    }

    fn decl(&mut self, out: &mut Vec<Decl>, protection: Option<Protection>) -> Result<(), ParseError> {
        let start = self.current_range();
        match self.peek_kind() {
            Some(TokenKind::Static) => {
                self.bump();
                match self.peek_kind() {
                    Some(TokenKind::Import) => self.import(out, protection, true, start),
                    Some(TokenKind::This) => {
                        self.bump();
                        let semi = self.expect(TokenKind::Semi)?.range;
                        out.push(Decl::Item(ItemDecl {
                            range: start.cover(semi),
                            protection,
                            kind: ItemKind::StaticCtor,
                            name: None,
                        }));
                        Ok(())
                    }
                    _ => Err(self.error_here("expected `import` or `this` after `static`")),
                }
            }
            Some(TokenKind::Import) => self.import(out, protection, false, start),
            Some(kind @ (TokenKind::Fn | TokenKind::Var | TokenKind::Class)) => {
                self.bump();
                let name = self.ident()?;
                let semi = self.expect(TokenKind::Semi)?.range;
                let kind = match kind {
                    TokenKind::Fn => ItemKind::Function,
                    TokenKind::Var => ItemKind::Variable,
                    _ => ItemKind::Class,
                };
                out.push(Decl::Item(ItemDecl {
                    range: start.cover(semi),
                    protection,
                    kind,
                    name: Some(name),
                }));
                Ok(())
            }
            _ => Err(self.error_here("expected a declaration")),
        }
    }

    fn import(
        &mut self,
        out: &mut Vec<Decl>,
        protection: Option<Protection>,
        is_static: bool,
        start: TextRange,
    ) -> Result<(), ParseError> {
        self.expect(TokenKind::Import)?;
        let mut pending = Vec::new();
        loop {
            let one_start = self.current_range();
            let alias = if self.at(TokenKind::Ident) && self.nth_kind(1) == Some(TokenKind::Eq) {
                let alias = self.ident()?;
                self.bump();
                Some(alias)
            } else {
                None
            };
            let (mut path, path_range) = self.dotted()?;
            let id = path.pop().unwrap_or_default();

            let mut bindings = Vec::new();
            let mut last = path_range;
            if self.eat(TokenKind::Colon) {
                loop {
                    let first = self.ident()?;
                    last = self.previous_range();
                    if self.eat(TokenKind::Eq) {
                        let name = self.ident()?;
                        last = self.previous_range();
                        bindings.push((name, Some(first)));
                    } else {
                        bindings.push((first, None));
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }

            let range = if pending.is_empty() { start } else { one_start };
            pending.push(ImportDecl {
                range: range.cover(last),
                protection,
                is_static,
                alias,
                packages: path,
                id,
                bindings,
            });

            // A bind-list must be the last import in a list.
            let has_bindings = pending.last().is_some_and(|i: &ImportDecl| !i.bindings.is_empty());
            if has_bindings || !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semi)?;
        out.extend(pending.into_iter().map(Decl::Import));
        Ok(())
    }

    fn dotted(&mut self) -> Result<(Vec<SmolStr>, TextRange), ParseError> {
        let start = self.current_range();
        let mut path = vec![self.ident()?];
        while self.eat(TokenKind::Dot) {
            path.push(self.ident()?);
        }
        Ok((path, start.cover(self.previous_range())))
    }

    fn protection_keyword(&self) -> Option<Protection> {
        match self.peek_kind()? {
            TokenKind::Public => Some(Protection::Public),
            TokenKind::Private => Some(Protection::Private),
            TokenKind::Package => Some(Protection::Package),
            _ => None,
        }
    }

    fn ident(&mut self) -> Result<SmolStr, ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(SmolStr::new(token.text))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>, ParseError> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                let token = *token;
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error_here(&format!("expected {kind:?}"))),
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.nth_kind(0)
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn current_range(&self) -> TextRange {
        self.tokens
            .get(self.pos)
            .map(|t| t.range)
            .unwrap_or_else(|| TextRange::empty(self.end))
    }

    fn previous_range(&self) -> TextRange {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.range)
            .unwrap_or_else(|| TextRange::empty(self.end))
    }

    fn error_here(&self, message: &str) -> ParseError {
        let found = match self.tokens.get(self.pos) {
            Some(token) => format!("`{}`", token.text),
            None => "end of file".to_string(),
        };
        ParseError {
            message: format!("{message}, found {found}"),
            range: self.current_range(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_import(src: &str) -> ImportDecl {
        let module = parse_module(src).unwrap();
        let mut imports: Vec<_> = module.imports().cloned().collect();
        assert_eq!(imports.len(), 1, "expected exactly one import in {src:?}");
        imports.remove(0)
    }

    #[test]
    fn test_plain_import() {
        let import = only_import("import a.b.c;");
        assert_eq!(import.packages, vec!["a", "b"]);
        assert_eq!(import.id, "c");
        assert_eq!(import.alias, None);
        assert!(!import.is_static);
        assert_eq!(import.protection, None);
    }

    #[test]
    fn test_aliased_static_import() {
        let import = only_import("public static import io = std.stdio;");
        assert_eq!(import.alias.as_deref(), Some("io"));
        assert!(import.is_static);
        assert_eq!(import.protection, Some(Protection::Public));
        assert_eq!(import.packages, vec!["std"]);
        assert_eq!(import.id, "stdio");
    }

    #[test]
    fn test_bind_list() {
        let import = only_import("import std.stdio : writefln, out = stdout;");
        assert_eq!(
            import.bindings,
            vec![
                (SmolStr::new("writefln"), None),
                (SmolStr::new("stdout"), Some(SmolStr::new("out"))),
            ]
        );
    }

    #[test]
    fn test_import_list_and_ranges() {
        let src = "module app.main;\nimport a, b.c;";
        let module = parse_module(src).unwrap();
        let header = module.header.as_ref().unwrap();
        assert_eq!(header.path, vec!["app", "main"]);

        let imports: Vec<_> = module.imports().collect();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].id, "a");
        assert_eq!(imports[1].packages, vec!["b"]);
        assert_eq!(&src[imports[0].range], "import a");
        assert_eq!(&src[imports[1].range], "b.c");
    }

    #[test]
    fn test_protection_label_and_block() {
        let src = "import a; private: import b; package { import c; fn f; } import d;";
        let module = parse_module(src).unwrap();
        let prots: Vec<_> = module.imports().map(|i| (i.id.clone(), i.protection)).collect();
        assert_eq!(
            prots,
            vec![
                (SmolStr::new("a"), None),
                (SmolStr::new("b"), Some(Protection::Private)),
                (SmolStr::new("c"), Some(Protection::Package)),
                (SmolStr::new("d"), Some(Protection::Private)),
            ]
        );
    }

    #[test]
    fn test_items() {
        let module = parse_module("fn main; var x; class C; static this;").unwrap();
        let kinds: Vec<_> = module
            .decls
            .iter()
            .map(|d| match d {
                Decl::Item(item) => item.kind,
                Decl::Import(_) => panic!("unexpected import"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![ItemKind::Function, ItemKind::Variable, ItemKind::Class, ItemKind::StaticCtor]
        );
    }

    #[test]
    fn test_errors() {
        let err = parse_module("import a.b").unwrap_err();
        assert!(err.message.contains("end of file"), "{}", err.message);

        let err = parse_module("public { import a;").unwrap_err();
        assert!(err.message.contains("expected `}`"), "{}", err.message);

        let err = parse_module("static var x;").unwrap_err();
        assert!(err.message.contains("after `static`"), "{}", err.message);
    }
}
