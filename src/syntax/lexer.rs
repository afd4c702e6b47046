//! Token stream for module sources.

use logos::Logos;
use text_size::{TextRange, TextSize};

#[derive(Logos, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[logos(skip r"([ \t\r\n\f]+|//[^\n]*)")]
pub enum TokenKind {
    #[token("module")]
    Module,
    #[token("import")]
    Import,
    #[token("static")]
    Static,
    #[token("this")]
    This,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("package")]
    Package,
    #[token("fn")]
    Fn,
    #[token("var")]
    Var,
    #[token("class")]
    Class,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token("=")]
    Eq,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

/// A lexed token with its source range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub range: TextRange,
}

/// Lex `src` completely.
///
/// Stops at the first unrecognised character and returns its range.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>, TextRange> {
    let mut lexer = TokenKind::lexer(src);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let range = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );
        let Ok(kind) = result else {
            return Err(range);
        };
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            range,
        });
    }
    Ok(tokens)
}
