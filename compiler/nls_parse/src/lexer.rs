//! Tokens of the surface syntax, produced by logos.

use std::ops::Range;

use logos::Logos;

use crate::ParseError;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[regex(r"#[^\n]*", logos::skip)]
    Comment,

    #[token("\\")]
    Backslash,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| Some(lex.slice().to_string()))]
    #[regex(r"[+\-*/%]", |lex| Some(lex.slice().to_string()))]
    Ident(String),
}

impl Token {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Comment => "comment".to_string(),
            Token::Backslash => "`\\`".to_string(),
            Token::Dot => "`.`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::Semi => "`;`".to_string(),
            Token::Int(value) => format!("integer `{value}`"),
            Token::Ident(name) => format!("identifier `{name}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Range<usize>,
}

pub type SpannedToken = Spanned<Token>;

pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(value) => tokens.push(Spanned { value, span }),
            Err(()) => {
                let text = &source[span.clone()];
                let message = if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
                    format!("integer literal `{text}` out of range")
                } else {
                    format!("unexpected character `{text}`")
                };
                return Err(ParseError::new(message, span));
            }
        }
    }

    Ok(tokens)
}
