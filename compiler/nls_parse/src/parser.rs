//! Recursive-descent parser.
//!
//! ```text
//! program := (expr? ';')* expr?
//! expr    := term+                      juxtaposition is application
//! term    := lambda | atom
//! lambda  := '\' ident+ '.' expr        extends as far right as possible
//! atom    := int | ident | '(' expr ')' | '[' term+ ']'
//! ```
//!
//! A lambda term swallows the rest of its expression, so it can only be
//! the last term of an application: `f \x. x 1` is `f` applied to
//! `\x. (x 1)`.

use std::ops::Range;

use nls_stack::ensure_sufficient_stack;

use crate::ast::Expr;
use crate::lexer::{tokenize, SpannedToken, Token};
use crate::ParseError;

/// Parse a whole program into its top-level expressions.
pub fn parse(source: &str) -> Result<Vec<Expr>, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: source.len(),
    };
    parser.program()
}

struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
    /// Source length, for spans at end of input.
    end: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.value)
    }

    fn span(&self) -> Range<usize> {
        self.tokens
            .get(self.pos)
            .map_or(self.end..self.end, |t| t.span.clone())
    }

    fn error_here(&self, expected: &str) -> ParseError {
        let found = self
            .peek()
            .map_or_else(|| "end of input".to_string(), Token::describe);
        ParseError::new(format!("expected {expected}, found {found}"), self.span())
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<(), ParseError> {
        if self.peek() == Some(token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_here(expected))
        }
    }

    fn program(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = Vec::new();
        loop {
            match self.peek() {
                None => return Ok(exprs),
                Some(Token::Semi) => {
                    self.pos += 1;
                }
                Some(_) => {
                    exprs.push(self.expr()?);
                    match self.peek() {
                        None | Some(Token::Semi) => {}
                        Some(_) => return Err(self.error_here("`;` or end of input")),
                    }
                }
            }
        }
    }

    fn starts_term(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Backslash
                    | Token::LParen
                    | Token::LBracket
                    | Token::Int(_)
                    | Token::Ident(_)
            )
        )
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| {
            let (func, func_is_lambda) = self.term()?;
            let mut args = Vec::new();
            let mut last_is_lambda = func_is_lambda;
            while !last_is_lambda && self.starts_term() {
                let (arg, is_lambda) = self.term()?;
                args.push(arg);
                last_is_lambda = is_lambda;
            }
            if args.is_empty() {
                Ok(func)
            } else {
                Ok(Expr::Apply {
                    func: Box::new(func),
                    args,
                })
            }
        })
    }

    /// A term and whether it was a lambda.
    ///
    /// List items recurse here without passing through `expr`, so this is
    /// guarded too.
    fn term(&mut self) -> Result<(Expr, bool), ParseError> {
        ensure_sufficient_stack(|| {
            if self.peek() == Some(&Token::Backslash) {
                self.lambda().map(|lambda| (lambda, true))
            } else {
                self.atom().map(|atom| (atom, false))
            }
        })
    }

    fn lambda(&mut self) -> Result<Expr, ParseError> {
        self.expect(&Token::Backslash, "`\\`")?;
        let mut params = Vec::new();
        while let Some(Token::Ident(name)) = self.peek() {
            params.push(name.clone());
            self.pos += 1;
        }
        if params.is_empty() {
            return Err(self.error_here("parameter name"));
        }
        self.expect(&Token::Dot, "`.` after parameters")?;
        let body = self.expr()?;
        Ok(Expr::Lambda {
            params,
            body: Box::new(body),
        })
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let open = self.span();
        match self.peek() {
            Some(Token::Int(value)) => {
                let value = *value;
                self.pos += 1;
                Ok(Expr::Int(value))
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(Expr::Var(name))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                if self.peek() == Some(&Token::RParen) {
                    return Err(self.error_here("expression"));
                }
                let inner = self.expr()?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some(Token::LBracket) => {
                self.pos += 1;
                let mut items = Vec::new();
                while self.starts_term() {
                    let (item, _) = self.term()?;
                    items.push(item);
                }
                if items.is_empty() && self.peek() == Some(&Token::RBracket) {
                    let close = self.span();
                    return Err(ParseError::new("empty list literal", open.start..close.end));
                }
                self.expect(&Token::RBracket, "`]`")?;
                Ok(Expr::List(items))
            }
            _ => Err(self.error_here("expression")),
        }
    }
}
