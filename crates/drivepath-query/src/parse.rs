//! Recursive-descent parser for the filter grammar.
//!
//! Precedence, tightest first: `not`, `and`, `or`. Quoted values honor
//! backslash escapes.

use drivepath_core::{AppError, AppResult};

use crate::expr::{Collection, CompareOp, Expr, Field};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    LBrace,
    RBrace,
    Eq,
    Ne,
    Word(String),
    Str(String),
}

fn tokenize(input: &str) -> AppResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '{' => {
                chars.next();
                tokens.push(Token::LBrace);
            }
            '}' => {
                chars.next();
                tokens.push(Token::RBrace);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err(AppError::validation("Expected '=' after '!'"));
                }
                tokens.push(Token::Ne);
            }
            '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(AppError::validation("Dangling escape")),
                        },
                        Some('\'') => break,
                        Some(other) => value.push(other),
                        None => return Err(AppError::validation("Unterminated string")),
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(word));
            }
            other => {
                return Err(AppError::validation(format!(
                    "Unexpected character '{other}'"
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w == word)
    }

    fn expect(&mut self, expected: Token) -> AppResult<()> {
        match self.next() {
            Some(t) if t == expected => Ok(()),
            other => Err(AppError::validation(format!(
                "Expected {expected:?}, found {other:?}"
            ))),
        }
    }

    fn expect_word(&mut self, word: &str) -> AppResult<()> {
        self.expect(Token::Word(word.to_string()))
    }

    fn expect_str(&mut self) -> AppResult<String> {
        match self.next() {
            Some(Token::Str(s)) => Ok(s),
            other => Err(AppError::validation(format!(
                "Expected quoted value, found {other:?}"
            ))),
        }
    }

    fn parse_or(&mut self) -> AppResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.peek_word("or") {
            self.next();
            let rhs = self.parse_and()?;
            lhs = lhs.or(rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> AppResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while self.peek_word("and") {
            self.next();
            let rhs = self.parse_unary()?;
            lhs = lhs.and(rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> AppResult<Expr> {
        if self.peek_word("not") {
            self.next();
            return Ok(self.parse_unary()?.negate());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> AppResult<Expr> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Str(value)) => {
                self.expect_word("in")?;
                let collection = match self.next() {
                    Some(Token::Word(w)) if w == "parents" => Collection::Parents,
                    Some(Token::Word(w)) if w == "owners" => Collection::Owners,
                    other => {
                        return Err(AppError::validation(format!(
                            "Unknown collection {other:?}"
                        )));
                    }
                };
                Ok(Expr::In { value, collection })
            }
            Some(Token::Word(w)) if w == "properties" => {
                self.expect_word("has")?;
                self.expect(Token::LBrace)?;
                self.expect_word("key")?;
                self.expect(Token::Eq)?;
                let key = self.expect_str()?;
                self.expect_word("and")?;
                self.expect_word("value")?;
                self.expect(Token::Eq)?;
                let value = self.expect_str()?;
                self.expect(Token::RBrace)?;
                Ok(Expr::Property { key, value })
            }
            Some(Token::Word(w)) if w == "trashed" => {
                let negate = match self.next() {
                    Some(Token::Eq) => false,
                    Some(Token::Ne) => true,
                    other => {
                        return Err(AppError::validation(format!(
                            "Expected '=' or '!=' after trashed, found {other:?}"
                        )));
                    }
                };
                let flag = match self.next() {
                    Some(Token::Word(w)) if w == "true" => true,
                    Some(Token::Word(w)) if w == "false" => false,
                    other => {
                        return Err(AppError::validation(format!(
                            "Expected true or false, found {other:?}"
                        )));
                    }
                };
                let expr = Expr::Trashed(flag);
                Ok(if negate { expr.negate() } else { expr })
            }
            Some(Token::Word(w)) => {
                let field = match w.as_str() {
                    "name" => Field::Name,
                    "mimeType" => Field::MimeType,
                    _ => return Err(AppError::validation(format!("Unknown field '{w}'"))),
                };
                let op = match self.next() {
                    Some(Token::Eq) => CompareOp::Eq,
                    Some(Token::Ne) => CompareOp::Ne,
                    Some(Token::Word(w)) if w == "contains" => CompareOp::Contains,
                    other => {
                        return Err(AppError::validation(format!(
                            "Expected operator, found {other:?}"
                        )));
                    }
                };
                let value = self.expect_str()?;
                Ok(Expr::Compare { field, op, value })
            }
            other => Err(AppError::validation(format!(
                "Unexpected token {other:?}"
            ))),
        }
    }
}

/// Parse a filter string into an [`Expr`].
///
/// Fails with `Validation` on malformed input.
pub fn parse(input: &str) -> AppResult<Expr> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(AppError::validation("Empty query"));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos < parser.tokens.len() {
        return Err(AppError::validation(format!(
            "Trailing input at token {}",
            parser.pos
        )));
    }
    Ok(expr)
}
