//! On-demand tokenizer
//!
//! The lexer never builds a token vector: the parser pulls one token at a
//! time, which keeps evaluation a single pass over the input.

use crate::error::{CalcError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    End,
}

impl TokenKind {
    /// Human-readable form used in syntax error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Number(v) => format!("number {}", v),
            Self::Plus => "operator '+'".to_string(),
            Self::Minus => "operator '-'".to_string(),
            Self::Star => "operator '*'".to_string(),
            Self::Slash => "operator '/'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::End => "end of expression".to_string(),
        }
    }
}

/// A token and the byte offset where it starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Produce the next token; `End` is returned indefinitely once input is exhausted
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let start = self.pos;

        let Some(c) = self.peek_char() else {
            return Ok(Token {
                kind: TokenKind::End,
                position: start,
            });
        };

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '0'..='9' => return self.number(start),
            other => {
                return Err(CalcError::syntax(
                    start,
                    format!("unexpected character '{}'", other),
                ))
            },
        };

        self.pos += 1;
        Ok(Token {
            kind,
            position: start,
        })
    }

    /// number := digit+ ("." digit+)?
    fn number(&mut self, start: usize) -> Result<Token> {
        let bytes = self.src.as_bytes();
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }

        if end < bytes.len() && bytes[end] == b'.' {
            let frac_start = end + 1;
            let mut frac_end = frac_start;
            while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
                frac_end += 1;
            }
            if frac_end == frac_start {
                return Err(CalcError::syntax(
                    end,
                    "expected digit after decimal point",
                ));
            }
            end = frac_end;
        }

        let literal = &self.src[start..end];
        let value: f64 = literal
            .parse()
            .map_err(|e| CalcError::syntax(start, format!("invalid number '{}': {}", literal, e)))?;
        if !value.is_finite() {
            return Err(CalcError::numeric_overflow(start));
        }

        self.pos = end;
        Ok(Token {
            kind: TokenKind::Number(value),
            position: start,
        })
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            out.push(token.kind);
            if token.kind == TokenKind::End {
                return out;
            }
        }
    }

    #[test]
    fn test_operators_and_numbers() {
        assert_eq!(
            kinds("12.5 * (3-1)/ 4 +7"),
            vec![
                TokenKind::Number(12.5),
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Number(3.0),
                TokenKind::Minus,
                TokenKind::Number(1.0),
                TokenKind::RParen,
                TokenKind::Slash,
                TokenKind::Number(4.0),
                TokenKind::Plus,
                TokenKind::Number(7.0),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let mut lexer = Lexer::new("  1 +\t22");
        assert_eq!(lexer.next_token().unwrap().position, 2);
        assert_eq!(lexer.next_token().unwrap().position, 4);
        let last = lexer.next_token().unwrap();
        assert_eq!(last.kind, TokenKind::Number(22.0));
        assert_eq!(last.position, 6);
        assert_eq!(lexer.next_token().unwrap().position, 8);
    }

    #[test]
    fn test_end_is_sticky() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::End);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::End);
    }

    #[test]
    fn test_trailing_decimal_point_rejected() {
        let err = Lexer::new("5.").next_token().unwrap_err();
        assert_eq!(err, CalcError::syntax(1, "expected digit after decimal point"));
    }

    #[test]
    fn test_unrecognized_character() {
        let mut lexer = Lexer::new("1 % 2");
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err, CalcError::syntax(2, "unexpected character '%'"));
    }

    #[test]
    fn test_multibyte_character_reported_whole() {
        let err = Lexer::new("π").next_token().unwrap_err();
        assert_eq!(err, CalcError::syntax(0, "unexpected character 'π'"));
    }

    #[test]
    fn test_huge_literal_overflows() {
        let literal = "9".repeat(400);
        let err = Lexer::new(&literal).next_token().unwrap_err();
        assert_eq!(err, CalcError::numeric_overflow(0));
    }
}
