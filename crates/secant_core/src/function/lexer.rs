//! Tokeniser for the expression grammar.

use crate::types::ExpressionError;

/// A lexical token with its byte offset.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// Real literal, e.g. `2.5e-3`
    Number(f64),
    /// Imaginary literal, e.g. `2j` or `0.5i`
    Imaginary(f64),
    /// Identifier, possibly dotted (`cmath.sin`)
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    /// `^` or `**`
    Power,
    LParen,
    RParen,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Number(v) => format!("number {}", v),
            TokenKind::Imaginary(v) => format!("imaginary literal {}j", v),
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Power => "'^'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
        }
    }
}

/// Splits `source` into tokens.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ExpressionError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;

        let kind = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                pos += 1;
                continue;
            }
            b'+' => {
                pos += 1;
                TokenKind::Plus
            }
            b'-' => {
                pos += 1;
                TokenKind::Minus
            }
            b'*' => {
                if bytes.get(pos + 1) == Some(&b'*') {
                    pos += 2;
                    TokenKind::Power
                } else {
                    pos += 1;
                    TokenKind::Star
                }
            }
            b'/' => {
                pos += 1;
                TokenKind::Slash
            }
            b'^' => {
                pos += 1;
                TokenKind::Power
            }
            b'(' => {
                pos += 1;
                TokenKind::LParen
            }
            b')' => {
                pos += 1;
                TokenKind::RParen
            }
            b'0'..=b'9' | b'.' => {
                let (kind, end) = lex_number(source, start)?;
                pos = end;
                kind
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let end = lex_ident(bytes, start);
                pos = end;
                TokenKind::Ident(source[start..end].to_string())
            }
            _ => {
                // Report the full (possibly multi-byte) character.
                let found = source[start..].chars().next().unwrap_or('?');
                return Err(ExpressionError::UnexpectedCharacter {
                    found,
                    position: start,
                });
            }
        };

        tokens.push(Token {
            kind,
            position: start,
        });
    }

    Ok(tokens)
}

fn lex_number(source: &str, start: usize) -> Result<(TokenKind, usize), ExpressionError> {
    let bytes = source.as_bytes();
    let mut pos = start;

    while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
        pos += 1;
    }

    // Exponent only when followed by digits, so `2*e` style input still lexes.
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut look = pos + 1;
        if look < bytes.len() && (bytes[look] == b'+' || bytes[look] == b'-') {
            look += 1;
        }
        if look < bytes.len() && bytes[look].is_ascii_digit() {
            pos = look;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }

    let text = &source[start..pos];
    let value: f64 = text
        .parse()
        .map_err(|_| ExpressionError::MalformedNumber {
            text: text.to_string(),
            position: start,
        })?;

    // Imaginary suffix: `2j`, `3.5i`, but not `2in` or `2jz`.
    if pos < bytes.len() && (bytes[pos] == b'j' || bytes[pos] == b'i') {
        let after = bytes.get(pos + 1);
        let continues_ident = after.is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_');
        if !continues_ident {
            return Ok((TokenKind::Imaginary(value), pos + 1));
        }
    }

    Ok((TokenKind::Number(value), pos))
}

fn lex_ident(bytes: &[u8], start: usize) -> usize {
    let mut pos = start;
    loop {
        while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
            pos += 1;
        }
        // Dotted segment (`cmath.sin`): dot followed by an identifier start.
        let dotted = bytes.get(pos) == Some(&b'.')
            && bytes
                .get(pos + 1)
                .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_');
        if dotted {
            pos += 1;
        } else {
            return pos;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_polynomial() {
        assert_eq!(
            kinds("z**3 - 1"),
            vec![
                TokenKind::Ident("z".to_string()),
                TokenKind::Power,
                TokenKind::Number(3.0),
                TokenKind::Minus,
                TokenKind::Number(1.0),
            ]
        );
    }

    #[test]
    fn test_scientific_and_imaginary() {
        assert_eq!(
            kinds("1e-10 + 2.5j"),
            vec![
                TokenKind::Number(1e-10),
                TokenKind::Plus,
                TokenKind::Imaginary(2.5),
            ]
        );
    }

    #[test]
    fn test_exponent_needs_digits() {
        assert_eq!(
            kinds("2e"),
            vec![TokenKind::Number(2.0), TokenKind::Ident("e".to_string())]
        );
    }

    #[test]
    fn test_dotted_identifier() {
        assert_eq!(
            kinds("cmath.sin(z)"),
            vec![
                TokenKind::Ident("cmath.sin".to_string()),
                TokenKind::LParen,
                TokenKind::Ident("z".to_string()),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_rejects_unknown_character() {
        let err = tokenize("z; import os").unwrap_err();
        assert_eq!(
            err,
            ExpressionError::UnexpectedCharacter {
                found: ';',
                position: 1
            }
        );
    }

    #[test]
    fn test_malformed_number() {
        assert!(matches!(
            tokenize("1.2.3").unwrap_err(),
            ExpressionError::MalformedNumber { .. }
        ));
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("  z + 1").unwrap();
        assert_eq!(tokens[0].position, 2);
        assert_eq!(tokens[1].position, 4);
        assert_eq!(tokens[2].position, 6);
    }
}
