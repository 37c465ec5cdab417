//! Token scanner for the ARI text form.
//!
//! The text form has six structural characters (`/ , = ; ( )`); everything
//! between them is a value segment, percent-decoded before interpretation.
//! Whitespace terminates segments and is otherwise ignored.

use super::escape;
use super::{ParseError, ParseErrorKind};

/// One token of the text form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// `/`
    Slash,
    /// `,`
    Comma,
    /// `=`
    Eq,
    /// `;`
    Semi,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// A percent-decoded value segment.
    Seg(String),
}

/// A token with its source byte position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Byte offset of the token start in the input.
    pub pos: usize,
}

/// Scan the input into tokens.
///
/// The optional `ari:` scheme prefix must already be stripped.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut ix = 0;
    while ix < bytes.len() {
        let b = bytes[ix];
        let structural = match b {
            b'/' => Some(Token::Slash),
            b',' => Some(Token::Comma),
            b'=' => Some(Token::Eq),
            b';' => Some(Token::Semi),
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            _ => None,
        };
        if let Some(token) = structural {
            tokens.push(Spanned { token, pos: ix });
            ix += 1;
            continue;
        }
        if b.is_ascii_whitespace() {
            ix += 1;
            continue;
        }
        let start = ix;
        while ix < bytes.len() {
            let b = bytes[ix];
            if matches!(b, b'/' | b',' | b'=' | b';' | b'(' | b')') || b.is_ascii_whitespace() {
                break;
            }
            ix += 1;
        }
        let raw = &input[start..ix];
        let seg = escape::percent_decode(raw).map_err(|err| ParseError {
            kind: ParseErrorKind::Escape(err),
            pos: start,
        })?;
        tokens.push(Spanned { token: Token::Seg(seg), pos: start });
    }
    Ok(tokens)
}

/// Strip an optional `ari:` scheme prefix (case-insensitive).
#[must_use]
pub fn strip_scheme(input: &str) -> &str {
    if input.len() >= 4 && input[..4].eq_ignore_ascii_case("ari:") {
        &input[4..]
    } else {
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_structural_split() {
        assert_eq!(
            kinds("/INT/10"),
            vec![
                Token::Slash,
                Token::Seg("INT".into()),
                Token::Slash,
                Token::Seg("10".into()),
            ]
        );
    }

    #[test]
    fn test_percent_decoded_segments() {
        assert_eq!(kinds("%22hi%20there%22"), vec![Token::Seg("\"hi there\"".into())]);
    }

    #[test]
    fn test_whitespace_splits_segments() {
        assert_eq!(
            kinds("hello there"),
            vec![Token::Seg("hello".into()), Token::Seg("there".into())]
        );
    }

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("ari:/INT/10"), "/INT/10");
        assert_eq!(strip_scheme("ARI:true"), "true");
        assert_eq!(strip_scheme("/INT/10"), "/INT/10");
    }

    #[test]
    fn test_bad_escape_position() {
        let err = tokenize("ab,c%G1").unwrap_err();
        assert_eq!(err.pos, 3);
    }
}
