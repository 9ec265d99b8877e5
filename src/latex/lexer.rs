//! Token extraction from LaTeX math strings

use super::{ParseError, ParseErrorKind};

/// A single lexical token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `\name` or a control symbol such as `\,` or `\{` (stored without the backslash)
    Command(String),
    /// Any other character
    Char(char),
    Space,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Superscript,
    Subscript,
}

/// Splits a math string into tokens.
///
/// Runs of whitespace collapse into a single [`TokenKind::Space`]. A trailing
/// lone backslash is an error.
///
/// # Examples
///
/// ```
/// use latex_mcp::latex::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize(r"\frac{a}{b}").unwrap();
/// assert_eq!(tokens[0].kind, TokenKind::Command("frac".into()));
/// assert_eq!(tokens.len(), 7);
/// ```
pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let kind = match c {
            '\\' => {
                let Some(&(_, next)) = chars.peek() else {
                    return Err(ParseError::new(offset, ParseErrorKind::TrailingBackslash));
                };
                if next.is_ascii_alphabetic() {
                    let mut name = String::new();
                    while let Some(&(_, ch)) = chars.peek() {
                        if !ch.is_ascii_alphabetic() {
                            break;
                        }
                        name.push(ch);
                        chars.next();
                    }
                    TokenKind::Command(name)
                } else {
                    chars.next();
                    TokenKind::Command(next.to_string())
                }
            }
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '^' => TokenKind::Superscript,
            '_' => TokenKind::Subscript,
            c if c.is_whitespace() => {
                while matches!(chars.peek(), Some(&(_, ch)) if ch.is_whitespace()) {
                    chars.next();
                }
                TokenKind::Space
            }
            c => TokenKind::Char(c),
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}
