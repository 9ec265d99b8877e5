//! LaTeX math markup: delimiters, text/math segments and the math tree
//!
//! Only the math subset an assistant routinely writes is understood: groups,
//! scripts, fractions, radicals, `\left`/`\right` pairs, accents, font styles,
//! function names, big operators, spacing and the usual symbol commands.
//! Anything else is rejected with a positioned [`ParseError`].

pub mod lexer;
mod parser;
pub mod symbols;

use thiserror::Error;

pub use parser::MAX_DEPTH;
pub use symbols::AtomClass;

/// A node in the parsed math tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A single glyph: letter, digit, operator, greek symbol
    Symbol { ch: char, class: AtomClass },
    /// Upright text run from `\text{}` and friends; spaces are preserved
    Text { text: String, bold: bool },
    /// Upright function name such as `sin`, optionally taking limits
    Function { name: String, limits: bool },
    /// Braced group
    Group(Vec<Node>),
    /// `\mathbf{...}` style wrapper around math content
    Styled { bold: bool, body: Vec<Node> },
    /// Base with optional subscript and superscript
    Scripts {
        base: Box<Node>,
        sub: Option<Vec<Node>>,
        sup: Option<Vec<Node>>,
    },
    /// `\frac`, `\dfrac`, `\tfrac`, and the bar-less inner part of `\binom`
    Fraction {
        num: Vec<Node>,
        den: Vec<Node>,
        bar: bool,
        scale: f32,
    },
    /// `\sqrt[index]{body}`
    Radical {
        index: Option<Vec<Node>>,
        body: Vec<Node>,
    },
    /// `\sum`, `\int`, ...
    BigOperator { ch: char, limits: bool },
    /// `\left( ... \right)`; `.` stands for an invisible delimiter
    Delimited {
        left: char,
        right: char,
        body: Vec<Node>,
    },
    /// Mark drawn above (or below, for underline) its body
    Accent { kind: AccentKind, body: Vec<Node> },
    /// Explicit horizontal space in em (may be negative)
    Space(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccentKind {
    Hat,
    Bar,
    Underline,
    Vec,
    Dot,
    DoubleDot,
    Tilde,
}

/// A run of a source line: either plain text or math markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Math(String),
}

/// Error produced while tokenizing or parsing markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at position {position})")]
pub struct ParseError {
    /// Byte offset into the markup that was being parsed
    pub position: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(position: usize, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("trailing backslash")]
    TrailingBackslash,
    #[error("unknown command '\\{0}'")]
    UnknownCommand(String),
    #[error("'\\{0}' is not supported; use standard math LaTeX only")]
    UnsupportedCommand(String),
    #[error("missing closing '}}'")]
    UnclosedBrace,
    #[error("unexpected '}}'")]
    UnexpectedCloseBrace,
    #[error("missing closing ']'")]
    UnclosedBracket,
    #[error("missing argument for '{0}'")]
    MissingArgument(String),
    #[error("double {0}")]
    DoubleScript(&'static str),
    #[error("'\\left' without matching '\\right'")]
    UnmatchedLeft,
    #[error("'\\right' without matching '\\left'")]
    UnmatchedRight,
    #[error("invalid delimiter after '\\{0}'")]
    InvalidDelimiter(String),
    #[error("unbalanced $ delimiters")]
    UnbalancedDollar,
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

/// Remove surrounding `$$` or `$` when they wrap the whole string.
///
/// The string is trimmed first. A pair only counts as surrounding when the
/// content between them has no other `$`, so `$a$ and $b$` is kept intact.
///
/// # Examples
///
/// ```
/// use latex_mcp::latex::strip_outer_delimiters;
///
/// assert_eq!(strip_outer_delimiters("  $$x^2$$ "), "x^2");
/// assert_eq!(strip_outer_delimiters("$E = mc^2$"), "E = mc^2");
/// assert_eq!(strip_outer_delimiters("$a$ or $b$"), "$a$ or $b$");
/// assert_eq!(strip_outer_delimiters("$$"), "");
/// ```
pub fn strip_outer_delimiters(latex: &str) -> &str {
    let latex = latex.trim();
    if latex == "$$" {
        return "";
    }
    if latex.len() >= 4 && latex.starts_with("$$") && latex.ends_with("$$") {
        let inner = &latex[2..latex.len() - 2];
        if !has_unescaped_dollar(inner) {
            return inner.trim();
        }
    }
    if latex.len() > 2 && latex.starts_with('$') && latex.ends_with('$') {
        let inner = &latex[1..latex.len() - 1];
        if !has_unescaped_dollar(inner) {
            return inner.trim();
        }
    }
    latex
}

fn has_unescaped_dollar(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| b == b'$' && (i == 0 || bytes[i - 1] != b'\\'))
}

/// Split one source line into text and math segments.
///
/// A line without `$` is a single math segment (bare LaTeX). Otherwise text
/// outside `$...$` (or `$$...$$`) stays text and the inside becomes math.
/// `\$` outside math is a literal dollar sign. Empty segments are dropped.
pub fn split_segments(line: &str) -> Result<Vec<Segment>, ParseError> {
    let line = strip_outer_delimiters(line);
    if !has_unescaped_dollar(line) {
        if line.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![Segment::Math(line.to_string())]);
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_math = false;
    let mut opened_at = 0;
    let mut chars = line.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some(&(_, '$'))) => {
                chars.next();
                if in_math {
                    current.push_str("\\$");
                } else {
                    current.push('$');
                }
            }
            '$' => {
                if matches!(chars.peek(), Some(&(_, '$'))) {
                    chars.next();
                }
                push_segment(&mut segments, std::mem::take(&mut current), in_math);
                in_math = !in_math;
                opened_at = offset;
            }
            c => current.push(c),
        }
    }

    if in_math {
        return Err(ParseError::new(opened_at, ParseErrorKind::UnbalancedDollar));
    }
    push_segment(&mut segments, current, false);
    Ok(segments)
}

fn push_segment(segments: &mut Vec<Segment>, content: String, math: bool) {
    if math {
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            segments.push(Segment::Math(trimmed.to_string()));
        }
    } else if !content.trim().is_empty() {
        segments.push(Segment::Text(content));
    }
}

/// Parse math markup (without `$` delimiters) into a node list.
///
/// # Examples
///
/// ```
/// use latex_mcp::latex::{parse, Node};
///
/// let nodes = parse(r"\frac{1}{2}").unwrap();
/// assert!(matches!(nodes[0], Node::Fraction { .. }));
///
/// assert!(parse(r"\frac{1}").is_err());
/// ```
pub fn parse(math: &str) -> Result<Vec<Node>, ParseError> {
    let tokens = lexer::tokenize(math)?;
    parser::parse_tokens(&tokens, math.len())
}
