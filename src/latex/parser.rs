//! Recursive-descent parser from tokens to [`Node`] trees

use super::lexer::{Token, TokenKind};
use super::symbols::{self, AtomClass};
use super::{AccentKind, Node, ParseError, ParseErrorKind};

/// Deepest nesting of groups and command arguments accepted.
pub const MAX_DEPTH: usize = 32;

/// Where a node list ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    End,
    Brace,
    Bracket,
    Right,
}

pub(super) fn parse_tokens(tokens: &[Token], src_len: usize) -> Result<Vec<Node>, ParseError> {
    let mut parser = Parser { tokens, pos: 0, src_len, depth: 0 };
    parser.parse_list(Stop::End)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    src_len: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(Token { kind: TokenKind::Space, .. })) {
            self.pos += 1;
        }
    }

    /// Offset of the next token, or the end of the source.
    fn offset(&self) -> usize {
        self.peek().map(|t| t.offset).unwrap_or(self.src_len)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.offset(), kind)
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(ParseErrorKind::TooDeep(MAX_DEPTH)));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn parse_list(&mut self, stop: Stop) -> Result<Vec<Node>, ParseError> {
        self.nested(|p| p.parse_list_items(stop))
    }

    fn parse_list_items(&mut self, stop: Stop) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            let Some(tok) = self.peek() else {
                return match stop {
                    Stop::End => Ok(nodes),
                    Stop::Brace => Err(self.error(ParseErrorKind::UnclosedBrace)),
                    Stop::Bracket => Err(self.error(ParseErrorKind::UnclosedBracket)),
                    Stop::Right => Err(self.error(ParseErrorKind::UnmatchedLeft)),
                };
            };

            match &tok.kind {
                TokenKind::CloseBrace => {
                    if stop != Stop::Brace {
                        return Err(self.error(ParseErrorKind::UnexpectedCloseBrace));
                    }
                    self.advance();
                    return Ok(nodes);
                }
                TokenKind::CloseBracket if stop == Stop::Bracket => {
                    self.advance();
                    return Ok(nodes);
                }
                TokenKind::Command(name) if name == "right" => {
                    if stop != Stop::Right {
                        return Err(self.error(ParseErrorKind::UnmatchedRight));
                    }
                    // the caller consumes `\right` and its delimiter
                    return Ok(nodes);
                }
                TokenKind::Command(name) if is_ignored(name) => {
                    self.advance();
                }
                TokenKind::Superscript | TokenKind::Subscript => {
                    self.parse_script(&mut nodes)?;
                }
                TokenKind::Space => {
                    self.advance();
                }
                _ => {
                    let atom = self.parse_atom()?;
                    nodes.push(atom);
                }
            }
        }
    }

    /// Attach a `^` or `_` argument to the previous node.
    fn parse_script(&mut self, nodes: &mut Vec<Node>) -> Result<(), ParseError> {
        let Some(tok) = self.advance() else {
            return Ok(());
        };
        let is_sup = tok.kind == TokenKind::Superscript;
        let op = if is_sup { "^" } else { "_" };
        let arg = self.parse_argument(op)?;

        let base = nodes.pop().unwrap_or(Node::Group(Vec::new()));
        let node = match base {
            Node::Scripts { base, sub, sup } => {
                let slot_taken = if is_sup { sup.is_some() } else { sub.is_some() };
                if slot_taken {
                    let what = if is_sup { "superscript" } else { "subscript" };
                    return Err(ParseError::new(tok.offset, ParseErrorKind::DoubleScript(what)));
                }
                if is_sup {
                    Node::Scripts { base, sub, sup: Some(arg) }
                } else {
                    Node::Scripts { base, sub: Some(arg), sup }
                }
            }
            other => {
                let (sub, sup) = if is_sup { (None, Some(arg)) } else { (Some(arg), None) };
                Node::Scripts { base: Box::new(other), sub, sup }
            }
        };
        nodes.push(node);
        Ok(())
    }

    /// A command argument: a braced group or a single atom.
    fn parse_argument(&mut self, command: &str) -> Result<Vec<Node>, ParseError> {
        self.skip_spaces();
        let missing = || ParseErrorKind::MissingArgument(command.to_string());
        let Some(tok) = self.peek() else {
            return Err(self.error(missing()));
        };
        match &tok.kind {
            TokenKind::OpenBrace => {
                self.advance();
                self.parse_list(Stop::Brace)
            }
            TokenKind::CloseBrace | TokenKind::Superscript | TokenKind::Subscript => {
                Err(self.error(missing()))
            }
            TokenKind::Command(name) if name == "right" => Err(self.error(missing())),
            _ => self.nested(|p| Ok(vec![p.parse_atom()?])),
        }
    }

    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        let Some(tok) = self.advance() else {
            return Err(self.error(ParseErrorKind::MissingArgument("group".into())));
        };
        let node = match &tok.kind {
            TokenKind::Char('\'') => Node::Symbol { ch: '′', class: AtomClass::Ord },
            TokenKind::Char(c) => Node::Symbol { ch: *c, class: symbols::char_class(*c) },
            TokenKind::OpenBracket => Node::Symbol { ch: '[', class: AtomClass::Open },
            TokenKind::CloseBracket => Node::Symbol { ch: ']', class: AtomClass::Close },
            TokenKind::OpenBrace => Node::Group(self.parse_list(Stop::Brace)?),
            TokenKind::Command(name) => self.parse_command(name, tok.offset)?,
            TokenKind::Space => Node::Space(0.0),
            TokenKind::CloseBrace => {
                return Err(ParseError::new(tok.offset, ParseErrorKind::UnexpectedCloseBrace))
            }
            TokenKind::Superscript | TokenKind::Subscript => {
                let op = if tok.kind == TokenKind::Superscript { "^" } else { "_" };
                return Err(ParseError::new(
                    tok.offset,
                    ParseErrorKind::MissingArgument(op.into()),
                ));
            }
        };
        Ok(node)
    }

    fn parse_command(&mut self, name: &str, offset: usize) -> Result<Node, ParseError> {
        let node = match name {
            "frac" | "dfrac" | "tfrac" | "cfrac" => {
                let num = self.parse_argument(name)?;
                let den = self.parse_argument(name)?;
                let scale = match name {
                    "dfrac" | "cfrac" => 1.0,
                    "tfrac" => 0.7,
                    _ => 0.85,
                };
                Node::Fraction { num, den, bar: true, scale }
            }
            "binom" | "dbinom" | "tbinom" => {
                let num = self.parse_argument(name)?;
                let den = self.parse_argument(name)?;
                let scale = if name == "tbinom" { 0.7 } else { 0.85 };
                Node::Delimited {
                    left: '(',
                    right: ')',
                    body: vec![Node::Fraction { num, den, bar: false, scale }],
                }
            }
            "sqrt" => {
                self.skip_spaces();
                let index = if matches!(self.peek(), Some(Token { kind: TokenKind::OpenBracket, .. })) {
                    self.advance();
                    Some(self.parse_list(Stop::Bracket)?)
                } else {
                    None
                };
                let body = self.parse_argument(name)?;
                Node::Radical { index, body }
            }
            "left" => {
                let left = self.parse_delimiter(name)?;
                let body = self.parse_list(Stop::Right)?;
                // parse_list stopped at `\right`
                self.advance();
                let right = self.parse_delimiter("right")?;
                Node::Delimited { left, right, body }
            }
            "big" | "Big" | "bigg" | "Bigg" | "bigl" | "bigr" | "Bigl" | "Bigr" | "biggl"
            | "biggr" | "Biggl" | "Biggr" => {
                let ch = self.parse_delimiter(name)?;
                let class = match ch {
                    '(' | '[' | '{' | '⟨' | '⌊' | '⌈' => AtomClass::Open,
                    ')' | ']' | '}' | '⟩' | '⌋' | '⌉' => AtomClass::Close,
                    _ => AtomClass::Ord,
                };
                Node::Symbol { ch, class }
            }
            "hat" | "widehat" => self.accent(name, AccentKind::Hat)?,
            "bar" | "overline" => self.accent(name, AccentKind::Bar)?,
            "underline" => self.accent(name, AccentKind::Underline)?,
            "vec" | "overrightarrow" => self.accent(name, AccentKind::Vec)?,
            "dot" => self.accent(name, AccentKind::Dot)?,
            "ddot" => self.accent(name, AccentKind::DoubleDot)?,
            "tilde" | "widetilde" => self.accent(name, AccentKind::Tilde)?,
            "text" | "textrm" | "textnormal" | "textit" | "textsf" | "texttt" | "emph"
            | "mathrm" | "operatorname" | "mbox" => {
                Node::Text { text: self.parse_raw_text(name)?, bold: false }
            }
            "textbf" => Node::Text { text: self.parse_raw_text(name)?, bold: true },
            "mathbf" | "boldsymbol" | "bm" | "mathbb" => {
                Node::Styled { bold: true, body: self.parse_argument(name)? }
            }
            "mathit" | "mathsf" | "mathtt" | "mathcal" | "mathfrak" | "mathnormal" => {
                Node::Styled { bold: false, body: self.parse_argument(name)? }
            }
            "not" => {
                let negated = self.parse_argument(name)?;
                match negated.as_slice() {
                    [Node::Symbol { ch: '=', .. }] => Node::Symbol { ch: '≠', class: AtomClass::Rel },
                    [Node::Symbol { ch: '∈', .. }] => Node::Symbol { ch: '∉', class: AtomClass::Rel },
                    _ => {
                        return Err(ParseError::new(
                            offset,
                            ParseErrorKind::UnsupportedCommand(name.into()),
                        ))
                    }
                }
            }
            _ => self.parse_simple_command(name, offset)?,
        };
        Ok(node)
    }

    /// Commands that take no arguments.
    fn parse_simple_command(&self, name: &str, offset: usize) -> Result<Node, ParseError> {
        if let Some(em) = symbols::spacing(name) {
            return Ok(Node::Space(em));
        }
        if let Some((text, limits)) = symbols::function_name(name) {
            return Ok(Node::Function { name: text.to_string(), limits });
        }
        if let Some((ch, limits)) = symbols::big_operator(name) {
            return Ok(Node::BigOperator { ch, limits });
        }
        if let Some((ch, class)) = symbols::symbol(name) {
            return Ok(Node::Symbol { ch, class });
        }
        let kind = if symbols::is_unsupported(name) {
            ParseErrorKind::UnsupportedCommand(name.to_string())
        } else {
            ParseErrorKind::UnknownCommand(name.to_string())
        };
        Err(ParseError::new(offset, kind))
    }

    fn accent(&mut self, name: &str, kind: AccentKind) -> Result<Node, ParseError> {
        Ok(Node::Accent { kind, body: self.parse_argument(name)? })
    }

    fn parse_delimiter(&mut self, command: &str) -> Result<char, ParseError> {
        self.skip_spaces();
        let invalid = |offset| {
            ParseError::new(offset, ParseErrorKind::InvalidDelimiter(command.to_string()))
        };
        let offset = self.offset();
        let Some(tok) = self.advance() else {
            return Err(invalid(offset));
        };
        let ch = match &tok.kind {
            TokenKind::Char(c) => symbols::delimiter_char(*c),
            TokenKind::OpenBracket => Some('['),
            TokenKind::CloseBracket => Some(']'),
            TokenKind::Command(name) => symbols::delimiter_command(name),
            _ => None,
        };
        ch.ok_or_else(|| invalid(offset))
    }

    /// Read a braced argument verbatim, keeping spaces.
    fn parse_raw_text(&mut self, command: &str) -> Result<String, ParseError> {
        self.skip_spaces();
        let offset = self.offset();
        let missing = || ParseError::new(offset, ParseErrorKind::MissingArgument(command.into()));
        let Some(first) = self.advance() else {
            return Err(missing());
        };
        match &first.kind {
            TokenKind::OpenBrace => {}
            TokenKind::Char(c) => return Ok(c.to_string()),
            _ => return Err(missing()),
        }

        let mut text = String::new();
        let mut depth = 1usize;
        while let Some(tok) = self.advance() {
            match &tok.kind {
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(text);
                    }
                }
                TokenKind::Char(c) => text.push(*c),
                TokenKind::Space => text.push(' '),
                TokenKind::OpenBracket => text.push('['),
                TokenKind::CloseBracket => text.push(']'),
                TokenKind::Superscript => text.push('^'),
                TokenKind::Subscript => text.push('_'),
                TokenKind::Command(name) => match name.as_str() {
                    " " | "," | ";" | ":" | "quad" => text.push(' '),
                    n if n.chars().count() == 1 => text.push_str(n),
                    n => match symbols::symbol(n) {
                        Some((ch, _)) => text.push(ch),
                        None => {
                            return Err(ParseError::new(
                                tok.offset,
                                ParseErrorKind::UnknownCommand(n.to_string()),
                            ))
                        }
                    },
                },
            }
        }
        Err(self.error(ParseErrorKind::UnclosedBrace))
    }
}

/// Style switches with no visual effect at bitmap resolution.
fn is_ignored(name: &str) -> bool {
    matches!(
        name,
        "displaystyle" | "textstyle" | "scriptstyle" | "limits" | "nolimits" | "nonumber"
    )
}
