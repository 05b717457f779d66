//! SGF (Smart Game Format) reader.
//!
//! Parses the first game of an SGF collection straight into a [`GameTree`]
//! arena. The grammar handled is the FF[4] one:
//!
//! ```text
//! Collection = GameTree { GameTree }
//! GameTree   = "(" Sequence { GameTree } ")"
//! Sequence   = Node { Node }
//! Node       = ";" { Property }
//! Property   = PropIdent PropValue { PropValue }
//! PropValue  = "[" CValueType "]"
//! ```
//!
//! Lower-case letters inside property identifiers (FF[1]-FF[3] long names
//! such as `AddBlack`) are dropped, leaving the upper-case short form.

use thiserror::Error;

use crate::board::Point;
use crate::constants::MAX_BOARD_SIZE;
use crate::tree::{GameTree, NodeId, Property};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SgfErrorKind {
    UnexpectedEof,
    UnexpectedChar(char),
    EmptyTree,
    UnterminatedValue,
}

impl std::fmt::Display for SgfErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SgfErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            SgfErrorKind::UnexpectedChar(c) => write!(f, "unexpected character {c:?}"),
            SgfErrorKind::EmptyTree => write!(f, "game tree without nodes"),
            SgfErrorKind::UnterminatedValue => write!(f, "property value is not closed"),
        }
    }
}

/// A syntax error, positioned at a 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SGF syntax error at {line}:{column}: {kind}")]
pub struct SgfError {
    pub line: usize,
    pub column: usize,
    pub kind: SgfErrorKind,
}

/// Parse SGF text and return the first game as an annotated tree.
pub fn parse(text: &str) -> Result<GameTree, SgfError> {
    let mut parser = Parser::new(text);
    parser.skip_to_collection()?;
    let mut tree = None;
    parser.game_tree(&mut tree, None)?;
    let mut tree = tree.ok_or_else(|| parser.error(SgfErrorKind::EmptyTree))?;
    tree.annotate();
    Ok(tree)
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            src: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, kind: SgfErrorKind) -> SgfError {
        let consumed = &self.src[..self.pos.min(self.src.len())];
        let line = consumed.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = consumed
            .iter()
            .rposition(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let column = String::from_utf8_lossy(&consumed[line_start..]).chars().count() + 1;
        SgfError { line, column, kind }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), SgfError> {
        self.skip_ws();
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.unexpected_here()),
            None => Err(self.error(SgfErrorKind::UnexpectedEof)),
        }
    }

    fn unexpected_here(&self) -> SgfError {
        let c = std::str::from_utf8(&self.src[self.pos..])
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        self.error(SgfErrorKind::UnexpectedChar(c))
    }

    /// Files often carry a header or mail quoting before the first `(;`.
    fn skip_to_collection(&mut self) -> Result<(), SgfError> {
        while self.pos < self.src.len() {
            if self.src[self.pos] == b'(' {
                let mut next = self.pos + 1;
                while matches!(self.src.get(next), Some(b) if b.is_ascii_whitespace()) {
                    next += 1;
                }
                if self.src.get(next) == Some(&b';') {
                    return Ok(());
                }
            }
            self.pos += 1;
        }
        Err(self.error(SgfErrorKind::UnexpectedEof))
    }

    fn game_tree(&mut self, tree: &mut Option<GameTree>, parent: Option<NodeId>) -> Result<(), SgfError> {
        self.expect(b'(')?;
        self.skip_ws();

        let mut last = parent;
        let mut nodes = 0;
        while self.peek() == Some(b';') {
            self.pos += 1;
            let props = self.properties()?;
            let id = match last {
                Some(p) => match tree.as_mut() {
                    Some(t) => t.add_child(p, props),
                    None => return Err(self.error(SgfErrorKind::EmptyTree)),
                },
                None => {
                    let t = GameTree::new(props);
                    let root = t.root();
                    *tree = Some(t);
                    root
                }
            };
            last = Some(id);
            nodes += 1;
            self.skip_ws();
        }
        if nodes == 0 {
            return Err(self.error(SgfErrorKind::EmptyTree));
        }

        while self.peek() == Some(b'(') {
            self.game_tree(tree, last)?;
            self.skip_ws();
        }
        self.expect(b')')
    }

    fn properties(&mut self) -> Result<Vec<Property>, SgfError> {
        let mut props = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b) if b.is_ascii_alphabetic() => {}
                Some(b';' | b'(' | b')') => return Ok(props),
                Some(_) => return Err(self.unexpected_here()),
                None => return Err(self.error(SgfErrorKind::UnexpectedEof)),
            }

            let mut ident = String::new();
            while let Some(b) = self.peek() {
                if !b.is_ascii_alphabetic() {
                    break;
                }
                if b.is_ascii_uppercase() {
                    ident.push(b as char);
                }
                self.pos += 1;
            }

            self.skip_ws();
            if self.peek() != Some(b'[') {
                return match self.peek() {
                    Some(_) => Err(self.unexpected_here()),
                    None => Err(self.error(SgfErrorKind::UnexpectedEof)),
                };
            }
            let mut values = Vec::new();
            while self.peek() == Some(b'[') {
                values.push(self.value()?);
                self.skip_ws();
            }

            match props.iter_mut().find(|p| p.ident == ident) {
                Some(existing) => existing.values.extend(values),
                None if !ident.is_empty() => props.push(Property { ident, values }),
                None => {}
            }
        }
    }

    fn value(&mut self) -> Result<String, SgfError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                self.pos = start;
                return Err(self.error(SgfErrorKind::UnterminatedValue));
            };
            self.pos += 1;
            match b {
                b']' => break,
                b'\\' => match self.peek() {
                    // Soft line break.
                    Some(b'\n') => {
                        self.pos += 1;
                        if self.peek() == Some(b'\r') {
                            self.pos += 1;
                        }
                    }
                    Some(b'\r') => {
                        self.pos += 1;
                        if self.peek() == Some(b'\n') {
                            self.pos += 1;
                        }
                    }
                    Some(escaped) => {
                        out.push(escaped);
                        self.pos += 1;
                    }
                    None => {}
                },
                _ => out.push(b),
            }
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

fn coord(c: u8) -> Option<usize> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as usize),
        b'A'..=b'Z' => Some((c - b'A') as usize + 26),
        _ => None,
    }
}

/// Decode a move value. `None` is a pass: an empty value, or `tt` on
/// boards up to 19x19.
pub fn parse_point(value: &str, board_size: usize) -> Option<Point> {
    let bytes = value.trim().as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    if bytes == b"tt" && board_size <= 19 {
        return None;
    }
    let x = coord(bytes[0])?;
    let y = coord(bytes[1])?;
    if x >= MAX_BOARD_SIZE || y >= MAX_BOARD_SIZE {
        return None;
    }
    Some((x, y))
}

/// Decode a point-list value, expanding the compressed `aa:cc` rectangle form.
pub fn expand_points(value: &str, board_size: usize) -> Vec<Point> {
    match value.split_once(':') {
        Some((from, to)) => {
            let (Some((x1, y1)), Some((x2, y2))) =
                (parse_point(from, board_size), parse_point(to, board_size))
            else {
                return Vec::new();
            };
            let (xs, xe) = (x1.min(x2), x1.max(x2));
            let (ys, ye) = (y1.min(y2), y1.max(y2));
            let mut points = Vec::with_capacity((xe - xs + 1) * (ye - ys + 1));
            for y in ys..=ye {
                for x in xs..=xe {
                    points.push((x, y));
                }
            }
            points
        }
        None => parse_point(value, board_size).into_iter().collect(),
    }
}
