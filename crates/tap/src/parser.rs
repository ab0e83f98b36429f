//! Text → expression tree.
//!
//! A single-pass tokenizer/parser over a byte slice (Tap's source text is
//! UTF-unaware, single-byte). An explicit stack of open `Frame`s, each
//! accumulating a sibling chain for the container it belongs to, tracks
//! insertion points without pointer-chasing; closing a bracket pops its
//! frame and attaches the completed chain to the parent frame. Three
//! bracket kinds, line/column tracking, and best-effort error recovery
//! all fall out of that one stack.

use crate::error::{Diagnostic, ErrorKind, ErrorLog};
use crate::expr::{Expr, ExprKind, StrFlag};
use crate::symtab::hash_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketKind {
    Paren,
    Bracket,
    Brace,
}

struct Frame {
    kind: BracketKind,
    /// Head of the sibling chain accumulated so far, and a cursor to its
    /// current tail so appending is O(1).
    head: Option<Box<Expr>>,
    tail_is_empty: bool,
    line: u32,
    col: u32,
}

impl Frame {
    fn new(kind: BracketKind, line: u32, col: u32) -> Self {
        Self { kind, head: None, tail_is_empty: true, line, col }
    }

    fn push(&mut self, node: Expr) {
        match &mut self.head {
            None => self.head = Some(Box::new(node)),
            Some(h) => h.push_next(node),
        }
        self.tail_is_empty = false;
    }
}

/// A symbol hashes with the same multiplicative formula as the symbol
/// table, but reduced modulo `i64::MAX` rather than a small bucket count
/// — a much larger modulus, as the original source uses, even though the
/// two hash *families* collide on the same formula.
const SYMBOL_HASH_MODULO: usize = usize::MAX;

fn symbol_hash(name: &str) -> i64 {
    (hash_name(name, SYMBOL_HASH_MODULO) as i64).abs()
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    stack: Vec<Frame>,
    errors: Vec<Diagnostic>,
}

/// Parses `source` into the head of a flat sibling chain of top-level
/// forms (not wrapped in a container: a source file is a sequence of
/// independent forms evaluated in order, not a single function call),
/// recording any parse errors into `log`. Parsing always succeeds and
/// returns some tree, possibly nil when there are no top-level forms.
pub fn parse(source: &str, log: &mut ErrorLog) -> Expr {
    let mut parser = Parser {
        src: source.as_bytes(),
        pos: 0,
        line: 1,
        col: 1,
        stack: vec![Frame::new(BracketKind::Paren, 1, 1)],
        errors: Vec::new(),
    };
    parser.run();
    // Any frame still open at end-of-input is an unclosed bracket: report
    // it and fold its (possibly partial) contents into its parent so no
    // already-parsed subtree is silently discarded.
    while parser.stack.len() > 1 {
        let frame = parser.stack.pop().unwrap();
        parser.errors.push(Diagnostic::new(
            ErrorKind::UnclosedParen,
            "unclosed opening bracket",
            frame.line,
            frame.col,
        ));
        let node = match frame.kind {
            BracketKind::Paren => finish_container(frame, false),
            BracketKind::Brace => finish_container(frame, true),
            BracketKind::Bracket => {
                let (fl, fc) = (frame.line, frame.col);
                let inner = finish_container(frame, false);
                Expr::new(ExprKind::Lazy(Box::new(inner)), fl, fc)
            }
        };
        parser.stack.last_mut().unwrap().push(node);
    }
    for e in parser.errors.drain(..) {
        log.record(e);
    }
    let root = parser.stack.remove(0);
    match root.head {
        Some(head) => *head,
        None => Expr::nil_at(root.line, root.col),
    }
}

fn finish_container(frame: Frame, is_array: bool) -> Expr {
    if frame.tail_is_empty {
        Expr::nil_at(frame.line, frame.col)
    } else {
        let mut e = Expr::new(ExprKind::Container(None, is_array), frame.line, frame.col);
        e.kind = ExprKind::Container(frame.head, is_array);
        e
    }
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn error(&mut self, kind: ErrorKind, message: impl Into<String>, line: u32, col: u32) {
        self.errors.push(Diagnostic::new(kind, message, line, col));
    }

    fn run(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.bump();
                }
                b';' => self.skip_comment(),
                b'(' => self.open(BracketKind::Paren),
                b'[' => self.open(BracketKind::Bracket),
                b'{' => self.open(BracketKind::Brace),
                b')' => self.close(BracketKind::Paren),
                b']' => self.close(BracketKind::Bracket),
                b'}' => self.close(BracketKind::Brace),
                b'"' => self.string_literal(),
                _ => self.token(),
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.bump();
        }
    }

    fn open(&mut self, kind: BracketKind) {
        let (line, col) = (self.line, self.col);
        self.bump();
        self.stack.push(Frame::new(kind, line, col));
    }

    fn close(&mut self, kind: BracketKind) {
        let (line, col) = (self.line, self.col);
        self.bump();
        if self.stack.len() <= 1 {
            self.error(ErrorKind::UnmatchedParen, "unmatched closing bracket", line, col);
            return;
        }
        let frame = self.stack.pop().unwrap();
        if frame.kind != kind {
            self.error(ErrorKind::UnmatchedParen, "mismatched closing bracket", line, col);
            // Put the frame's contents into the parent anyway so parsing
            // can continue without losing the subtree.
        }
        let node = match frame.kind {
            BracketKind::Paren => finish_container(frame, false),
            BracketKind::Brace => finish_container(frame, true),
            BracketKind::Bracket => {
                let (fl, fc) = (frame.line, frame.col);
                let inner = finish_container(frame, false);
                Expr::new(ExprKind::Lazy(Box::new(inner)), fl, fc)
            }
        };
        self.stack.last_mut().unwrap().push(node);
    }

    fn string_literal(&mut self) {
        let (line, col) = (self.line, self.col);
        self.bump(); // opening quote
        let mut buf = String::new();
        loop {
            match self.peek() {
                None => {
                    self.error(ErrorKind::UnclosedStrLit, "unclosed string literal", line, col);
                    break;
                }
                Some(b'"') => {
                    self.bump();
                    break;
                }
                Some(b'\\') => {
                    self.bump();
                    if let Some(escaped) = self.bump() {
                        buf.push(escaped as char);
                    }
                }
                Some(b) => {
                    self.bump();
                    buf.push(b as char);
                }
            }
        }
        let node = Expr::new(ExprKind::Str(buf, StrFlag::Literal), line, col);
        self.stack.last_mut().unwrap().push(node);
    }

    fn token(&mut self) {
        let (line, col) = (self.line, self.col);
        let is_symbol = self.peek() == Some(b'\'');
        if is_symbol {
            self.bump();
        }
        let text_start = self.pos;
        while let Some(b) = self.peek() {
            if is_break_byte(b) {
                break;
            }
            self.bump();
        }
        let text = std::str::from_utf8(&self.src[text_start..self.pos]).unwrap_or("");
        let node = if is_symbol {
            Expr::new(ExprKind::Int(symbol_hash(text)), line, col)
        } else {
            classify_token(text, line, col)
        };
        self.stack.last_mut().unwrap().push(node);
    }
}

fn is_break_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b';' | b'"')
}

/// Classifies a bare token by progressive kind: a leading digit
/// (optionally signed) starts an integer; a `.` promotes it to a float;
/// a `:` marks a base-conversion suffix; any other non-numeric byte
/// demotes the token to a variable reference.
fn classify_token(text: &str, line: u32, col: u32) -> Expr {
    if text.is_empty() {
        return Expr::nil_at(line, col);
    }
    if let Some(parsed) = try_parse_number(text) {
        return match parsed {
            Number::Int(n) => Expr::new(ExprKind::Int(n), line, col),
            Number::Float(f) => Expr::new(ExprKind::Float(f), line, col),
        };
    }
    Expr::new(ExprKind::Str(text.to_string(), StrFlag::VarRef), line, col)
}

enum Number {
    Int(i64),
    Float(f64),
}

/// Parses `digits[.digits]` or `digits:base`, optionally signed. Returns
/// `None` if `text` is not a well-formed number, in which case the caller
/// treats it as a variable-reference token. A `:base` suffix reinterprets
/// the prefix as digits in that base (so `"ff:16"` is 255), matching the
/// base-conversion flag the original parser records on a pending number.
fn try_parse_number(text: &str) -> Option<Number> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'+') => (false, &text[1..]),
        Some(b'-') => (true, &text[1..]),
        _ => (false, text),
    };
    if rest.is_empty() {
        return None;
    }

    if let Some(idx) = rest.rfind(':') {
        let (prefix, base_str) = (&rest[..idx], &rest[idx + 1..]);
        if prefix.is_empty() || base_str.is_empty() {
            return None;
        }
        let base: u32 = base_str.parse().ok()?;
        if !(2..=36).contains(&base) {
            return None;
        }
        if !prefix.chars().all(|c| c.is_digit(base)) {
            return None;
        }
        let magnitude = i64::from_str_radix(prefix, base).ok()?;
        return Some(Number::Int(if negative { -magnitude } else { magnitude }));
    }

    if !rest.bytes().next().is_some_and(|b| b.is_ascii_digit()) {
        return None;
    }

    if let Some(dot) = rest.find('.') {
        let (int_part, frac_part) = (&rest[..dot], &rest[dot + 1..]);
        if int_part.is_empty() || frac_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let whole: f64 = rest.parse().ok()?;
        return Some(Number::Float(if negative { -whole } else { whole }));
    }

    if !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude: i64 = rest.parse().ok()?;
    Some(Number::Int(if negative { -magnitude } else { magnitude }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(src: &str) -> (Expr, ErrorLog) {
        let mut log = ErrorLog::new();
        let expr = parse(src, &mut log);
        (expr, log)
    }

    #[test]
    fn parses_simple_call() {
        let (expr, log) = parse_str("(+ 1 2)");
        assert!(log.is_empty());
        match expr.kind {
            ExprKind::Container(Some(head), false) => {
                assert!(matches!(head.kind, ExprKind::Str(ref s, StrFlag::VarRef) if s == "+"));
                let arg1 = head.next.as_ref().unwrap();
                assert!(matches!(arg1.kind, ExprKind::Int(1)));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn unclosed_paren_records_error() {
        let (_, log) = parse_str("(");
        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].kind, ErrorKind::UnclosedParen);
    }

    #[test]
    fn unmatched_paren_records_error() {
        let (_, log) = parse_str(")");
        assert_eq!(log.entries().len(), 1);
        assert_eq!(log.entries()[0].kind, ErrorKind::UnmatchedParen);
    }

    #[test]
    fn float_and_base_suffixed_int() {
        let (expr, log) = parse_str("(3.5 ff:16)");
        assert!(log.is_empty());
        if let ExprKind::Container(Some(head), false) = expr.kind {
            assert!(matches!(head.kind, ExprKind::Float(f) if (f - 3.5).abs() < f64::EPSILON));
            let second = head.next.unwrap();
            assert!(matches!(second.kind, ExprKind::Int(255)));
        } else {
            panic!("unexpected shape");
        }
    }
}
