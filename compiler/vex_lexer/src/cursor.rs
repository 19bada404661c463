//! Byte cursor with line/column tracking.
//!
//! Past the end of the buffer, `current()` and the peeks return `0`, which
//! no scanning predicate accepts, so loops terminate without explicit
//! bounds checks. An interior NUL is told apart from EOF with `is_eof()`.

use vex_ir::Position;

/// Everything needed to rewind a [`Cursor`]. `Copy`, so snapshots are free.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LexerState {
    pos: usize,
    line: u32,
    column: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Cursor {
            buf: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    #[inline]
    pub(crate) fn peek2(&self) -> u8 {
        self.byte_at(self.pos + 2)
    }

    #[inline]
    fn byte_at(&self, idx: usize) -> u8 {
        self.buf.get(idx).copied().unwrap_or(0)
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Consume one byte, tracking newlines.
    pub(crate) fn advance(&mut self) {
        if self.is_eof() {
            return;
        }
        if self.buf[self.pos] == b'\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    pub(crate) fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Consume the current byte if it equals `byte`.
    pub(crate) fn eat(&mut self, byte: u8) -> bool {
        if !self.is_eof() && self.current() == byte {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.advance();
        }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        // Slices only ever span ASCII identifier bytes.
        std::str::from_utf8(&self.buf[start..self.pos]).unwrap_or_default()
    }

    #[inline]
    pub(crate) fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub(crate) fn state(&self) -> LexerState {
        LexerState {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    pub(crate) fn set_state(&mut self, state: LexerState) {
        self.pos = state.pos;
        self.line = state.line;
        self.column = state.column;
    }
}
