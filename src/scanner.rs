use tracing::trace;

use crate::error::{ErrorKind, Position, Result, SyntaxError};

/// Character cursor over the whole input, tracking line and column.
pub struct Scanner<'a> {
    input: &'a str,
    pos: Position,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner {
            input,
            pos: Position::start(),
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos.offset..]
    }

    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    /// Current position in the source.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Consume one character.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos.offset += ch.len_utf8();
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    pub fn eat_char(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume characters while `pred` holds, returning the consumed slice.
    pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos.offset;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.advance();
        }
        &self.input[start..self.pos.offset]
    }

    /// Slice of the input between a saved offset and the cursor.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.pos.offset]
    }

    pub fn error(&self, kind: ErrorKind) -> SyntaxError {
        SyntaxError::new(kind, self.pos)
    }

    pub fn error_at(&self, kind: ErrorKind, at: Position) -> SyntaxError {
        SyntaxError::new(kind, at)
    }

    // ── Whitespace & Comments ───────────────────────────────────────

    /// Skip whitespace, `// ...` line comments and nested `{- ... -}` block
    /// comments until none remain at the cursor.
    pub fn skip_ignorable(&mut self) -> Result<()> {
        loop {
            self.take_while(char::is_whitespace);
            if self.starts_with("//") {
                let comment = self.take_while(|ch| ch != '\n');
                trace!(len = comment.len(), "skipped line comment");
            } else if self.starts_with("{-") {
                self.skip_block_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let begin = self.pos;
        self.advance_by(2);
        let mut depth = 1usize;
        while depth > 0 {
            if self.starts_with("{-") {
                self.advance_by(2);
                depth += 1;
            } else if self.starts_with("-}") {
                self.advance_by(2);
                depth -= 1;
            } else if self.advance().is_none() {
                return Err(self.error_at(ErrorKind::UnterminatedComment, begin));
            }
        }
        trace!(line = begin.line, "skipped block comment");
        Ok(())
    }
}

/// Characters allowed in a name. Digits are deliberately excluded.
pub fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}
