use serde::{Deserialize, Serialize};

/// Byte-offset span in source code, with the 1-based line/column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end, line: 0, column: 0 }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0, line: 0, column: 0 }
    }

    /// Compute line and column for `start` from the source text the span points into.
    pub fn located_in(mut self, source: &str) -> Self {
        let mut cut = self.start.min(source.len());
        while !source.is_char_boundary(cut) {
            cut -= 1;
        }
        let upto = &source[..cut];
        self.line = upto.matches('\n').count() as u32 + 1;
        self.column = match upto.rfind('\n') {
            Some(nl) => (upto.len() - nl) as u32,
            None => upto.len() as u32 + 1,
        };
        self
    }
}
