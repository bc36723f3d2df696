use std::fmt;

/// A 1-based line and column. Orders by line first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub const ORIGIN: Pos = Pos::new(1, 1);

    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub(crate) fn next_column(self) -> Self {
        Self::new(self.line, self.column + 1)
    }

    pub(crate) fn next_line(self) -> Self {
        Self::new(self.line + 1, 1)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source region from `start` up to, not including, `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    /// Empty span at `pos`.
    pub const fn at(pos: Pos) -> Self {
        Self::new(pos, pos)
    }

    /// Covers both `self` and `other`, and whatever lies between.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Whether `other` starts on the line `self` ends on.
    pub fn continues_on(self, other: Span) -> bool {
        self.end.line == other.start.line
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::at(Pos::ORIGIN)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.start.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_covers_both_in_any_order() {
        let a = Span::new(Pos::new(1, 1), Pos::new(1, 2));
        let b = Span::new(Pos::new(2, 4), Pos::new(2, 7));
        let expected = Span::new(Pos::new(1, 1), Pos::new(2, 7));
        assert_eq!(a.to(b), expected);
        assert_eq!(b.to(a), expected);
    }

    #[test]
    fn line_continuation() {
        let a = Span::new(Pos::new(1, 1), Pos::new(1, 4));
        assert!(a.continues_on(Span::at(Pos::new(1, 5))));
        assert!(!a.continues_on(Span::at(Pos::new(2, 1))));
    }

    #[test]
    fn displays_the_start() {
        let span = Span::new(Pos::new(3, 9), Pos::new(3, 12));
        assert_eq!(span.to_string(), "3:9");
    }
}
