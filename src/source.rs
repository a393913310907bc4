use std::fmt;
use std::ops::Range;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)] // Default for convenience
pub struct Span {
    pub start: usize, // Byte offset
    pub end: usize,   // Byte offset (exclusive)
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    // Helper to merge two spans (e.g., a statement from its keyword to its closing brace)
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn to_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_takes_outer_bounds() {
        let a = Span::new(4, 9);
        let b = Span::new(0, 6);
        assert_eq!(a.merge(b), Span::new(0, 9));
        assert_eq!(b.merge(a), Span::new(0, 9));
    }

    #[test]
    fn test_range_conversions() {
        let span: Span = (3..7).into();
        assert_eq!(span, Span::new(3, 7));
        assert_eq!(span.to_range(), 3..7);
        assert_eq!(span.to_string(), "3..7");
    }
}
