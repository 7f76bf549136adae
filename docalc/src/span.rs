/// A range of character indices, start inclusive, end exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn of(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn pos(pos: usize) -> Self {
        Self::of(pos, pos + 1)
    }
}
