/// Set of obstruction conditions checked against the falling brick.
///
/// Conditions combine with `|`; [`Board::brick_touched`](crate::Board::brick_touched)
/// reports whether any of the requested ones holds.
///
/// ```
/// use brickfall_engine::Blocker;
///
/// let below = Blocker::BORDER_BOTTOM | Blocker::BRICK_BELOW;
/// assert!(below.contains(Blocker::BRICK_BELOW));
/// assert!(!below.contains(Blocker::BORDER_LEFT));
/// assert!(Blocker::SOMETHING.contains(below));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::BitOr)]
pub struct Blocker(u16);

impl Blocker {
    pub const NONE: Self = Self(0);
    /// An occupied cell sits in column 0.
    pub const BORDER_LEFT: Self = Self(1 << 0);
    /// An occupied cell sits in the last column.
    pub const BORDER_RIGHT: Self = Self(1 << 1);
    /// An occupied cell sits in the last row.
    pub const BORDER_BOTTOM: Self = Self(1 << 2);
    /// The cell left of an occupied cell is embedded.
    pub const BRICK_AT_LEFT: Self = Self(1 << 3);
    /// The cell right of an occupied cell is embedded.
    pub const BRICK_AT_RIGHT: Self = Self(1 << 4);
    /// The cell below an occupied cell is embedded.
    pub const BRICK_BELOW: Self = Self(1 << 5);
    /// Every condition.
    pub const SOMETHING: Self = Self(0b11_1111);

    /// Returns whether every condition of `other` is part of `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns whether `self` and `other` share any condition.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_something_is_union_of_all() {
        let all = Blocker::BORDER_LEFT
            | Blocker::BORDER_RIGHT
            | Blocker::BORDER_BOTTOM
            | Blocker::BRICK_AT_LEFT
            | Blocker::BRICK_AT_RIGHT
            | Blocker::BRICK_BELOW;
        assert_eq!(all, Blocker::SOMETHING);
    }

    #[test]
    fn test_contains_and_intersects() {
        let horizontal = Blocker::BORDER_LEFT | Blocker::BRICK_AT_LEFT;
        assert!(horizontal.contains(Blocker::BORDER_LEFT));
        assert!(!horizontal.contains(Blocker::BORDER_LEFT | Blocker::BORDER_RIGHT));
        assert!(horizontal.intersects(Blocker::BORDER_LEFT | Blocker::BORDER_RIGHT));
        assert!(!horizontal.intersects(Blocker::BRICK_BELOW));
        assert!(!Blocker::NONE.intersects(Blocker::SOMETHING));
    }
}
