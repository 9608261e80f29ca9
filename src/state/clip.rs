use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Colour;

/// Stable identity of a clip across frames and list replacements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A block spanning a contiguous column range on one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique identifier
    pub id: ClipId,
    /// First column the clip occupies
    pub column: u32,
    /// Width in columns; zero still occupies one column
    pub width: u32,
    /// Row (track index) the clip sits on
    pub row: u32,
    pub colour: Colour,
}

impl Clip {
    pub fn new(column: u32, width: u32, row: u32, colour: Colour) -> Self {
        Self {
            id: ClipId::new(),
            column,
            width,
            row,
            colour,
        }
    }

    /// Width in columns, counting a zero-width clip as one column.
    pub fn occupied_width(&self) -> u32 {
        self.width.max(1)
    }

    /// Last column covered by the clip (inclusive).
    pub fn last_column(&self) -> i64 {
        self.column as i64 + self.occupied_width() as i64 - 1
    }

    /// Check whether `column` falls inside the clip's range.
    pub fn covers_column(&self, column: i64) -> bool {
        column >= self.column as i64 && column <= self.last_column()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_column() {
        let clip = Clip::new(10, 5, 2, Colour::WHITE);
        assert_eq!(clip.last_column(), 14);
    }

    #[test]
    fn test_zero_width_occupies_one_column() {
        let clip = Clip::new(7, 0, 0, Colour::WHITE);
        assert_eq!(clip.occupied_width(), 1);
        assert_eq!(clip.last_column(), 7);
        assert!(clip.covers_column(7));
        assert!(!clip.covers_column(8));
    }

    #[test]
    fn test_last_column_does_not_overflow() {
        let clip = Clip::new(u32::MAX, u32::MAX, 0, Colour::WHITE);
        assert_eq!(clip.last_column(), u32::MAX as i64 * 2 - 1);
    }
}
