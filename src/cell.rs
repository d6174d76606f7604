use serde::{Deserialize, Serialize};

/// Play-state of a single cell as tracked by the board.
///
/// `Revealed` is monotonic within a session; `Flagged` and `Revealed` are
/// mutually exclusive by construction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Hidden,
    Flagged,
    Revealed,
}

impl CellState {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

/// What the presentation layer may see for one cell.
///
/// Mine positions leak only through `Mine`, `Exploded`, and `WrongFlag`,
/// which are produced solely for revealed mines or once the game has ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    /// A revealed mine.
    Mine,
    /// The mine whose reveal lost the game.
    Exploded,
    /// A flag on a non-mine cell, shown after a loss.
    WrongFlag,
}

impl CellView {
    /// Whether the cell still renders as covered.
    pub const fn is_closed(self) -> bool {
        use CellView::*;
        match self {
            Hidden => true,
            Flagged => true,
            Revealed(_) => false,
            Mine => false,
            Exploded => false,
            WrongFlag => true,
        }
    }
}
