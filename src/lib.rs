//! Pure Minesweeper game logic: board generation with first-click safety,
//! flood and chord reveals, and a tick-driven game session. Rendering,
//! input mapping, and real timers live in the front end, which drives a
//! [`GameSession`] and polls its snapshot queries.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub use board::{Board, BoardConfig};
pub use cell::{CellState, CellView};
pub use engine::{
    chord_reveal, flag_all_mines, flood_reveal, reveal_all_mines, toggle_flag, FlagOutcome,
    RevealOutcome,
};
pub use error::{GameError, Result};
pub use generator::{BoardGenerator, RandomBoardGenerator, SafeZone};
pub use session::{GameSession, SessionState};
pub use types::{CellCount, Coord, Coord2};

mod board;
mod cell;
mod engine;
mod error;
mod generator;
mod session;
mod types;

/// Named difficulty presets. Pure configuration data; any other
/// [`BoardConfig`] works just as well.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const fn config(self) -> BoardConfig {
        match self {
            Self::Beginner => BoardConfig::new_unchecked(9, 9, 10),
            Self::Intermediate => BoardConfig::new_unchecked(16, 16, 40),
            Self::Expert => BoardConfig::new_unchecked(16, 30, 99),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "expert" => Ok(Self::Expert),
            _ => Err(GameError::InvalidConfiguration),
        }
    }
}
