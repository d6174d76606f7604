use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardConfig};

pub use random::RandomBoardGenerator;

mod random;

/// Produces a populated board for a given configuration.
pub trait BoardGenerator {
    fn generate(self, config: BoardConfig) -> Board;
}

/// How much area around the first click is kept mine-free.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafeZone {
    /// No guarantee at all.
    None,
    /// The clicked cell itself is mine-free.
    Cell,
    /// The clicked cell and its up-to-8 neighbors are mine-free, so the
    /// first reveal always opens a zero region.
    Neighborhood,
}
