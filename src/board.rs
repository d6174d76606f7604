use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::cell::{CellState, CellView};
use crate::error::{GameError, Result};
use crate::types::{mult, neighbors, CellCount, Coord, Coord2, NeighborIter, ToNdIndex};

/// Board dimensions and mine budget.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
}

impl BoardConfig {
    /// Builds a config without validating it. Degenerate values make
    /// generation fall back to a smaller safe zone (see the generator).
    pub const fn new_unchecked(rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self { rows, cols, mines }
    }

    /// Fails unless `rows, cols >= 1` and `mines < rows * cols`. A zero
    /// mine count is legal and wins on the first click.
    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        if rows == 0 || cols == 0 || mines >= mult(rows, cols) {
            return Err(GameError::InvalidConfiguration);
        }
        Ok(Self::new_unchecked(rows, cols, mines))
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }
}

/// A populated board: the immutable mine layout, the per-cell adjacency
/// counts computed once at construction, and the mutable play state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    mines: Array2<bool>,
    adjacent: Array2<u8>,
    state: Array2<CellState>,
    mine_count: CellCount,
    revealed_count: CellCount,
    flagged_count: CellCount,
    triggered_mine: Option<Coord2>,
}

impl Board {
    pub fn from_mine_mask(mines: Array2<bool>) -> Self {
        let dim = mines.dim();
        let bounds: Coord2 = (
            dim.0.try_into().unwrap(),
            dim.1.try_into().unwrap(),
        );

        let mine_count = mines
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap();

        let mut adjacent: Array2<u8> = Array2::default(dim);
        for row in 0..bounds.0 {
            for col in 0..bounds.1 {
                let at = (row, col);
                if mines[at.to_nd_index()] {
                    continue;
                }
                adjacent[at.to_nd_index()] = neighbors(at, bounds)
                    .filter(|&pos| mines[pos.to_nd_index()])
                    .count()
                    .try_into()
                    .unwrap();
            }
        }

        Self {
            mines,
            adjacent,
            state: Array2::default(dim),
            mine_count,
            revealed_count: 0,
            flagged_count: 0,
            triggered_mine: None,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mines: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::OutOfBounds);
            }
            mines[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mines))
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.mines.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn config(&self) -> BoardConfig {
        let (rows, cols) = self.size();
        BoardConfig::new_unchecked(rows, cols, self.mine_count)
    }

    pub fn total_cells(&self) -> CellCount {
        self.mines.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    pub fn all_safe_revealed(&self) -> bool {
        self.revealed_count == self.safe_cell_count()
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn state_at(&self, coords: Coord2) -> CellState {
        self.state[coords.to_nd_index()]
    }

    pub fn adjacent_at(&self, coords: Coord2) -> u8 {
        self.adjacent[coords.to_nd_index()]
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.mines[coords.to_nd_index()]
    }

    /// The mine whose reveal lost the game, if any.
    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        neighbors(coords, self.size())
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = self.size();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    /// Player-visible snapshot of one cell. `disclose` permits mine
    /// disclosure and is set by the session once the game has ended.
    pub fn cell_view(&self, coords: Coord2, disclose: bool) -> CellView {
        let mine = self.has_mine_at(coords);
        match self.state_at(coords) {
            CellState::Revealed if mine => {
                if self.triggered_mine == Some(coords) {
                    CellView::Exploded
                } else {
                    CellView::Mine
                }
            }
            CellState::Revealed => CellView::Revealed(self.adjacent_at(coords)),
            CellState::Flagged if disclose && !mine => CellView::WrongFlag,
            CellState::Flagged => CellView::Flagged,
            CellState::Hidden => CellView::Hidden,
        }
    }

    /// Reveals a hidden cell. Mine reveals do not count toward the
    /// safe-cell total used for win detection.
    pub(crate) fn reveal_cell(&mut self, coords: Coord2) {
        debug_assert_eq!(self.state_at(coords), CellState::Hidden);
        self.state[coords.to_nd_index()] = CellState::Revealed;
        if !self.has_mine_at(coords) {
            self.revealed_count += 1;
        }
    }

    pub(crate) fn set_flag(&mut self, coords: Coord2, flagged: bool) {
        let state = if flagged {
            self.flagged_count += 1;
            CellState::Flagged
        } else {
            self.flagged_count -= 1;
            CellState::Hidden
        };
        self.state[coords.to_nd_index()] = state;
    }

    pub(crate) fn set_triggered(&mut self, coords: Coord2) {
        self.triggered_mine.get_or_insert(coords);
    }
}
