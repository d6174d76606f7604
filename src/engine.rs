use core::ops::BitOr;
use std::collections::{HashSet, VecDeque};

use crate::board::Board;
use crate::cell::CellState;
use crate::error::Result;
use crate::types::Coord2;

/// Outcome of flagging a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Outcome of revealing one or more cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Merges per-neighbor outcomes during a chord: a mine hit dominates,
/// then a win, then any plain reveal.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Toggles the flag on a hidden cell. Revealed cells are a silent no-op.
pub fn toggle_flag(board: &mut Board, at: Coord2) -> Result<FlagOutcome> {
    use FlagOutcome::*;

    let at = board.validate_coords(at)?;

    Ok(match board.state_at(at) {
        CellState::Hidden => {
            board.set_flag(at, true);
            Changed
        }
        CellState::Flagged => {
            board.set_flag(at, false);
            Changed
        }
        CellState::Revealed => NoChange,
    })
}

/// Reveals a hidden cell and, when it has no adjacent mines, the whole
/// contiguous zero region plus its numbered border. Flagged cells are
/// barriers: the fill never crosses or reveals them.
pub fn flood_reveal(board: &mut Board, at: Coord2) -> Result<RevealOutcome> {
    let at = board.validate_coords(at)?;
    Ok(reveal_from(board, at))
}

/// Reveals all hidden, unflagged neighbors of a revealed numbered cell,
/// gated on the flagged-neighbor count matching the cell's number. Mine
/// neighbors are revealed individually; safe neighbors flood.
pub fn chord_reveal(board: &mut Board, at: Coord2) -> Result<RevealOutcome> {
    use RevealOutcome::*;

    let at = board.validate_coords(at)?;

    if board.state_at(at) != CellState::Revealed {
        return Ok(NoChange);
    }
    let count = board.adjacent_at(at);
    if count == 0 {
        return Ok(NoChange);
    }

    let flagged: u8 = board
        .neighbors(at)
        .filter(|&pos| board.state_at(pos) == CellState::Flagged)
        .count()
        .try_into()
        .unwrap();
    if flagged != count {
        return Ok(NoChange);
    }

    Ok(board
        .neighbors(at)
        .map(|neighbor| reveal_from(board, neighbor))
        .reduce(BitOr::bitor)
        .unwrap_or(NoChange))
}

fn reveal_from(board: &mut Board, at: Coord2) -> RevealOutcome {
    use RevealOutcome::*;

    if board.state_at(at) != CellState::Hidden {
        return NoChange;
    }

    if board.has_mine_at(at) {
        board.reveal_cell(at);
        board.set_triggered(at);
        return HitMine;
    }

    board.reveal_cell(at);
    log::trace!("revealed {:?}, adjacent: {}", at, board.adjacent_at(at));

    if board.adjacent_at(at) == 0 {
        // Zero cells have no mine neighbors, so the worklist only ever
        // holds safe cells.
        let mut visited = HashSet::from([at]);
        let mut to_visit: VecDeque<_> = board
            .neighbors(at)
            .filter(|&pos| board.state_at(pos) == CellState::Hidden)
            .collect();

        while let Some(visit) = to_visit.pop_front() {
            if !visited.insert(visit) {
                continue;
            }
            if board.state_at(visit) != CellState::Hidden {
                continue;
            }

            board.reveal_cell(visit);

            if board.adjacent_at(visit) == 0 {
                to_visit.extend(
                    board
                        .neighbors(visit)
                        .filter(|&pos| board.state_at(pos) == CellState::Hidden)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    if board.all_safe_revealed() {
        Won
    } else {
        Revealed
    }
}

/// Loss finalization: every mine cell ends up revealed, including
/// previously flagged ones.
pub fn reveal_all_mines(board: &mut Board) {
    for at in board.coords() {
        if !board.has_mine_at(at) {
            continue;
        }
        match board.state_at(at) {
            CellState::Hidden => board.reveal_cell(at),
            CellState::Flagged => {
                board.set_flag(at, false);
                board.reveal_cell(at);
            }
            CellState::Revealed => {}
        }
    }
}

/// Win finalization: every remaining hidden mine ends up flagged, which
/// drives the mines-remaining counter to zero.
pub fn flag_all_mines(board: &mut Board) {
    for at in board.coords() {
        if board.has_mine_at(at) && board.state_at(at) == CellState::Hidden {
            board.set_flag(at, true);
        }
    }
}
