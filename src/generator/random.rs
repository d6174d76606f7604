use ndarray::Array2;
use rand::prelude::*;

use super::{BoardGenerator, SafeZone};
use crate::board::{Board, BoardConfig};
use crate::types::{neighbors, CellCount, Coord2, ToNdIndex};

/// Uniform random mine placement that keeps the requested safe zone clear.
///
/// The safe cell must lie within the board described by the config passed
/// to [`generate`](BoardGenerator::generate).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
    safe_cell: Coord2,
    zone: SafeZone,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64, safe_cell: Coord2, zone: SafeZone) -> Self {
        Self {
            seed,
            safe_cell,
            zone,
        }
    }

    /// Shrinks the zone until the mine budget fits the remaining cells.
    /// With a validated config a `Cell` zone always fits, so the only
    /// common degradation is `Neighborhood` -> `Cell` on tiny dense boards.
    fn effective_zone(&self, config: BoardConfig) -> SafeZone {
        let total = config.total_cells();

        let zone = match self.zone {
            SafeZone::Neighborhood => {
                let zone_len =
                    1 + neighbors(self.safe_cell, config.size()).count() as CellCount;
                if config.mines > total - zone_len {
                    log::warn!(
                        "Cannot keep the full neighborhood mine-free, falling back to the clicked cell only"
                    );
                    SafeZone::Cell
                } else {
                    SafeZone::Neighborhood
                }
            }
            zone => zone,
        };

        match zone {
            SafeZone::Cell if config.mines > total - 1 => {
                log::warn!("Cannot keep the clicked cell mine-free, placing mines anywhere");
                SafeZone::None
            }
            zone => zone,
        }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: BoardConfig) -> Board {
        let total = config.total_cells();
        let zone = self.effective_zone(config);

        let mut reserved: Vec<Coord2> = Vec::new();
        match zone {
            SafeZone::None => {}
            SafeZone::Cell => reserved.push(self.safe_cell),
            SafeZone::Neighborhood => {
                reserved.push(self.safe_cell);
                reserved.extend(neighbors(self.safe_cell, config.size()));
            }
        }

        // Reserved cells are marked as occupied so the rank scan below
        // skips them, then cleared before handing the mask over.
        let mut mines: Array2<bool> = Array2::default(config.size().to_nd_index());
        for &coords in &reserved {
            mines[coords.to_nd_index()] = true;
        }

        let mut free = total - reserved.len() as CellCount;
        let mut placed: CellCount = 0;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        {
            let slots = mines.as_slice_mut().expect("layout should be standard");
            while placed < config.mines {
                if free == 0 {
                    break;
                }
                let mut target: CellCount = rng.random_range(0..free);
                for slot in slots.iter_mut() {
                    if *slot {
                        continue;
                    }
                    if target == 0 {
                        *slot = true;
                        placed += 1;
                        free -= 1;
                        break;
                    }
                    target -= 1;
                }
            }
        }

        for &coords in &reserved {
            mines[coords.to_nd_index()] = false;
        }

        let board = Board::from_mine_mask(mines);
        if board.mine_count() != config.mines {
            log::warn!(
                "Generated board mine count mismatch, actual: {}, requested: {}",
                board.mine_count(),
                config.mines
            );
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(config: BoardConfig, seed: u64, safe_cell: Coord2) -> Board {
        RandomBoardGenerator::new(seed, safe_cell, SafeZone::Neighborhood).generate(config)
    }

    #[test]
    fn places_exactly_the_requested_mines() {
        let config = BoardConfig::new(9, 9, 10).unwrap();
        for seed in 0..20 {
            let board = generate(config, seed, (4, 4));
            assert_eq!(board.mine_count(), 10);
        }
    }

    #[test]
    fn corner_click_keeps_its_neighborhood_clear() {
        let config = BoardConfig::new(9, 9, 10).unwrap();
        for seed in 0..50 {
            let board = generate(config, seed, (0, 0));
            for at in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                assert!(!board.has_mine_at(at), "seed {seed} mined {at:?}");
            }
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_board() {
        let config = BoardConfig::new(16, 30, 99).unwrap();
        let first = generate(config, 7, (8, 15));
        let second = generate(config, 7, (8, 15));
        assert_eq!(first, second);
    }

    #[test]
    fn dense_board_degrades_to_a_single_safe_cell() {
        // 8 mines on 3x3 cannot spare the whole neighborhood, but the
        // clicked cell itself stays clear.
        let config = BoardConfig::new(3, 3, 8).unwrap();
        for seed in 0..20 {
            let board = generate(config, seed, (1, 1));
            assert_eq!(board.mine_count(), 8);
            assert!(!board.has_mine_at((1, 1)));
        }
    }

    #[test]
    fn zero_mines_is_a_valid_board() {
        let config = BoardConfig::new(2, 2, 0).unwrap();
        let board = generate(config, 0, (0, 0));
        assert_eq!(board.mine_count(), 0);
        assert_eq!(board.safe_cell_count(), 4);
    }

    #[test]
    fn unrestricted_zone_still_places_uniformly() {
        let config = BoardConfig::new(4, 4, 6).unwrap();
        let board =
            RandomBoardGenerator::new(3, (0, 0), SafeZone::None).generate(config);
        assert_eq!(board.mine_count(), 6);
    }
}
