use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardConfig};
use crate::cell::{CellState, CellView};
use crate::engine::{self, FlagOutcome, RevealOutcome};
use crate::error::{GameError, Result};
use crate::generator::{BoardGenerator, RandomBoardGenerator, SafeZone};
use crate::types::{CellCount, Coord, Coord2};

/// Valid transitions:
/// - Fresh -> InProgress (first click generates the board)
/// - InProgress -> Won | Lost (terminal until reset)
/// - any -> Fresh (reset)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No board yet; the first click decides the mine layout.
    #[default]
    Fresh,
    InProgress,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }

    /// The game has ended and no further board mutation happens.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Owns one game from first click to win or loss.
///
/// The session is the single integration point for a front end: clicks and
/// flags come in, snapshot queries go out. The front end owns the real 1 Hz
/// timer and forwards it through [`tick`](GameSession::tick); the session
/// ignores ticks whenever the clock is not running, so a stale callback
/// firing after a finished game or a reset can never advance the counter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    config: BoardConfig,
    board: Option<Board>,
    state: SessionState,
    elapsed_secs: u32,
    running: bool,
    seed: u64,
}

impl GameSession {
    pub fn new(config: BoardConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Deterministic variant: the first click always produces the same
    /// board for the same seed, config, and coordinates.
    pub fn with_seed(config: BoardConfig, seed: u64) -> Self {
        Self {
            config,
            board: None,
            state: SessionState::Fresh,
            elapsed_secs: 0,
            running: false,
            seed,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True only after a loss.
    pub fn game_over(&self) -> bool {
        self.state == SessionState::Lost
    }

    pub fn won(&self) -> bool {
        self.state == SessionState::Won
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn rows(&self) -> Coord {
        self.config.rows
    }

    pub fn cols(&self) -> Coord {
        self.config.cols
    }

    pub fn total_mines(&self) -> CellCount {
        self.config.mines
    }

    /// `mines - flags`; goes negative when the player over-flags and is
    /// deliberately not clamped.
    pub fn mines_remaining(&self) -> isize {
        let flagged = self.board.as_ref().map_or(0, Board::flagged_count);
        (self.config.mines as isize) - (flagged as isize)
    }

    /// Snapshot of one cell. A fresh session reports every in-bounds cell
    /// as hidden; mine positions are disclosed only once the game ends.
    pub fn cell(&self, at: Coord2) -> Result<CellView> {
        let at = self.validate(at)?;
        Ok(match &self.board {
            None => CellView::Hidden,
            Some(board) => board.cell_view(at, self.state.is_finished()),
        })
    }

    /// Full-board snapshot in row-major order, for per-render polling.
    pub fn cells(&self) -> impl Iterator<Item = (Coord2, CellView)> + '_ {
        let disclose = self.state.is_finished();
        let (rows, cols) = (self.config.rows, self.config.cols);
        (0..rows)
            .flat_map(move |row| (0..cols).map(move |col| (row, col)))
            .map(move |at| {
                let view = match &self.board {
                    None => CellView::Hidden,
                    Some(board) => board.cell_view(at, disclose),
                };
                (at, view)
            })
    }

    /// Left click: generates the board on the first click, chords on
    /// revealed cells, floods on hidden ones. Flagged cells and finished
    /// games are silent no-ops.
    pub fn click(&mut self, at: Coord2) -> Result<RevealOutcome> {
        let at = self.validate(at)?;
        if self.state.is_finished() {
            return Ok(RevealOutcome::NoChange);
        }

        if self.board.is_none() {
            log::debug!("first click at {:?}, generating board", at);
            self.state = SessionState::InProgress;
            self.running = true;
        }
        let (seed, config) = (self.seed, self.config);
        let board = self.board.get_or_insert_with(|| {
            RandomBoardGenerator::new(seed, at, SafeZone::Neighborhood).generate(config)
        });

        let outcome = match board.state_at(at) {
            CellState::Flagged => RevealOutcome::NoChange,
            CellState::Revealed => engine::chord_reveal(board, at)?,
            CellState::Hidden => engine::flood_reveal(board, at)?,
        };

        match outcome {
            RevealOutcome::HitMine => self.finish(false),
            RevealOutcome::Won => self.finish(true),
            _ => {}
        }
        Ok(outcome)
    }

    /// Right click. No-op unless the game is in progress and the cell is
    /// still unrevealed.
    pub fn toggle_flag(&mut self, at: Coord2) -> Result<FlagOutcome> {
        let at = self.validate(at)?;
        if self.state != SessionState::InProgress {
            return Ok(FlagOutcome::NoChange);
        }
        match self.board.as_mut() {
            Some(board) => engine::toggle_flag(board, at),
            None => Ok(FlagOutcome::NoChange),
        }
    }

    /// One second of wall-clock time, forwarded by the front end. Counted
    /// only while the game is in progress.
    pub fn tick(&mut self) {
        if self.running {
            self.elapsed_secs += 1;
        }
    }

    /// Back to a fresh session with the same configuration and a new seed.
    pub fn reset(&mut self) {
        log::debug!("session reset");
        self.board = None;
        self.state = SessionState::Fresh;
        self.elapsed_secs = 0;
        self.running = false;
        self.seed = rand::random();
    }

    /// Difficulty change: validates nothing (the config is already built
    /// through [`BoardConfig::new`]) and resets the session.
    pub fn set_config(&mut self, config: BoardConfig) {
        self.config = config;
        self.reset();
    }

    fn validate(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.config.rows && coords.1 < self.config.cols {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    fn finish(&mut self, won: bool) {
        if let Some(board) = self.board.as_mut() {
            if won {
                engine::flag_all_mines(board);
            } else {
                engine::reveal_all_mines(board);
            }
        }
        self.state = if won {
            SessionState::Won
        } else {
            SessionState::Lost
        };
        self.running = false;
        log::debug!(
            "game {} after {}s",
            if won { "won" } else { "lost" },
            self.elapsed_secs
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Difficulty;

    const SEED: u64 = 42;

    fn beginner() -> GameSession {
        GameSession::with_seed(Difficulty::Beginner.config(), SEED)
    }

    /// The board the session will generate on its first click, so tests
    /// can locate mines without going through the session's view gate.
    fn peek_board(session: &GameSession, first_click: Coord2) -> Board {
        RandomBoardGenerator::new(SEED, first_click, SafeZone::Neighborhood)
            .generate(session.config())
    }

    #[test]
    fn first_click_is_always_safe_and_starts_the_game() {
        let mut session = beginner();

        let outcome = session.click((0, 0)).unwrap();

        assert_ne!(outcome, RevealOutcome::HitMine);
        assert_eq!(session.state(), SessionState::InProgress);
        assert!(session.is_running());
        assert!(!session.game_over());
        assert!(!session.won());
        // the safe neighborhood always opens as a zero region
        assert_eq!(session.cell((0, 0)).unwrap(), CellView::Revealed(0));
    }

    #[test]
    fn fresh_session_renders_hidden_and_ignores_flags() {
        let mut session = beginner();

        assert_eq!(session.cell((4, 4)).unwrap(), CellView::Hidden);
        assert!(session.cells().all(|(_, view)| view == CellView::Hidden));
        assert_eq!(session.cells().count(), 81);
        assert_eq!(session.toggle_flag((4, 4)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(session.mines_remaining(), 10);
    }

    #[test]
    fn clicking_a_mine_loses_and_reveals_all_mines() {
        let mut session = beginner();
        let layout = peek_board(&session, (0, 0));
        session.click((0, 0)).unwrap();

        let mine = layout.coords().find(|&at| layout.has_mine_at(at)).unwrap();
        let outcome = session.click(mine).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert!(session.game_over());
        assert!(!session.won());
        assert!(!session.is_running());
        assert_eq!(session.cell(mine).unwrap(), CellView::Exploded);
        for at in layout.coords().filter(|&at| layout.has_mine_at(at)) {
            assert!(
                matches!(session.cell(at).unwrap(), CellView::Mine | CellView::Exploded),
                "mine at {at:?} not revealed"
            );
        }
    }

    #[test]
    fn revealing_every_safe_cell_wins_and_flags_the_mines() {
        let mut session = beginner();
        let layout = peek_board(&session, (0, 0));
        session.click((0, 0)).unwrap();

        for at in layout.coords().filter(|&at| !layout.has_mine_at(at)) {
            session.click(at).unwrap();
        }

        assert!(session.won());
        assert!(!session.game_over());
        assert!(!session.is_running());
        assert_eq!(session.mines_remaining(), 0);
        for at in layout.coords().filter(|&at| layout.has_mine_at(at)) {
            assert_eq!(session.cell(at).unwrap(), CellView::Flagged);
        }
    }

    #[test]
    fn terminal_sessions_ignore_further_input() {
        let mut session = beginner();
        let layout = peek_board(&session, (0, 0));
        session.click((0, 0)).unwrap();
        let mine = layout.coords().find(|&at| layout.has_mine_at(at)).unwrap();
        session.click(mine).unwrap();

        let frozen = session.clone();
        assert_eq!(session.click((8, 8)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag((8, 8)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(session, frozen);
    }

    #[test]
    fn clicking_a_flagged_cell_is_a_no_op() {
        let mut session = beginner();
        session.click((0, 0)).unwrap();

        let hidden = (0..9)
            .flat_map(|r| (0..9).map(move |c| (r, c)))
            .find(|&at| session.cell(at).unwrap() == CellView::Hidden)
            .unwrap();
        session.toggle_flag(hidden).unwrap();

        assert_eq!(session.click(hidden).unwrap(), RevealOutcome::NoChange);
        assert_eq!(session.cell(hidden).unwrap(), CellView::Flagged);
    }

    #[test]
    fn over_flagging_drives_the_counter_negative() {
        let mut session = beginner();
        session.click((0, 0)).unwrap();

        let hidden: Vec<Coord2> = (0..9)
            .flat_map(|r| (0..9).map(move |c| (r, c)))
            .filter(|&at| session.cell(at).unwrap() == CellView::Hidden)
            .take(12)
            .collect();
        assert_eq!(hidden.len(), 12);
        for at in hidden {
            session.toggle_flag(at).unwrap();
        }

        assert_eq!(session.mines_remaining(), -2);
    }

    #[test]
    fn flag_toggle_round_trips_through_the_session() {
        let mut session = beginner();
        session.click((0, 0)).unwrap();

        let at = session
            .cells()
            .find(|&(_, view)| view == CellView::Hidden)
            .map(|(at, _)| at)
            .unwrap();
        session.toggle_flag(at).unwrap();
        assert_eq!(session.cell(at).unwrap(), CellView::Flagged);
        session.toggle_flag(at).unwrap();
        assert_eq!(session.cell(at).unwrap(), CellView::Hidden);
    }

    #[test]
    fn ticks_only_count_while_the_game_runs() {
        let mut session = beginner();

        session.tick();
        assert_eq!(session.elapsed_secs(), 0);

        session.click((0, 0)).unwrap();
        session.tick();
        session.tick();
        session.tick();
        assert_eq!(session.elapsed_secs(), 3);
    }

    #[test]
    fn stale_ticks_cannot_resurrect_a_finished_or_reset_session() {
        let mut session = beginner();
        let layout = peek_board(&session, (0, 0));
        session.click((0, 0)).unwrap();
        session.tick();

        let mine = layout.coords().find(|&at| layout.has_mine_at(at)).unwrap();
        session.click(mine).unwrap();
        session.tick();
        assert_eq!(session.elapsed_secs(), 1);

        session.reset();
        session.tick();
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.state(), SessionState::Fresh);
    }

    #[test]
    fn reset_returns_to_fresh_with_the_same_config() {
        let mut session = beginner();
        session.click((4, 4)).unwrap();
        session.reset();

        assert!(session.state().is_fresh());
        assert_eq!(session.config(), Difficulty::Beginner.config());
        assert_eq!(session.cell((4, 4)).unwrap(), CellView::Hidden);
        assert_eq!(session.mines_remaining(), 10);
    }

    #[test]
    fn changing_difficulty_resets_the_session() {
        let mut session = beginner();
        session.click((0, 0)).unwrap();

        session.set_config(Difficulty::Expert.config());

        assert!(session.state().is_fresh());
        assert_eq!(session.rows(), 16);
        assert_eq!(session.cols(), 30);
        assert_eq!(session.mines_remaining(), 99);
    }

    #[test]
    fn out_of_bounds_input_is_rejected() {
        let mut session = beginner();

        assert_eq!(session.click((9, 0)), Err(GameError::OutOfBounds));
        assert_eq!(session.cell((0, 9)), Err(GameError::OutOfBounds));
        assert_eq!(session.toggle_flag((20, 20)), Err(GameError::OutOfBounds));
    }

    #[test]
    fn session_survives_a_serde_round_trip() {
        let mut session = beginner();
        session.click((0, 0)).unwrap();
        session.tick();

        let json = serde_json::to_string(&session).unwrap();
        let restored: GameSession = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, session);
    }
}
