use alloc::vec;
use alloc::vec::Vec;
use chrono::{DateTime, TimeDelta, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Upper bound on placement regenerations within a single dig.
const MAX_REGENERATIONS: u8 = 8;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Ready
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigStatus {
    Success,
    DugMine,
    HasWon,
    MinesChanged,
}

impl DigStatus {
    pub const fn is_game_over(self) -> bool {
        matches!(self, Self::DugMine | Self::HasWon)
    }
}

/// Cells revealed by one dig. Both lists are empty when a mine was hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DigOutcome {
    pub dug_cells: Vec<Coord2>,
    pub shore_cells: Vec<Coord2>,
    pub status: DigStatus,
}

impl DigOutcome {
    fn dug_mine() -> Self {
        Self {
            dug_cells: Vec::new(),
            shore_cells: Vec::new(),
            status: DigStatus::DugMine,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkAction {
    Marked,
    Unmarked,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    Success,
    DugMine,
    HasWon,
    MinesChanged,
    Error,
}

impl From<DigStatus> for StatusCode {
    fn from(status: DigStatus) -> Self {
        match status {
            DigStatus::Success => Self::Success,
            DigStatus::DugMine => Self::DugMine,
            DigStatus::HasWon => Self::HasWon,
            DigStatus::MinesChanged => Self::MinesChanged,
        }
    }
}

/// Flat result of any engine operation, for hosts that only look at status codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionReport {
    pub affected: Option<Vec<Coord2>>,
    pub shores: Option<Vec<Coord2>>,
    pub status: StatusCode,
}

impl ActionReport {
    const fn status_only(status: StatusCode) -> Self {
        Self {
            affected: None,
            shores: None,
            status,
        }
    }
}

impl From<Result<DigOutcome>> for ActionReport {
    fn from(result: Result<DigOutcome>) -> Self {
        match result {
            Ok(outcome) if outcome.status == DigStatus::DugMine => {
                Self::status_only(StatusCode::DugMine)
            }
            Ok(outcome) => Self {
                affected: Some(outcome.dug_cells),
                shores: Some(outcome.shore_cells),
                status: outcome.status.into(),
            },
            Err(_) => Self::status_only(StatusCode::Error),
        }
    }
}

impl From<Result<()>> for ActionReport {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => Self::status_only(StatusCode::Success),
            Err(_) => Self::status_only(StatusCode::Error),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GridEngine {
    difficulty: Difficulty,
    config: GameConfig,
    layout: MineLayout,
    grid: Array2<GridCell>,
    generator: RandomMineGenerator,
    dug_count: CellCount,
    marked_count: CellCount,
    first_dug: Option<Coord2>,
    triggered_mine: Option<Coord2>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    saved_elapsed: Option<i64>,
}

impl GridEngine {
    /// Fresh game for a preset. Mines are placed without a safe zone, the
    /// first dig regenerates them when needed.
    pub fn new_game(difficulty: Difficulty, seed: u64) -> Self {
        let mut generator = RandomMineGenerator::new(seed);
        let layout = generator.generate(difficulty.config(), None);
        Self::with_generator(difficulty, layout, generator)
    }

    /// Game over a fixed placement. The board size comes from `layout`,
    /// `seed` only drives later regenerations.
    pub fn from_layout(difficulty: Difficulty, layout: MineLayout, seed: u64) -> Self {
        Self::with_generator(difficulty, layout, RandomMineGenerator::new(seed))
    }

    fn with_generator(
        difficulty: Difficulty,
        layout: MineLayout,
        generator: RandomMineGenerator,
    ) -> Self {
        let config = GameConfig::new_unchecked(layout.size(), layout.mine_count());
        Self {
            difficulty,
            config,
            grid: build_grid(&layout),
            layout,
            generator,
            dug_count: 0,
            marked_count: 0,
            first_dug: None,
            triggered_mine: None,
            started_at: None,
            ended_at: None,
            saved_elapsed: None,
        }
    }

    /// Rebuilds an in-progress game from persisted cells.
    pub(crate) fn restore(
        difficulty: Difficulty,
        layout: MineLayout,
        grid: Array2<GridCell>,
        first_dug: Option<Coord2>,
        saved_elapsed: Option<i64>,
        seed: u64,
    ) -> Self {
        let mut engine = Self::from_layout(difficulty, layout, seed);
        engine.dug_count = grid.iter().filter(|cell| cell.is_dug).count() as CellCount;
        engine.marked_count = grid.iter().filter(|cell| cell.is_marked).count() as CellCount;
        engine.grid = grid;
        engine.first_dug = first_dug;
        engine.saved_elapsed = saved_elapsed;
        engine
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn rows(&self) -> Coord {
        self.config.size.0
    }

    pub fn cols(&self) -> Coord {
        self.config.size.1
    }

    pub fn mines(&self) -> CellCount {
        self.config.mines
    }

    pub fn marked_count(&self) -> CellCount {
        self.marked_count
    }

    pub fn dug_count(&self) -> CellCount {
        self.dug_count
    }

    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.marked_count as isize)
    }

    pub fn cell_at(&self, coords: Coord2) -> GridCell {
        self.grid[coords.to_nd_index()]
    }

    pub fn cells(&self) -> &Array2<GridCell> {
        &self.grid
    }

    pub fn mine_positions(&self) -> &[Coord2] {
        self.layout.positions()
    }

    pub fn first_dug(&self) -> Option<Coord2> {
        self.first_dug
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    pub fn state(&self) -> EngineState {
        match (self.started_at, self.ended_at) {
            (_, Some(_)) if self.is_cleared() => EngineState::Won,
            (_, Some(_)) => EngineState::Lost,
            (Some(_), None) => EngineState::Active,
            (None, None) => EngineState::Ready,
        }
    }

    /// Whole seconds of play, `None` before the clock starts. A restored game
    /// reports its saved value until [`Self::resume_game`] is called.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        let Some(started_at) = self.started_at else {
            return self.saved_elapsed;
        };
        let until = self.ended_at.unwrap_or(now);
        Some((until - started_at).num_milliseconds().div_euclid(1000))
    }

    pub fn start_game(&mut self, now: DateTime<Utc>) {
        if self.started_at.is_some() {
            return;
        }
        if self.saved_elapsed.is_some() {
            self.resume_game(now);
        } else {
            log::debug!("Clock started");
            self.started_at = Some(now);
        }
    }

    pub fn end_game(&mut self, now: DateTime<Utc>) {
        if self.ended_at.is_none() {
            self.ended_at = Some(now);
        }
    }

    /// Stops a running clock and keeps the elapsed seconds for
    /// [`Self::resume_game`]. The game reports [`EngineState::Ready`] while paused.
    pub fn pause_game(&mut self, now: DateTime<Utc>) {
        if self.started_at.is_none() || self.ended_at.is_some() {
            return;
        }
        self.saved_elapsed = self.elapsed_secs(now);
        self.started_at = None;
        log::debug!("Clock paused at {:?}s", self.saved_elapsed);
    }

    pub fn is_paused(&self) -> bool {
        self.saved_elapsed.is_some()
    }

    /// Back-dates the start by the saved elapsed time and forgets it.
    pub fn resume_game(&mut self, now: DateTime<Utc>) {
        let Some(saved) = self.saved_elapsed.take() else {
            return;
        };
        let offset = TimeDelta::try_seconds(saved).unwrap_or(TimeDelta::zero());
        log::debug!("Resuming with {saved}s already played");
        self.started_at = Some(now - offset);
    }

    pub fn dig_cell(&mut self, coords: Coord2, now: DateTime<Utc>) -> Result<DigOutcome> {
        let coords = self.layout.validate_coords(coords)?;
        self.check_not_finished()?;

        let cell = self.cell_at(coords);
        if cell.is_dug || cell.is_marked {
            return Err(GameError::InvalidState);
        }

        self.start_game(now);

        let mut regenerations = 0;
        let mut forced_clear = false;
        let (dug_cells, shore_cells) = loop {
            let first_move = self.first_dug.is_none() || regenerations > 0;
            let can_regenerate = first_move && regenerations < MAX_REGENERATIONS;

            if can_regenerate && self.cell_at(coords).is_unsafe_start() {
                self.regenerate_around(coords);
                regenerations += 1;
                continue;
            }

            if self.cell_at(coords).is_mine {
                self.grid[coords.to_nd_index()].is_dug = true;
                self.triggered_mine = Some(coords);
                self.end_game(now);
                log::debug!("Mine dug at {coords:?}");
                return Ok(DigOutcome::dug_mine());
            }

            let (dug, shores) = self.collect_reveal(coords);
            if can_regenerate && self.would_clear(dug.len()) {
                self.regenerate_around(coords);
                regenerations += 1;
                continue;
            }
            if first_move && self.would_clear(dug.len()) {
                log::warn!("First dig still clears the board after {regenerations} regenerations");
                forced_clear = true;
            }

            break (dug, shores);
        };

        for &pos in &dug_cells {
            self.grid[pos.to_nd_index()].is_dug = true;
        }
        self.dug_count += dug_cells.len() as CellCount;
        if self.first_dug.is_none() {
            self.first_dug = Some(coords);
        }

        let won = self.is_cleared();
        if won {
            self.end_game(now);
            for &mine in self.layout.positions() {
                self.grid[mine.to_nd_index()].is_marked = true;
            }
            self.marked_count = self.config.mines;
            log::debug!("Board cleared");
        }

        // a forced clear is still a win
        let status = if won && forced_clear {
            DigStatus::HasWon
        } else if regenerations > 0 {
            DigStatus::MinesChanged
        } else if won {
            DigStatus::HasWon
        } else {
            DigStatus::Success
        };

        log::trace!(
            "Dug {} cells from {coords:?}, {} shores, {status:?}",
            dug_cells.len(),
            shore_cells.len()
        );

        Ok(DigOutcome {
            dug_cells,
            shore_cells,
            status,
        })
    }

    pub fn mark_cell(&mut self, coords: Coord2) -> Result<()> {
        self.check_active()?;
        let coords = self.layout.validate_coords(coords)?;

        let cell = &mut self.grid[coords.to_nd_index()];
        if cell.is_marked || cell.is_dug {
            return Err(GameError::InvalidState);
        }
        cell.is_marked = true;
        self.marked_count += 1;
        Ok(())
    }

    pub fn unmark_cell(&mut self, coords: Coord2) -> Result<()> {
        self.check_active()?;
        let coords = self.layout.validate_coords(coords)?;

        let cell = &mut self.grid[coords.to_nd_index()];
        if !cell.is_marked || cell.is_dug {
            return Err(GameError::InvalidState);
        }
        cell.is_marked = false;
        self.marked_count -= 1;
        Ok(())
    }

    pub fn toggle_mark(&mut self, coords: Coord2) -> Result<MarkAction> {
        let coords = self.layout.validate_coords(coords)?;
        if self.cell_at(coords).is_marked {
            self.unmark_cell(coords).map(|()| MarkAction::Unmarked)
        } else {
            self.mark_cell(coords).map(|()| MarkAction::Marked)
        }
    }

    /// Digs every hidden neighbour of a numbered cell whose marks already
    /// account for all of its mines. Stops early when a dig ends the game.
    pub fn chord_dig(&mut self, coords: Coord2, now: DateTime<Utc>) -> Result<Vec<DigOutcome>> {
        let coords = self.layout.validate_coords(coords)?;
        self.check_not_finished()?;

        let cell = self.cell_at(coords);
        if !cell.is_dug || cell.mines_around == 0 {
            return Err(GameError::InvalidState);
        }
        if self.count_marked_neighbors(coords) != cell.mines_around {
            return Ok(vec![]);
        }

        let mut outcomes = Vec::new();
        for pos in self.layout.iter_neighbors(coords) {
            if !self.cell_at(pos).is_hidden() {
                continue;
            }
            let outcome = self.dig_cell(pos, now)?;
            let game_over = outcome.status.is_game_over();
            outcomes.push(outcome);
            if game_over {
                break;
            }
        }
        Ok(outcomes)
    }

    /// Cells a dig at `coords` would reveal, as `(dug, shores)`, without mutating.
    fn collect_reveal(&self, coords: Coord2) -> (Vec<Coord2>, Vec<Coord2>) {
        if self.cell_at(coords).mines_around != 0 {
            return (vec![coords], vec![coords]);
        }

        let mut visited: Array2<bool> = Array2::default(self.grid.dim());
        let mut to_visit = vec![coords];
        let mut dug = Vec::new();
        let mut shores = Vec::new();
        visited[coords.to_nd_index()] = true;

        while let Some(visit_coords) = to_visit.pop() {
            dug.push(visit_coords);
            if self.cell_at(visit_coords).mines_around > 0 {
                shores.push(visit_coords);
                continue;
            }

            for pos in self.layout.iter_neighbors(visit_coords) {
                let seen = &mut visited[pos.to_nd_index()];
                if *seen {
                    continue;
                }
                *seen = true;
                if !self.cell_at(pos).is_hidden() {
                    log::trace!("Flood stops at {pos:?}");
                    continue;
                }
                to_visit.push(pos);
            }
        }

        (dug, shores)
    }

    fn regenerate_around(&mut self, center: Coord2) {
        log::debug!("Regenerating mines around {center:?}");
        self.first_dug = Some(center);
        self.layout = self.generator.generate(self.config, Some(center));
        self.grid = build_grid(&self.layout);
        self.dug_count = 0;
        self.marked_count = 0;
    }

    fn would_clear(&self, newly_dug: usize) -> bool {
        usize::from(self.dug_count) + newly_dug == usize::from(self.config.safe_cell_count())
    }

    fn is_cleared(&self) -> bool {
        self.would_clear(0)
    }

    fn count_marked_neighbors(&self, coords: Coord2) -> u8 {
        self.layout
            .iter_neighbors(coords)
            .filter(|&pos| self.cell_at(pos).is_marked)
            .count() as u8
    }

    fn check_active(&self) -> Result<()> {
        if matches!(self.state(), EngineState::Active) {
            Ok(())
        } else {
            Err(GameError::InvalidState)
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.has_ended() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

fn build_grid(layout: &MineLayout) -> Array2<GridCell> {
    Array2::from_shape_fn(layout.size().to_nd_index(), |(row, col)| {
        let coords = (row as Coord, col as Coord);
        let is_mine = layout.contains_mine(coords);
        GridCell {
            is_mine,
            mines_around: if is_mine {
                0
            } else {
                layout.adjacent_mine_count(coords)
            },
            ..Default::default()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(secs * 1000).unwrap()
    }

    /// 3x5 board with mines in the right column, the left part floods open.
    fn right_edge_engine() -> GridEngine {
        let layout = MineLayout::from_mine_coords((3, 5), &[(0, 4), (2, 4)]).unwrap();
        GridEngine::from_layout(Difficulty::Easy, layout, 1)
    }

    fn assert_counts_match_neighbors(engine: &GridEngine) {
        let mut mines = 0;
        for ((row, col), cell) in engine.cells().indexed_iter() {
            let coords = (row as Coord, col as Coord);
            if cell.is_mine {
                mines += 1;
                continue;
            }
            let expected = engine
                .layout
                .iter_neighbors(coords)
                .filter(|&pos| engine.cell_at(pos).is_mine)
                .count() as u8;
            assert_eq!(cell.mines_around, expected, "at {coords:?}");
        }
        assert_eq!(mines, engine.mines());
    }

    #[test]
    fn fresh_grids_have_exact_mines_and_counts() {
        for difficulty in Difficulty::ALL {
            let engine = GridEngine::new_game(difficulty, 99);

            assert_eq!(engine.size(), difficulty.config().size);
            assert_eq!(engine.state(), EngineState::Ready);
            assert_counts_match_neighbors(&engine);
        }
    }

    #[test]
    fn first_dig_never_hits_the_safe_zone() {
        for seed in 0..40 {
            let mut engine = GridEngine::new_game(Difficulty::Easy, seed);
            let target = ((seed % 10) as Coord, (seed % 8) as Coord);

            let outcome = engine.dig_cell(target, t0()).unwrap();

            assert_ne!(outcome.status, DigStatus::DugMine);
            assert_eq!(engine.cell_at(target).mines_around, 0);
            assert!(
                engine
                    .mine_positions()
                    .iter()
                    .all(|&mine| !is_within_one(mine, target))
            );
            assert_eq!(engine.first_dug(), Some(target));
            assert_counts_match_neighbors(&engine);
            assert_eq!(engine.dig_cell(target, t0()), Err(GameError::InvalidState));
        }
    }

    #[test]
    fn unsafe_first_dig_reports_mines_changed() {
        let layout = MineLayout::from_mine_coords((6, 6), &[(0, 1), (5, 5)]).unwrap();
        let mut engine = GridEngine::from_layout(Difficulty::Easy, layout, 5);

        let outcome = engine.dig_cell((0, 0), t0()).unwrap();

        assert_eq!(outcome.status, DigStatus::MinesChanged);
        assert!(!engine.cell_at((0, 1)).is_mine);
        assert_eq!(engine.mine_positions().len(), 2);
    }

    #[test]
    fn first_dig_that_would_clear_moves_the_mine() {
        for seed in 0..20 {
            let layout = MineLayout::from_mine_coords((1, 10), &[(0, 9)]).unwrap();
            let mut engine = GridEngine::from_layout(Difficulty::Easy, layout, seed);

            let outcome = engine.dig_cell((0, 0), t0()).unwrap();

            assert_eq!(outcome.status, DigStatus::MinesChanged, "seed {seed}");
            assert_eq!(engine.state(), EngineState::Active, "seed {seed}");
            assert_eq!(engine.mine_positions().len(), 1);
            assert_ne!(engine.mine_positions()[0], (0, 9), "seed {seed}");
            assert!(!engine.cell_at((0, 9)).is_dug);
        }
    }

    #[test]
    fn unavoidable_clear_on_first_dig_reports_the_win() {
        let layout = MineLayout::from_mine_coords((1, 3), &[(0, 2)]).unwrap();
        let mut engine = GridEngine::from_layout(Difficulty::Easy, layout, 3);

        let outcome = engine.dig_cell((0, 0), t0()).unwrap();

        assert_eq!(outcome.status, DigStatus::HasWon);
        assert_eq!(outcome.dug_cells.len(), 2);
        assert_eq!(engine.state(), EngineState::Won);
        assert_eq!(engine.marked_count(), engine.mines());
        assert_eq!(engine.elapsed_secs(at(5)), Some(0));
    }

    #[test]
    fn flood_fill_stops_at_shores() {
        let mut engine = right_edge_engine();

        let outcome = engine.dig_cell((1, 0), t0()).unwrap();

        assert_eq!(outcome.status, DigStatus::Success);
        assert_eq!(outcome.dug_cells.len(), 12);
        assert_eq!(engine.dug_count(), 12);
        for &shore in &outcome.shore_cells {
            assert!(engine.cell_at(shore).mines_around > 0);
        }
        let mut shores = outcome.shore_cells.clone();
        shores.sort();
        assert_eq!(shores, [(0, 3), (1, 3), (2, 3)]);

        let mut unique = outcome.dug_cells.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), outcome.dug_cells.len());
        assert!(engine.cell_at((1, 4)).is_hidden());
    }

    #[test]
    fn flood_fill_skips_marked_cells() {
        let mut engine = right_edge_engine();
        engine.start_game(t0());
        engine.first_dug = Some((2, 2));
        engine.mark_cell((0, 2)).unwrap();

        let outcome = engine.dig_cell((1, 0), t0()).unwrap();

        assert!(!outcome.dug_cells.contains(&(0, 2)));
        assert!(engine.cell_at((0, 2)).is_marked);
        assert!(!engine.cell_at((0, 2)).is_dug);
    }

    #[test]
    fn numbered_cell_is_its_own_shore() {
        let mut engine = right_edge_engine();
        engine.dig_cell((1, 0), t0()).unwrap();

        let outcome = engine.dig_cell((1, 4), t0()).unwrap();

        assert_eq!(outcome.dug_cells, [(1, 4)]);
        assert_eq!(outcome.shore_cells, [(1, 4)]);
    }

    #[test]
    fn last_safe_cell_wins_and_marks_mines() {
        let mut engine = right_edge_engine();
        engine.dig_cell((1, 0), at(1)).unwrap();

        let outcome = engine.dig_cell((1, 4), at(4)).unwrap();

        assert_eq!(outcome.status, DigStatus::HasWon);
        assert_eq!(engine.state(), EngineState::Won);
        assert_eq!(engine.marked_count(), engine.mines());
        assert!(engine.cell_at((0, 4)).is_marked);
        assert_eq!(engine.elapsed_secs(at(100)), Some(3));
        assert_eq!(engine.dig_cell((0, 4), at(5)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn digging_a_mine_loses() {
        let mut engine = right_edge_engine();
        engine.dig_cell((1, 0), t0()).unwrap();

        let outcome = engine.dig_cell((0, 4), at(2)).unwrap();

        assert_eq!(outcome, DigOutcome::dug_mine());
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 4)));
        assert!(engine.cell_at((0, 4)).is_dug);
        assert_eq!(
            ActionReport::from(engine.dig_cell((2, 4), at(3))).status,
            StatusCode::Error
        );
    }

    #[test]
    fn easy_scenario_marks_and_unmarks() {
        let mut engine = GridEngine::new_game(Difficulty::Easy, 2024);

        let report = ActionReport::from(engine.dig_cell((0, 0), t0()));
        assert!(matches!(
            report.status,
            StatusCode::Success | StatusCode::MinesChanged
        ));

        let target = engine
            .cells()
            .indexed_iter()
            .find(|(_, cell)| cell.is_hidden())
            .map(|((row, col), _)| (row as Coord, col as Coord))
            .unwrap();

        let before = engine.marked_count();
        let report = ActionReport::from(engine.mark_cell(target));
        assert_eq!(report.status, StatusCode::Success);
        assert_eq!(engine.marked_count(), before + 1);

        engine.unmark_cell(target).unwrap();
        assert_eq!(engine.marked_count(), before);
    }

    #[test]
    fn marking_requires_an_active_game() {
        let mut engine = right_edge_engine();

        assert_eq!(engine.mark_cell((0, 0)), Err(GameError::InvalidState));

        engine.dig_cell((1, 0), t0()).unwrap();
        assert_eq!(engine.mark_cell((1, 0)), Err(GameError::InvalidState));
        assert_eq!(engine.unmark_cell((1, 4)), Err(GameError::InvalidState));
        assert_eq!(engine.mark_cell((9, 9)), Err(GameError::OutOfBounds));
        assert_eq!(engine.toggle_mark((1, 4)), Ok(MarkAction::Marked));
        assert_eq!(engine.mark_cell((1, 4)), Err(GameError::InvalidState));
        assert_eq!(engine.toggle_mark((1, 4)), Ok(MarkAction::Unmarked));
        assert_eq!(engine.mines_left(), 2);
    }

    #[test]
    fn chord_digs_unmarked_neighbors() {
        let mut engine = right_edge_engine();
        engine.dig_cell((1, 0), t0()).unwrap();
        engine.mark_cell((0, 4)).unwrap();

        assert_eq!(engine.chord_dig((1, 3), t0()), Ok(vec![]));

        engine.mark_cell((2, 4)).unwrap();
        let outcomes = engine.chord_dig((1, 3), t0()).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, DigStatus::HasWon);
        assert_eq!(engine.chord_dig((1, 0), t0()), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn chord_with_a_wrong_mark_hits_the_mine() {
        let mut engine = right_edge_engine();
        engine.dig_cell((1, 0), t0()).unwrap();
        engine.mark_cell((1, 4)).unwrap();

        let outcomes = engine.chord_dig((0, 3), t0()).unwrap();

        assert_eq!(outcomes.last().map(|o| o.status), Some(DigStatus::DugMine));
        assert_eq!(engine.state(), EngineState::Lost);
    }

    #[test]
    fn clock_is_started_once_and_resumes_back_dated() {
        let mut engine = right_edge_engine();
        assert_eq!(engine.elapsed_secs(at(10)), None);

        engine.start_game(at(10));
        engine.start_game(at(20));
        assert_eq!(engine.elapsed_secs(at(25)), Some(15));

        engine.saved_elapsed = Some(42);
        engine.started_at = None;
        assert_eq!(engine.elapsed_secs(at(100)), Some(42));

        engine.resume_game(at(100));
        assert_eq!(engine.elapsed_secs(at(103)), Some(45));

        engine.resume_game(at(500));
        assert_eq!(engine.elapsed_secs(at(103)), Some(45));
    }

    #[test]
    fn pause_keeps_elapsed_until_resumed() {
        let mut engine = right_edge_engine();
        engine.dig_cell((1, 0), at(10)).unwrap();

        engine.pause_game(at(40));
        assert!(engine.is_paused());
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.elapsed_secs(at(900)), Some(30));
        assert_eq!(engine.mark_cell((1, 4)), Err(GameError::InvalidState));

        engine.resume_game(at(1000));
        assert!(!engine.is_paused());
        assert_eq!(engine.state(), EngineState::Active);
        assert_eq!(engine.elapsed_secs(at(1005)), Some(35));
    }

    #[test]
    fn rejected_digs_do_not_mutate() {
        let mut engine = right_edge_engine();

        assert_eq!(engine.dig_cell((3, 0), t0()), Err(GameError::OutOfBounds));
        assert!(!engine.has_started());
        assert_eq!(engine.first_dug(), None);
    }
}
