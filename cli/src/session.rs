use chrono::{DateTime, Utc};
use tilesweep_canvas::{BatchId, CellAnimationEngine, FrameEvent, Surface};
use tilesweep_core as game;
use game::{
    ActionReport, Coord, Coord2, DigOutcome, DigStatus, Difficulty, EngineState, GameStore,
    GridEngine, MarkAction, SavedGame, TimeRecord,
};

const BANNER_FADE_MS: f32 = 300.0;

/// Marks of a resumed game, shown once its dug cells finished growing.
#[derive(Clone, Debug)]
struct PendingMarks {
    batch: BatchId,
    cells: Vec<Coord2>,
}

/// One game view: the engine, its animations and where it is persisted.
#[derive(Debug)]
pub struct GameSession<S: GameStore> {
    engine: GridEngine,
    animations: CellAnimationEngine,
    store: S,
    cell_size: f32,
    pending_marks: Option<PendingMarks>,
}

impl<S: GameStore> GameSession<S> {
    /// Starts a fresh game, dropping any save of the same difficulty.
    pub fn new(
        mut store: S,
        difficulty: Difficulty,
        seed: u64,
        cell_size: f32,
    ) -> Result<Self, S::Error> {
        store.delete(difficulty)?;
        Ok(Self::with_engine(
            store,
            GridEngine::new_game(difficulty, seed),
            cell_size,
        ))
    }

    /// Continues the saved game of `difficulty` when there is a readable one.
    /// The clock stays paused until the first move or [`Self::resume`].
    pub fn open(
        mut store: S,
        difficulty: Difficulty,
        seed: u64,
        cell_size: f32,
    ) -> Result<Self, S::Error> {
        let Some(saved) = store.load(difficulty)? else {
            return Ok(Self::with_engine(
                store,
                GridEngine::new_game(difficulty, seed),
                cell_size,
            ));
        };

        match saved.restore(seed) {
            Ok(engine) => {
                let mut session = Self::with_engine(store, engine, cell_size);
                session.replay_saved_cells();
                Ok(session)
            }
            Err(err) => {
                log::warn!("Discarding unreadable {difficulty} save: {err}");
                Self::new(store, difficulty, seed, cell_size)
            }
        }
    }

    fn with_engine(store: S, engine: GridEngine, cell_size: f32) -> Self {
        let mut animations = CellAnimationEngine::new(&engine);
        animations.render(cell_size);
        Self {
            engine,
            animations,
            store,
            cell_size,
            pending_marks: None,
        }
    }

    pub fn engine(&self) -> &GridEngine {
        &self.engine
    }

    pub fn animations(&self) -> &CellAnimationEngine {
        &self.animations
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn difficulty(&self) -> Difficulty {
        self.engine.difficulty()
    }

    /// The first dig of a fresh game also fades out the start banner.
    pub fn dig(&mut self, coords: Coord2, now: DateTime<Utc>) -> Result<ActionReport, S::Error> {
        let fresh = self.engine.state().is_ready() && !self.engine.is_paused();
        self.resume_if_paused(now);

        let result = self.engine.dig_cell(coords, now);
        match &result {
            Ok(outcome) => {
                if fresh {
                    self.animations.begin(BANNER_FADE_MS);
                }
                // mines may move on the first dig even when it wins outright
                if fresh || outcome.status == DigStatus::MinesChanged {
                    self.animations.grid_changed(&self.engine);
                }
                self.animate_dug(coords, &outcome.dug_cells);
                self.settle(now)?;
            }
            Err(err) => log::debug!("Dig at {coords:?} rejected: {err}"),
        }
        Ok(result.into())
    }

    pub fn toggle_mark(
        &mut self,
        coords: Coord2,
        now: DateTime<Utc>,
    ) -> Result<ActionReport, S::Error> {
        self.resume_if_paused(now);

        let result = self.engine.toggle_mark(coords);
        match result {
            Ok(MarkAction::Marked) => self.animations.mark_cell(coords),
            Ok(MarkAction::Unmarked) => self.animations.unmark_cell(coords),
            Err(err) => log::debug!("Mark at {coords:?} rejected: {err}"),
        }
        if result.is_ok() {
            self.save(now)?;
        }
        Ok(result.map(|_| ()).into())
    }

    /// Digs around a satisfied number, reported as a single dig.
    pub fn chord(&mut self, coords: Coord2, now: DateTime<Utc>) -> Result<ActionReport, S::Error> {
        self.resume_if_paused(now);

        let outcomes = match self.engine.chord_dig(coords, now) {
            Ok(outcomes) => outcomes,
            Err(err) => {
                log::debug!("Chord at {coords:?} rejected: {err}");
                return Ok(ActionReport::from(Err::<DigOutcome, _>(err)));
            }
        };
        let mut merged = DigOutcome {
            dug_cells: Vec::new(),
            shore_cells: Vec::new(),
            status: DigStatus::Success,
        };
        for outcome in outcomes {
            if outcome.status == DigStatus::MinesChanged {
                self.animations.grid_changed(&self.engine);
            }
            merged.dug_cells.extend(outcome.dug_cells);
            merged.shore_cells.extend(outcome.shore_cells);
            merged.status = outcome.status;
        }

        self.animate_dug(coords, &merged.dug_cells);
        self.settle(now)?;
        Ok(ActionReport::from(Ok(merged)))
    }

    /// Stops the clock and saves a game in progress.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), S::Error> {
        if self.engine.state() != EngineState::Active {
            return Ok(());
        }
        self.engine.pause_game(now);
        self.save(now)
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.engine.resume_game(now);
        self.animations.begin(BANNER_FADE_MS);
    }

    /// Throws the current game away and deals a new one of the same difficulty.
    pub fn abandon(&mut self, seed: u64) -> Result<(), S::Error> {
        let difficulty = self.difficulty();
        self.store.delete(difficulty)?;
        self.animations.clean();

        self.engine = GridEngine::new_game(difficulty, seed);
        self.animations = CellAnimationEngine::new(&self.engine);
        self.animations.render(self.cell_size);
        self.pending_marks = None;
        log::debug!("Abandoned {difficulty} game");
        Ok(())
    }

    /// Runs one animation frame, restoring pending marks when their batch is done.
    pub fn advance(&mut self, delta_ms: f32, surface: &mut impl Surface) -> Vec<FrameEvent> {
        let events = self.animations.frame(delta_ms, surface);

        for event in &events {
            match event {
                FrameEvent::RevealFinished(batch) => {
                    if let Some(pending) = self
                        .pending_marks
                        .take_if(|pending| pending.batch == *batch)
                    {
                        for coords in pending.cells {
                            self.animations.mark_cell(coords);
                        }
                    }
                }
                FrameEvent::LowFrameRate(fps) => log::info!("Running at {fps} fps"),
                FrameEvent::MineShown(_) => {}
            }
        }
        events
    }

    fn resume_if_paused(&mut self, now: DateTime<Utc>) {
        if self.engine.is_paused() {
            self.resume(now);
        }
    }

    fn animate_dug(&mut self, origin: Coord2, cells: &[Coord2]) {
        match cells {
            [] => {}
            [single] => self.animations.dig_cell(*single),
            many => {
                self.animations.dig_cells(origin, many);
            }
        }
    }

    /// Persists or retires the game depending on how the last move ended.
    fn settle(&mut self, now: DateTime<Utc>) -> Result<(), S::Error> {
        let difficulty = self.difficulty();
        match self.engine.state() {
            EngineState::Won => {
                self.animations.reveal_mines(None);
                self.store.delete(difficulty)?;
                let time = self.engine.elapsed_secs(now).unwrap_or(0);
                log::debug!("Won {difficulty} in {time}s");
                self.store.push_record(TimeRecord::new(difficulty, time, now))
            }
            EngineState::Lost => {
                self.animations.reveal_mines(self.engine.triggered_mine());
                self.store.delete(difficulty)
            }
            EngineState::Ready | EngineState::Active => self.save(now),
        }
    }

    fn save(&mut self, now: DateTime<Utc>) -> Result<(), S::Error> {
        self.store.save(SavedGame::new(&self.engine, now))
    }

    fn replay_saved_cells(&mut self) {
        let mut dug = Vec::new();
        let mut marked = Vec::new();
        for ((row, col), cell) in self.engine.cells().indexed_iter() {
            let coords = (row as Coord, col as Coord);
            if cell.is_dug {
                dug.push(coords);
            } else if cell.is_marked {
                marked.push(coords);
            }
        }
        log::debug!("Replaying {} dug and {} marked cells", dug.len(), marked.len());

        let origin = self.engine.first_dug().or(dug.first().copied());
        let batch = origin.and_then(|origin| self.animations.dig_cells(origin, &dug));
        match batch {
            Some(batch) => {
                self.pending_marks = Some(PendingMarks {
                    batch,
                    cells: marked,
                })
            }
            None => {
                for coords in marked {
                    self.animations.mark_cell(coords);
                }
            }
        }
    }
}
