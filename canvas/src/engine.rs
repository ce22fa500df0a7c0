use ndarray::Array2;
use tilesweep_core as game;
use game::{Coord, Coord2, Direction, GridEngine, NeighborIterExt, ToNdIndex};

use crate::easing::{ease_out_back, ease_out_quart};
use crate::*;

const TAP_TO_BEGIN: &str = "Tap to begin.";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BatchId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FrameEvent {
    /// Every cell of a [`CellAnimationEngine::dig_cells`] batch started growing.
    RevealFinished(BatchId),
    MineShown(Coord2),
    LowFrameRate(u32),
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum TimerAction {
    StartGrow { coords: Coord2, adapt_delay_ms: f32 },
    AdaptAround(Coord2),
    ShowMine(Coord2),
    BatchDone(BatchId),
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct PendingTimer {
    remaining_ms: f32,
    action: TimerAction,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct BannerFade {
    elapsed_ms: f32,
    duration_ms: f32,
}

/// Animates the visual grid of one game.
///
/// Nothing is drawn or scheduled until [`Self::render`] is called, and every
/// operation is ignored again after [`Self::clean`].
#[derive(Clone, Debug)]
pub struct CellAnimationEngine {
    cells: Array2<CanvasCell>,
    mine_positions: Vec<Coord2>,
    metrics: Option<CellMetrics>,
    timers: Vec<PendingTimer>,
    mines_revealed: bool,
    dug_mine: Option<Coord2>,
    next_batch: u32,
    is_first_frame: bool,
    needs_clear: bool,
    banner_fade: Option<BannerFade>,
    slow_frames: SlowFrameMonitor,
}

impl CellAnimationEngine {
    pub fn new(engine: &GridEngine) -> Self {
        let bounds = engine.size();
        let cells = Array2::from_shape_fn(bounds.to_nd_index(), |(row, col)| {
            let coords = (row as Coord, col as Coord);
            CanvasCell::new(coords, bounds, engine.cell_at(coords))
        });

        Self {
            cells,
            mine_positions: engine.mine_positions().to_vec(),
            metrics: None,
            timers: Vec::new(),
            mines_revealed: false,
            dug_mine: None,
            next_batch: 0,
            is_first_frame: false,
            needs_clear: false,
            banner_fade: None,
            slow_frames: SlowFrameMonitor::default(),
        }
    }

    pub fn render(&mut self, cell_size: f32) {
        log::debug!("Rendering with {cell_size}px cells");
        self.metrics = Some(CellMetrics::new(cell_size));
        self.is_first_frame = true;
    }

    /// Drops every pending timer and detaches from the surface.
    pub fn clean(&mut self) {
        log::debug!("Cleaning up with {} pending timers", self.timers.len());
        self.timers.clear();
        self.metrics = None;
        self.banner_fade = None;
    }

    pub fn is_rendering(&self) -> bool {
        self.metrics.is_some()
    }

    /// Pixel size of the whole grid once rendering.
    pub fn surface_size(&self) -> Option<(f32, f32)> {
        let metrics = self.metrics?;
        let (rows, cols) = self.bounds();
        Some((
            f32::from(cols) * metrics.size,
            f32::from(rows) * metrics.size,
        ))
    }

    pub fn size(&self) -> Coord2 {
        self.bounds()
    }

    pub fn cell(&self, coords: Coord2) -> &CanvasCell {
        &self.cells[coords.to_nd_index()]
    }

    pub fn mines_revealed(&self) -> bool {
        self.mines_revealed
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Nothing left to draw until the next operation.
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
            && self.banner_fade.is_none()
            && !self.is_first_frame
            && !self.needs_clear
            && self.cells.iter().all(CanvasCell::is_idle)
    }

    pub fn dig_cell(&mut self, coords: Coord2) {
        if self.accepts("dig_cell", coords) {
            self.start_grow(coords, CellState::Dug);
        }
    }

    /// Reveals a flood in a ripple around `origin`. Returns the batch reported
    /// by [`FrameEvent::RevealFinished`], or `None` when not rendering.
    pub fn dig_cells(&mut self, origin: Coord2, cells: &[Coord2]) -> Option<BatchId> {
        if !self.accepts("dig_cells", origin) {
            return None;
        }

        let batch = BatchId(self.next_batch);
        self.next_batch = self.next_batch.wrapping_add(1);

        if let [single] = cells {
            self.dig_cell(*single);
            self.push_timer(0.0, TimerAction::BatchDone(batch));
            return Some(batch);
        }

        let schedule = wavefront(origin, cells, TIME_BETWEEN_CELLS_MS);
        for entry in &schedule.entries {
            if !self.accepts("dig_cells", entry.coords) {
                continue;
            }
            self.cells[entry.coords.to_nd_index()].transition(CellState::Dug);
            self.push_timer(
                entry.delay_ms,
                TimerAction::StartGrow {
                    coords: entry.coords,
                    adapt_delay_ms: entry.distance * DELAY_MANY_MS,
                },
            );
        }
        self.push_timer(schedule.finish_delay_ms, TimerAction::BatchDone(batch));

        log::debug!(
            "Batch {} of {} cells finishes in {}ms",
            batch.0,
            cells.len(),
            schedule.finish_delay_ms
        );
        Some(batch)
    }

    pub fn mark_cell(&mut self, coords: Coord2) {
        if self.accepts("mark_cell", coords) {
            self.start_grow(coords, CellState::Marked);
        }
    }

    pub fn unmark_cell(&mut self, coords: Coord2) {
        if !self.accepts("unmark_cell", coords) {
            return;
        }

        let cell = &mut self.cells[coords.to_nd_index()];
        cell.transition(CellState::None);
        cell.start(Animation::Grow);
        cell.is_reverse = true;
        cell.end_animation = None;

        self.adapt_surrounding(coords);
    }

    /// Shows every mine, spreading from the losing mine or from the grid centre.
    pub fn reveal_mines(&mut self, loss: Option<Coord2>) {
        let (rows, cols) = self.bounds();
        let origin = loss.unwrap_or((rows / 2, cols / 2));
        if !self.accepts("reveal_mines", origin) {
            return;
        }

        self.mines_revealed = true;

        if let Some(loss) = loss {
            self.dug_mine = Some(loss);
            self.cells[loss.to_nd_index()].start(Animation::DugMine);
            self.adapt_surrounding(loss);
        }

        let others: Vec<_> = self
            .mine_positions
            .iter()
            .copied()
            .filter(|&mine| Some(mine) != loss)
            .collect();
        let schedule = wavefront(origin, &others, TIME_BETWEEN_CELLS_MS);
        for entry in schedule.entries {
            self.push_timer(entry.delay_ms, TimerAction::ShowMine(entry.coords));
        }
    }

    /// Picks up mine and count changes after the placement was regenerated.
    /// Running animations are left alone.
    pub fn grid_changed(&mut self, engine: &GridEngine) {
        if !self.accepts("grid_changed", (0, 0)) {
            return;
        }
        if engine.size() != self.bounds() {
            log::warn!(
                "Ignoring grid change from {:?} to {:?}",
                self.bounds(),
                engine.size()
            );
            return;
        }

        for ((row, col), cell) in self.cells.indexed_iter_mut() {
            let source = engine.cell_at((row as Coord, col as Coord));
            cell.is_mine = source.is_mine;
            cell.mines_around = source.mines_around;
        }
        self.mine_positions = engine.mine_positions().to_vec();
    }

    /// Repaints everything on the next frame, with every animation at its end.
    pub fn make_full_redraw(&mut self) {
        if !self.accepts("make_full_redraw", (0, 0)) {
            return;
        }
        self.redraw_settled(true);
    }

    /// Queues a clear, then restarts cells in their final frame.
    /// Without `all`, cells that are animating or waiting to start are left alone.
    fn redraw_settled(&mut self, all: bool) {
        self.needs_clear = true;
        let mines_revealed = self.mines_revealed;
        let dug_mine = self.dug_mine;
        let waiting: Vec<Coord2> = self
            .timers
            .iter()
            .filter_map(|timer| match timer.action {
                TimerAction::StartGrow { coords, .. } | TimerAction::ShowMine(coords) => {
                    Some(coords)
                }
                TimerAction::AdaptAround(_) | TimerAction::BatchDone(_) => None,
            })
            .collect();

        for ((row, col), cell) in self.cells.indexed_iter_mut() {
            let coords = (row as Coord, col as Coord);
            if !all && (cell.running != Animation::None || waiting.contains(&coords)) {
                continue;
            }
            if cell.state == CellState::Dug {
                cell.running = Animation::Adapt;
                cell.elapsed_ms = DURATION_NORMAL_MS;
            } else if cell.is_mine && mines_revealed {
                cell.running = if dug_mine == Some(coords) {
                    Animation::DugMine
                } else {
                    Animation::ShowMine
                };
                cell.elapsed_ms = DURATION_MINE_MS;
            } else if cell.state == CellState::Marked {
                cell.running = Animation::Adapt;
                cell.elapsed_ms = DURATION_NORMAL_MS;
            }
        }
    }

    /// Fades out the "tap to begin" banner over `fade_ms`.
    pub fn begin(&mut self, fade_ms: f32) {
        if self.accepts("begin", (0, 0)) {
            self.banner_fade = Some(BannerFade {
                elapsed_ms: 0.0,
                duration_ms: fade_ms,
            });
        }
    }

    /// Advances every animation and timer by `delta_ms` and draws the cells
    /// that changed.
    pub fn frame(&mut self, delta_ms: f32, surface: &mut impl Surface) -> Vec<FrameEvent> {
        let Some(metrics) = self.metrics else {
            log::trace!("Ignoring frame before render");
            return Vec::new();
        };
        let mut events = Vec::new();

        if self.is_first_frame || self.needs_clear {
            surface.draw(DrawCommand::FillSurface {
                paint: Paint::CellsNormal,
            });
        }
        if self.is_first_frame {
            surface.draw(DrawCommand::Banner {
                text: TAP_TO_BEGIN,
                opacity: 1.0,
            });
        }
        self.is_first_frame = false;
        self.needs_clear = false;

        let (rows, cols) = self.bounds();
        for row in 0..rows {
            for col in 0..cols {
                let coords = (row, col);
                let running = self.cells[coords.to_nd_index()].running;
                match running {
                    Animation::None => {}
                    Animation::Grow => self.draw_grow(coords, delta_ms, &metrics, surface),
                    Animation::Adapt => self.draw_adapt(coords, delta_ms, &metrics, surface),
                    Animation::ShowMine => {
                        self.draw_mine(coords, delta_ms, false, &metrics, surface)
                    }
                    Animation::DugMine => {
                        self.draw_mine(coords, delta_ms, true, &metrics, surface)
                    }
                }
            }
        }

        if let Some(mut fade) = self.banner_fade {
            fade.elapsed_ms += delta_ms;
            let opacity = 1.0 - fade.elapsed_ms / fade.duration_ms;
            let opacity = if opacity > 0.0 { opacity } else { 0.0 };
            self.banner_fade = (opacity > 0.0).then_some(fade);

            surface.draw(DrawCommand::FillSurface {
                paint: Paint::CellsNormal,
            });
            surface.draw(DrawCommand::Banner {
                text: TAP_TO_BEGIN,
                opacity,
            });

            // the fade painted over settled cells
            if self.banner_fade.is_none() {
                self.redraw_settled(false);
            }
        }

        self.advance_timers(delta_ms, &mut events);

        if let Some(fps) = self.slow_frames.record(delta_ms) {
            events.push(FrameEvent::LowFrameRate(fps));
        }

        events
    }

    fn bounds(&self) -> Coord2 {
        let (rows, cols) = self.cells.dim();
        (rows as Coord, cols as Coord)
    }

    fn accepts(&self, operation: &str, coords: Coord2) -> bool {
        if self.metrics.is_none() {
            log::trace!("Ignoring {operation} while not rendering");
            return false;
        }
        let (rows, cols) = self.bounds();
        if coords.0 >= rows || coords.1 >= cols {
            log::warn!("Ignoring {operation} outside the grid at {coords:?}");
            return false;
        }
        true
    }

    fn start_grow(&mut self, coords: Coord2, state: CellState) {
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.transition(state);
        cell.start(Animation::Grow);
        cell.end_animation = Some(Continuation::AdaptAround);
    }

    fn push_timer(&mut self, delay_ms: f32, action: TimerAction) {
        self.timers.push(PendingTimer {
            remaining_ms: delay_ms,
            action,
        });
    }

    fn advance_timers(&mut self, delta_ms: f32, events: &mut Vec<FrameEvent>) {
        for timer in &mut self.timers {
            timer.remaining_ms -= delta_ms;
        }

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|timer| timer.remaining_ms <= 0.0);
        self.timers = pending;
        due.sort_by(|a, b| a.remaining_ms.total_cmp(&b.remaining_ms));

        for timer in due {
            match timer.action {
                TimerAction::StartGrow {
                    coords,
                    adapt_delay_ms,
                } => {
                    let cell = &mut self.cells[coords.to_nd_index()];
                    cell.start(Animation::Grow);
                    cell.end_animation = Some(Continuation::AdaptAfter(adapt_delay_ms));
                }
                TimerAction::AdaptAround(coords) => self.adapt_around(coords),
                TimerAction::ShowMine(coords) => {
                    self.cells[coords.to_nd_index()].start(Animation::ShowMine);
                    self.adapt_surrounding(coords);
                    events.push(FrameEvent::MineShown(coords));
                }
                TimerAction::BatchDone(batch) => events.push(FrameEvent::RevealFinished(batch)),
            }
        }
    }

    fn run_continuation(&mut self, coords: Coord2, continuation: Continuation) {
        match continuation {
            Continuation::AdaptAround => self.adapt_around(coords),
            Continuation::AdaptAfter(delay_ms) => {
                self.push_timer(delay_ms, TimerAction::AdaptAround(coords))
            }
        }
    }

    fn adapt_around(&mut self, coords: Coord2) {
        self.adapt_to_cells_around(coords);
        self.adapt_surrounding(coords);
    }

    fn adapt_surrounding(&mut self, coords: Coord2) {
        for neighbor in self.cells.iter_neighbors(coords) {
            self.adapt_to_cells_around(neighbor);
        }
    }

    /// Recomputes which neighbours share this cell's state and starts a merge
    /// when the cell is idle.
    fn adapt_to_cells_around(&mut self, coords: Coord2) {
        let state = self.cells[coords.to_nd_index()].state;
        if state == CellState::None {
            return;
        }

        let bounds = self.bounds();
        let has_same_cell = Direction::ALL.map(|direction| {
            let Some(next) = direction.step(coords, bounds) else {
                return false;
            };
            let next = &self.cells[next.to_nd_index()];
            if state == CellState::Marked && self.mines_revealed && next.is_mine {
                return false;
            }
            next.state == state
        });

        let cell = &mut self.cells[coords.to_nd_index()];
        cell.has_same_cell = has_same_cell;
        if cell.is_idle() {
            cell.start(Animation::Adapt);
        }
    }

    fn draw_grow(
        &mut self,
        coords: Coord2,
        delta_ms: f32,
        metrics: &CellMetrics,
        surface: &mut impl Surface,
    ) {
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.elapsed_ms += delta_ms;

        let t = cell.elapsed_ms / DURATION_NORMAL_MS;
        let mut progress = if cell.is_reverse {
            1.0 - ease_out_quart(t)
        } else {
            ease_out_back(t)
        };
        let mut continuation = None;
        if cell.elapsed_ms >= DURATION_NORMAL_MS {
            progress = if cell.is_reverse { 0.0 } else { 1.0 };
            continuation = cell.finish();
        }

        let marked = cell.draws_marked();
        let mines_around = cell.mines_around;

        surface.draw(DrawCommand::FillRect {
            rect: metrics.cell_rect(coords),
            paint: Paint::CellsNormal,
        });
        let (rect, radius) = metrics.grow_panel(coords, progress);
        surface.draw(DrawCommand::RoundRect {
            rect,
            radii: [radius; 4],
            paint: panel_paint(marked),
        });
        draw_content(coords, marked, mines_around, progress, metrics, surface);

        if let Some(continuation) = continuation {
            self.run_continuation(coords, continuation);
        }
    }

    fn draw_adapt(
        &mut self,
        coords: Coord2,
        delta_ms: f32,
        metrics: &CellMetrics,
        surface: &mut impl Surface,
    ) {
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.elapsed_ms += delta_ms;

        let mut progress = ease_out_quart(cell.elapsed_ms / DURATION_NORMAL_MS);
        let mut continuation = None;
        if cell.elapsed_ms >= ADAPT_SETTLE_MS {
            progress = 1.0;
            continuation = cell.finish();
            cell.is_expanded_to = cell.has_same_cell;
        }

        let marked = cell.draws_marked();
        let mines_around = cell.mines_around;
        let panel =
            metrics.merged_panel(coords, &cell.has_same_cell, &cell.is_expanded_to, progress);

        surface.draw(DrawCommand::FillRect {
            rect: metrics.cell_rect(coords),
            paint: Paint::CellsNormal,
        });
        surface.draw(DrawCommand::RoundRect {
            rect: panel.rect,
            radii: panel.radii,
            paint: panel_paint(marked),
        });
        for (corner, notch) in Corner::ALL.into_iter().zip(panel.notches) {
            let Some(radius) = notch else {
                continue;
            };
            let (x, y) = metrics.corner_point(coords, corner);
            surface.draw(DrawCommand::CornerNotch {
                x,
                y,
                radius,
                corner,
                paint: Paint::CellsNormal,
            });
        }
        draw_content(coords, marked, mines_around, 1.0, metrics, surface);

        if let Some(continuation) = continuation {
            self.run_continuation(coords, continuation);
        }
    }

    fn draw_mine(
        &mut self,
        coords: Coord2,
        delta_ms: f32,
        is_dug_mine: bool,
        metrics: &CellMetrics,
        surface: &mut impl Surface,
    ) {
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.elapsed_ms += delta_ms;

        let mut progress = ease_out_back(cell.elapsed_ms / DURATION_MINE_MS);
        if cell.elapsed_ms >= DURATION_MINE_MS {
            progress = 1.0;
            // an interrupted grow does not get to merge afterwards
            cell.finish();
        }

        let backdrop = match cell.state {
            CellState::None if is_dug_mine => Some(Paint::DugMineBackground),
            CellState::None => None,
            CellState::Marked => Some(Paint::CellsMarked),
            CellState::Dug => return,
        };

        surface.draw(DrawCommand::FillRect {
            rect: metrics.cell_rect(coords),
            paint: Paint::CellsNormal,
        });
        if let Some(paint) = backdrop {
            surface.draw(DrawCommand::RoundRect {
                rect: metrics.shrunken_rect(coords),
                radii: [metrics.border_radius; 4],
                paint,
            });
        }
        let (x, y, size) = metrics.icon_placement(coords, 1.0, progress);
        surface.draw(DrawCommand::Icon {
            icon: Icon::Mine,
            x,
            y,
            size,
            paint: Paint::Background,
        });
    }
}

fn panel_paint(marked: bool) -> Paint {
    if marked {
        Paint::CellsMarked
    } else {
        Paint::Background
    }
}

/// Flag for marked panels, adjacent-mine digit for dug ones.
fn draw_content(
    coords: Coord2,
    marked: bool,
    mines_around: u8,
    scale: f32,
    metrics: &CellMetrics,
    surface: &mut impl Surface,
) {
    if marked {
        let (x, y, size) = metrics.icon_placement(coords, scale, 0.0);
        surface.draw(DrawCommand::Icon {
            icon: Icon::Flag,
            x,
            y,
            size,
            paint: Paint::Background,
        });
    } else if mines_around > 0 {
        let (x, y, font_size) = metrics.digit_placement(coords, scale);
        surface.draw(DrawCommand::Digit {
            digit: mines_around,
            x,
            y,
            font_size,
            paint: Paint::Foreground,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game::{Difficulty, MineLayout};

    fn board(size: Coord2, mines: &[Coord2]) -> GridEngine {
        let layout = MineLayout::from_mine_coords(size, mines).unwrap();
        GridEngine::from_layout(Difficulty::Easy, layout, 0)
    }

    fn rendered(engine: &GridEngine) -> CellAnimationEngine {
        let mut animations = CellAnimationEngine::new(engine);
        animations.render(10.0);
        animations
    }

    fn run(animations: &mut CellAnimationEngine, total_ms: u32) -> Vec<FrameEvent> {
        let mut surface = Vec::new();
        let mut events = Vec::new();
        for _ in 0..total_ms / 16 {
            events.extend(animations.frame(16.0, &mut surface));
        }
        events
    }

    #[test]
    fn operations_before_render_are_ignored() {
        let engine = board((3, 3), &[(2, 2)]);
        let mut animations = CellAnimationEngine::new(&engine);
        let mut surface = Vec::new();

        animations.dig_cell((0, 0));
        assert_eq!(animations.dig_cells((0, 0), &[(0, 0), (0, 1)]), None);
        assert_eq!(animations.cell((0, 0)).state, CellState::None);
        assert!(animations.frame(16.0, &mut surface).is_empty());
        assert!(surface.is_empty());

        animations.render(10.0);
        animations.clean();
        animations.mark_cell((1, 1));
        assert_eq!(animations.cell((1, 1)).state, CellState::None);
    }

    #[test]
    fn first_frame_shows_the_banner_and_begin_fades_it() {
        let engine = board((3, 3), &[(2, 2)]);
        let mut animations = rendered(&engine);
        let mut surface = Vec::new();

        animations.frame(16.0, &mut surface);
        assert_eq!(
            surface,
            [
                DrawCommand::FillSurface {
                    paint: Paint::CellsNormal
                },
                DrawCommand::Banner {
                    text: TAP_TO_BEGIN,
                    opacity: 1.0
                },
            ]
        );

        animations.begin(100.0);
        let mut surface = Vec::new();
        for _ in 0..10 {
            animations.frame(20.0, &mut surface);
        }
        let opacities: Vec<_> = surface
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Banner { opacity, .. } => Some(*opacity),
                _ => None,
            })
            .collect();
        assert_eq!(opacities.len(), 5);
        assert!(opacities.windows(2).all(|pair| pair[0] > pair[1]));
        assert_eq!(opacities.last(), Some(&0.0));
    }

    #[test]
    fn settled_cells_are_repainted_once_the_banner_is_gone() {
        let engine = board((3, 3), &[(2, 2)]);
        let mut animations = rendered(&engine);
        animations.dig_cell((0, 0));
        run(&mut animations, 640);
        assert!(animations.is_idle());

        animations.begin(100.0);
        animations.dig_cells((2, 0), &[(2, 0), (2, 1)]);
        let mut surface = Vec::new();
        for _ in 0..6 {
            animations.frame(20.0, &mut surface);
        }
        assert_eq!(animations.cell((2, 0)).running, Animation::Grow);
        assert_eq!(animations.cell((2, 1)).running, Animation::None);
        for _ in 0..4 {
            animations.frame(20.0, &mut surface);
        }
        assert_eq!(animations.cell((2, 1)).running, Animation::Grow);

        let last_clear = surface
            .iter()
            .rposition(|command| matches!(command, DrawCommand::FillSurface { .. }))
            .unwrap();
        let cell_rect = CellMetrics::new(10.0).cell_rect((0, 0));
        assert!(surface[last_clear..].iter().any(|command| matches!(
            command,
            DrawCommand::FillRect { rect, .. } if *rect == cell_rect
        )));
        assert!(
            !surface[last_clear..]
                .iter()
                .any(|command| matches!(command, DrawCommand::Banner { .. }))
        );
    }

    #[test]
    fn surface_size_follows_the_board() {
        let engine = board((3, 5), &[(2, 2)]);
        assert_eq!(CellAnimationEngine::new(&engine).surface_size(), None);
        assert_eq!(rendered(&engine).surface_size(), Some((50.0, 30.0)));
    }

    #[test]
    fn neighbouring_digs_merge_after_growing() {
        let engine = board((3, 3), &[(2, 2)]);
        let mut animations = rendered(&engine);

        animations.dig_cell((0, 0));
        animations.dig_cell((0, 1));
        assert_eq!(animations.cell((0, 0)).running, Animation::Grow);

        run(&mut animations, 640);

        let left = animations.cell((0, 0));
        assert_eq!(left.state, CellState::Dug);
        assert_eq!(left.running, Animation::None);
        assert!(left.has_same_cell[Direction::Right.index()]);
        assert!(!left.has_same_cell[Direction::Down.index()]);
        assert_eq!(left.is_expanded_to, left.has_same_cell);
        assert!(animations.cell((0, 1)).has_same_cell[Direction::Left.index()]);
    }

    #[test]
    fn flood_grows_as_a_wavefront() {
        let engine = board((1, 6), &[(0, 5)]);
        let mut animations = rendered(&engine);
        let flood = [(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)];

        let batch = animations.dig_cells((0, 0), &flood).unwrap();
        assert!(
            flood
                .iter()
                .all(|&pos| animations.cell(pos).state == CellState::Dug)
        );

        let mut surface = Vec::new();
        let mut grow_started = [None; 5];
        let mut finished_at = None;
        for frame in 1..=150u32 {
            let now = frame * 10;
            let events = animations.frame(10.0, &mut surface);
            if events.contains(&FrameEvent::RevealFinished(batch)) {
                finished_at.get_or_insert(now);
            }
            for (i, &pos) in flood.iter().enumerate() {
                if animations.cell(pos).running == Animation::Grow {
                    grow_started[i].get_or_insert(now);
                }
            }
        }

        let starts: Vec<u32> = grow_started.iter().map(|start| start.unwrap()).collect();
        assert_eq!(starts.len(), 5);
        assert!(starts.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(starts[4] >= 600);

        let finished_at = finished_at.unwrap();
        assert!(finished_at >= 600);
        assert!(finished_at >= *starts.iter().max().unwrap());
    }

    #[test]
    fn batch_of_one_finishes_on_the_next_frame() {
        let engine = board((3, 3), &[(2, 2)]);
        let mut animations = rendered(&engine);

        let batch = animations.dig_cells((1, 1), &[(1, 1)]).unwrap();

        assert_eq!(animations.cell((1, 1)).running, Animation::Grow);
        assert_eq!(
            animations.frame(16.0, &mut Vec::new()),
            [FrameEvent::RevealFinished(batch)]
        );
    }

    #[test]
    fn unmark_plays_the_grow_backwards() {
        let engine = board((3, 3), &[(2, 2)]);
        let mut animations = rendered(&engine);
        animations.mark_cell((1, 1));
        run(&mut animations, 640);

        animations.unmark_cell((1, 1));
        let cell = animations.cell((1, 1));
        assert_eq!(cell.state, CellState::None);
        assert_eq!(cell.prev_state, CellState::Marked);
        assert!(cell.is_reverse);

        let mut surface = Vec::new();
        animations.frame(16.0, &mut surface);
        assert!(surface.iter().any(|command| matches!(
            command,
            DrawCommand::RoundRect {
                paint: Paint::CellsMarked,
                ..
            }
        )));

        run(&mut animations, 400);
        assert_eq!(animations.cell((1, 1)).running, Animation::None);
    }

    #[test]
    fn loss_shows_the_dug_mine_first() {
        let engine = board((3, 3), &[(0, 0), (2, 2)]);
        let mut animations = rendered(&engine);

        animations.reveal_mines(Some((0, 0)));
        assert_eq!(animations.cell((0, 0)).running, Animation::DugMine);

        let mut surface = Vec::new();
        animations.frame(16.0, &mut surface);
        assert!(surface.iter().any(|command| matches!(
            command,
            DrawCommand::RoundRect {
                paint: Paint::DugMineBackground,
                ..
            }
        )));

        let events = run(&mut animations, 1000);
        assert_eq!(events, [FrameEvent::MineShown((2, 2))]);
        assert_eq!(animations.cell((2, 2)).running, Animation::None);
    }

    #[test]
    fn marked_cells_split_from_mines_once_revealed() {
        let engine = board((1, 3), &[(0, 1)]);
        let mut animations = rendered(&engine);
        animations.mark_cell((0, 0));
        animations.mark_cell((0, 1));
        run(&mut animations, 640);
        assert!(animations.cell((0, 0)).has_same_cell[Direction::Right.index()]);

        animations.reveal_mines(None);
        let events = run(&mut animations, 640);

        assert_eq!(events, [FrameEvent::MineShown((0, 1))]);
        assert!(!animations.cell((0, 0)).has_same_cell[Direction::Right.index()]);
    }

    #[test]
    fn full_redraw_settles_every_cell_in_one_frame() {
        let engine = board((3, 3), &[(2, 2)]);
        let mut animations = rendered(&engine);
        animations.dig_cell((0, 0));
        run(&mut animations, 640);

        animations.make_full_redraw();
        assert_eq!(animations.cell((0, 0)).running, Animation::Adapt);

        let mut surface = Vec::new();
        animations.frame(16.0, &mut surface);
        assert_eq!(
            surface.first(),
            Some(&DrawCommand::FillSurface {
                paint: Paint::CellsNormal
            })
        );
        assert_eq!(animations.cell((0, 0)).running, Animation::None);
    }

    #[test]
    fn grid_changes_are_mirrored() {
        let mut engine = game::GridEngine::new_game(Difficulty::Easy, 3);
        let mut animations = rendered(&engine);
        let now = chrono_epoch();

        engine.dig_cell((4, 4), now).unwrap();
        animations.grid_changed(&engine);

        for ((row, col), cell) in engine.cells().indexed_iter() {
            let mirrored = animations.cell((row as Coord, col as Coord));
            assert_eq!(mirrored.is_mine, cell.is_mine);
            assert_eq!(mirrored.mines_around, cell.mines_around);
        }
    }

    #[test]
    fn clean_cancels_pending_timers() {
        let engine = board((1, 6), &[(0, 5)]);
        let mut animations = rendered(&engine);
        animations.dig_cells((0, 0), &[(0, 0), (0, 1), (0, 2)]);
        assert!(animations.has_pending_timers());

        animations.clean();
        animations.render(10.0);
        let events = run(&mut animations, 800);

        assert!(events.is_empty());
        assert!(animations.is_idle());
        assert_eq!(animations.cell((0, 2)).running, Animation::None);
    }

    #[test]
    fn slow_frames_are_reported() {
        let engine = board((3, 3), &[(2, 2)]);
        let mut animations = rendered(&engine);
        let mut surface = Vec::new();

        let mut events = Vec::new();
        for _ in 0..5 {
            events = animations.frame(50.0, &mut surface);
        }

        assert_eq!(events, [FrameEvent::LowFrameRate(20)]);
    }

    fn chrono_epoch() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(0).unwrap()
    }
}
