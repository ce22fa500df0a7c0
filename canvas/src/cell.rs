use tilesweep_core::{Coord2, Direction, GridCell};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CellState {
    #[default]
    None,
    Dug,
    Marked,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Animation {
    #[default]
    None,
    Grow,
    Adapt,
    ShowMine,
    DugMine,
}

/// Work left for the frame driver once the running animation completes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Continuation {
    /// Recompute the merge shape of the cell and its neighbours.
    AdaptAround,
    /// Same as [`Continuation::AdaptAround`], after a delay in milliseconds.
    AdaptAfter(f32),
}

/// Visual mirror of one grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasCell {
    pub is_mine: bool,
    pub mines_around: u8,
    pub state: CellState,
    pub prev_state: CellState,
    pub running: Animation,
    pub elapsed_ms: f32,
    pub is_reverse: bool,
    /// Indexed by [`Direction::index`].
    pub has_same_cell: [bool; 8],
    pub is_expanded_to: [bool; 8],
    pub end_animation: Option<Continuation>,
}

impl CanvasCell {
    pub fn new(coords: Coord2, bounds: Coord2, cell: GridCell) -> Self {
        Self {
            is_mine: cell.is_mine,
            mines_around: cell.mines_around,
            state: CellState::None,
            prev_state: CellState::None,
            running: Animation::None,
            elapsed_ms: 0.0,
            is_reverse: false,
            has_same_cell: Direction::ALL.map(|direction| direction.step(coords, bounds).is_some()),
            is_expanded_to: [false; 8],
            end_animation: None,
        }
    }

    pub fn start(&mut self, animation: Animation) {
        self.running = animation;
        self.elapsed_ms = 0.0;
        self.is_reverse = false;
    }

    /// Moves to `state`, remembering the one it leaves.
    pub fn transition(&mut self, state: CellState) {
        self.prev_state = self.state;
        self.state = state;
    }

    /// Stops the running animation, returning its continuation.
    pub fn finish(&mut self) -> Option<Continuation> {
        self.running = Animation::None;
        self.elapsed_ms = 0.0;
        self.end_animation.take()
    }

    pub fn is_idle(&self) -> bool {
        self.running == Animation::None
    }

    /// Marked panels stay visible while a cell is being unmarked.
    pub fn draws_marked(&self) -> bool {
        self.state == CellState::Marked
            || (self.state == CellState::None && self.prev_state == CellState::Marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_cells_start_without_outside_neighbors() {
        let cell = CanvasCell::new((0, 2), (3, 3), GridCell::default());

        assert_eq!(
            cell.has_same_cell,
            [false, false, false, false, true, true, true, false]
        );
        assert_eq!(cell.is_expanded_to, [false; 8]);
    }

    #[test]
    fn unmarking_keeps_the_marked_paint() {
        let mut cell = CanvasCell::new((1, 1), (3, 3), GridCell::default());
        assert_eq!(cell.has_same_cell, [true; 8]);

        cell.transition(CellState::Marked);
        cell.transition(CellState::None);

        assert_eq!(cell.prev_state, CellState::Marked);
        assert!(cell.draws_marked());
    }
}
