use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Simulation state of one grid cell.
///
/// `mines_around` is only meaningful when `is_mine` is false.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub is_mine: bool,
    pub is_dug: bool,
    pub is_marked: bool,
    pub mines_around: u8,
}

impl GridCell {
    pub const fn is_hidden(self) -> bool {
        !self.is_dug && !self.is_marked
    }

    /// Mine or mine-adjacent, the cells a first dig must never land on.
    pub const fn is_unsafe_start(self) -> bool {
        self.is_mine || self.mines_around != 0
    }

    pub fn flags(self) -> CellFlags {
        let mut flags = CellFlags::empty();
        flags.set(CellFlags::MINE, self.is_mine);
        flags.set(CellFlags::DUG, self.is_dug);
        flags.set(CellFlags::MARKED, self.is_marked);
        flags
    }
}

bitflags! {
    /// Packed cell state used by the saved-game encoding.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CellFlags: u8 {
        const MINE   = 0b100;
        const DUG    = 0b010;
        const MARKED = 0b001;
    }
}
