use crate::*;
pub use random::*;

mod random;

pub trait MineGenerator {
    /// Places `config.mines` unique mines, keeping the 3x3 block around `safe_zone` empty.
    fn generate(&mut self, config: GameConfig, safe_zone: Option<Coord2>) -> MineLayout;
}
