use alloc::vec::Vec;
use rand::prelude::*;

use super::*;

/// Uniform placement over every cell outside the optional safe zone.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&mut self, config: GameConfig, safe_zone: Option<Coord2>) -> MineLayout {
        let (rows, cols) = config.size;
        let mut taken: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut free_cells = config.total_cells();

        if let Some(center) = safe_zone {
            for pos in core::iter::once(center).chain(NeighborIter::new(center, config.size)) {
                taken[pos.to_nd_index()] = true;
                free_cells -= 1;
            }
        }

        if config.mines > free_cells {
            log::warn!(
                "Cannot fit {} mines outside the safe zone, placing {}",
                config.mines,
                free_cells
            );
        }

        let mut positions = Vec::with_capacity(config.mines.into());
        {
            let cells = taken.as_slice_mut().expect("layout should be standard");
            while positions.len() < usize::from(config.mines) && free_cells > 0 {
                // pick the n-th free cell, skipping the ones already taken
                let mut place = usize::from(self.rng.random_range(0..free_cells));
                for (i, cell) in cells.iter_mut().enumerate() {
                    if *cell {
                        place += 1;
                    }
                    if i == place {
                        *cell = true;
                        free_cells -= 1;
                        positions.push(((i / usize::from(cols)) as Coord, (i % usize::from(cols)) as Coord));
                        break;
                    }
                }
            }
        }

        log::debug!(
            "Placed {} mines on a {}x{} grid, safe zone: {:?}",
            positions.len(),
            rows,
            cols,
            safe_zone
        );

        MineLayout::from_mine_coords(config.size, &positions)
            .expect("generated positions are within the grid")
    }
}
