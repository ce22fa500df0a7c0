use tilesweep_core::Coord2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScheduleEntry {
    pub coords: Coord2,
    pub distance: f32,
    pub delay_ms: f32,
}

/// Per-cell start delays of a radial reveal, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
    /// Delay of the farthest cell.
    pub finish_delay_ms: f32,
}

/// Euclidean distance between two cells, in cells.
pub fn distance(a: Coord2, b: Coord2) -> f32 {
    let dr = f32::from(a.0) - f32::from(b.0);
    let dc = f32::from(a.1) - f32::from(b.1);
    (dr * dr + dc * dc).sqrt()
}

/// Delays every cell by its distance from `origin` times `step_ms`.
pub fn wavefront(origin: Coord2, cells: &[Coord2], step_ms: f32) -> Schedule {
    let entries: Vec<_> = cells
        .iter()
        .map(|&coords| {
            let distance = distance(origin, coords);
            ScheduleEntry {
                coords,
                distance,
                delay_ms: distance * step_ms,
            }
        })
        .collect();

    let max_distance = entries
        .iter()
        .map(|entry| entry.distance)
        .fold(0.0, f32::max);

    Schedule {
        entries,
        finish_delay_ms: max_distance * step_ms,
    }
}
