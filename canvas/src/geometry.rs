use tilesweep_core::{Coord2, Direction};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Pixel sizes derived from the cell size chosen at render time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellMetrics {
    pub size: f32,
    pub size_shrunken: f32,
    pub side_normal: f32,
    pub side_shrunken: f32,
    pub side_diff: f32,
    pub border_radius: f32,
    pub icon_size: f32,
    pub digit_size: f32,
}

/// Shape of a cell panel while it merges with its neighbours.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MergedPanel {
    pub rect: Rect,
    /// Follows [`Corner::ALL`].
    pub radii: [f32; 4],
    /// Concave corner radii, `None` where nothing is painted.
    pub notches: [Option<f32>; 4],
}

impl Corner {
    /// Edge directions meeting at this corner.
    pub const fn edges(self) -> (Direction, Direction) {
        use Direction::*;
        match self {
            Corner::TopLeft => (Left, Up),
            Corner::TopRight => (Up, Right),
            Corner::BottomRight => (Right, Down),
            Corner::BottomLeft => (Down, Left),
        }
    }

    pub const fn diagonal(self) -> Direction {
        use Direction::*;
        match self {
            Corner::TopLeft => UpLeft,
            Corner::TopRight => UpRight,
            Corner::BottomRight => DownRight,
            Corner::BottomLeft => DownLeft,
        }
    }
}

impl CellMetrics {
    pub fn new(size: f32) -> Self {
        let side_normal = size * 0.5;
        let side_shrunken = side_normal * SHRUNKEN_FACTOR;
        Self {
            size,
            size_shrunken: size * SHRUNKEN_FACTOR,
            side_normal,
            side_shrunken,
            side_diff: side_normal - side_shrunken,
            border_radius: size * BORDER_RADIUS_FACTOR,
            icon_size: size * ICON_FACTOR,
            digit_size: size * DIGIT_FACTOR,
        }
    }

    /// Top-left pixel of a cell.
    pub fn origin(&self, (row, col): Coord2) -> (f32, f32) {
        (f32::from(col) * self.size, f32::from(row) * self.size)
    }

    pub fn cell_rect(&self, coords: Coord2) -> Rect {
        let (x, y) = self.origin(coords);
        Rect {
            x,
            y,
            width: self.size,
            height: self.size,
        }
    }

    /// Resting panel of a cell with no merged neighbours.
    pub fn shrunken_rect(&self, coords: Coord2) -> Rect {
        let (x, y) = self.origin(coords);
        Rect {
            x: x + self.side_diff,
            y: y + self.side_diff,
            width: self.size_shrunken,
            height: self.size_shrunken,
        }
    }

    pub fn corner_point(&self, coords: Coord2, corner: Corner) -> (f32, f32) {
        let (x, y) = self.origin(coords);
        match corner {
            Corner::TopLeft => (x, y),
            Corner::TopRight => (x + self.size, y),
            Corner::BottomRight => (x + self.size, y + self.size),
            Corner::BottomLeft => (x, y + self.size),
        }
    }

    /// Panel growing from the cell centre, returned with its uniform radius.
    pub fn grow_panel(&self, coords: Coord2, progress: f32) -> (Rect, f32) {
        let (x, y) = self.origin(coords);
        let offset = self.side_normal - progress * self.side_shrunken;
        let side = progress * self.size_shrunken;
        let rect = Rect {
            x: x + offset,
            y: y + offset,
            width: side,
            height: side,
        };
        (rect, progress * self.border_radius)
    }

    pub fn merged_panel(
        &self,
        coords: Coord2,
        has_same: &[bool; 8],
        expanded: &[bool; 8],
        progress: f32,
    ) -> MergedPanel {
        let inset = |direction: Direction| {
            let i = direction.index();
            match (has_same[i], expanded[i]) {
                (true, true) => 0.0,
                (true, false) => self.side_diff * (1.0 - progress),
                (false, true) => self.side_diff * progress,
                (false, false) => self.side_diff,
            }
        };

        let (x, y) = self.origin(coords);
        let (up, right, down, left) = (
            inset(Direction::Up),
            inset(Direction::Right),
            inset(Direction::Down),
            inset(Direction::Left),
        );
        let rect = Rect {
            x: x + left,
            y: y + up,
            width: self.size - left - right,
            height: self.size - up - down,
        };

        let radius = self.border_radius;
        let radii = Corner::ALL.map(|corner| {
            let (a, b) = corner.edges();
            let shared = has_same[a.index()] || has_same[b.index()];
            let was_expanded = expanded[a.index()] || expanded[b.index()];
            match (shared, was_expanded) {
                (false, false) => radius,
                (false, true) => progress * radius,
                (true, false) => radius * (1.0 - progress),
                (true, true) => 0.0,
            }
        });

        let notches = Corner::ALL.map(|corner| {
            let (a, b) = corner.edges();
            let d = corner.diagonal();
            let edges_shared = has_same[a.index()] && has_same[b.index()];
            if edges_shared && has_same[d.index()] {
                let settled = expanded[a.index()] && expanded[b.index()] && expanded[d.index()];
                (!settled).then_some(radius * (1.0 - progress))
            } else if edges_shared {
                Some(radius)
            } else {
                None
            }
        });

        MergedPanel {
            rect,
            radii,
            notches,
        }
    }

    /// Top-left corner and side of a centred icon at `scale`, displaced by a
    /// horizontal then vertical wobble while `shake` runs from 0 to 1.
    pub fn icon_placement(&self, coords: Coord2, scale: f32, shake: f32) -> (f32, f32, f32) {
        const SHAKE_FREQUENCY: f32 = 12.6;

        let (mut shake_x, mut shake_y) = (0.0, 0.0);
        if shake != 0.0 {
            let offset = self.size * 0.1 * (shake * SHAKE_FREQUENCY).sin();
            if shake < 0.5 {
                shake_x = offset;
            } else {
                shake_y = offset;
            }
        }

        let side = self.icon_size * scale;
        let margin = (self.size - side) / 2.0;
        let (x, y) = self.origin(coords);
        (x + shake_x + margin, y + shake_y + margin, side)
    }

    /// Baseline origin and font size of the adjacent-mine digit.
    pub fn digit_placement(&self, coords: Coord2, scale: f32) -> (f32, f32, f32) {
        let font_size = self.digit_size * scale;
        let (x, y) = self.origin(coords);
        (
            x + self.size / 2.0 - font_size / 4.0,
            y + self.size / 2.0 + font_size / 3.0,
            font_size,
        )
    }
}
