use crate::Rect;

/// Palette slots, resolved to colours by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Paint {
    CellsNormal,
    CellsMarked,
    Background,
    Foreground,
    DugMineBackground,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Icon {
    Flag,
    Mine,
}

/// Cell corners, in rounded-rectangle radius order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillSurface {
        paint: Paint,
    },
    FillRect {
        rect: Rect,
        paint: Paint,
    },
    /// `radii` follow [`Corner::ALL`].
    RoundRect {
        rect: Rect,
        radii: [f32; 4],
        paint: Paint,
    },
    /// Quarter disc centred on a cell corner, covering the inside of the cell.
    CornerNotch {
        x: f32,
        y: f32,
        radius: f32,
        corner: Corner,
        paint: Paint,
    },
    /// Square icon with its top-left corner at `(x, y)`.
    Icon {
        icon: Icon,
        x: f32,
        y: f32,
        size: f32,
        paint: Paint,
    },
    /// Text baseline origin at `(x, y)`.
    Digit {
        digit: u8,
        x: f32,
        y: f32,
        font_size: f32,
        paint: Paint,
    },
    Banner {
        text: &'static str,
        opacity: f32,
    },
}

/// Drawing target. Hosts translate commands into their own canvas calls.
pub trait Surface {
    fn draw(&mut self, command: DrawCommand);
}

impl Surface for Vec<DrawCommand> {
    fn draw(&mut self, command: DrawCommand) {
        self.push(command);
    }
}
