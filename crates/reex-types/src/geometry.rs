//! Integer screen-space rectangles.

/// An axis-aligned rectangle in screen pixels.
///
/// Width and height are signed so that chrome arithmetic on tiny windows
/// (`W - 40` and the like) cannot wrap; [`Rect::size_u32`] clamps them
/// for backend calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Shrink by `d` pixels on every side.
    pub const fn inset(&self, d: i32) -> Self {
        Self {
            x: self.x + d,
            y: self.y + d,
            w: self.w - 2 * d,
            h: self.h - 2 * d,
        }
    }

    /// Width and height clamped to zero, for backend calls.
    pub fn size_u32(&self) -> (u32, u32) {
        (self.w.max(0) as u32, self.h.max(0) as u32)
    }
}
