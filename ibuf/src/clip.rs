//! Clip resolution.
//!
//! Every drawing operation describes the area it wants to touch as a paint
//! position plus a size. Before any byte is written the request is intersected
//! with the buffer's clip rectangle:
//!
//! ```text
//!        dest_x
//!          ├── src_x ──┤
//!          ┌───────────┬──────────────────┬─────┐
//!          │  skipped  │     painted      │ cut │   request
//!          └───────────┼──────────────────┼─────┘
//!                      │                  │
//!              ┌───────┴──────────────────┴──────────┐
//!              │            clip rectangle           │
//!              └─────────────────────────────────────┘
//! ```
//!
//! Whatever is cut from the left/top is reported back as a source shift, so
//! callers that read from a source image (or an RLE stream) skip the same
//! number of source pixels and stay aligned.

/// An axis-aligned rectangle in buffer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// The visible part of a request, as resolved by [`ClipRect::clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clipped {
    /// Columns dropped from the left of the source.
    pub src_x: usize,
    /// Rows dropped from the top of the source.
    pub src_y: usize,
    pub dest_x: i32,
    pub dest_y: i32,
    pub w: usize,
    pub h: usize,
}

impl ClipRect {
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// First column past the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// First row past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && self.contains_row(y)
    }

    #[must_use]
    pub const fn contains_row(&self, y: i32) -> bool {
        y >= self.y && y < self.bottom()
    }

    /// Overlap of two rectangles. Disjoint rectangles give an empty one.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let w = (self.right().min(other.right()) - x).max(0);
        let h = (self.bottom().min(other.bottom()) - y).max(0);
        Self { x, y, w, h }
    }

    /// Resolves a `w` x `h` request painted at `(dest_x, dest_y)`.
    ///
    /// Returns `None` when nothing of the request is inside the rectangle,
    /// including when `w` or `h` is not positive.
    #[must_use]
    pub fn clip(&self, dest_x: i32, dest_y: i32, w: i32, h: i32) -> Option<Clipped> {
        let (src_x, dest_x, w) = clip_axis(dest_x, w, self.x, self.w)?;
        let (src_y, dest_y, h) = clip_axis(dest_y, h, self.y, self.h)?;
        Some(Clipped {
            src_x,
            src_y,
            dest_x,
            dest_y,
            w,
            h,
        })
    }

    /// Single-row variant of [`clip`](Self::clip): horizontal clipping plus an
    /// in/out test on the row. The result always has `h == 1` and `src_y == 0`.
    #[must_use]
    pub fn clip_x(&self, dest_x: i32, dest_y: i32, w: i32) -> Option<Clipped> {
        if !self.contains_row(dest_y) {
            return None;
        }
        let (src_x, dest_x, w) = clip_axis(dest_x, w, self.x, self.w)?;
        Some(Clipped {
            src_x,
            src_y: 0,
            dest_x,
            dest_y,
            w,
            h: 1,
        })
    }
}

/// Clips the span `[dest, dest + len)` against `[start, start + extent)`.
/// Returns `(skipped, new_dest, new_len)`.
fn clip_axis(dest: i32, len: i32, start: i32, extent: i32) -> Option<(usize, i32, usize)> {
    let dest = i64::from(dest);
    let lo = dest.max(i64::from(start));
    let hi = (dest + i64::from(len)).min(i64::from(start) + i64::from(extent));
    if hi <= lo {
        return None;
    }

    let skipped = usize::try_from(lo - dest).ok()?;
    let len = usize::try_from(hi - lo).ok()?;
    Some((skipped, i32::try_from(lo).ok()?, len))
}
