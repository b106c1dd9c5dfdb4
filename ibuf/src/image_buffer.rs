//! 8-bit indexed image buffer.
//!
//! A buffer is a window onto a flat byte array, one palette index per pixel.
//! Rows are `line_width` bytes apart, which may be more than the visible
//! `width`. The offsets move the coordinate origin so that a buffer can
//! address a guard band around the visible area:
//!
//! ```text
//!  storage index 0
//!  ▼
//!  ┌──────────────────────────────┬──────┐ ◄ row (-offset_y)
//!  │ (-offset_x, -offset_y)       │      │
//!  │          ┌ (0, 0)            │ pad  │
//!  │          ▼                   │      │
//!  │          ·                   │      │
//!  └──────────────────────────────┴──────┘
//!  ◄────────── width ────────────►
//!  ◄────────────── line_width ──────────►
//! ```
//!
//! Pixel `(x, y)` lives at `(y + offset_y) * line_width + (x + offset_x)`.
//! The clip rectangle can never leave the visible area, so every operation
//! that clips first only ever touches bytes inside the storage.
//!
//! The drawing operations are split across submodules: [`blit`] (copies and
//! solid fills), [`translucent`] (table blends) and [`paint_rle`] (sprites).

mod blit;
mod paint_rle;
mod translucent;

use crate::clip::ClipRect;
use crate::error::BufferError;

/// Geometry of a buffer over caller supplied storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    /// Bytes from one row to the next.
    pub line_width: usize,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Layout {
    /// Tightly packed rows, no offset.
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            line_width: width,
            offset_x: 0,
            offset_y: 0,
        }
    }

    #[must_use]
    pub const fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }

    #[must_use]
    pub const fn with_offset(mut self, offset_x: i32, offset_y: i32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }
}

/// An 8-bit-per-pixel image buffer with a clip rectangle.
///
/// `S` is the backing storage: anything that derefs to a byte slice, owned
/// (`Vec<u8>`, `Box<[u8]>`) or borrowed (`&mut [u8]`).
#[derive(Debug, Clone)]
pub struct ImageBuffer8<S = Vec<u8>> {
    bits: S,
    width: usize,
    height: usize,
    line_width: usize,
    offset_x: i32,
    offset_y: i32,
    clip: ClipRect,
}

impl ImageBuffer8 {
    /// Allocates a zeroed `width` x `height` buffer.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            bits: vec![0; width * height],
            width,
            height,
            line_width: width,
            offset_x: 0,
            offset_y: 0,
            clip: visible_area(&Layout::new(width, height)),
        }
    }
}

impl<S: AsRef<[u8]>> ImageBuffer8<S> {
    /// Wraps existing storage.
    ///
    /// # Errors
    ///
    /// Fails when rows would overlap, when `storage` is shorter than
    /// `line_width * height`, or when an offset is `i32::MIN`.
    pub fn with_layout(storage: S, layout: Layout) -> Result<Self, BufferError> {
        if layout.line_width < layout.width {
            return Err(BufferError::StrideTooSmall {
                line_width: layout.line_width,
                width: layout.width,
            });
        }

        let needed = layout.line_width.saturating_mul(layout.height);
        let len = storage.as_ref().len();
        if len < needed {
            return Err(BufferError::StorageTooSmall { len, needed });
        }

        if layout.offset_x == i32::MIN || layout.offset_y == i32::MIN {
            return Err(BufferError::OffsetOutOfRange {
                offset_x: layout.offset_x,
                offset_y: layout.offset_y,
            });
        }

        Ok(Self {
            bits: storage,
            width: layout.width,
            height: layout.height,
            line_width: layout.line_width,
            offset_x: layout.offset_x,
            offset_y: layout.offset_y,
            clip: visible_area(&layout),
        })
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub const fn line_width(&self) -> usize {
        self.line_width
    }

    #[must_use]
    pub const fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    #[must_use]
    pub const fn layout(&self) -> Layout {
        Layout {
            width: self.width,
            height: self.height,
            line_width: self.line_width,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        }
    }

    /// Current clip rectangle.
    #[must_use]
    pub const fn clip(&self) -> ClipRect {
        self.clip
    }

    /// The whole addressable area, in buffer coordinates.
    #[must_use]
    pub fn visible(&self) -> ClipRect {
        visible_area(&self.layout())
    }

    /// Restricts drawing to `(x, y, w, h)`, intersected with the visible area.
    pub fn set_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.clip = ClipRect::new(x, y, w, h).intersect(&self.visible());
    }

    /// Allows drawing over the whole visible area again.
    pub fn clear_clip(&mut self) {
        self.clip = self.visible();
    }

    /// Raw storage, padding included.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        self.bits.as_ref()
    }

    #[must_use]
    pub fn into_storage(self) -> S {
        self.bits
    }

    /// Reads one pixel of the visible area.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.visible()
            .contains(x, y)
            .then(|| self.bits.as_ref()[self.index(x, y)])
    }

    /// Storage index of `(x, y)`. The point must be inside the visible area.
    #[allow(clippy::cast_sign_loss)]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn index(&self, x: i32, y: i32) -> usize {
        let col = i64::from(x) + i64::from(self.offset_x);
        let row = i64::from(y) + i64::from(self.offset_y);
        debug_assert!(col >= 0 && (col as usize) < self.width.max(1));
        debug_assert!(row >= 0 && (row as usize) < self.height.max(1));
        row as usize * self.line_width + col as usize
    }

    /// `len` pixels of row `y` starting at `x`, all inside the visible area.
    pub(crate) fn row(&self, x: i32, y: i32, len: usize) -> &[u8] {
        let start = self.index(x, y);
        &self.bits.as_ref()[start..start + len]
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> ImageBuffer8<S> {
    #[must_use]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        self.bits.as_mut()
    }

    /// Writes one pixel if it is inside the clip rectangle.
    pub fn put_pixel(&mut self, x: i32, y: i32, value: u8) {
        if self.clip.contains(x, y) {
            let i = self.index(x, y);
            self.bits.as_mut()[i] = value;
        }
    }

    pub(crate) fn row_mut(&mut self, x: i32, y: i32, len: usize) -> &mut [u8] {
        let start = self.index(x, y);
        &mut self.bits.as_mut()[start..start + len]
    }
}

fn visible_area(layout: &Layout) -> ClipRect {
    ClipRect::new(
        -layout.offset_x,
        -layout.offset_y,
        saturating_i32(layout.width),
        saturating_i32(layout.height),
    )
}

/// Sizes in this crate are `usize`, coordinates `i32`.
pub(crate) fn saturating_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_buffer_is_zeroed_and_unclipped() {
        let buf = ImageBuffer8::new(4, 3);
        assert_eq!(buf.pixels(), &[0; 12]);
        assert_eq!(buf.clip(), ClipRect::new(0, 0, 4, 3));
        assert_eq!(buf.line_width(), 4);
    }

    #[test]
    fn layout_is_validated() {
        assert_eq!(
            ImageBuffer8::with_layout(vec![0_u8; 32], Layout::new(8, 4).with_line_width(6)).err(),
            Some(BufferError::StrideTooSmall {
                line_width: 6,
                width: 8
            })
        );
        assert_eq!(
            ImageBuffer8::with_layout(vec![0_u8; 31], Layout::new(8, 4)).err(),
            Some(BufferError::StorageTooSmall { len: 31, needed: 32 })
        );
        assert!(
            ImageBuffer8::with_layout(vec![0_u8; 32], Layout::new(8, 4).with_offset(i32::MIN, 0))
                .is_err()
        );
        assert!(ImageBuffer8::with_layout(vec![0_u8; 40], Layout::new(8, 4).with_line_width(10)).is_ok());
    }

    #[test]
    fn offsets_move_the_origin() {
        let mut storage = vec![0_u8; 6 * 4];
        storage[6 + 2] = 0xAB;
        let buf =
            ImageBuffer8::with_layout(storage, Layout::new(5, 4).with_line_width(6).with_offset(2, 1))
                .unwrap();

        assert_eq!(buf.visible(), ClipRect::new(-2, -1, 5, 4));
        assert_eq!(buf.pixel(0, 0), Some(0xAB));
        assert_eq!(buf.pixel(-2, -1), Some(0));
        assert_eq!(buf.pixel(3, 0), None);
        assert_eq!(buf.pixel(0, 3), None);
    }

    #[test]
    fn clip_is_confined_to_visible_area() {
        let mut buf = ImageBuffer8::new(10, 10);
        buf.set_clip(-5, 2, 8, 100);
        assert_eq!(buf.clip(), ClipRect::new(0, 2, 3, 8));

        buf.clear_clip();
        assert_eq!(buf.clip(), ClipRect::new(0, 0, 10, 10));
    }

    #[test]
    fn put_pixel_respects_clip() {
        let mut buf = ImageBuffer8::new(4, 4);
        buf.set_clip(1, 1, 2, 2);
        buf.put_pixel(0, 0, 7);
        buf.put_pixel(1, 1, 7);
        buf.put_pixel(3, 3, 7);
        assert_eq!(buf.pixel(0, 0), Some(0));
        assert_eq!(buf.pixel(1, 1), Some(7));
        assert_eq!(buf.pixel(3, 3), Some(0));
    }

    #[test]
    fn writes_stay_inside_padded_offset_storage() {
        const PAD: u8 = 0xEE;
        const STRIDE: usize = 9;
        let layout = Layout::new(6, 4).with_line_width(STRIDE).with_offset(2, 1);
        let mut buf = ImageBuffer8::with_layout(vec![PAD; STRIDE * 4], layout).unwrap();

        let assert_padding = |buf: &ImageBuffer8| {
            for row in buf.pixels().chunks(STRIDE) {
                assert_eq!(&row[6..], &[PAD; 3]);
            }
        };
        let assert_visible = |buf: &ImageBuffer8, expected: &dyn Fn(i32, i32) -> u8| {
            for y in -1..3 {
                for x in -2..4 {
                    assert_eq!(buf.pixel(x, y), Some(expected(x, y)), "pixel ({x}, {y})");
                }
            }
        };

        // 10x10 sprite, every pixel distinct, hot spot in its middle.
        let sprite: Vec<u8> = (1..=100).collect();
        let stream = crate::rle::encode(&sprite, 10, 10, 5, 5, 0).unwrap();
        assert_eq!(buf.paint_rle(1, 1, &stream), Ok(stream.len()));
        assert_padding(&buf);
        assert_visible(&buf, &|x, y| u8::try_from((y + 4) * 10 + (x + 4) + 1).unwrap());

        buf.fill_rect(3, 100, 100, -50, -50);
        assert_padding(&buf);
        assert_visible(&buf, &|_, _| 3);

        buf.copy_rect_transparent(&[1; 400], 20, 20, -10, -10);
        assert_padding(&buf);
        assert_visible(&buf, &|_, _| 1);
    }

    #[test]
    fn borrowed_storage() {
        let mut storage = [0_u8; 9];
        {
            let mut buf = ImageBuffer8::with_layout(&mut storage[..], Layout::new(3, 3)).unwrap();
            buf.put_pixel(2, 2, 5);
        }
        assert_eq!(storage[8], 5);
    }
}
