//! Opaque and transparent copies, solid fills.

use rand::Rng;

use super::{ImageBuffer8, saturating_i32};

impl<S: AsRef<[u8]> + AsMut<[u8]>> ImageBuffer8<S> {
    /// Moves a rectangle within this buffer.
    ///
    /// Source and destination may overlap. Rows are walked top-down when the
    /// destination is above the source and bottom-up otherwise, so no row is
    /// overwritten before it has been read.
    pub fn copy(&mut self, srcx: i32, srcy: i32, srcw: i32, srch: i32, destx: i32, desty: i32) {
        // The source has to exist, the destination has to be inside the clip.
        let Some(src) = self.visible().clip(srcx, srcy, srcw, srch) else {
            return;
        };
        let destx = destx.saturating_add(saturating_i32(src.src_x));
        let desty = desty.saturating_add(saturating_i32(src.src_y));
        let Some(dst) = self
            .clip
            .clip(destx, desty, saturating_i32(src.w), saturating_i32(src.h))
        else {
            return;
        };
        let srcx = src.dest_x + saturating_i32(dst.src_x);
        let srcy = src.dest_y + saturating_i32(dst.src_y);

        let mut move_row = |r: i32| {
            let from = self.index(srcx, srcy + r);
            let to = self.index(dst.dest_x, dst.dest_y + r);
            self.bits.as_mut().copy_within(from..from + dst.w, to);
        };

        let rows = 0..saturating_i32(dst.h);
        if srcy >= dst.dest_y {
            rows.for_each(&mut move_row);
        } else {
            rows.rev().for_each(&mut move_row);
        }
    }

    /// Copies all of `src` into this buffer with its top-left corner at `(destx, desty)`.
    pub fn put<T: AsRef<[u8]>>(&mut self, src: &ImageBuffer8<T>, destx: i32, desty: i32) {
        let origin = src.visible();
        let Some(c) = self.clip.clip(
            destx,
            desty,
            saturating_i32(src.width()),
            saturating_i32(src.height()),
        ) else {
            return;
        };

        let src_x = origin.x + saturating_i32(c.src_x);
        for r in 0..saturating_i32(c.h) {
            let src_y = origin.y + saturating_i32(c.src_y) + r;
            self.row_mut(c.dest_x, c.dest_y + r, c.w)
                .copy_from_slice(src.row(src_x, src_y, c.w));
        }
    }

    /// Sets every visible pixel to `value`. Row padding is left alone.
    pub fn fill(&mut self, value: u8) {
        let (area, width) = (self.visible(), self.width);
        for y in area.y..area.bottom() {
            self.row_mut(area.x, y, width).fill(value);
        }
    }

    /// Fills a `w` x `h` rectangle at `(x, y)`, clipped.
    pub fn fill_rect(&mut self, value: u8, w: i32, h: i32, x: i32, y: i32) {
        let Some(c) = self.clip.clip(x, y, w, h) else {
            return;
        };
        for r in 0..saturating_i32(c.h) {
            self.row_mut(c.dest_x, c.dest_y + r, c.w).fill(value);
        }
    }

    /// Fills `w` pixels of row `y` starting at `x`, clipped.
    pub fn fill_line(&mut self, value: u8, w: i32, x: i32, y: i32) {
        let Some(c) = self.clip.clip_x(x, y, w) else {
            return;
        };
        self.row_mut(c.dest_x, c.dest_y, c.w).fill(value);
    }

    /// Copies a `srcw` x `srch` block of tightly packed pixels to `(x, y)`, clipped.
    pub fn copy_rect(&mut self, src: &[u8], srcw: i32, srch: i32, x: i32, y: i32) {
        if !source_fits("copy_rect", src, srcw, srch) {
            return;
        }
        let Some(c) = self.clip.clip(x, y, srcw, srch) else {
            return;
        };

        let stride = usize::try_from(srcw).unwrap_or_default();
        for (r, line) in src.chunks_exact(stride).skip(c.src_y).take(c.h).enumerate() {
            self.row_mut(c.dest_x, c.dest_y + saturating_i32(r), c.w)
                .copy_from_slice(&line[c.src_x..c.src_x + c.w]);
        }
    }

    /// Copies `w` pixels into row `y` starting at `x`, clipped.
    pub fn copy_line(&mut self, src: &[u8], w: i32, x: i32, y: i32) {
        if !source_fits("copy_line", src, w, 1) {
            return;
        }
        let Some(c) = self.clip.clip_x(x, y, w) else {
            return;
        };
        self.row_mut(c.dest_x, c.dest_y, c.w)
            .copy_from_slice(&src[c.src_x..c.src_x + c.w]);
    }

    /// Like [`copy_rect`](Self::copy_rect), but source pixels equal to 0 are
    /// transparent and leave the destination untouched.
    pub fn copy_rect_transparent(&mut self, src: &[u8], srcw: i32, srch: i32, x: i32, y: i32) {
        if !source_fits("copy_rect_transparent", src, srcw, srch) {
            return;
        }
        let Some(c) = self.clip.clip(x, y, srcw, srch) else {
            return;
        };

        let stride = usize::try_from(srcw).unwrap_or_default();
        for (r, line) in src.chunks_exact(stride).skip(c.src_y).take(c.h).enumerate() {
            let to = self.row_mut(c.dest_x, c.dest_y + saturating_i32(r), c.w);
            for (dst, &pix) in to.iter_mut().zip(&line[c.src_x..c.src_x + c.w]) {
                if pix != 0 {
                    *dst = pix;
                }
            }
        }
    }

    /// Fills the visible area with random static: `black` and `gray` two
    /// times in five each, `white` the rest.
    pub fn fill_static<R: Rng + ?Sized>(&mut self, black: u8, gray: u8, white: u8, rng: &mut R) {
        let (area, width) = (self.visible(), self.width);
        for y in area.y..area.bottom() {
            for pix in self.row_mut(area.x, y, width) {
                *pix = match rng.random_range(0..5) {
                    0 | 1 => black,
                    2 | 3 => gray,
                    _ => white,
                };
            }
        }
    }
}

impl<S: AsRef<[u8]>> ImageBuffer8<S> {
    /// Copies the area of this buffer at `(srcx, srcy)` into `dest`, which
    /// receives a rectangle of its own size. Only pixels inside this buffer's
    /// clip rectangle are read; the rest of `dest` is left as it was.
    pub fn get<D: AsRef<[u8]> + AsMut<[u8]>>(
        &self,
        dest: &mut ImageBuffer8<D>,
        srcx: i32,
        srcy: i32,
    ) {
        let Some(c) = self.clip.clip(
            srcx,
            srcy,
            saturating_i32(dest.width()),
            saturating_i32(dest.height()),
        ) else {
            return;
        };

        let origin = dest.visible();
        let dest_x = origin.x + saturating_i32(c.src_x);
        for r in 0..saturating_i32(c.h) {
            let dest_y = origin.y + saturating_i32(c.src_y) + r;
            dest.row_mut(dest_x, dest_y, c.w)
                .copy_from_slice(self.row(c.dest_x, c.dest_y + r, c.w));
        }
    }
}

/// Checks that `src` holds at least a `w` x `h` block.
pub(super) fn source_fits(op: &'static str, src: &[u8], w: i32, h: i32) -> bool {
    let needed = usize::try_from(w)
        .unwrap_or_default()
        .saturating_mul(usize::try_from(h).unwrap_or_default());
    if src.len() < needed {
        tracing::warn!(op, len = src.len(), needed, "source pixels too short, skipping");
        return false;
    }
    true
}
