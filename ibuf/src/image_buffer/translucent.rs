//! Table driven blending.
//!
//! A translucent palette index `c` in `first..=last` does not replace the
//! destination pixel `d`, it replaces it with `xforms[c - first][d]`.

use std::ops::RangeInclusive;

use super::blit::source_fits;
use super::{ImageBuffer8, saturating_i32};
use crate::table::XformTable;

impl<S: AsRef<[u8]> + AsMut<[u8]>> ImageBuffer8<S> {
    /// Copies `w` pixels into row `y` at `x`. Source pixels inside
    /// `translucent` are blended through their table, the rest are written
    /// as they are.
    ///
    /// `xforms` holds one table per index of `translucent`, in order.
    pub fn copy_line_translucent(
        &mut self,
        src: &[u8],
        w: i32,
        x: i32,
        y: i32,
        translucent: RangeInclusive<u8>,
        xforms: &[XformTable],
    ) {
        if !source_fits("copy_line_translucent", src, w, 1) {
            return;
        }
        let first = *translucent.start();
        let levels = translucent.clone().count();
        if xforms.len() < levels {
            tracing::warn!(
                levels,
                tables = xforms.len(),
                "fewer translucency tables than translucent indices, skipping"
            );
            return;
        }
        let Some(c) = self.clip.clip_x(x, y, w) else {
            return;
        };

        let line = &src[c.src_x..c.src_x + c.w];
        for (dst, &pix) in self.row_mut(c.dest_x, c.dest_y, c.w).iter_mut().zip(line) {
            *dst = if translucent.contains(&pix) {
                xforms[usize::from(pix - first)][*dst]
            } else {
                pix
            };
        }
    }

    /// Passes `w` pixels of row `y` starting at `x` through `xform`.
    pub fn fill_line_translucent(&mut self, w: i32, x: i32, y: i32, xform: &XformTable) {
        let Some(c) = self.clip.clip_x(x, y, w) else {
            return;
        };
        blend(self.row_mut(c.dest_x, c.dest_y, c.w), xform);
    }

    /// Passes a `w` x `h` rectangle at `(x, y)` through `xform`.
    pub fn fill_rect_translucent(&mut self, w: i32, h: i32, x: i32, y: i32, xform: &XformTable) {
        let Some(c) = self.clip.clip(x, y, w, h) else {
            return;
        };
        for r in 0..saturating_i32(c.h) {
            blend(self.row_mut(c.dest_x, c.dest_y + r, c.w), xform);
        }
    }
}

fn blend(row: &mut [u8], xform: &XformTable) {
    for pix in row {
        *pix = xform[*pix];
    }
}
