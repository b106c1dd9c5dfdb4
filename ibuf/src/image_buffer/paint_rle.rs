use super::{ImageBuffer8, saturating_i32};
use crate::error::RleError;
use crate::rle::{Pixels, Segments};
use crate::table::RemapTable;

impl<S: AsRef<[u8]> + AsMut<[u8]>> ImageBuffer8<S> {
    /// Paints an RLE sprite with its origin at `(xoff, yoff)`.
    ///
    /// Returns the number of stream bytes read, terminator included. That
    /// count does not depend on the paint position or the clip rectangle.
    ///
    /// # Errors
    ///
    /// Stops at the first malformed record. Scanlines before it stay painted.
    pub fn paint_rle(&mut self, xoff: i32, yoff: i32, stream: &[u8]) -> Result<usize, RleError> {
        self.paint_segments(xoff, yoff, stream, |pix| pix)
    }

    /// Like [`paint_rle`](Self::paint_rle), writing `remap[pix]` for every pixel.
    ///
    /// # Errors
    ///
    /// Same as [`paint_rle`](Self::paint_rle).
    pub fn paint_rle_remapped(
        &mut self,
        xoff: i32,
        yoff: i32,
        stream: &[u8],
        remap: &RemapTable,
    ) -> Result<usize, RleError> {
        self.paint_segments(xoff, yoff, stream, |pix| remap[pix])
    }

    fn paint_segments<F>(
        &mut self,
        xoff: i32,
        yoff: i32,
        stream: &[u8],
        map: F,
    ) -> Result<usize, RleError>
    where
        F: Fn(u8) -> u8,
    {
        let mut segments = Segments::new(stream);
        for segment in &mut segments {
            let segment = segment.inspect_err(|e| {
                tracing::debug!(xoff, yoff, error = %e, "rle paint stopped");
            })?;

            let x = xoff.saturating_add(segment.x);
            let y = yoff.saturating_add(segment.y);
            let Some(c) = self
                .clip
                .clip_x(x, y, saturating_i32(segment.pixels.len()))
            else {
                continue;
            };

            let row = self.row_mut(c.dest_x, c.dest_y, c.w);
            match segment.pixels {
                Pixels::Literal(pixels) => {
                    for (dst, &pix) in row.iter_mut().zip(&pixels[c.src_x..]) {
                        *dst = map(pix);
                    }
                }
                Pixels::Repeat { color, .. } => row.fill(map(color)),
            }
        }
        Ok(segments.consumed())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RleError;
    use crate::rle::encode;
    use crate::{ImageBuffer8, RemapTable};
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EMPTY: u8 = 0xFF;

    fn scanline(encoded: bool, len: u16, dx: i16, dy: i16) -> Vec<u8> {
        let header = (len << 1) | u16::from(encoded);
        let mut out = header.to_le_bytes().to_vec();
        out.extend_from_slice(&dx.to_le_bytes());
        out.extend_from_slice(&dy.to_le_bytes());
        out
    }

    fn canvas(w: usize, h: usize) -> ImageBuffer8 {
        let mut buf = ImageBuffer8::new(w, h);
        buf.fill(EMPTY);
        buf
    }

    /// Blotchy sprite with transparent holes and plenty of repeats.
    fn random_sprite(rng: &mut StdRng, w: usize, h: usize) -> Vec<u8> {
        let palette = [EMPTY, EMPTY, 3, 3, 3, 17, 42, 200];
        let mut pixels = Vec::with_capacity(w * h);
        let mut current = EMPTY;
        for _ in 0..w * h {
            if rng.random_bool(0.3) {
                current = palette[rng.random_range(0..palette.len())];
            }
            pixels.push(current);
        }
        pixels
    }

    #[test]
    fn repeat_run_clipped_on_the_left() {
        let mut stream = scanline(true, 4, -2, 0);
        stream.extend_from_slice(&[(4 << 1) | 1, 0x07]);
        // A follow-up scanline only lands right if the cursor stayed aligned.
        stream.extend(scanline(false, 1, 3, 0));
        stream.push(0x09);
        stream.extend_from_slice(&[0, 0]);

        let mut buf = canvas(4, 1);
        assert_eq!(buf.paint_rle(0, 0, &stream), Ok(stream.len()));
        assert_eq!(buf.pixels(), &[0x07, 0x07, EMPTY, 0x09]);
    }

    #[test]
    fn literal_run_clipped_on_both_sides() {
        let mut stream = scanline(true, 8, -3, 1);
        stream.extend_from_slice(&[5 << 1, 1, 2, 3, 4, 5, (3 << 1) | 1, 6]);
        stream.extend_from_slice(&[0, 0]);

        let mut buf = canvas(4, 3);
        buf.set_clip(0, 0, 3, 3);
        assert_eq!(buf.paint_rle(0, 0, &stream), Ok(stream.len()));
        assert_eq!(
            buf.pixels(),
            &[
                EMPTY, EMPTY, EMPTY, EMPTY, //
                4, 5, 6, EMPTY, //
                EMPTY, EMPTY, EMPTY, EMPTY,
            ]
        );
    }

    #[test]
    fn encoded_sprite_paints_back_at_hot_spot() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let pixels = random_sprite(&mut rng, 16, 9);
        let stream = encode(&pixels, 16, 9, 4, 2, EMPTY).unwrap();

        let mut buf = canvas(16, 9);
        assert_eq!(buf.paint_rle(4, 2, &stream), Ok(stream.len()));
        assert_eq!(buf.pixels(), &pixels[..]);
    }

    #[test]
    fn painting_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(11);
        let stream = encode(&random_sprite(&mut rng, 12, 12), 12, 12, 6, 6, EMPTY).unwrap();

        let mut first = canvas(20, 20);
        let mut second = canvas(20, 20);
        first.set_clip(2, 3, 11, 9);
        second.set_clip(2, 3, 11, 9);
        let a = first.paint_rle(8, 7, &stream);
        let b = second.paint_rle(8, 7, &stream);

        assert_eq!(a, b);
        assert_eq!(first.pixels(), second.pixels());
    }

    #[test]
    fn clipped_paint_matches_cropped_full_paint() {
        let mut rng = StdRng::seed_from_u64(0xC11F);
        for _ in 0..200 {
            let (w, h) = (rng.random_range(1..24), rng.random_range(1..16));
            let stream = encode(&random_sprite(&mut rng, w, h), w, h, 3, 2, EMPTY).unwrap();
            let (xoff, yoff) = (rng.random_range(-20..40), rng.random_range(-12..30));

            let mut full = canvas(32, 24);
            let consumed = full.paint_rle(xoff, yoff, &stream);

            let mut clipped = canvas(32, 24);
            clipped.set_clip(
                rng.random_range(-4..32),
                rng.random_range(-4..24),
                rng.random_range(0..36),
                rng.random_range(0..28),
            );
            assert_eq!(clipped.paint_rle(xoff, yoff, &stream), consumed);

            let clip = clipped.clip();
            for y in 0..24 {
                for x in 0..32 {
                    let expected = if clip.contains(x, y) {
                        full.pixel(x, y)
                    } else {
                        Some(EMPTY)
                    };
                    assert_eq!(clipped.pixel(x, y), expected, "pixel ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn off_screen_sprite_is_fully_consumed() {
        let mut rng = StdRng::seed_from_u64(3);
        let stream = encode(&random_sprite(&mut rng, 10, 10), 10, 10, 0, 0, EMPTY).unwrap();

        let mut buf = canvas(8, 8);
        for (xoff, yoff) in [(-1000, 0), (0, -1000), (8, 0), (0, 8), (-10, -10)] {
            assert_eq!(buf.paint_rle(xoff, yoff, &stream), Ok(stream.len()));
        }
        assert!(buf.pixels().iter().all(|&p| p == EMPTY));
    }

    #[test]
    fn remapped_paint_translates_every_pixel() {
        let mut stream = scanline(true, 5, 0, 0);
        stream.extend_from_slice(&[(2 << 1) | 1, 1, 3 << 1, 2, 3, 4]);
        stream.extend_from_slice(&[0, 0]);
        let remap = RemapTable::from_fn(|c| c.wrapping_mul(10));

        let mut buf = canvas(6, 1);
        assert_eq!(buf.paint_rle_remapped(1, 0, &stream, &remap), Ok(stream.len()));
        assert_eq!(buf.pixels(), &[EMPTY, 10, 10, 20, 30, 40]);
    }

    #[test]
    fn remapped_raw_scanline_clipped_on_the_left() {
        let mut stream = scanline(false, 4, -1, 0);
        stream.extend_from_slice(&[1, 2, 3, 4, 0, 0]);
        let remap = RemapTable::from_fn(|c| c.wrapping_mul(10));

        let mut buf = canvas(4, 1);
        buf.set_clip(1, 0, 3, 1);
        assert_eq!(buf.paint_rle_remapped(0, 0, &stream, &remap), Ok(stream.len()));
        assert_eq!(buf.pixels(), &[EMPTY, 30, 40, EMPTY]);
    }

    #[test]
    fn truncated_stream_keeps_earlier_scanlines() {
        let mut stream = scanline(false, 2, 0, 0);
        stream.extend_from_slice(&[1, 2]);
        stream.extend(scanline(false, 4, 0, 1));
        stream.extend_from_slice(&[3, 4]);

        let mut buf = canvas(4, 2);
        assert_eq!(
            buf.paint_rle(0, 0, &stream),
            Err(RleError::Truncated {
                offset: 14,
                needed: 4
            })
        );
        assert_eq!(buf.pixels(), &[1, 2, EMPTY, EMPTY, EMPTY, EMPTY, EMPTY, EMPTY]);
    }

    #[test]
    fn overflowing_run_is_rejected() {
        let mut stream = scanline(true, 2, 0, 0);
        stream.extend_from_slice(&[(3 << 1) | 1, 9, 0, 0]);

        let mut buf = canvas(4, 1);
        assert_eq!(
            buf.paint_rle(0, 0, &stream),
            Err(RleError::RunOverflow {
                offset: 6,
                count: 3,
                remaining: 2
            })
        );
        assert!(buf.pixels().iter().all(|&p| p == EMPTY));
    }
}
