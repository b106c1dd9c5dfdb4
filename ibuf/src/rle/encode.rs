use crate::error::RleError;

/// Longest run a control byte can describe.
const MAX_RUN: usize = 0x7F;

/// Longest scanline a header can describe.
const MAX_SCANLINE: usize = 0x7FFF;

/// Identical pixels needed before a repeat run beats literals.
const MIN_REPEAT: usize = 3;

/// Encodes a `width` x `height` image into an RLE sprite stream.
///
/// Pixels equal to `transparent` are left out. Offsets are stored relative to
/// `(hot_x, hot_y)`, so painting the result at the hot spot reproduces the
/// image. Rows beyond the end of `pixels` are ignored.
///
/// # Errors
///
/// Fails with [`RleError::OffsetOutOfRange`] when a pixel lies further than
/// an `i16` away from the hot spot.
pub fn encode(
    pixels: &[u8],
    width: usize,
    height: usize,
    hot_x: i32,
    hot_y: i32,
    transparent: u8,
) -> Result<Vec<u8>, RleError> {
    let mut out = Vec::new();
    if width == 0 {
        out.extend_from_slice(&[0, 0]);
        return Ok(out);
    }

    for (y, row) in pixels.chunks_exact(width).take(height).enumerate() {
        let mut x = 0;
        while x < width {
            if row[x] == transparent {
                x += 1;
                continue;
            }
            let start = x;
            while x < width && row[x] != transparent {
                x += 1;
            }

            for (i, span) in row[start..x].chunks(MAX_SCANLINE).enumerate() {
                let dx = offset(start + i * MAX_SCANLINE, hot_x);
                let dy = offset(y, hot_y);
                let (Some(dx), Some(dy)) = (dx, dy) else {
                    return Err(RleError::OffsetOutOfRange {
                        x: start + i * MAX_SCANLINE,
                        y,
                    });
                };
                push_scanline(&mut out, span, dx, dy);
            }
        }
    }

    out.extend_from_slice(&[0, 0]);
    Ok(out)
}

fn offset(pos: usize, hot: i32) -> Option<i16> {
    let delta = i64::try_from(pos).ok()? - i64::from(hot);
    i16::try_from(delta).ok()
}

#[allow(clippy::cast_possible_truncation)]
fn push_scanline(out: &mut Vec<u8>, span: &[u8], dx: i16, dy: i16) {
    let encoded = span
        .windows(MIN_REPEAT)
        .any(|w| w.iter().all(|&p| p == w[0]));
    let header = ((span.len() as u16) << 1) | u16::from(encoded);

    out.extend_from_slice(&header.to_le_bytes());
    out.extend_from_slice(&dx.to_le_bytes());
    out.extend_from_slice(&dy.to_le_bytes());

    if encoded {
        push_runs(out, span);
    } else {
        out.extend_from_slice(span);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn push_runs(out: &mut Vec<u8>, span: &[u8]) {
    let mut literal_start = 0;
    let mut i = 0;
    while i < span.len() {
        let color = span[i];
        let run = span[i..].iter().take_while(|&&p| p == color).count();
        if run >= MIN_REPEAT {
            push_literals(out, &span[literal_start..i]);
            let mut left = run;
            while left > 0 {
                let n = left.min(MAX_RUN);
                out.push(((n as u8) << 1) | 1);
                out.push(color);
                left -= n;
            }
            literal_start = i + run;
        }
        i += run;
    }
    push_literals(out, &span[literal_start..]);
}

#[allow(clippy::cast_possible_truncation)]
fn push_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_RUN) {
        out.push((chunk.len() as u8) << 1);
        out.extend_from_slice(chunk);
    }
}
