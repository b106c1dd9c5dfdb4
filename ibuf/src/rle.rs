//! RLE sprite streams.
//!
//! A sprite is a list of scanline records closed by a zero header. All
//! multi-byte values are little-endian.
//!
//! ```text
//! ┌──────────┬─────────┬─────────┬──────────────────────────┐
//! │ header   │ dx      │ dy      │ body                     │
//! │ u16      │ i16     │ i16     │                          │
//! └──────────┴─────────┴─────────┴──────────────────────────┘
//!   bit 0     = encoded flag
//!   bits 1-15 = scanline length in pixels (0 header ends the sprite)
//!
//! raw body:      len literal pixel bytes
//! encoded body:  runs until len pixels are covered, each run is
//!                ┌─────────┬────────────────────────────┐
//!                │ control │ 1 colour byte  (bit 0 = 1) │
//!                │ u8      │ count literals (bit 0 = 0) │
//!                └─────────┴────────────────────────────┘
//!                count = control >> 1
//! ```
//!
//! `dx`/`dy` are relative to the paint origin, so the same stream can be drawn
//! anywhere. Streams are read through [`Segments`], which walks the whole
//! record structure and hands out every run whether or not it will end up
//! visible, so the stream position after a scanline never depends on clipping.

mod encode;

pub use encode::encode;

use crate::error::RleError;

/// Pixel data of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pixels<'a> {
    /// Consecutive literal palette indices.
    Literal(&'a [u8]),
    /// One colour repeated `count` times.
    Repeat { color: u8, count: usize },
}

impl Pixels<'_> {
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Literal(pixels) => pixels.len(),
            Self::Repeat { count, .. } => *count,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A horizontal run of pixels, positioned relative to the paint origin.
///
/// A raw scanline is a single segment, an encoded scanline yields one
/// segment per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub x: i32,
    pub y: i32,
    pub pixels: Pixels<'a>,
}

/// Bounding box of a sprite, relative to its paint origin. `x1`/`y1` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteBounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl SpriteBounds {
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    fn include_row(&mut self, x: i32, y: i32, w: i32) {
        self.x0 = self.x0.min(x);
        self.y0 = self.y0.min(y);
        self.x1 = self.x1.max(x + w);
        self.y1 = self.y1.max(y + 1);
    }
}

/// Bounds-checked little-endian reader over a stream slice.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], RleError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(RleError::Truncated {
                offset: self.pos,
                needed: len,
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, RleError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16, RleError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_i16(&mut self) -> Result<i16, RleError> {
        let bytes = self.take(2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }
}

/// Scanline currently being walked.
struct Scanline {
    encoded: bool,
    x: i32,
    y: i32,
    remaining: usize,
}

/// Iterator over every run of a sprite stream.
///
/// Yields `Err` once on a malformed stream and then stops. After the
/// iterator is exhausted, [`consumed`](Self::consumed) is the length of the
/// stream including its terminator.
pub struct Segments<'a> {
    reader: Reader<'a>,
    scanline: Option<Scanline>,
    done: bool,
}

impl<'a> Segments<'a> {
    #[must_use]
    pub const fn new(stream: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(stream),
            scanline: None,
            done: false,
        }
    }

    /// Bytes read so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.reader.pos
    }

    /// Reads the next scanline header. `None` on the terminator.
    fn next_scanline(&mut self) -> Result<Option<Scanline>, RleError> {
        let header = self.reader.read_u16()?;
        if header == 0 {
            return Ok(None);
        }
        let dx = self.reader.read_i16()?;
        let dy = self.reader.read_i16()?;

        Ok(Some(Scanline {
            encoded: header & 1 != 0,
            x: i32::from(dx),
            y: i32::from(dy),
            remaining: usize::from(header >> 1),
        }))
    }

    fn next_segment(&mut self) -> Result<Option<Segment<'a>>, RleError> {
        let mut scanline = match self.scanline.take() {
            Some(scanline) if scanline.remaining > 0 => scanline,
            _ => loop {
                match self.next_scanline()? {
                    None => return Ok(None),
                    // Encoded scanline with no pixels: nothing follows the header.
                    Some(scanline) if scanline.remaining == 0 => {}
                    Some(scanline) => break scanline,
                }
            },
        };

        let segment = if scanline.encoded {
            self.read_run(&mut scanline)?
        } else {
            let segment = Segment {
                x: scanline.x,
                y: scanline.y,
                pixels: Pixels::Literal(self.reader.take(scanline.remaining)?),
            };
            scanline.remaining = 0;
            segment
        };

        self.scanline = Some(scanline);
        Ok(Some(segment))
    }

    /// Reads one run of an encoded scanline and advances the scanline past it.
    fn read_run(&mut self, scanline: &mut Scanline) -> Result<Segment<'a>, RleError> {
        let offset = self.reader.pos;
        let control = self.reader.read_u8()?;
        let count = usize::from(control >> 1);
        if count > scanline.remaining {
            return Err(RleError::RunOverflow {
                offset,
                count,
                remaining: scanline.remaining,
            });
        }

        let pixels = if control & 1 == 0 {
            Pixels::Literal(self.reader.take(count)?)
        } else {
            Pixels::Repeat {
                color: self.reader.read_u8()?,
                count,
            }
        };

        let segment = Segment {
            x: scanline.x,
            y: scanline.y,
            pixels,
        };
        scanline.x += i32::try_from(count).unwrap_or(i32::MAX);
        scanline.remaining -= count;
        Ok(segment)
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>, RleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_segment() {
            Ok(Some(segment)) => Some(Ok(segment)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Walks a whole stream without painting it.
///
/// Returns the number of bytes the sprite occupies, terminator included.
///
/// # Errors
///
/// Fails on a truncated stream or a run that overflows its scanline.
pub fn validate(stream: &[u8]) -> Result<usize, RleError> {
    let mut segments = Segments::new(stream);
    for segment in &mut segments {
        segment?;
    }
    Ok(segments.consumed())
}

/// Area covered by the painted pixels of a stream, relative to the paint origin.
///
/// # Errors
///
/// Same as [`validate`].
pub fn bounds(stream: &[u8]) -> Result<Option<SpriteBounds>, RleError> {
    let mut bounds: Option<SpriteBounds> = None;
    for segment in Segments::new(stream) {
        let segment = segment?;
        if segment.pixels.is_empty() {
            continue;
        }
        let w = i32::try_from(segment.pixels.len()).unwrap_or(i32::MAX);
        bounds
            .get_or_insert(SpriteBounds {
                x0: segment.x,
                y0: segment.y,
                x1: segment.x,
                y1: segment.y,
            })
            .include_row(segment.x, segment.y, w);
    }
    Ok(bounds)
}
