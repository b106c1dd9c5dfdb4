use std::fmt;

/// Rejected buffer geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Rows would overlap: the stride is narrower than the visible width.
    StrideTooSmall { line_width: usize, width: usize },
    /// The backing storage cannot hold `line_width * height` bytes.
    StorageTooSmall { len: usize, needed: usize },
    /// Offsets must be negatable to describe the visible area.
    OffsetOutOfRange { offset_x: i32, offset_y: i32 },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrideTooSmall { line_width, width } => {
                write!(f, "line width {line_width} is smaller than width {width}")
            }
            Self::StorageTooSmall { len, needed } => {
                write!(f, "storage holds {len} bytes, {needed} needed")
            }
            Self::OffsetOutOfRange { offset_x, offset_y } => {
                write!(f, "offset ({offset_x}, {offset_y}) out of range")
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// Malformed RLE sprite stream.
///
/// For decode errors `offset` is the stream position of the failing read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RleError {
    /// A read of `needed` bytes at `offset` would pass the end of the stream.
    Truncated { offset: usize, needed: usize },
    /// An encoded run declares more pixels than its scanline has left.
    RunOverflow {
        offset: usize,
        count: usize,
        remaining: usize,
    },
    /// The encoder met a pixel whose offset from the hot spot does not fit an `i16`.
    OffsetOutOfRange { x: usize, y: usize },
}

impl fmt::Display for RleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { offset, needed } => {
                write!(f, "rle stream truncated: {needed} bytes needed at offset {offset}")
            }
            Self::RunOverflow {
                offset,
                count,
                remaining,
            } => write!(
                f,
                "rle run of {count} pixels at offset {offset} overflows scanline ({remaining} left)"
            ),
            Self::OffsetOutOfRange { x, y } => {
                write!(f, "pixel ({x}, {y}) is too far from the hot spot to encode")
            }
        }
    }
}

impl std::error::Error for RleError {}
