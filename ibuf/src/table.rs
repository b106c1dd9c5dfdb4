//! 256-entry palette lookup tables.

use std::ops::Index;

/// Maps one palette index to another.
///
/// The same shape serves two purposes: remapping sprite colours before they
/// are written, and translucency, where the table is indexed by the pixel
/// already in the buffer and yields the blended result for one source colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable([u8; 256]);

/// Blend table for one translucent source colour, indexed by destination pixel.
pub type XformTable = ColorTable;

/// Palette substitution applied to every painted pixel.
pub type RemapTable = ColorTable;

impl ColorTable {
    #[must_use]
    pub const fn new(entries: [u8; 256]) -> Self {
        Self(entries)
    }

    /// Every index maps to itself.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn identity() -> Self {
        Self(std::array::from_fn(|i| i as u8))
    }

    /// Every index maps to `value`.
    #[must_use]
    pub const fn constant(value: u8) -> Self {
        Self([value; 256])
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_fn(f: impl Fn(u8) -> u8) -> Self {
        Self(std::array::from_fn(|i| f(i as u8)))
    }

    #[must_use]
    pub const fn get(&self, index: u8) -> u8 {
        self.0[index as usize]
    }

    #[must_use]
    pub const fn as_array(&self) -> &[u8; 256] {
        &self.0
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[u8; 256]> for ColorTable {
    fn from(entries: [u8; 256]) -> Self {
        Self(entries)
    }
}

impl Index<u8> for ColorTable {
    type Output = u8;

    fn index(&self, index: u8) -> &u8 {
        &self.0[index as usize]
    }
}
