//! The [`ColorRgba`] primitive — a 4×8-bit color value.
//!
//! Tile pixels are compared for *exact* equality on all four channels, both
//! by the color-key logic in the atlas loader and by tests, so `Eq` is part
//! of the contract.

/// An RGBA color with 8 bits per channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorRgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba {
    /// Fully transparent black — the content of every blank tile pixel.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Construct from individual channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color (`a = 255`).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Whether all three color channels are equal (ignores alpha).
    #[inline]
    pub const fn is_grayscale(self) -> bool {
        self.r == self.g && self.r == self.b
    }

    /// Whether the alpha channel is fully opaque.
    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}

impl From<[u8; 4]> for ColorRgba {
    #[inline]
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<ColorRgba> for [u8; 4] {
    #[inline]
    fn from(c: ColorRgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_equality() {
        assert_eq!(ColorRgba::new(1, 2, 3, 4), ColorRgba::new(1, 2, 3, 4));
        assert_ne!(ColorRgba::new(1, 2, 3, 4), ColorRgba::new(1, 2, 3, 5));
    }

    #[test]
    fn grayscale_and_opaque() {
        assert!(ColorRgba::new(128, 128, 128, 255).is_grayscale());
        assert!(!ColorRgba::new(128, 128, 129, 255).is_grayscale());
        assert!(ColorRgba::rgb(0, 0, 0).is_opaque());
        assert!(!ColorRgba::TRANSPARENT.is_opaque());
    }

    #[test]
    fn array_round_trip() {
        let c = ColorRgba::from([9, 8, 7, 6]);
        assert_eq!(<[u8; 4]>::from(c), [9, 8, 7, 6]);
    }
}
