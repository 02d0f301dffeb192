//! The pixel arena — flat backing storage for fixed-length tile blocks.
//!
//! One contiguous `Vec<ColorRgba>` holds `tiles_capacity` blocks of
//! `tile_length` pixels each. Tile id 0 is the permanently blank tile:
//! [`PixelArena::allocate`] never hands it out, so consumers can rely on it
//! staying fully transparent.

use crate::color::ColorRgba;
use crate::error::Error;

/// Starting capacity (in tiles) when the arena first grows.
pub(crate) const DEFAULT_TILES_LENGTH: i32 = 256;

#[derive(Debug)]
pub(crate) struct PixelArena {
    pixels: Vec<ColorRgba>,
    tile_length: usize,
    tiles_count: i32,
    tiles_capacity: i32,
}

impl PixelArena {
    /// An empty arena for blocks of `tile_length` pixels. No storage is
    /// allocated until the first tile is generated.
    pub(crate) fn new(tile_length: usize) -> Self {
        Self {
            pixels: Vec::new(),
            tile_length,
            tiles_count: 0,
            tiles_capacity: 0,
        }
    }

    /// An arena pre-sized to exactly `tiles` blocks, all live and zeroed.
    ///
    /// Used by atlas loaders that know the tile count up front; this skips
    /// the usual growth floor, so later growth doubles from `tiles`.
    pub(crate) fn with_tiles(tile_length: usize, tiles: i32) -> Result<Self, Error> {
        let mut arena = Self::new(tile_length);
        arena.grow_to(tiles)?;
        arena.tiles_count = tiles;
        Ok(arena)
    }

    #[inline]
    pub(crate) fn tiles_count(&self) -> i32 {
        self.tiles_count
    }

    #[inline]
    pub(crate) fn tiles_capacity(&self) -> i32 {
        self.tiles_capacity
    }

    /// The block of pixels for `tile_id`. Caller guarantees
    /// `tile_id < tiles_capacity` (ids come from the charmap or
    /// [`allocate`](Self::allocate)).
    pub(crate) fn block(&self, tile_id: i32) -> &[ColorRgba] {
        let start = tile_id as usize * self.tile_length;
        &self.pixels[start..start + self.tile_length]
    }

    pub(crate) fn block_mut(&mut self, tile_id: i32) -> &mut [ColorRgba] {
        let start = tile_id as usize * self.tile_length;
        &mut self.pixels[start..start + self.tile_length]
    }

    /// Grow until `tile_id` fits, doubling from the current capacity (or
    /// from [`DEFAULT_TILES_LENGTH`] when empty). New blocks are
    /// zero-filled. On allocation failure the arena is unchanged.
    pub(crate) fn ensure_capacity(&mut self, tile_id: i32) -> Result<(), Error> {
        if tile_id < self.tiles_capacity {
            return Ok(());
        }
        let mut new_capacity = if self.tiles_capacity == 0 {
            DEFAULT_TILES_LENGTH
        } else {
            self.tiles_capacity
        };
        while tile_id >= new_capacity {
            // Doubling past i32 range cannot be satisfied; report it as a
            // growth failure rather than wrapping.
            new_capacity = new_capacity.checked_mul(2).ok_or(Error::Allocation)?;
        }
        self.grow_to(new_capacity)
    }

    /// Reserve a fresh tile id, growing if at capacity. The first
    /// allocation skips id 0 so the blank tile is never handed out.
    pub(crate) fn allocate(&mut self) -> Result<i32, Error> {
        self.ensure_capacity(self.tiles_count)?;
        if self.tiles_count == 0 {
            // Keep tile 0 blank.
            self.tiles_count = 1;
        }
        let tile_id = self.tiles_count;
        self.tiles_count += 1;
        Ok(tile_id)
    }

    fn grow_to(&mut self, new_capacity: i32) -> Result<(), Error> {
        let new_len = new_capacity as usize * self.tile_length;
        let additional = new_len - self.pixels.len();
        self.pixels
            .try_reserve_exact(additional)
            .map_err(|_| Error::Allocation)?;
        self.pixels.resize(new_len, ColorRgba::TRANSPARENT);
        self.tiles_capacity = new_capacity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_growth_uses_floor() {
        let mut arena = PixelArena::new(4);
        assert_eq!(arena.tiles_capacity(), 0);
        let id = arena.allocate().unwrap();
        assert_eq!(id, 1); // id 0 stays blank
        assert_eq!(arena.tiles_count(), 2);
        assert_eq!(arena.tiles_capacity(), DEFAULT_TILES_LENGTH);
    }

    #[test]
    fn growth_doubles_and_zero_fills() {
        let mut arena = PixelArena::new(2);
        arena.ensure_capacity(0).unwrap();
        assert_eq!(arena.tiles_capacity(), 256);
        arena.ensure_capacity(256).unwrap();
        assert_eq!(arena.tiles_capacity(), 512);
        arena.ensure_capacity(2000).unwrap();
        assert_eq!(arena.tiles_capacity(), 2048);
        // Freshly grown, never written: all zero.
        assert!(
            arena
                .block(1999)
                .iter()
                .all(|&p| p == ColorRgba::TRANSPARENT)
        );
    }

    #[test]
    fn blocks_are_disjoint_slices() {
        let mut arena = PixelArena::with_tiles(3, 4).unwrap();
        arena.block_mut(2).fill(ColorRgba::rgb(9, 9, 9));
        assert!(arena.block(1).iter().all(|&p| p == ColorRgba::TRANSPARENT));
        assert!(arena.block(3).iter().all(|&p| p == ColorRgba::TRANSPARENT));
        assert!(arena.block(2).iter().all(|&p| p == ColorRgba::rgb(9, 9, 9)));
    }

    #[test]
    fn presized_arena_doubles_from_its_own_size() {
        let mut arena = PixelArena::with_tiles(1, 4).unwrap();
        assert_eq!(arena.tiles_count(), 4);
        assert_eq!(arena.tiles_capacity(), 4);
        let id = arena.allocate().unwrap();
        assert_eq!(id, 4);
        assert_eq!(arena.tiles_capacity(), 8);
    }

    #[test]
    fn unsatisfiable_growth_fails_cleanly() {
        let mut arena = PixelArena::new(1);
        assert_eq!(arena.ensure_capacity(i32::MAX), Err(Error::Allocation));
        assert_eq!(arena.tiles_capacity(), 0);
    }

    #[test]
    fn growth_preserves_existing_blocks() {
        let mut arena = PixelArena::with_tiles(2, 2).unwrap();
        arena.block_mut(1).fill(ColorRgba::new(1, 2, 3, 4));
        arena.ensure_capacity(100).unwrap();
        assert!(arena.block(1).iter().all(|&p| p == ColorRgba::new(1, 2, 3, 4)));
    }
}
