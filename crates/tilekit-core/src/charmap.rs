//! The charmap — a lazily-growing codepoint → tile-id index.
//!
//! Codepoints are opaque non-negative integers. The stored value 0 means
//! "unassigned / blank tile"; a codepoint beyond the allocated range reads
//! the same as one stored as 0.

use crate::error::Error;

/// Starting length (in codepoints) when the charmap first grows.
pub(crate) const DEFAULT_CHARMAP_LENGTH: i32 = 256;

#[derive(Debug, Default)]
pub(crate) struct Charmap {
    map: Vec<i32>,
}

impl Charmap {
    #[inline]
    pub(crate) fn len(&self) -> i32 {
        self.map.len() as i32
    }

    /// The tile id stored for `codepoint`, or `None` when the codepoint is
    /// negative or outside the allocated range. A returned 0 means the
    /// codepoint is in range but unassigned (blank).
    pub(crate) fn get(&self, codepoint: i32) -> Option<i32> {
        if codepoint < 0 {
            return None;
        }
        self.map.get(codepoint as usize).copied()
    }

    /// Store `tile_id` for `codepoint`, growing the map to cover it.
    ///
    /// Tile-id validation belongs to the tileset (it knows `tiles_count`);
    /// the charmap only rejects negative codepoints.
    pub(crate) fn set(&mut self, codepoint: i32, tile_id: i32) -> Result<(), Error> {
        if codepoint < 0 {
            return Err(Error::InvalidArgument("negative codepoint"));
        }
        self.grow_to_cover(codepoint)?;
        self.map[codepoint as usize] = tile_id;
        Ok(())
    }

    /// Double the length from a floor of [`DEFAULT_CHARMAP_LENGTH`] until
    /// `codepoint` is in range, zero-filling new slots. On allocation
    /// failure the map is unchanged.
    fn grow_to_cover(&mut self, codepoint: i32) -> Result<(), Error> {
        if (codepoint as usize) < self.map.len() {
            return Ok(());
        }
        let mut new_length = if self.map.is_empty() {
            DEFAULT_CHARMAP_LENGTH
        } else {
            self.map.len() as i32
        };
        while codepoint >= new_length {
            // Doubling past i32 range cannot be satisfied; report it as a
            // growth failure rather than wrapping.
            new_length = new_length.checked_mul(2).ok_or(Error::Allocation)?;
        }
        let additional = new_length as usize - self.map.len();
        self.map
            .try_reserve_exact(additional)
            .map_err(|_| Error::Allocation)?;
        self.map.resize(new_length as usize, 0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_map_reads_as_unassigned() {
        let map = Charmap::default();
        assert_eq!(map.len(), 0);
        assert_eq!(map.get(0), None);
        assert_eq!(map.get(65), None);
    }

    #[test]
    fn negative_codepoint() {
        let mut map = Charmap::default();
        assert_eq!(map.get(-1), None);
        assert_eq!(
            map.set(-1, 1),
            Err(Error::InvalidArgument("negative codepoint"))
        );
    }

    #[test]
    fn set_grows_with_doubling_floor() {
        let mut map = Charmap::default();
        map.set(10, 3).unwrap();
        assert_eq!(map.len(), DEFAULT_CHARMAP_LENGTH);
        map.set(700, 4).unwrap();
        assert_eq!(map.len(), 1024);
        // In-range but unassigned slots read as 0.
        assert_eq!(map.get(11), Some(0));
        assert_eq!(map.get(10), Some(3));
        assert_eq!(map.get(700), Some(4));
    }

    #[test]
    fn huge_codepoint_growth_fails_cleanly() {
        let mut map = Charmap::default();
        assert_eq!(map.set(1 << 30, 0), Err(Error::Allocation));
        // The map is unchanged and still usable.
        assert_eq!(map.len(), 0);
        map.set(65, 1).unwrap();
        assert_eq!(map.get(65), Some(1));
    }

    #[test]
    fn growth_preserves_mappings() {
        let mut map = Charmap::default();
        for cp in 0..200 {
            map.set(cp, cp + 1).unwrap();
        }
        map.set(100_000, 7).unwrap();
        for cp in 0..200 {
            assert_eq!(map.get(cp), Some(cp + 1));
        }
    }
}
