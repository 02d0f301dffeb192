//! The [`Tileset`] type — a shared, observable store of fixed-size tiles.
//!
//! A `Tileset` is a *handle* to shared storage. Cloning a `Tileset` yields
//! another handle to the **same** store; the store is torn down when the
//! last handle drops, running every remaining observer's delete hook first.

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use crate::arena::PixelArena;
use crate::charmap::Charmap;
use crate::color::ColorRgba;
use crate::error::Error;
use crate::observer::{Observer, ObserverId, Registry};

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Convert a grayscale, fully opaque pixel block to white-with-alpha.
///
/// A block where every pixel has `r == g == b` and `a == 255` is remapped so
/// each pixel becomes `{255, 255, 255, original_r}`; renderers can then tint
/// the tile by multiplying with a foreground color. Blocks with any color or
/// any translucency are left untouched.
pub fn normalize_block(block: &mut [ColorRgba]) {
    let has_color = block.iter().any(|p| !p.is_grayscale());
    let has_alpha = block.iter().any(|p| !p.is_opaque());
    if has_color || has_alpha {
        return;
    }
    for pixel in block {
        *pixel = ColorRgba::new(255, 255, 255, pixel.r);
    }
}

// ---------------------------------------------------------------------------
// Internal shared store
// ---------------------------------------------------------------------------

struct TilesetStore {
    tile_width: i32,
    tile_height: i32,
    tile_length: usize,
    virtual_columns: i32,
    arena: PixelArena,
    charmap: Charmap,
    observers: Registry,
}

impl TilesetStore {
    fn assign(&mut self, codepoint: i32, tile_id: i32) -> Result<i32, Error> {
        if codepoint < 0 {
            return Err(Error::InvalidArgument("negative codepoint"));
        }
        if tile_id < 0 || tile_id >= self.arena.tiles_count() {
            return Err(Error::InvalidArgument("tile id out of range"));
        }
        self.charmap.set(codepoint, tile_id)?;
        Ok(tile_id)
    }

    /// Resolve `codepoint` to a tile id for writing, allocating a fresh
    /// tile when needed. A stored mapping of 0 always counts as "not yet
    /// generated": tile 0 is the permanent blank tile, so a codepoint
    /// pointed at it gets a fresh tile the next time content arrives.
    fn generate(&mut self, codepoint: i32) -> Result<i32, Error> {
        if codepoint < 0 {
            return Err(Error::InvalidArgument("negative codepoint"));
        }
        if let Some(tile_id) = self.charmap.get(codepoint) {
            if tile_id > 0 {
                return Ok(tile_id);
            }
        }
        let tile_id = self.arena.allocate()?;
        self.assign(codepoint, tile_id)
    }
}

// ---------------------------------------------------------------------------
// Tileset
// ---------------------------------------------------------------------------

/// A shared handle to a tileset: fixed-geometry tile pixels, a codepoint →
/// tile-id charmap, and attached change observers.
///
/// Cloning shares the underlying store; the last handle to drop tears it
/// down. Handles are neither `Send` nor `Sync` — all access must happen on
/// one thread.
#[derive(Clone)]
pub struct Tileset {
    store: Rc<RefCell<TilesetStore>>,
}

/// A non-owning handle to a tileset, for observer hooks.
///
/// A change hook that captures a full [`Tileset`] clone keeps the store
/// alive from inside the store itself, which leaks it; capture a
/// `WeakTileset` (via [`Tileset::downgrade`]) and [`upgrade`] it inside the
/// hook instead.
///
/// [`upgrade`]: WeakTileset::upgrade
#[derive(Clone)]
pub struct WeakTileset {
    store: Weak<RefCell<TilesetStore>>,
}

impl WeakTileset {
    /// A usable handle, as long as at least one strong handle survives.
    pub fn upgrade(&self) -> Option<Tileset> {
        self.store.upgrade().map(|store| Tileset { store })
    }
}

impl Tileset {
    /// Create a tileset for tiles of `width` × `height` pixels.
    ///
    /// Geometry is fixed for the tileset's lifetime. Fails with
    /// [`Error::InvalidArgument`] for non-positive dimensions.
    pub fn new(width: i32, height: i32) -> Result<Self, Error> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidArgument("non-positive tile dimensions"));
        }
        let tile_length = width
            .checked_mul(height)
            .ok_or(Error::InvalidArgument("tile dimensions overflow"))?
            as usize;
        Ok(Self {
            store: Rc::new(RefCell::new(TilesetStore {
                tile_width: width,
                tile_height: height,
                tile_length,
                virtual_columns: 1,
                arena: PixelArena::new(tile_length),
                charmap: Charmap::default(),
                observers: Registry::default(),
            })),
        })
    }

    /// Create a tileset with `tiles` pre-allocated, zeroed tile slots.
    ///
    /// For loaders that know the tile count up front (a `columns × rows`
    /// tilesheet). The slots count as live tiles, so they can be written
    /// with [`set_tile_raw`](Self::set_tile_raw) and targeted by
    /// [`assign`](Self::assign) immediately.
    pub fn with_raw_tiles(width: i32, height: i32, tiles: i32) -> Result<Self, Error> {
        if tiles < 0 {
            return Err(Error::InvalidArgument("negative tile count"));
        }
        let tileset = Self::new(width, height)?;
        {
            let mut store = tileset.store.borrow_mut();
            let tile_length = store.tile_length;
            store.arena = PixelArena::with_tiles(tile_length, tiles)?;
        }
        Ok(tileset)
    }

    /// Downgrade to a non-owning handle (for observer hooks).
    pub fn downgrade(&self) -> WeakTileset {
        WeakTileset {
            store: Rc::downgrade(&self.store),
        }
    }

    /// Number of live handles to this tileset's store.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.store)
    }

    // -- geometry accessors -------------------------------------------------

    /// Tile width in pixels.
    pub fn tile_width(&self) -> i32 {
        self.store.borrow().tile_width
    }

    /// Tile height in pixels.
    pub fn tile_height(&self) -> i32 {
        self.store.borrow().tile_height
    }

    /// Pixels per tile (`tile_width * tile_height`).
    pub fn tile_length(&self) -> usize {
        self.store.borrow().tile_length
    }

    /// Logical column count, used by consumers that translate tile ids back
    /// to positions on the source tilesheet. 1 unless a loader set it.
    pub fn virtual_columns(&self) -> i32 {
        self.store.borrow().virtual_columns
    }

    /// Record the source tilesheet's column count for consumers.
    pub fn set_virtual_columns(&self, columns: i32) {
        self.store.borrow_mut().virtual_columns = columns;
    }

    /// Number of live tiles (ids `0..tiles_count` are valid).
    pub fn tiles_count(&self) -> i32 {
        self.store.borrow().arena.tiles_count()
    }

    /// Allocated tile slots, always `>= tiles_count`.
    pub fn tiles_capacity(&self) -> i32 {
        self.store.borrow().arena.tiles_capacity()
    }

    /// Current charmap length; codepoints at or past it read as unmapped.
    pub fn character_map_length(&self) -> i32 {
        self.store.borrow().charmap.len()
    }

    // -- charmap ------------------------------------------------------------

    /// The tile id mapped to `codepoint`, or `None` when the codepoint is
    /// negative or past the charmap's current length. A returned 0 means
    /// the blank tile ("unassigned").
    pub fn lookup(&self, codepoint: i32) -> Option<i32> {
        self.store.borrow().charmap.get(codepoint)
    }

    /// Map `codepoint` to an existing `tile_id`, growing the charmap to
    /// cover the codepoint. Returns the tile id on success.
    ///
    /// Note that a mapping of 0 does not survive the write path: the next
    /// [`set_tile`](Self::set_tile) for that codepoint allocates a fresh
    /// tile instead of writing into the permanent blank.
    pub fn assign(&self, codepoint: i32, tile_id: i32) -> Result<i32, Error> {
        self.store.borrow_mut().assign(codepoint, tile_id)
    }

    // -- tile pixel access --------------------------------------------------

    /// Read the tile mapped to `codepoint`.
    ///
    /// With `Some(buffer)`, copies the tile's pixels into it (the buffer
    /// must be exactly [`tile_length`](Self::tile_length) pixels). With
    /// `None`, performs a pure existence check. Unmapped codepoints yield
    /// [`Error::NotFound`].
    pub fn get_tile(&self, codepoint: i32, buffer: Option<&mut [ColorRgba]>) -> Result<(), Error> {
        let store = self.store.borrow();
        let Some(tile_id) = store.charmap.get(codepoint) else {
            return Err(Error::NotFound);
        };
        let Some(buffer) = buffer else {
            return Ok(());
        };
        if buffer.len() != store.tile_length {
            return Err(Error::InvalidArgument("buffer length != tile_length"));
        }
        buffer.copy_from_slice(store.arena.block(tile_id));
        Ok(())
    }

    /// Write `block` as the tile for `codepoint`, allocating a tile if the
    /// codepoint is unmapped (or mapped to the blank tile 0).
    ///
    /// The block is stored normalized (see [`normalize_block`]): a fully
    /// grayscale, fully opaque block becomes white-with-alpha. After the
    /// write, attached observers are notified synchronously, newest-first;
    /// the first hook error aborts the pass and becomes this call's result
    /// (earlier hooks stay notified). Hooks must not attach or detach
    /// observers on this tileset — reentrant registry mutation is
    /// unsupported.
    pub fn set_tile(&self, codepoint: i32, block: &[ColorRgba]) -> Result<(), Error> {
        let mut store = self.store.borrow_mut();
        if codepoint < 0 {
            return Err(Error::InvalidArgument("negative codepoint"));
        }
        if block.len() != store.tile_length {
            return Err(Error::InvalidArgument("block length != tile_length"));
        }
        let tile_id = match store.charmap.get(codepoint) {
            Some(tile_id) if tile_id > 0 => tile_id,
            // Out of range, or mapped to the permanent blank: allocate.
            _ => store.generate(codepoint)?,
        };
        let dst = store.arena.block_mut(tile_id);
        dst.copy_from_slice(block);
        normalize_block(dst);

        // Run hooks without holding the borrow, so they can read this
        // tileset through their own (weak) handles.
        let mut registry = mem::take(&mut store.observers);
        drop(store);
        let result = registry.notify(tile_id, codepoint);
        let mut store = self.store.borrow_mut();
        registry.merge_from(mem::take(&mut store.observers));
        store.observers = registry;
        result
    }

    /// Read a tile by raw id, bypassing the charmap. Valid for any id in
    /// `0..tiles_count`, including tiles no codepoint maps to.
    pub fn get_tile_raw(&self, tile_id: i32, buffer: &mut [ColorRgba]) -> Result<(), Error> {
        let store = self.store.borrow();
        if tile_id < 0 || tile_id >= store.arena.tiles_count() {
            return Err(Error::InvalidArgument("tile id out of range"));
        }
        if buffer.len() != store.tile_length {
            return Err(Error::InvalidArgument("buffer length != tile_length"));
        }
        buffer.copy_from_slice(store.arena.block(tile_id));
        Ok(())
    }

    /// Write a tile by raw id, bypassing the charmap, normalization and
    /// observer notification. Loader-grade access for bulk ingestion.
    pub fn set_tile_raw(&self, tile_id: i32, block: &[ColorRgba]) -> Result<(), Error> {
        let mut store = self.store.borrow_mut();
        if tile_id < 0 || tile_id >= store.arena.tiles_count() {
            return Err(Error::InvalidArgument("tile id out of range"));
        }
        if block.len() != store.tile_length {
            return Err(Error::InvalidArgument("block length != tile_length"));
        }
        store.arena.block_mut(tile_id).copy_from_slice(block);
        Ok(())
    }

    // -- observers ----------------------------------------------------------

    /// Attach an observer; the returned id detaches it later. The most
    /// recently attached observer is notified first.
    pub fn attach_observer(&self, observer: Observer) -> ObserverId {
        self.store.borrow_mut().observers.attach(observer)
    }

    /// Detach an observer, running its delete hook exactly once. Unknown or
    /// already-detached ids are a no-op.
    pub fn detach_observer(&self, id: ObserverId) {
        let hook = self.store.borrow_mut().observers.detach(id);
        if let Some(hook) = hook {
            hook();
        }
    }
}

impl Drop for Tileset {
    fn drop(&mut self) {
        // Only the last handle tears down. Remaining observers hold hooks
        // that expect a deletion callback before their tileset goes away.
        if Rc::strong_count(&self.store) != 1 {
            return;
        }
        let hooks = self.store.borrow_mut().observers.take_delete_hooks();
        for hook in hooks {
            hook();
        }
    }
}
