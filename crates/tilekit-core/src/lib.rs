//! **tilekit-core** — a shared, observable store of fixed-size glyph tiles.
//!
//! A [`Tileset`] owns three things: a flat pixel arena of equally sized
//! RGBA tile blocks (tile id 0 reserved as the permanent blank), a sparse
//! codepoint → tile-id charmap, and a registry of change observers for
//! consumers that cache per-tile derived state.
//!
//! Handles are reference counted: cloning a [`Tileset`] shares the store,
//! and the last handle to drop tears it down, notifying every remaining
//! observer first. Everything is single-threaded and synchronous; handles
//! are deliberately neither `Send` nor `Sync`.
//!
//! Loading tilesets from tilesheet images lives in the companion
//! `tilekit-atlas` crate.

mod arena;
mod charmap;
pub mod color;
pub mod error;
pub mod observer;
pub mod tileset;

pub use color::ColorRgba;
pub use error::Error;
pub use observer::{Observer, ObserverId};
pub use tileset::{Tileset, WeakTileset, normalize_block};
