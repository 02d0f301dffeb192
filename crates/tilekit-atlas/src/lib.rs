//! **tilekit-atlas** — loads tilesheet images into [`Tileset`]s.
//!
//! A tilesheet is a single image divided into a `columns × rows` grid of
//! equally sized cells, one glyph per cell. Loading classifies and
//! normalizes every cell in one pass:
//!
//! - a fully grayscale, fully opaque cell becomes white-with-alpha, so
//!   renderers can tint it by multiplying with a foreground color;
//! - if every pixel of cell 0 shares one RGBA value, that value is treated
//!   as a transparency key and matching pixels anywhere on the sheet become
//!   fully transparent.
//!
//! Cell `i` lands at tile id `i`; codepoints are then assigned either
//! identically (codepoint `i` → tile `i`) or through an explicit mapping
//! list such as [`charmaps::CP437`].

use std::fmt;
use std::path::Path;

use image::RgbaImage;
use tilekit_core::{ColorRgba, Error, Tileset, normalize_block};

pub mod charmaps;

pub use charmaps::load_tilesheet_cp437;

// ---------------------------------------------------------------------------
// AtlasError
// ---------------------------------------------------------------------------

/// Error type for tilesheet loading.
#[derive(Debug)]
pub enum AtlasError {
    /// The image file could not be read or decoded. No tileset is created.
    Decode(image::ImageError),
    /// Building the tileset failed; the partial tileset is dropped.
    Tileset(Error),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::Decode(err) => write!(f, "failed to decode tilesheet image: {err}"),
            AtlasError::Tileset(err) => write!(f, "failed to build tileset: {err}"),
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtlasError::Decode(err) => Some(err),
            AtlasError::Tileset(err) => Some(err),
        }
    }
}

impl From<image::ImageError> for AtlasError {
    fn from(err: image::ImageError) -> Self {
        AtlasError::Decode(err)
    }
}

impl From<Error> for AtlasError {
    fn from(err: Error) -> Self {
        AtlasError::Tileset(err)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a tilesheet image file into a new [`Tileset`].
///
/// `mapping` gives the codepoint for each cell in grid order; `None` means
/// the identity mapping over all `columns * rows` cells. A mapping shorter
/// than the cell count leaves the remaining cells reachable by raw tile id
/// only; a mapping longer than the cell count fails.
pub fn load_tilesheet<P: AsRef<Path>>(
    path: P,
    columns: i32,
    rows: i32,
    mapping: Option<&[i32]>,
) -> Result<Tileset, AtlasError> {
    let img = image::open(path)?.into_rgba8();
    tileset_from_image(&img, columns, rows, mapping)
}

/// Build a [`Tileset`] from an already-decoded RGBA image.
///
/// Same contract as [`load_tilesheet`]; this is the entry point for
/// embedders that decode (or synthesize) the image themselves.
pub fn tileset_from_image(
    img: &RgbaImage,
    columns: i32,
    rows: i32,
    mapping: Option<&[i32]>,
) -> Result<Tileset, AtlasError> {
    if columns <= 0 || rows <= 0 {
        return Err(Error::InvalidArgument("non-positive grid dimensions").into());
    }
    let (img_w, img_h) = img.dimensions();
    let tile_w = img_w as i32 / columns;
    let tile_h = img_h as i32 / rows;
    if tile_w == 0 || tile_h == 0 {
        return Err(Error::InvalidArgument("image smaller than its grid").into());
    }
    if img_w as i32 % columns != 0 || img_h as i32 % rows != 0 {
        log::warn!(
            "tilesheet {img_w}x{img_h} does not divide into {columns}x{rows} cells evenly; \
             remainder pixels ignored"
        );
    }

    let font_tiles = columns * rows;
    let tileset = Tileset::with_raw_tiles(tile_w, tile_h, font_tiles)?;
    tileset.set_virtual_columns(columns);

    let color_key = detect_color_key(img, tile_w as u32, tile_h as u32);

    for i in 0..font_tiles {
        let x0 = (i % columns * tile_w) as u32;
        let y0 = (i / columns * tile_h) as u32;
        let original = cell_block(img, x0, y0, tile_w as u32, tile_h as u32);

        let mut tile = original.clone();
        normalize_block(&mut tile);
        if let Some(key) = color_key {
            // Key matching reads the original values, so a cell remapped to
            // white-with-alpha still drops its keyed pixels.
            for (dst, &src) in tile.iter_mut().zip(&original) {
                if src == key {
                    *dst = ColorRgba::TRANSPARENT;
                }
            }
        }
        tileset.set_tile_raw(i, &tile)?;
    }

    match mapping {
        Some(list) => {
            for (i, &codepoint) in list.iter().enumerate() {
                tileset.assign(codepoint, i as i32)?;
            }
        }
        None => {
            for i in 0..font_tiles {
                tileset.assign(i, i)?;
            }
        }
    }

    log::debug!(
        "loaded {columns}x{rows} tilesheet: {font_tiles} tiles of {tile_w}x{tile_h} px{}",
        if color_key.is_some() { ", color-keyed" } else { "" }
    );
    Ok(tileset)
}

/// The transparency key, if every pixel of cell 0 shares one RGBA value.
fn detect_color_key(img: &RgbaImage, tile_w: u32, tile_h: u32) -> Option<ColorRgba> {
    let key = ColorRgba::from(img.get_pixel(0, 0).0);
    for y in 0..tile_h {
        for x in 0..tile_w {
            if ColorRgba::from(img.get_pixel(x, y).0) != key {
                return None;
            }
        }
    }
    Some(key)
}

/// Copy one grid cell out of the sheet, row-major.
fn cell_block(img: &RgbaImage, x0: u32, y0: u32, tile_w: u32, tile_h: u32) -> Vec<ColorRgba> {
    let mut block = Vec::with_capacity((tile_w * tile_h) as usize);
    for y in 0..tile_h {
        for x in 0..tile_w {
            block.push(ColorRgba::from(img.get_pixel(x0 + x, y0 + y).0));
        }
    }
    block
}
