//! Tile atlas construction.
//!
//! Each tileset image becomes one texture. Its grid is sliced into source
//! rectangles, and every canonical GID the map resolves for a cell gets a
//! table entry pointing at that rectangle.

use crate::error::AssetLoadError;
use crate::geom::TileRect;
use crate::ir_map::{IrTileset, MapSource};
use crate::spatial::TileId;
use crate::surface::Surface;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Loads raw pixels for a tileset image.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<Surface>;
}

/// Turns decoded surfaces into backend textures.
///
/// Textures are owned values; dropping one releases it.
pub trait TextureFactory {
    type Texture;

    fn create_texture(&mut self, surface: &Surface) -> Self::Texture;
}

/// Index of a texture inside a [`TileAtlas`], one per tileset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasEntry {
    pub texture: TextureId,
    pub rect: TileRect,
}

/// GIDs below this index live in the dense table; the rest go to `sparse`.
const DENSE_GIDS: u32 = 1 << 16;

/// GID → source rectangle table plus the textures it points into.
pub struct TileAtlas<T> {
    textures: Vec<T>,
    entries: Vec<Option<AtlasEntry>>,
    sparse: BTreeMap<TileId, AtlasEntry>,
}

impl<T> TileAtlas<T> {
    fn new(tilesets: usize) -> Self {
        Self {
            textures: Vec::with_capacity(tilesets),
            entries: Vec::new(),
            sparse: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn get(&self, gid: TileId) -> Option<&AtlasEntry> {
        if gid.0 < DENSE_GIDS {
            self.entries.get(gid.0 as usize)?.as_ref()
        } else {
            self.sparse.get(&gid)
        }
    }

    #[inline]
    pub fn texture(&self, id: TextureId) -> &T {
        &self.textures[id.0]
    }

    pub fn textures(&self) -> &[T] {
        &self.textures
    }

    /// Number of GIDs with an entry.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count() + self.sparse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All populated entries in GID order.
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &AtlasEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(gid, e)| e.as_ref().map(|e| (TileId(gid as u32), e)))
            .chain(self.sparse.iter().map(|(&gid, e)| (gid, e)))
    }

    fn insert(&mut self, gid: TileId, entry: AtlasEntry) {
        let prev = if gid.0 < DENSE_GIDS {
            let idx = gid.0 as usize;
            if idx >= self.entries.len() {
                self.entries.resize(idx + 1, None);
            }
            self.entries[idx].replace(entry)
        } else {
            self.sparse.insert(gid, entry)
        };
        if let Some(prev) = prev {
            // Last write wins.
            warn!(gid = gid.0, ?prev, ?entry, "gid produced by more than one tileset cell");
        }
    }
}

/// Length of the region of `raw` pixels that is scanned for whole tiles.
///
/// Pixels past the last full cell (banners, credits) are not scanned, and
/// the remainder of `raw - margin` modulo the cell size is trimmed off.
pub fn scan_extent(raw: u32, tile: u32, margin: u32, spacing: u32) -> u32 {
    let cell = i64::from(tile) + i64::from(spacing);
    let (raw, margin, spacing) = (i64::from(raw), i64::from(margin), i64::from(spacing));

    let usable = raw - 2 * margin + spacing;
    if cell <= 0 || usable <= 0 {
        return 0;
    }
    let scan = (usable / cell) * cell - spacing;
    let trailing = (raw - margin).rem_euclid(cell);
    (scan - trailing).max(0) as u32
}

/// Source rectangles of `ts` in enumeration order, paired with the raw
/// tile index each cell is assigned.
///
/// Cells whose right edge passes the trimmed scan width still consume an
/// index but yield no rectangle.
pub fn slice_tileset(ts: &IrTileset, image_w: u32, image_h: u32) -> Vec<(u32, TileRect)> {
    assert!(
        ts.tile_w > 0 && ts.tile_h > 0,
        "tileset '{}' has a zero tile size",
        ts.name
    );
    let cell_w = ts.tile_w + ts.spacing;
    let cell_h = ts.tile_h + ts.spacing;
    let scan_w = scan_extent(image_w, ts.tile_w, ts.margin, ts.spacing);
    let scan_h = scan_extent(image_h, ts.tile_h, ts.margin, ts.spacing);

    let mut out = Vec::new();
    let mut raw = ts.first_gid;
    for y in (ts.margin..scan_h + ts.margin).step_by(cell_h as usize) {
        for x in (ts.margin..scan_w + ts.margin).step_by(cell_w as usize) {
            let index = raw;
            raw += 1;
            if x - ts.margin + ts.tile_w > scan_w || y + ts.tile_h > image_h {
                continue;
            }
            out.push((index, TileRect::new(x, y, ts.tile_w, ts.tile_h)));
        }
    }
    out
}

/// Builds the atlas for every tileset of `map`.
///
/// Any image that fails to decode aborts the whole build; textures created
/// for earlier tilesets are dropped (and so released) before returning.
pub fn build_atlas<M, D, F>(
    map: &M,
    decoder: &D,
    factory: &mut F,
) -> Result<TileAtlas<F::Texture>, AssetLoadError>
where
    M: MapSource + ?Sized,
    D: ImageDecoder + ?Sized,
    F: TextureFactory + ?Sized,
{
    let mut atlas = TileAtlas::new(map.tilesets().len());

    for ts in map.tilesets() {
        let mut surface = decoder.decode(&ts.image).map_err(|source| AssetLoadError {
            path: ts.image.clone(),
            source,
        })?;

        if let Some(key) = ts.transparent {
            if !surface.set_color_key(key) {
                debug!(
                    tileset = %ts.name,
                    indexed = surface.is_indexed(),
                    "color key not applied"
                );
            }
        }

        let texture_id = TextureId(atlas.textures.len());
        atlas.textures.push(factory.create_texture(&surface));
        let (image_w, image_h) = (surface.width, surface.height);
        drop(surface);

        let mut count = 0usize;
        for (raw, rect) in slice_tileset(ts, image_w, image_h) {
            for (gid, _flags) in map.resolve(raw) {
                atlas.insert(gid, AtlasEntry { texture: texture_id, rect });
                count += 1;
            }
        }

        info!(
            tileset = %ts.name,
            image = %ts.image.display(),
            width = image_w,
            height = image_h,
            entries = count,
            "built tileset texture"
        );
    }

    Ok(atlas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn tileset(tile: u32, margin: u32, spacing: u32) -> IrTileset {
        IrTileset {
            name: "t".into(),
            first_gid: 1,
            image: PathBuf::from("t.png"),
            tile_w: tile,
            tile_h: tile,
            tilecount: 0,
            spacing,
            margin,
            transparent: None,
        }
    }

    #[test]
    fn scan_extent_of_exact_grid_is_the_image() {
        assert_eq!(scan_extent(64, 16, 0, 0), 64);
        assert_eq!(scan_extent(48, 16, 0, 0), 48);
    }

    #[test]
    fn scan_extent_drops_decoration_past_last_cell() {
        // floor(72 / 16) * 16 = 64, then (72 % 16) = 8 is trimmed
        assert_eq!(scan_extent(72, 16, 0, 0), 56);
        // floor((40 - 4 + 2) / 10) * 10 - 2 = 28, then (40 - 2) % 10 = 8
        assert_eq!(scan_extent(40, 8, 2, 2), 20);
    }

    #[test]
    fn scan_extent_of_tiny_image_is_zero() {
        assert_eq!(scan_extent(3, 16, 2, 0), 0);
        assert_eq!(scan_extent(0, 16, 0, 0), 0);
    }

    #[test]
    fn slices_row_major_with_sequential_indices() {
        let cells = slice_tileset(&tileset(16, 0, 0), 32, 32);
        assert_eq!(
            cells,
            vec![
                (1, TileRect::new(0, 0, 16, 16)),
                (2, TileRect::new(16, 0, 16, 16)),
                (3, TileRect::new(0, 16, 16, 16)),
                (4, TileRect::new(16, 16, 16, 16)),
            ]
        );
    }

    #[test]
    fn high_gids_stay_out_of_the_dense_table() {
        let mut atlas = TileAtlas::<()>::new(0);
        let entry = |x| AtlasEntry {
            texture: TextureId(0),
            rect: TileRect::new(x, 0, 16, 16),
        };
        atlas.insert(TileId(3), entry(0));
        atlas.insert(TileId(1 << 28), entry(16));
        atlas.insert(TileId(DENSE_GIDS), entry(32));

        assert_eq!(atlas.entries.len(), 4);
        assert_eq!(atlas.len(), 3);
        assert_eq!(atlas.get(TileId(1 << 28)), Some(&entry(16)));
        assert!(atlas.get(TileId((1 << 28) + 1)).is_none());
        let gids: Vec<u32> = atlas.iter().map(|(gid, _)| gid.0).collect();
        assert_eq!(gids, vec![3, DENSE_GIDS, 1 << 28]);
    }

    #[test]
    fn clipped_trailing_column_consumes_index_without_rect() {
        // 40px wide: scan width 24, so the column at x=16 ends at 32 > 24.
        let cells = slice_tileset(&tileset(16, 0, 0), 40, 16);
        assert_eq!(cells, vec![(1, TileRect::new(0, 0, 16, 16))]);

        let cells = slice_tileset(&tileset(16, 0, 0), 40, 32);
        assert_eq!(cells.iter().map(|c| c.0).collect::<Vec<_>>(), vec![1, 3]);
    }
}
