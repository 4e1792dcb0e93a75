use crate::geom::Mirror;
use crate::spatial::{Orientation, RawGid, TileId};
use std::collections::HashMap;
use std::path::PathBuf;

/// Canonical, format-agnostic map.
#[derive(Debug, Clone)]
pub struct IrMap {
    pub width: u32,
    pub height: u32,
    /// Tile size declared by the map file. Informational only: rendering
    /// uses the first tileset's tile size.
    pub tile_w: u32,
    pub tile_h: u32,
    pub tilesets: Vec<IrTileset>, // must be sorted by first_gid
    pub layers: Vec<IrLayer>,     // draw order: array order
    pub objects: Vec<IrObject>,   // draw order: array order
    pub registry: GidRegistry,
}

/// One image atlas with a regular grid.
#[derive(Debug, Clone)]
pub struct IrTileset {
    pub name: String,
    pub first_gid: u32,
    pub image: PathBuf,
    pub tile_w: u32,
    pub tile_h: u32,
    pub tilecount: u32,
    pub spacing: u32, // 0 if not used
    pub margin: u32,  // 0 if not used
    pub transparent: Option<[u8; 3]>,
}

impl IrTileset {
    #[inline]
    pub fn last_gid(&self) -> u32 {
        self.first_gid.saturating_add(self.tilecount).saturating_sub(1)
    }
}

/// A tile layer. `data` holds canonical GIDs in row-major order, 0 for blank.
#[derive(Debug, Clone)]
pub struct IrLayer {
    pub name: String,
    pub visible: bool,
    pub data: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct IrObject {
    pub id: u32,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub visible: bool,
    /// Canonical GID, `TileId::EMPTY` for shapes without an image.
    pub gid: TileId,
    pub flip: Option<Mirror>,
}

/// Assigns canonical GIDs to flipped tile references.
///
/// The unflipped variant of a tile keeps its Tiled GID. Every distinct
/// flipped variant gets a fresh GID above the last tileset GID, so the
/// atlas can hold one entry per (tile, orientation) actually used.
#[derive(Debug, Clone, Default)]
pub struct GidRegistry {
    next: u32,
    by_variant: HashMap<(u32, Orientation), TileId>,
    variants: HashMap<u32, Vec<(TileId, Orientation)>>,
    orientation: HashMap<TileId, Orientation>,
}

impl GidRegistry {
    pub fn new(max_gid: u32) -> Self {
        Self {
            next: max_gid.saturating_add(1),
            ..Default::default()
        }
    }

    /// Maps a raw Tiled GID (flip bits included) to its canonical GID.
    pub fn register(&mut self, raw: RawGid) -> TileId {
        let clean = raw.clean();
        if clean == 0 {
            return TileId::EMPTY;
        }
        let orientation = raw.orientation();
        if orientation == Orientation::Identity {
            return TileId(clean);
        }
        if let Some(&id) = self.by_variant.get(&(clean, orientation)) {
            return id;
        }

        let id = TileId(self.next);
        self.next += 1;
        self.by_variant.insert((clean, orientation), id);
        self.variants.entry(clean).or_default().push((id, orientation));
        self.orientation.insert(id, orientation);
        id
    }

    /// Every (canonical GID, orientation) pair known for a Tiled GID.
    /// The unflipped variant is always included.
    pub fn resolve(&self, clean: u32) -> Vec<(TileId, Orientation)> {
        if clean == 0 {
            return Vec::new();
        }
        let mut out = vec![(TileId(clean), Orientation::Identity)];
        if let Some(v) = self.variants.get(&clean) {
            out.extend_from_slice(v);
        }
        out
    }

    pub fn orientation_of(&self, id: TileId) -> Orientation {
        self.orientation.get(&id).copied().unwrap_or_default()
    }
}

/// Read access the atlas builder and renderer need from a map.
pub trait MapSource {
    /// Map width in tiles.
    fn width(&self) -> u32;
    /// Map height in tiles.
    fn height(&self) -> u32;
    fn tilesets(&self) -> &[IrTileset];
    /// All tile layers in draw order, including hidden ones.
    fn tile_layers(&self) -> &[IrLayer];
    fn objects(&self) -> &[IrObject];
    /// Resolves a raw tile index to its canonical identities.
    fn resolve(&self, raw: u32) -> Vec<(TileId, Orientation)>;
    /// The tile at `(x, y)` on `layer`, or `None` for a blank cell.
    fn tile_at(&self, x: u32, y: u32, layer: usize) -> Option<(TileId, Orientation)>;
}

impl MapSource for IrMap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn tilesets(&self) -> &[IrTileset] {
        &self.tilesets
    }

    fn tile_layers(&self) -> &[IrLayer] {
        &self.layers
    }

    fn objects(&self) -> &[IrObject] {
        &self.objects
    }

    fn resolve(&self, raw: u32) -> Vec<(TileId, Orientation)> {
        self.registry.resolve(raw)
    }

    fn tile_at(&self, x: u32, y: u32, layer: usize) -> Option<(TileId, Orientation)> {
        let layer = self.layers.get(layer)?;
        let idx = (y as usize) * (self.width as usize) + x as usize;
        let gid = TileId(*layer.data.get(idx)?);
        if gid.is_empty() {
            return None;
        }
        Some((gid, self.registry.orientation_of(gid)))
    }
}
