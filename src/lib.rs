//! Tiled map atlas builder and viewport-culling renderer for Macroquad.

mod atlas;
mod backend;
mod error;
mod geom;
mod ir_map;
mod loader {
    pub mod json_loader;
}
mod map;
mod render;
mod spatial;
mod surface;

pub use atlas::{
    build_atlas, scan_extent, slice_tileset, AtlasEntry, ImageDecoder, TextureFactory, TextureId,
    TileAtlas,
};
pub use backend::{MacroquadBackend, MacroquadDecoder};
pub use error::{AssetLoadError, MapError};
pub use geom::{Mirror, Size, TileRect};
pub use ir_map::{GidRegistry, IrLayer, IrMap, IrObject, IrTileset, MapSource};
pub use loader::json_loader::{decode_map_file_to_ir, decode_map_str};
pub use map::Map;
pub use render::{
    clamp_edge, map_cell, render_frame, submit, visible_tiles, DrawBackend, DrawCommand,
    EdgePolicy, RenderConfig, TileSpan, OVERSCAN_TILES,
};
pub use spatial::{Orientation, RawGid, TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
pub use surface::{parse_hex_color, PixelFormat, Surface};

pub use macroquad::math::{Rect, Vec2};
