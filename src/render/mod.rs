//! Per-frame viewport culling and draw command generation.

mod cull;

pub use cull::{clamp_edge, map_cell, visible_tiles, EdgePolicy, TileSpan, OVERSCAN_TILES};

use crate::atlas::{TextureId, TileAtlas};
use crate::geom::{Mirror, Size, TileRect};
use crate::ir_map::MapSource;
use macroquad::math::{Rect, Vec2};
use serde::Deserialize;
use tracing::trace;

/// One tile or object copy onto the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub texture: TextureId,
    pub src: TileRect,
    pub dst: Rect,
    /// Degrees, clockwise, around the center of `dst`.
    pub rotation: f32,
    pub mirror: Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub edge_policy: EdgePolicy,
}

/// The drawing surface the commands are replayed on.
pub trait DrawBackend {
    type Texture;

    /// Current viewport size in pixels.
    fn viewport(&self) -> Size;

    fn copy(
        &mut self,
        texture: &Self::Texture,
        src: TileRect,
        dst: Rect,
        rotation: f32,
        mirror: Mirror,
    );
}

/// Computes the draw commands for one frame: every visible tile layer back
/// to front, then every visible object in declared order.
///
/// Tile size is taken from the first tileset and applied map-wide.
///
/// # Panics
///
/// If the map has zero width or height, no tilesets, or a zero tile size,
/// or if a visible layer does not hold exactly `width * height` cells.
pub fn render_frame<T, M>(
    atlas: &TileAtlas<T>,
    map: &M,
    origin: Vec2,
    viewport: Size,
    config: &RenderConfig,
) -> Vec<DrawCommand>
where
    M: MapSource + ?Sized,
{
    assert!(
        map.width() > 0 && map.height() > 0,
        "map dimensions must be nonzero, got {}x{}",
        map.width(),
        map.height()
    );
    let Some(first) = map.tilesets().first() else {
        panic!("cannot render a map without tilesets");
    };
    let (tw, th) = (first.tile_w, first.tile_h);
    assert!(tw > 0 && th > 0, "tile size must be nonzero, got {tw}x{th}");

    let span = visible_tiles(origin, viewport, tw, th);
    let (max_x, max_y) = (map.width() - 1, map.height() - 1);
    let (twf, thf) = (tw as f32, th as f32);
    let cells = map.width() as usize * map.height() as usize;

    let mut out = Vec::new();

    for (layer_idx, layer) in map.tile_layers().iter().enumerate() {
        if !layer.visible {
            continue;
        }
        assert_eq!(
            layer.data.len(),
            cells,
            "layer '{}' does not match the {}x{} map",
            layer.name,
            map.width(),
            map.height()
        );
        for y in span.y0..=span.y1 {
            for x in span.x0..=span.x1 {
                let Some((cx, cy)) = map_cell(x, y, max_x, max_y, config.edge_policy) else {
                    continue;
                };
                // blank area
                let Some((gid, orientation)) = map.tile_at(cx, cy, layer_idx) else {
                    continue;
                };
                let Some(entry) = atlas.get(gid) else {
                    continue;
                };

                let (rotation, mirror) = orientation.transform();
                out.push(DrawCommand {
                    texture: entry.texture,
                    src: entry.rect,
                    dst: Rect::new(x as f32 * twf - origin.x, y as f32 * thf - origin.y, twf, thf),
                    rotation,
                    mirror,
                });
            }
        }
    }

    // Object coordinates are in pixels, anchored bottom-left.
    for ob in map.objects() {
        if !ob.visible || ob.gid.is_empty() {
            continue;
        }
        let Some(entry) = atlas.get(ob.gid) else {
            continue;
        };
        out.push(DrawCommand {
            texture: entry.texture,
            src: entry.rect,
            dst: Rect::new(
                ob.x.floor() - origin.x,
                ob.y.floor() - origin.y - thf,
                twf,
                thf,
            ),
            rotation: ob.rotation,
            mirror: ob.flip.unwrap_or_default(),
        });
    }

    trace!(commands = out.len(), x0 = span.x0, y0 = span.y0, "rendered frame");
    out
}

/// Replays `commands` on `backend`.
pub fn submit<B>(backend: &mut B, atlas: &TileAtlas<B::Texture>, commands: &[DrawCommand])
where
    B: DrawBackend + ?Sized,
{
    for cmd in commands {
        backend.copy(atlas.texture(cmd.texture), cmd.src, cmd.dst, cmd.rotation, cmd.mirror);
    }
}
