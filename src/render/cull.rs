use crate::geom::Size;
use macroquad::math::Vec2;
use serde::Deserialize;

/// Extra tiles drawn past the viewport on the right and bottom, so a camera
/// origin that is not tile-aligned never shows a seam.
pub const OVERSCAN_TILES: i64 = 1;

/// What to draw for tile coordinates outside the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Nothing; the map simply ends.
    #[default]
    Skip,
    /// The nearest edge tile, repeated.
    Repeat,
}

/// Inclusive range of tile coordinates covering the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl TileSpan {
    pub fn columns(&self) -> i64 {
        self.x1 - self.x0 + 1
    }

    pub fn rows(&self) -> i64 {
        self.y1 - self.y0 + 1
    }
}

pub fn visible_tiles(origin: Vec2, viewport: Size, tw: u32, th: u32) -> TileSpan {
    let (tw, th) = (tw as f32, th as f32);
    let x0 = (origin.x / tw).floor() as i64;
    let y0 = (origin.y / th).floor() as i64;
    let cols = (viewport.w / tw).ceil() as i64;
    let rows = (viewport.h / th).ceil() as i64;

    TileSpan {
        x0,
        y0,
        x1: x0 + cols + OVERSCAN_TILES,
        y1: y0 + rows + OVERSCAN_TILES,
    }
}

#[inline]
pub fn clamp_edge(n: i64, limit: i64) -> i64 {
    if n <= 0 {
        0
    } else if n >= limit {
        limit
    } else {
        n
    }
}

/// Map cell to draw for tile coordinate `(x, y)`, given the last valid
/// column and row.
#[inline]
pub fn map_cell(x: i64, y: i64, max_x: u32, max_y: u32, policy: EdgePolicy) -> Option<(u32, u32)> {
    let cx = clamp_edge(x, i64::from(max_x));
    let cy = clamp_edge(y, i64::from(max_y));
    if policy == EdgePolicy::Skip && (cx != x || cy != y) {
        return None;
    }
    Some((cx as u32, cy as u32))
}
