// src/loader/json_loader.rs
use crate::error::MapError;
use crate::geom::Mirror;
use crate::ir_map::*;
use crate::spatial::{RawGid, TileId, GID_MASK};
use crate::surface::parse_hex_color;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    width: usize,
    #[serde(default)]
    height: usize,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
    #[serde(default)]
    objects: Vec<JsonObject>,
    #[serde(default)]
    layers: Vec<JsonLayer>,
}

fn default_true() -> bool {
    true
}

/// Either an external reference (`source`) or an embedded definition.
#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    embedded: Option<JsonTileset>,
}

#[derive(Deserialize)]
struct JsonMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
}

#[derive(Deserialize)]
struct JsonTileset {
    #[serde(default)]
    name: String,
    tilewidth: u32,
    tileheight: u32,
    tilecount: u32,
    image: String,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    transparentcolor: Option<String>,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    gid: Option<u32>,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, MapError> {
    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn tileset_to_ir(ts: JsonTileset, first_gid: u32, base_dir: &Path) -> Result<IrTileset, MapError> {
    if ts.tilewidth == 0 || ts.tileheight == 0 {
        return Err(MapError::InvalidMap(format!(
            "Tileset '{}' has a zero tile size",
            ts.name
        )));
    }
    if first_gid == 0 {
        return Err(MapError::InvalidMap(format!(
            "Tileset '{}' has firstgid 0",
            ts.name
        )));
    }
    // last GID of the range must still fit below the flip bits
    match first_gid.checked_add(ts.tilecount) {
        Some(end) if first_gid <= GID_MASK && end - 1 <= GID_MASK => {}
        _ => {
            return Err(MapError::InvalidMap(format!(
                "Tileset '{}' GID range {first_gid}+{} exceeds {GID_MASK:#x}",
                ts.name, ts.tilecount
            )))
        }
    }
    let transparent = match ts.transparentcolor.as_deref() {
        Some(hex) => Some(parse_hex_color(hex).ok_or_else(|| {
            MapError::InvalidMap(format!(
                "Tileset '{}' has malformed transparentcolor '{hex}'",
                ts.name
            ))
        })?),
        None => None,
    };

    Ok(IrTileset {
        name: ts.name,
        first_gid,
        image: base_dir.join(ts.image),
        tile_w: ts.tilewidth,
        tile_h: ts.tileheight,
        tilecount: ts.tilecount,
        spacing: ts.spacing,
        margin: ts.margin,
        transparent,
    })
}

/// Object flip from the GID's flip bits. Horizontal wins when both are set.
fn object_flip(raw: RawGid) -> Option<Mirror> {
    if raw.flip_h() {
        Some(Mirror::Horizontal)
    } else if raw.flip_v() {
        Some(Mirror::Vertical)
    } else {
        None
    }
}

struct LayerSink<'a> {
    map_w: u32,
    map_h: u32,
    max_gid: u32,
    registry: &'a mut GidRegistry,
    layers: Vec<IrLayer>,
    objects: Vec<IrObject>,
}

impl LayerSink<'_> {
    fn push(&mut self, l: JsonLayer, parent_visible: bool) -> Result<(), MapError> {
        let visible = parent_visible && l.visible;
        match l.kind.as_deref().unwrap_or("tilelayer") {
            "tilelayer" => {
                let expected = (self.map_w as usize) * (self.map_h as usize);
                if l.width != self.map_w as usize
                    || l.height != self.map_h as usize
                    || l.data.len() != expected
                {
                    return Err(MapError::InvalidLayerSize {
                        layer: l.name,
                        expected,
                        actual: l.data.len(),
                    });
                }

                let mut data = Vec::with_capacity(l.data.len());
                for raw in l.data {
                    let raw = RawGid(raw);
                    if raw.clean() > self.max_gid {
                        return Err(MapError::InvalidTileGid {
                            layer: l.name,
                            gid: raw.clean(),
                            max_gid: self.max_gid,
                        });
                    }
                    data.push(self.registry.register(raw).0);
                }
                self.layers.push(IrLayer {
                    name: l.name,
                    visible,
                    data,
                });
            }
            "objectgroup" => {
                for obj in l.objects {
                    let (gid, flip) = match obj.gid.map(RawGid) {
                        Some(raw) => {
                            if raw.clean() == 0 || raw.clean() > self.max_gid {
                                return Err(MapError::InvalidObjectGid {
                                    layer: l.name,
                                    object_id: obj.id,
                                    gid: raw.clean(),
                                    max_gid: self.max_gid,
                                });
                            }
                            // Flips are applied through `flip`, so the image is the unflipped tile.
                            (TileId(raw.clean()), object_flip(raw))
                        }
                        None => (TileId::EMPTY, None),
                    };
                    self.objects.push(IrObject {
                        id: obj.id,
                        name: obj.name,
                        x: obj.x,
                        y: obj.y,
                        rotation: obj.rotation,
                        visible: visible && obj.visible,
                        gid,
                        flip,
                    });
                }
            }
            "group" => {
                for child in l.layers {
                    self.push(child, visible)?;
                }
            }
            other => debug!(layer = %l.name, kind = other, "skipping unsupported layer type"),
        }
        Ok(())
    }
}

/// Decodes a Tiled JSON map already in memory. Relative paths (external
/// tilesets, images) resolve against `base_dir`.
pub fn decode_map_str(json: &str, base_dir: &Path) -> Result<IrMap, MapError> {
    let j: JsonMap = serde_json::from_str(json).map_err(|source| MapError::Json {
        path: base_dir.to_path_buf(),
        source,
    })?;
    decode_json_map(j, base_dir)
}

pub fn decode_map_file_to_ir(path: impl AsRef<Path>) -> Result<IrMap, MapError> {
    let p = path.as_ref();
    if p.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(MapError::UnsupportedFormat(p.display().to_string()));
    }

    let j: JsonMap = read_json(p)?;
    let map_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    decode_json_map(j, &map_dir)
}

fn decode_json_map(j: JsonMap, map_dir: &Path) -> Result<IrMap, MapError> {
    if j.width == 0 || j.height == 0 || j.tilewidth == 0 || j.tileheight == 0 {
        return Err(MapError::InvalidMap(format!(
            "Map dimensions must be nonzero, got {}x{} tiles of {}x{}",
            j.width, j.height, j.tilewidth, j.tileheight
        )));
    }

    // Build IR tilesets
    let mut ir_tilesets = Vec::with_capacity(j.tilesets.len());
    for ts in j.tilesets {
        let tileset = match (ts.source, ts.embedded) {
            (Some(source), _) => {
                if !source.ends_with(".json") {
                    return Err(MapError::UnsupportedFormat(source));
                }
                let ts_path = map_dir.join(&source);
                let ext: JsonTileset = read_json(&ts_path)?;
                let ts_dir = ts_path.parent().unwrap_or(map_dir).to_path_buf();
                tileset_to_ir(ext, ts.firstgid, &ts_dir)?
            }
            (None, Some(embedded)) => tileset_to_ir(embedded, ts.firstgid, map_dir)?,
            (None, None) => {
                return Err(MapError::InvalidMap(format!(
                    "Tileset at firstgid {} has neither a source nor an image",
                    ts.firstgid
                )))
            }
        };
        ir_tilesets.push(tileset);
    }

    // Sort by first_gid to make GID range checks trivial
    ir_tilesets.sort_by_key(|t| t.first_gid);

    let max_gid = ir_tilesets.iter().map(IrTileset::last_gid).max().unwrap_or(0);

    let mut registry = GidRegistry::new(max_gid);
    let mut sink = LayerSink {
        map_w: j.width,
        map_h: j.height,
        max_gid,
        registry: &mut registry,
        layers: Vec::new(),
        objects: Vec::new(),
    };
    for l in j.layers {
        sink.push(l, true)?;
    }
    let LayerSink { layers, objects, .. } = sink;

    debug!(
        tilesets = ir_tilesets.len(),
        layers = layers.len(),
        objects = objects.len(),
        "decoded map"
    );

    Ok(IrMap {
        width: j.width,
        height: j.height,
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        tilesets: ir_tilesets,
        layers,
        objects,
        registry,
    })
}
