// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tmx_viewport::{
    DrawBackend, GidRegistry, ImageDecoder, IrLayer, IrMap, IrObject, IrTileset, Mirror,
    PixelFormat, Rect, Size, Surface, TextureFactory, TileId, TileRect,
};

/// Serves surfaces from memory; unknown paths fail to decode.
#[derive(Default)]
pub struct FakeDecoder {
    images: HashMap<PathBuf, Surface>,
}

impl FakeDecoder {
    pub fn with(mut self, path: impl Into<PathBuf>, surface: Surface) -> Self {
        self.images.insert(path.into(), surface);
        self
    }
}

impl ImageDecoder for FakeDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<Surface> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such image: {}", path.display()))
    }
}

pub fn rgba(w: u32, h: u32) -> Surface {
    Surface::rgba8(w, h, vec![0; (w * h * 4) as usize])
}

pub fn indexed(w: u32, h: u32, palette: Vec<[u8; 3]>) -> Surface {
    Surface::indexed(w, h, palette, vec![0; (w * h) as usize])
}

#[derive(Debug)]
pub struct FakeTexture {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub color_key: Option<u8>,
    released: Rc<RefCell<Vec<usize>>>,
}

impl Drop for FakeTexture {
    fn drop(&mut self) {
        self.released.borrow_mut().push(self.id);
    }
}

#[derive(Default)]
pub struct FakeFactory {
    pub created: usize,
    released: Rc<RefCell<Vec<usize>>>,
}

impl FakeFactory {
    pub fn released(&self) -> Vec<usize> {
        let mut ids = self.released.borrow().clone();
        ids.sort_unstable();
        ids
    }
}

impl TextureFactory for FakeFactory {
    type Texture = FakeTexture;

    fn create_texture(&mut self, surface: &Surface) -> FakeTexture {
        let id = self.created;
        self.created += 1;
        let color_key = match &surface.format {
            PixelFormat::Indexed { color_key, .. } => *color_key,
            PixelFormat::Rgba8 => None,
        };
        FakeTexture {
            id,
            width: surface.width,
            height: surface.height,
            color_key,
            released: Rc::clone(&self.released),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyCall {
    pub texture: usize,
    pub src: TileRect,
    pub dst: Rect,
    pub rotation: f32,
    pub mirror: Mirror,
}

pub struct FakeBackend {
    pub viewport: Size,
    pub copies: Vec<CopyCall>,
}

impl FakeBackend {
    pub fn new(w: f32, h: f32) -> Self {
        Self {
            viewport: Size::new(w, h),
            copies: Vec::new(),
        }
    }
}

impl DrawBackend for FakeBackend {
    type Texture = FakeTexture;

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn copy(
        &mut self,
        texture: &FakeTexture,
        src: TileRect,
        dst: Rect,
        rotation: f32,
        mirror: Mirror,
    ) {
        self.copies.push(CopyCall {
            texture: texture.id,
            src,
            dst,
            rotation,
            mirror,
        });
    }
}

pub fn tileset(image: &str, first_gid: u32, tile: u32, tilecount: u32) -> IrTileset {
    IrTileset {
        name: image.trim_end_matches(".png").to_owned(),
        first_gid,
        image: PathBuf::from(image),
        tile_w: tile,
        tile_h: tile,
        tilecount,
        spacing: 0,
        margin: 0,
        transparent: None,
    }
}

/// A `w`×`h` map with 16px tiles from a single 160×160 tileset (100 tiles).
/// The layer numbers its cells row-major, so cell `(x, y)` holds gid
/// `y * w + x + 1`.
pub fn numbered_map(w: u32, h: u32) -> IrMap {
    let data = (0..w * h).map(|i| i % 100 + 1).collect();
    IrMap {
        width: w,
        height: h,
        tile_w: 16,
        tile_h: 16,
        tilesets: vec![tileset("tiles.png", 1, 16, 100)],
        layers: vec![IrLayer {
            name: "ground".into(),
            visible: true,
            data,
        }],
        objects: Vec::new(),
        registry: GidRegistry::new(100),
    }
}

pub fn numbered_decoder() -> FakeDecoder {
    FakeDecoder::default().with("tiles.png", rgba(160, 160))
}

/// Source rect of gid `n` in the 160×160 numbered tileset.
pub fn numbered_rect(n: u32) -> TileRect {
    TileRect::new((n - 1) % 10 * 16, (n - 1) / 10 * 16, 16, 16)
}

pub fn object(x: f32, y: f32, gid: u32) -> IrObject {
    IrObject {
        id: 1,
        name: String::new(),
        x,
        y,
        rotation: 0.0,
        visible: true,
        gid: TileId(gid),
        flip: None,
    }
}
