use crate::atlas::{build_atlas, ImageDecoder, TextureFactory, TileAtlas};
use crate::backend::{MacroquadBackend, MacroquadDecoder};
use crate::error::MapError;
use crate::geom::Size;
use crate::ir_map::IrMap;
use crate::loader::json_loader::decode_map_file_to_ir;
use crate::render::{render_frame, submit, DrawBackend, DrawCommand, RenderConfig};
use macroquad::prelude::{Texture2D, Vec2};
use std::path::Path;
use tracing::info;

/// A decoded map together with the atlas built for it.
pub struct Map<T> {
    pub ir: IrMap,
    pub atlas: TileAtlas<T>,
    pub config: RenderConfig,
}

impl Map<Texture2D> {
    /// Loads a Tiled JSON map and uploads its tilesets as macroquad textures.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        Self::load_with(path, &MacroquadDecoder, &mut MacroquadBackend)
    }
}

impl<T> Map<T> {
    pub fn load_with<D, F>(
        path: impl AsRef<Path>,
        decoder: &D,
        factory: &mut F,
    ) -> Result<Self, MapError>
    where
        D: ImageDecoder + ?Sized,
        F: TextureFactory<Texture = T> + ?Sized,
    {
        let path = path.as_ref();
        let ir = decode_map_file_to_ir(path)?;
        let map = Self::from_ir(ir, decoder, factory)?;
        info!(
            path = %path.display(),
            width = map.ir.width,
            height = map.ir.height,
            tiles = map.atlas.len(),
            "loaded map"
        );
        Ok(map)
    }

    pub fn from_ir<D, F>(ir: IrMap, decoder: &D, factory: &mut F) -> Result<Self, MapError>
    where
        D: ImageDecoder + ?Sized,
        F: TextureFactory<Texture = T> + ?Sized,
    {
        let atlas = build_atlas(&ir, decoder, factory)?;
        Ok(Self {
            ir,
            atlas,
            config: RenderConfig::default(),
        })
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Draw commands for the view whose top-left corner is `origin`.
    pub fn render(&self, origin: Vec2, viewport: Size) -> Vec<DrawCommand> {
        render_frame(&self.atlas, &self.ir, origin, viewport, &self.config)
    }

    /// Renders against the backend's viewport and replays the commands on it.
    pub fn draw<B>(&self, backend: &mut B, origin: Vec2)
    where
        B: DrawBackend<Texture = T> + ?Sized,
    {
        let commands = self.render(origin, backend.viewport());
        submit(backend, &self.atlas, &commands);
    }
}
