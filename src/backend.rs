//! Macroquad implementations of the decoder, texture factory and draw backend.

use crate::atlas::{ImageDecoder, TextureFactory};
use crate::geom::{Mirror, Size, TileRect};
use crate::render::DrawBackend;
use crate::surface::Surface;
use anyhow::Context;
use macroquad::prelude::*;
use std::path::Path;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Reads image files from disk and decodes them.
///
/// 8-bit palette PNGs stay indexed so a tileset color key can be applied.
/// Everything else goes through macroquad's codecs and comes out as RGBA.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacroquadDecoder;

impl ImageDecoder for MacroquadDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<Surface> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Reading image {}", path.display()))?;
        if bytes.starts_with(&PNG_SIGNATURE) {
            let indexed = decode_indexed_png(&bytes)
                .with_context(|| format!("Decoding image {}", path.display()))?;
            if let Some(surface) = indexed {
                return Ok(surface);
            }
        }
        let img = Image::from_file_with_format(&bytes, None)
            .map_err(|e| anyhow::anyhow!("Decoding image {}: {e}", path.display()))?;
        Ok(Surface::rgba8(u32::from(img.width), u32::from(img.height), img.bytes))
    }
}

/// Decodes `bytes` as an indexed surface if it is an 8-bit palette PNG.
fn decode_indexed_png(bytes: &[u8]) -> anyhow::Result<Option<Surface>> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let info = reader.info();
    if info.color_type != png::ColorType::Indexed || info.bit_depth != png::BitDepth::Eight {
        return Ok(None);
    }
    let Some(palette) = info.palette.as_ref() else {
        anyhow::bail!("indexed PNG without a palette");
    };
    let palette: Vec<[u8; 3]> = palette.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
    let (width, height) = (info.width, info.height);

    let mut pixels = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut pixels)?;
    pixels.truncate(frame.buffer_size());
    Ok(Some(Surface::indexed(width, height, palette, pixels)))
}

/// Draws onto the current macroquad render target. Requires a live
/// macroquad context.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacroquadBackend;

impl TextureFactory for MacroquadBackend {
    type Texture = Texture2D;

    fn create_texture(&mut self, surface: &Surface) -> Texture2D {
        let (w, h) = (surface.width as u16, surface.height as u16);
        let tex = Texture2D::from_rgba8(w, h, &surface.to_rgba8());
        tex.set_filter(FilterMode::Nearest);
        tex
    }
}

impl DrawBackend for MacroquadBackend {
    type Texture = Texture2D;

    fn viewport(&self) -> Size {
        Size::new(screen_width(), screen_height())
    }

    fn copy(
        &mut self,
        texture: &Texture2D,
        src: TileRect,
        dst: Rect,
        rotation: f32,
        mirror: Mirror,
    ) {
        draw_texture_ex(
            texture,
            dst.x,
            dst.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dst.w, dst.h)),
                source: Some(Rect::new(src.x as f32, src.y as f32, src.w as f32, src.h as f32)),
                rotation: rotation.to_radians(),
                flip_x: mirror == Mirror::Horizontal,
                flip_y: mirror == Mirror::Vertical,
                pivot: None,
            },
        );
    }
}
