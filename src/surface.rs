//! Decoded tileset pixels, prior to texture upload.

/// Pixel layout of a decoded [`Surface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    /// One byte per pixel indexing into `palette`. `color_key` marks the
    /// palette entry drawn fully transparent.
    Indexed {
        palette: Vec<[u8; 3]>,
        color_key: Option<u8>,
    },
    /// Four bytes per pixel.
    Rgba8,
}

#[derive(Debug, Clone)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl Surface {
    pub fn rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels,
        }
    }

    pub fn indexed(width: u32, height: u32, palette: Vec<[u8; 3]>, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            format: PixelFormat::Indexed {
                palette,
                color_key: None,
            },
            pixels,
        }
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.format, PixelFormat::Indexed { .. })
    }

    /// Marks `rgb` as the transparent color.
    ///
    /// Only indexed surfaces can carry a key; on any other format, or when
    /// the palette has no such color, this returns `false` and leaves the
    /// surface untouched.
    pub fn set_color_key(&mut self, rgb: [u8; 3]) -> bool {
        match &mut self.format {
            PixelFormat::Indexed { palette, color_key } => {
                match palette.iter().position(|c| *c == rgb) {
                    Some(i) => {
                        *color_key = Some(i as u8);
                        true
                    }
                    None => false,
                }
            }
            PixelFormat::Rgba8 => false,
        }
    }

    /// Expands the surface to tightly packed RGBA8.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match &self.format {
            PixelFormat::Rgba8 => self.pixels.clone(),
            PixelFormat::Indexed { palette, color_key } => {
                let mut out = Vec::with_capacity(self.pixels.len() * 4);
                for &idx in &self.pixels {
                    let [r, g, b] = palette.get(idx as usize).copied().unwrap_or([0, 0, 0]);
                    let a = if *color_key == Some(idx) { 0 } else { 255 };
                    out.extend_from_slice(&[r, g, b, a]);
                }
                out
            }
        }
    }
}

/// Parses a Tiled color string (`#rrggbb`, `rrggbb` or `#aarrggbb`) into RGB.
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !hex.is_ascii() {
        return None;
    }
    let hex = match hex.len() {
        6 => hex,
        8 => &hex[2..],
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
