//! Grid snapshot to raster image conversion.

use crate::error::{RenderError, Result};
use cellarium_core::GridSnapshot;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Alive/dead cell colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub alive: Rgb<u8>,
    pub dead: Rgb<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            alive: Rgb([255, 255, 255]),
            dead: Rgb([0, 0, 0]),
        }
    }
}

impl Palette {
    pub fn from_hex(alive: &str, dead: &str) -> Result<Self> {
        Ok(Self {
            alive: parse_hex(alive)?,
            dead: parse_hex(dead)?,
        })
    }
}

/// Parses a `#RRGGBB` color string (leading `#` optional).
pub fn parse_hex(color: &str) -> Result<Rgb<u8>> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RenderError::invalid_color(color));
    }
    let channel = |range| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| RenderError::invalid_color(color))
    };
    Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}

/// Renders a snapshot with each logical cell expanded to
/// `cell_size × cell_size` pixels. The engine is resolution-independent;
/// cell size only matters here.
pub fn render_frame(snapshot: &GridSnapshot, cell_size: u16, palette: &Palette) -> RgbImage {
    let cs = cell_size.max(1) as u32;
    let img_w = snapshot.width as u32 * cs;
    let img_h = snapshot.height as u32 * cs;
    let mut image = RgbImage::from_pixel(img_w, img_h, palette.dead);

    for (y, row) in snapshot.grid.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if *cell == 0 {
                continue;
            }
            let x0 = x as u32 * cs;
            let y0 = y as u32 * cs;
            for dy in 0..cs {
                for dx in 0..cs {
                    image.put_pixel(x0 + dx, y0 + dy, palette.alive);
                }
            }
        }
    }
    image
}

/// Encodes an image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
