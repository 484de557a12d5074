use std::{io::Cursor, path::Path};

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{CardError, CardResult};

/// Decode encoded image bytes into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> CardResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Read and decode an image file.
pub fn read_image(path: &Path) -> CardResult<RgbaImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image bytes from '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| match e {
        CardError::Other(err) => {
            CardError::Other(err.context(format!("decode image '{}'", path.display())))
        }
        other => other,
    })
}

/// Encode an RGBA8 raster as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> CardResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
