//! Linear barcode rasterisation.
//!
//! Symbol encoding is delegated to `barcoders`; this module turns the module
//! pattern into pixels and optionally prints the payload under the bars.

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::{
    assets::font::BitmapFont,
    foundation::error::{CardError, CardResult, CompositionStage},
    render::{composite::Rgba8, text::draw_text_centered},
};

/// Supported symbologies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Symbology {
    /// Code 128, code set B (printable ASCII).
    #[default]
    Code128,
}

/// Rendering knobs for a barcode raster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarcodeOptions {
    /// Symbology to encode with.
    pub symbology: Symbology,
    /// Width of one module in pixels.
    pub module_width: u32,
    /// Height of the bars in pixels.
    pub bar_height: u32,
    /// Blank modules left and right of the symbol.
    pub quiet_zone_modules: u32,
    /// Print the payload centred beneath the bars.
    pub human_readable: bool,
    /// Vertical gap between bars and printed text.
    pub text_gap: u32,
    /// Bar colour.
    pub foreground: Rgba8,
    /// Space colour; fully transparent lets the card show through.
    pub background: Rgba8,
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            symbology: Symbology::Code128,
            module_width: 2,
            bar_height: 57,
            quiet_zone_modules: 0,
            human_readable: true,
            text_gap: 5,
            foreground: [0, 0, 0, 255],
            background: [255, 255, 255, 0],
        }
    }
}

/// Rendered barcode plus what it encodes.
#[derive(Clone, Debug)]
pub struct BarcodeRaster {
    /// Payload the bars encode.
    pub payload: String,
    /// Symbology used.
    pub symbology: Symbology,
    /// Module pattern, `1` for bar and `0` for space, without quiet zone.
    pub modules: Vec<u8>,
    /// Pixels: quiet zone, bars, and the optional text line.
    pub image: RgbaImage,
}

/// Turns a text payload into a barcode raster.
pub trait BarcodeEncoder: Send + Sync {
    /// Encode `payload`. Errors are reported at the barcode stage.
    fn encode(&self, payload: &str, opts: &BarcodeOptions) -> CardResult<BarcodeRaster>;
}

/// Code 128 encoder backed by `barcoders`.
#[derive(Clone, Debug, Default)]
pub struct Code128Encoder {
    label_font: Option<Arc<BitmapFont>>,
}

/// Code set B selector understood by `barcoders`.
const CODE_SET_B: char = '\u{0181}';

impl Code128Encoder {
    /// Encoder without a label font; `human_readable` is ignored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Print human readable text with `font`.
    pub fn with_label_font(mut self, font: Arc<BitmapFont>) -> Self {
        self.label_font = Some(font);
        self
    }

    /// Module pattern for `payload` in code set B.
    pub fn modules(payload: &str) -> CardResult<Vec<u8>> {
        if payload.is_empty() {
            return Err(barcode_err("payload must be non-empty"));
        }
        if let Some(bad) = payload.chars().find(|c| !(' '..='~').contains(c)) {
            return Err(barcode_err(format!(
                "{bad:?} cannot be encoded in Code 128 set B"
            )));
        }

        let sym = barcoders::sym::code128::Code128::new(format!("{CODE_SET_B}{payload}"))
            .map_err(|e| barcode_err(format!("encode {payload:?}: {e}")))?;
        Ok(sym.encode())
    }
}

impl BarcodeEncoder for Code128Encoder {
    fn encode(&self, payload: &str, opts: &BarcodeOptions) -> CardResult<BarcodeRaster> {
        if opts.module_width == 0 || opts.bar_height == 0 {
            return Err(barcode_err("module width and bar height must be > 0"));
        }
        let modules = match opts.symbology {
            Symbology::Code128 => Self::modules(payload)?,
        };

        let total_modules = modules.len() as u32 + 2 * opts.quiet_zone_modules;
        let width = total_modules
            .checked_mul(opts.module_width)
            .ok_or_else(|| barcode_err("barcode too wide"))?;

        let label = self.label_font.as_deref().filter(|_| opts.human_readable);
        let text_height = label.map_or(0, |f| opts.text_gap + f.line_height());
        let height = opts.bar_height + text_height;

        let mut image = RgbaImage::from_pixel(width, height, Rgba(opts.background));
        let left = opts.quiet_zone_modules * opts.module_width;
        for (i, m) in modules.iter().enumerate() {
            if *m == 0 {
                continue;
            }
            let x0 = left + i as u32 * opts.module_width;
            for x in x0..x0 + opts.module_width {
                for y in 0..opts.bar_height {
                    image.put_pixel(x, y, Rgba(opts.foreground));
                }
            }
        }

        if let Some(font) = label {
            draw_text_centered(
                &mut image,
                font,
                i64::from(width / 2),
                i64::from(opts.bar_height + opts.text_gap),
                payload,
            )
            .map_err(|e| barcode_err(format!("label: {e}")))?;
        }

        tracing::trace!(payload, modules = modules.len(), width, height, "barcode rendered");
        Ok(BarcodeRaster {
            payload: payload.to_string(),
            symbology: opts.symbology,
            modules,
            image,
        })
    }
}

fn barcode_err(msg: impl Into<String>) -> CardError {
    CardError::composition(CompositionStage::Barcode, msg)
}

#[cfg(test)]
#[path = "../../tests/unit/barcode/mod.rs"]
mod tests;
