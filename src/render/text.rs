use image::RgbaImage;

use crate::{
    assets::font::BitmapFont,
    foundation::{
        core::Offset,
        error::{CardError, CardResult, CompositionStage},
    },
    render::composite::{SrcRect, blit_rect_over},
};

/// Draw `text` as one left-aligned line whose top is at `at.y`.
///
/// Each glyph quad lands at `(pen + xoffset, top + yoffset)`, which puts the
/// baseline at `top + font.base()`. Characters without a glyph fail the whole
/// call before anything is drawn.
pub fn draw_text(dst: &mut RgbaImage, font: &BitmapFont, at: Offset, text: &str) -> CardResult<()> {
    if let Err(ch) = font.measure(text) {
        return Err(CardError::composition(
            CompositionStage::Text,
            format!("font '{}' has no glyph for {ch:?} in {text:?}", font.face()),
        ));
    }
    draw_text_unchecked(dst, font, i64::from(at.x), i64::from(at.y), text);
    Ok(())
}

/// Draw `text` horizontally centred on `center_x`.
pub fn draw_text_centered(
    dst: &mut RgbaImage,
    font: &BitmapFont,
    center_x: i64,
    top: i64,
    text: &str,
) -> CardResult<()> {
    let width = font.measure(text).map_err(|ch| {
        CardError::composition(
            CompositionStage::Text,
            format!("font '{}' has no glyph for {ch:?} in {text:?}", font.face()),
        )
    })?;
    draw_text_unchecked(dst, font, center_x - width / 2, top, text);
    Ok(())
}

fn draw_text_unchecked(dst: &mut RgbaImage, font: &BitmapFont, x: i64, top: i64, text: &str) {
    let mut pen = x;
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        let Some(g) = font.glyph(ch) else {
            continue;
        };
        if let Some(p) = prev {
            pen += i64::from(font.kerning(p, ch));
        }
        if g.width > 0 && g.height > 0 {
            if let Some(page) = font.page(g.page) {
                let rect = SrcRect {
                    x: g.x,
                    y: g.y,
                    width: g.width,
                    height: g.height,
                };
                blit_rect_over(
                    dst,
                    page,
                    rect,
                    pen + i64::from(g.xoffset),
                    top + i64::from(g.yoffset),
                );
            }
        }
        pen += i64::from(g.xadvance);
        prev = Some(ch);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
