use image::RgbaImage;

use crate::foundation::core::Offset;

/// Straight (non-premultiplied) RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Source-over for straight-alpha pixels.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    let dst_w = mul_div255(da, inv);
    let out_a = sa + dst_w;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = u32::from(src[i]) * sa + u32::from(dst[i]) * dst_w;
        out[i] = ((c + out_a / 2) / out_a).min(255) as u8;
    }
    out[3] = out_a.min(255) as u8;
    out
}

fn mul_div255(x: u32, y: u32) -> u32 {
    (x * y + 127) / 255
}

/// Rectangle of a source image, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SrcRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl SrcRect {
    /// Rectangle covering all of `img`.
    pub fn full(img: &RgbaImage) -> Self {
        Self {
            x: 0,
            y: 0,
            width: img.width(),
            height: img.height(),
        }
    }
}

/// Blend `src` over `dst` with its top-left at `at`. Pixels outside `dst` are dropped.
pub fn blit_over(dst: &mut RgbaImage, src: &RgbaImage, at: Offset) {
    blit_rect_over(
        dst,
        src,
        SrcRect::full(src),
        i64::from(at.x),
        i64::from(at.y),
    );
}

/// Blend the `rect` region of `src` over `dst` with its top-left at `(x, y)`.
///
/// `(x, y)` may be negative or past the edges; only the overlap is touched.
pub fn blit_rect_over(dst: &mut RgbaImage, src: &RgbaImage, rect: SrcRect, x: i64, y: i64) {
    let (dw, dh) = (i64::from(dst.width()), i64::from(dst.height()));
    let rw = i64::from(rect.width.min(src.width().saturating_sub(rect.x)));
    let rh = i64::from(rect.height.min(src.height().saturating_sub(rect.y)));

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + rw).min(dw);
    let y1 = (y + rh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for ty in y0..y1 {
        let sy = rect.y + (ty - y) as u32;
        for tx in x0..x1 {
            let sx = rect.x + (tx - x) as u32;
            let s = src.get_pixel(sx, sy).0;
            if s[3] == 0 {
                continue;
            }
            let d = dst.get_pixel_mut(tx as u32, ty as u32);
            d.0 = over(d.0, s);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
