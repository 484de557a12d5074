//! AngelCode BMFont (text descriptor) loading.
//!
//! A font is a `.fnt` descriptor plus one or more page images holding the glyph
//! atlas. Only the metrics used for single-line, left-aligned printing are kept.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use image::RgbaImage;

use crate::{
    assets::decode,
    foundation::error::{CardError, CardResult},
};

/// Placement and atlas rectangle of one glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Atlas x of the glyph rectangle.
    pub x: u32,
    /// Atlas y of the glyph rectangle.
    pub y: u32,
    /// Rectangle width.
    pub width: u32,
    /// Rectangle height.
    pub height: u32,
    /// Horizontal offset from the pen position when drawing.
    pub xoffset: i32,
    /// Vertical offset from the top of the line when drawing.
    pub yoffset: i32,
    /// Pen advance after drawing.
    pub xadvance: i32,
    /// Atlas page index.
    pub page: u32,
}

/// Parsed `.fnt` text descriptor, before page images are loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontDescriptor {
    /// Face name from the `info` line.
    pub face: String,
    /// Nominal size from the `info` line.
    pub size: i32,
    /// Distance between lines.
    pub line_height: u32,
    /// Distance from the top of a line to the baseline.
    pub base: u32,
    /// Page file names indexed by page id.
    pub page_files: Vec<String>,
    /// Glyphs by character.
    pub glyphs: HashMap<char, Glyph>,
    /// Kerning adjustments by `(first, second)` pair.
    pub kernings: HashMap<(char, char), i32>,
}

impl FontDescriptor {
    /// Parse the BMFont text format.
    pub fn parse(src: &str) -> CardResult<Self> {
        let mut out = Self::default();
        let mut saw_common = false;
        let mut pages: Vec<(u32, String)> = Vec::new();

        for (lineno, raw) in src.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let (tag, attrs) = tokenize(line)
                .map_err(|e| CardError::asset_load(format!("font line {}: {e}", lineno + 1)))?;
            let at = |key: &str| -> CardResult<&str> {
                attrs
                    .get(key)
                    .map(String::as_str)
                    .ok_or_else(|| {
                        CardError::asset_load(format!(
                            "font line {}: '{tag}' is missing '{key}'",
                            lineno + 1
                        ))
                    })
            };
            let num = |key: &str| -> CardResult<i64> {
                let v = at(key)?;
                v.parse::<i64>().map_err(|_| {
                    CardError::asset_load(format!(
                        "font line {}: '{key}={v}' is not an integer",
                        lineno + 1
                    ))
                })
            };

            match tag.as_str() {
                "info" => {
                    out.face = attrs.get("face").cloned().unwrap_or_default();
                    out.size = attrs
                        .get("size")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or_default();
                }
                "common" => {
                    out.line_height = non_negative(num("lineHeight")?, "lineHeight")?;
                    out.base = non_negative(num("base")?, "base")?;
                    saw_common = true;
                }
                "page" => {
                    let id = non_negative(num("id")?, "page id")?;
                    pages.push((id, at("file")?.to_string()));
                }
                "char" => {
                    let id = non_negative(num("id")?, "char id")?;
                    let ch = char::from_u32(id).ok_or_else(|| {
                        CardError::asset_load(format!("font char id {id} is not a scalar value"))
                    })?;
                    let glyph = Glyph {
                        x: non_negative(num("x")?, "x")?,
                        y: non_negative(num("y")?, "y")?,
                        width: non_negative(num("width")?, "width")?,
                        height: non_negative(num("height")?, "height")?,
                        xoffset: num("xoffset")? as i32,
                        yoffset: num("yoffset")? as i32,
                        xadvance: num("xadvance")? as i32,
                        page: attrs
                            .get("page")
                            .map(|v| v.parse::<u32>())
                            .transpose()
                            .map_err(|_| CardError::asset_load("font char page is not a number"))?
                            .unwrap_or(0),
                    };
                    out.glyphs.insert(ch, glyph);
                }
                "kerning" => {
                    let first = char::from_u32(non_negative(num("first")?, "first")?);
                    let second = char::from_u32(non_negative(num("second")?, "second")?);
                    if let (Some(a), Some(b)) = (first, second) {
                        out.kernings.insert((a, b), num("amount")? as i32);
                    }
                }
                // chars/kernings counts and unknown blocks carry nothing we need.
                _ => {}
            }
        }

        if !saw_common {
            return Err(CardError::asset_load("font descriptor has no 'common' line"));
        }
        if out.glyphs.is_empty() {
            return Err(CardError::asset_load("font descriptor defines no glyphs"));
        }

        pages.sort_by_key(|(id, _)| *id);
        for (expected, (id, file)) in pages.into_iter().enumerate() {
            if id as usize != expected {
                return Err(CardError::asset_load(format!(
                    "font page ids must be contiguous from 0, found {id}"
                )));
            }
            out.page_files.push(file);
        }
        if out.page_files.is_empty() {
            return Err(CardError::asset_load("font descriptor has no pages"));
        }

        Ok(out)
    }
}

fn non_negative(v: i64, what: &str) -> CardResult<u32> {
    u32::try_from(v).map_err(|_| CardError::asset_load(format!("font {what} out of range: {v}")))
}

fn tokenize(line: &str) -> Result<(String, HashMap<String, String>), String> {
    let mut chars = line.chars().peekable();
    let mut tag = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        tag.push(c);
        chars.next();
    }

    let mut attrs = HashMap::new();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }
        if chars.next_if_eq(&'=').is_none() {
            return Err(format!("attribute '{key}' has no value"));
        }

        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(c) => value.push(c),
                    None => return Err(format!("unterminated quote in '{key}'")),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }
        attrs.insert(key, value);
    }

    Ok((tag, attrs))
}

/// Immutable bitmap font: glyph metrics plus atlas pages.
#[derive(Clone, Debug)]
pub struct BitmapFont {
    descriptor: FontDescriptor,
    pages: Vec<RgbaImage>,
}

impl BitmapFont {
    /// Load a `.fnt` descriptor and the page images it references.
    ///
    /// Page paths are resolved relative to the descriptor's directory.
    pub fn load(path: &Path) -> CardResult<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("read font descriptor '{}'", path.display()))
            .map_err(|e| CardError::asset_load(format!("{e:#}")))?;
        let descriptor = FontDescriptor::parse(&src)?;

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut pages = Vec::with_capacity(descriptor.page_files.len());
        for file in &descriptor.page_files {
            let page_path: PathBuf = dir.join(file);
            let page = decode::read_image(&page_path)
                .map_err(|e| CardError::asset_load(format!("font page: {e:#}")))?;
            pages.push(page);
        }

        let font = Self::from_parts(descriptor, pages)?;
        tracing::debug!(
            face = %font.descriptor.face,
            glyphs = font.descriptor.glyphs.len(),
            pages = font.pages.len(),
            "loaded bitmap font"
        );
        Ok(font)
    }

    /// Assemble a font from a parsed descriptor and decoded pages.
    pub fn from_parts(descriptor: FontDescriptor, pages: Vec<RgbaImage>) -> CardResult<Self> {
        if pages.len() != descriptor.page_files.len() {
            return Err(CardError::asset_load(format!(
                "font declares {} pages but {} were provided",
                descriptor.page_files.len(),
                pages.len()
            )));
        }
        for (ch, g) in &descriptor.glyphs {
            let page = pages.get(g.page as usize).ok_or_else(|| {
                CardError::asset_load(format!("glyph {ch:?} references missing page {}", g.page))
            })?;
            let fits = u64::from(g.x) + u64::from(g.width) <= u64::from(page.width())
                && u64::from(g.y) + u64::from(g.height) <= u64::from(page.height());
            if !fits {
                return Err(CardError::asset_load(format!(
                    "glyph {ch:?} rectangle lies outside page {}",
                    g.page
                )));
            }
        }
        Ok(Self { descriptor, pages })
    }

    /// Face name.
    pub fn face(&self) -> &str {
        &self.descriptor.face
    }

    /// Distance between lines in pixels.
    pub fn line_height(&self) -> u32 {
        self.descriptor.line_height
    }

    /// Distance from line top to baseline in pixels.
    pub fn base(&self) -> u32 {
        self.descriptor.base
    }

    /// Glyph metrics for `ch`.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.descriptor.glyphs.get(&ch)
    }

    /// Kerning adjustment applied between `first` and `second`.
    pub fn kerning(&self, first: char, second: char) -> i32 {
        self.descriptor
            .kernings
            .get(&(first, second))
            .copied()
            .unwrap_or(0)
    }

    /// Atlas page by index.
    pub fn page(&self, index: u32) -> Option<&RgbaImage> {
        self.pages.get(index as usize)
    }

    /// Pen advance of `text` as a single line, or the first character without a glyph.
    pub fn measure(&self, text: &str) -> Result<i64, char> {
        let mut pen = 0i64;
        let mut prev: Option<char> = None;
        for ch in text.chars() {
            let g = self.glyph(ch).ok_or(ch)?;
            if let Some(p) = prev {
                pen += i64::from(self.kerning(p, ch));
            }
            pen += i64::from(g.xadvance);
            prev = Some(ch);
        }
        Ok(pen)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
