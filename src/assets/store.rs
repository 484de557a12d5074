use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbaImage;

use crate::{
    assets::{decode, font::BitmapFont},
    foundation::error::{CardError, CardResult},
};

/// Where the template and font live, relative to an asset root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetSources {
    /// Directory relative sources are resolved against.
    pub root: PathBuf,
    /// Background template image.
    pub template: String,
    /// BMFont `.fnt` descriptor.
    pub font: String,
}

impl AssetSources {
    /// Default layout of the asset root: `bg2.png` and `temp_fonts/faustina.fnt`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            template: "bg2.png".to_string(),
            font: "temp_fonts/faustina.fnt".to_string(),
        }
    }

    fn resolve(&self, source: &str) -> CardResult<PathBuf> {
        let norm = normalize_rel_path(source).map_err(|e| CardError::asset_load(e.to_string()))?;
        Ok(self.root.join(Path::new(&norm)))
    }
}

/// Immutable template and font shared by every composition.
///
/// Loaded once before the server accepts requests; afterwards only `&` access is
/// handed out, so compositions must clone the template before drawing on it.
#[derive(Debug)]
pub struct AssetStore {
    template: RgbaImage,
    font: Arc<BitmapFont>,
}

impl AssetStore {
    /// Read and decode the template and font. Any failure is an
    /// [`CardError::AssetLoad`].
    pub fn load(sources: &AssetSources) -> CardResult<Self> {
        let template_path = sources.resolve(&sources.template)?;
        let template = decode::read_image(&template_path)
            .map_err(|e| CardError::asset_load(format!("template: {e:#}")))?;

        let font_path = sources.resolve(&sources.font)?;
        let font = BitmapFont::load(&font_path)?;

        tracing::info!(
            template = %template_path.display(),
            width = template.width(),
            height = template.height(),
            font = %font_path.display(),
            face = font.face(),
            "card assets loaded"
        );
        Ok(Self::from_parts(template, font))
    }

    /// Build a store from already decoded parts.
    pub fn from_parts(template: RgbaImage, font: BitmapFont) -> Self {
        Self {
            template,
            font: Arc::new(font),
        }
    }

    /// Shared background template.
    pub fn template(&self) -> &RgbaImage {
        &self.template
    }

    /// Shared bitmap font.
    pub fn font(&self) -> &BitmapFont {
        &self.font
    }

    /// Shared handle to the font, for collaborators that outlive a borrow.
    pub fn shared_font(&self) -> Arc<BitmapFont> {
        Arc::clone(&self.font)
    }
}

/// Normalize and validate asset-root-relative paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> CardResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CardError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(CardError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CardError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CardError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
