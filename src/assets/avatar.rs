use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;
use rand::seq::IndexedRandom;

use crate::{
    assets::decode,
    foundation::error::{CardError, CardResult, CompositionStage},
};

/// A decoded avatar photo, consumed by one composition.
#[derive(Clone, Debug)]
pub struct Avatar {
    /// File the photo was read from.
    pub source: PathBuf,
    /// Decoded pixels at native size.
    pub image: RgbaImage,
}

/// Picks photos out of a pool directory.
///
/// The directory is listed on every call; files can be added or removed while the
/// server runs.
#[derive(Clone, Debug)]
pub struct AvatarLoader {
    pool: PathBuf,
}

impl AvatarLoader {
    /// Loader over the pool directory `pool`.
    pub fn new(pool: impl Into<PathBuf>) -> Self {
        Self { pool: pool.into() }
    }

    /// Pool directory.
    pub fn pool(&self) -> &Path {
        &self.pool
    }

    /// Current pool members (regular files), sorted by file name.
    pub fn list(&self) -> CardResult<Vec<PathBuf>> {
        let rd = std::fs::read_dir(&self.pool)
            .with_context(|| format!("list avatar pool '{}'", self.pool.display()))?;

        let mut out = Vec::new();
        for entry in rd {
            let entry =
                entry.with_context(|| format!("read avatar pool '{}'", self.pool.display()))?;
            // Entries can vanish between listing and stat; skip them.
            let Ok(ft) = entry.file_type() else {
                continue;
            };
            if ft.is_file() {
                out.push(entry.path());
            }
        }
        out.sort();
        Ok(out)
    }

    /// Decode a uniformly random pool member.
    pub fn pick_random(&self) -> CardResult<Avatar> {
        let entries = self.list()?;
        let chosen = entries
            .choose(&mut rand::rng())
            .ok_or_else(|| self.empty_pool())?;
        tracing::debug!(
            avatar = %chosen.display(),
            pool_size = entries.len(),
            "picked avatar"
        );
        Self::load(chosen)
    }

    /// Decode the first pool member by file name.
    pub fn pick_first(&self) -> CardResult<Avatar> {
        let entries = self.list()?;
        let first = entries.first().ok_or_else(|| self.empty_pool())?;
        Self::load(first)
    }

    /// Decode a specific photo.
    pub fn load(path: &Path) -> CardResult<Avatar> {
        let image = decode::read_image(path)
            .map_err(|e| CardError::composition(CompositionStage::Avatar, format!("{e:#}")))?;
        Ok(Avatar {
            source: path.to_path_buf(),
            image,
        })
    }

    fn empty_pool(&self) -> CardError {
        CardError::NoAvatarsAvailable(self.pool.display().to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/avatar.rs"]
mod tests;
