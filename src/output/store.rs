use std::{
    fmt,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    str::FromStr,
    time::{Duration, SystemTime},
};

use anyhow::Context;
use image::RgbaImage;
use rand::{TryRngCore, rngs::OsRng};

use crate::{
    assets::decode,
    foundation::error::{CardError, CardResult},
};

const FILE_PREFIX: &str = "id_card_";
const FILE_SUFFIX: &str = ".png";
const ID_BYTES: usize = 4;
const PERSIST_ATTEMPTS: usize = 4;

/// Opaque artifact identifier: 8 lowercase hex characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId([u8; ID_BYTES]);

impl ArtifactId {
    /// Draw a fresh identifier from the operating system's CSPRNG.
    pub fn generate() -> CardResult<Self> {
        let mut bytes = [0u8; ID_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CardError::persist(format!("os random source failed: {e}")))?;
        Ok(Self(bytes))
    }

    /// Identifier from raw bytes.
    pub fn from_bytes(bytes: [u8; ID_BYTES]) -> Self {
        Self(bytes)
    }

    /// Output file name, `id_card_<id>.png`.
    pub fn file_name(&self) -> String {
        format!("{FILE_PREFIX}{self}{FILE_SUFFIX}")
    }

    /// Parse an output file name back into its identifier.
    pub fn from_file_name(name: &str) -> CardResult<Self> {
        name.strip_prefix(FILE_PREFIX)
            .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            .ok_or_else(|| CardError::validation(format!("{name:?} is not an artifact file name")))?
            .parse()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ArtifactId {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Uppercase is rejected so that one id maps to exactly one file name.
        if s.len() != ID_BYTES * 2 || !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CardError::validation(format!(
                "artifact id {s:?} must be {} lowercase hex characters",
                ID_BYTES * 2
            )));
        }
        let mut bytes = [0u8; ID_BYTES];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CardError::validation(format!("artifact id {s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

/// Outcome of one retention sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Regular files inspected.
    pub scanned: usize,
    /// Files deleted.
    pub removed: usize,
    /// Entries that could not be inspected or deleted.
    pub failed: usize,
}

/// Owns the output directory: writes, reads back and expires artifacts.
#[derive(Clone, Debug)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    /// Store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> CardResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an artifact is (or would be) stored at.
    pub fn path_for(&self, id: ArtifactId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// Encode `image` as PNG and persist it under a fresh identifier.
    pub fn persist(&self, image: &RgbaImage) -> CardResult<ArtifactId> {
        let png = decode::encode_png(image).map_err(|e| CardError::persist(format!("{e:#}")))?;
        self.persist_png(&png)
    }

    /// Persist already encoded PNG bytes under a fresh identifier.
    ///
    /// Bytes go to a hidden temp file first and are then linked into place
    /// without clobbering, so readers never observe a partial artifact and an
    /// existing artifact is never replaced.
    pub fn persist_png(&self, png: &[u8]) -> CardResult<ArtifactId> {
        for _ in 0..PERSIST_ATTEMPTS {
            let id = ArtifactId::generate()?;
            match self.publish(id, png) {
                Ok(()) => {
                    tracing::info!(artifact = %id, bytes = png.len(), "artifact persisted");
                    return Ok(id);
                }
                Err(PublishError::Exists) => {
                    tracing::error!(artifact = %id, "artifact id collision, drawing a new id");
                }
                Err(PublishError::Io(e)) => return Err(e),
            }
        }
        Err(CardError::persist(format!(
            "no free artifact id after {PERSIST_ATTEMPTS} attempts"
        )))
    }

    fn publish(&self, id: ArtifactId, png: &[u8]) -> Result<(), PublishError> {
        let io = |what: &str, e: std::io::Error| {
            PublishError::Io(CardError::persist(format!(
                "{what} in '{}': {e}",
                self.dir.display()
            )))
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".tmp-")
            .suffix(FILE_SUFFIX)
            .tempfile_in(&self.dir)
            .map_err(|e| io("create temp file", e))?;
        tmp.write_all(png).map_err(|e| io("write artifact", e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| io("sync artifact", e))?;

        // On failure the temp file is dropped and removed with the error.
        match tmp.persist_noclobber(self.path_for(id)) {
            Ok(_) => Ok(()),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Err(PublishError::Exists),
            Err(e) => Err(io("publish artifact", e.error)),
        }
    }

    /// Read an artifact back. `Ok(None)` when it does not exist or was swept.
    pub fn read(&self, id: ArtifactId) -> CardResult<Option<Vec<u8>>> {
        let path = self.path_for(id);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CardError::Other(
                anyhow::Error::new(e).context(format!("read artifact '{}'", path.display())),
            )),
        }
    }

    /// Delete files last modified more than `ttl` ago.
    pub fn sweep_expired(&self, ttl: Duration) -> CardResult<SweepReport> {
        self.sweep_expired_at(ttl, SystemTime::now())
    }

    /// [`Self::sweep_expired`] against an explicit `now`.
    ///
    /// The cutoff is fixed before listing, so files written while the sweep runs
    /// are never removed by it. Per-entry failures are logged and counted.
    pub fn sweep_expired_at(&self, ttl: Duration, now: SystemTime) -> CardResult<SweepReport> {
        let cutoff = now.checked_sub(ttl).unwrap_or(SystemTime::UNIX_EPOCH);
        let rd = std::fs::read_dir(&self.dir)
            .with_context(|| format!("list output dir '{}'", self.dir.display()))?;

        let mut report = SweepReport::default();
        for entry in rd {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable output entry");
                    report.failed += 1;
                    continue;
                }
            };
            let path = entry.path();
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot stat output entry");
                    report.failed += 1;
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            report.scanned += 1;

            let modified = match meta.modified() {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "no mtime for output entry");
                    report.failed += 1;
                    continue;
                }
            };
            if modified >= cutoff {
                continue;
            }

            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "expired artifact removed");
                    report.removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "artifact already gone");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove expired artifact");
                    report.failed += 1;
                }
            }
        }

        tracing::debug!(
            scanned = report.scanned,
            removed = report.removed,
            failed = report.failed,
            ttl_secs = ttl.as_secs(),
            "output sweep finished"
        );
        Ok(report)
    }
}

enum PublishError {
    Exists,
    Io(CardError),
}

#[cfg(test)]
#[path = "../../tests/unit/output/store.rs"]
mod tests;
