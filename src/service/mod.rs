//! Card generation: field source, avatar pool, compositor and output store wired together.

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{
    assets::{
        avatar::{Avatar, AvatarLoader},
        store::{AssetSources, AssetStore},
    },
    barcode::Code128Encoder,
    fields::{CardFields, FieldSource, RandomFieldSource},
    foundation::error::{CardError, CardResult},
    output::{
        retention::RetentionPolicy,
        store::{ArtifactId, OutputStore},
    },
    render::compositor::Compositor,
};

/// When expired artifacts are swept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SweepMode {
    /// A [`RetentionTask`](crate::RetentionTask) sweeps on a fixed interval.
    #[default]
    Background,
    /// Every generation sweeps first, before composing.
    Inline,
}

/// Everything needed to assemble a [`CardGenerationService`].
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Template and font locations.
    pub assets: AssetSources,
    /// Directory holding avatar photos.
    pub avatar_dir: PathBuf,
    /// Directory artifacts are written to.
    pub output_dir: PathBuf,
    /// Artifact lifetime and sweep cadence.
    pub retention: RetentionPolicy,
    /// Background or inline sweeping.
    pub sweep_mode: SweepMode,
    /// Registration prefix, e.g. `BBDITM/BT-CS`.
    pub registration_prefix: String,
    /// Registration year.
    pub registration_year: i32,
}

/// Produces cards on demand and serves them back by identifier.
///
/// Cheap to share behind an `Arc`; all state is either immutable or lives in the
/// output directory.
pub struct CardGenerationService {
    assets: Arc<AssetStore>,
    avatars: AvatarLoader,
    compositor: Compositor,
    output: OutputStore,
    fields: Arc<dyn FieldSource>,
    sample: CardFields,
    inline_sweep: Option<Duration>,
}

impl std::fmt::Debug for CardGenerationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardGenerationService")
            .field("avatars", &self.avatars)
            .field("compositor", &self.compositor)
            .field("output", &self.output)
            .field("inline_sweep", &self.inline_sweep)
            .finish_non_exhaustive()
    }
}

impl CardGenerationService {
    /// Service with the default Code 128 encoder labelled in the card font.
    ///
    /// The sample card uses `sample` fields; see [`CardFields::sample`].
    pub fn new(
        assets: Arc<AssetStore>,
        avatars: AvatarLoader,
        output: OutputStore,
        fields: Arc<dyn FieldSource>,
        sample: CardFields,
    ) -> Self {
        let encoder = Code128Encoder::new().with_label_font(assets.shared_font());
        Self {
            compositor: Compositor::new(Arc::new(encoder)),
            assets,
            avatars,
            output,
            fields,
            sample,
            inline_sweep: None,
        }
    }

    /// Load assets, open the output directory and build the service.
    ///
    /// Fails with [`CardError::AssetLoad`] before anything is served when the
    /// template or font cannot be read, or the avatar directory is missing.
    pub fn from_config(config: &ServiceConfig) -> CardResult<Self> {
        let assets = Arc::new(AssetStore::load(&config.assets)?);
        if !config.avatar_dir.is_dir() {
            return Err(CardError::asset_load(format!(
                "avatar directory '{}' does not exist",
                config.avatar_dir.display()
            )));
        }
        let avatars = AvatarLoader::new(&config.avatar_dir);
        let output = OutputStore::open(&config.output_dir)?;
        let fields = Arc::new(RandomFieldSource::new(
            config.registration_prefix.clone(),
            config.registration_year,
        )?);
        let sample = CardFields::sample(&config.registration_prefix, config.registration_year)?;

        let mut service = Self::new(assets, avatars, output, fields, sample);
        if config.sweep_mode == SweepMode::Inline {
            service = service.with_inline_sweep(config.retention.ttl);
        }
        Ok(service)
    }

    /// Sweep artifacts older than `ttl` at the start of every generation.
    pub fn with_inline_sweep(mut self, ttl: Duration) -> Self {
        self.inline_sweep = Some(ttl);
        self
    }

    /// Replace the compositor (custom encoder or barcode options).
    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    /// Output store artifacts are written to.
    pub fn output(&self) -> &OutputStore {
        &self.output
    }

    /// Generate a card with fresh fields and a random avatar.
    pub fn generate_blocking(&self) -> CardResult<ArtifactId> {
        self.sweep_inline();
        let fields = self.fields.fields()?;
        let avatar = self.avatars.pick_random()?;
        self.compose_and_persist(&avatar, &fields)
    }

    /// Generate the fixed sample card with the first avatar of the pool.
    pub fn generate_sample_blocking(&self) -> CardResult<ArtifactId> {
        self.sweep_inline();
        let avatar = self.avatars.pick_first()?;
        self.compose_and_persist(&avatar, &self.sample)
    }

    /// [`Self::generate_blocking`] on the blocking pool.
    pub async fn generate(self: &Arc<Self>) -> CardResult<ArtifactId> {
        let this = Arc::clone(self);
        run_blocking(move || this.generate_blocking()).await
    }

    /// [`Self::generate_sample_blocking`] on the blocking pool.
    pub async fn generate_sample(self: &Arc<Self>) -> CardResult<ArtifactId> {
        let this = Arc::clone(self);
        run_blocking(move || this.generate_sample_blocking()).await
    }

    /// PNG bytes of an artifact, `None` once it is missing or swept.
    pub async fn read(&self, id: ArtifactId) -> CardResult<Option<Vec<u8>>> {
        let output = self.output.clone();
        run_blocking(move || output.read(id)).await
    }

    fn compose_and_persist(&self, avatar: &Avatar, fields: &CardFields) -> CardResult<ArtifactId> {
        let card = self.compositor.compose_card(&self.assets, avatar, fields)?;
        let id = self.output.persist(&card)?;
        tracing::info!(
            artifact = %id,
            registration = fields.registration_number(),
            "card generated"
        );
        Ok(id)
    }

    fn sweep_inline(&self) {
        let Some(ttl) = self.inline_sweep else {
            return;
        };
        if let Err(e) = self.output.sweep_expired(ttl) {
            tracing::warn!(error = %e, "inline sweep failed");
        }
    }
}

async fn run_blocking<T, F>(f: F) -> CardResult<T>
where
    F: FnOnce() -> CardResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CardError::Other(anyhow::Error::new(e).context("blocking task failed")))?
}

#[cfg(test)]
#[path = "../../tests/unit/service/mod.rs"]
mod tests;
