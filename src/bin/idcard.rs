use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use chrono::Datelike;
use clap::{Parser, ValueEnum};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use idcard::{
    AppState, AssetSources, CardGenerationService, RetentionPolicy, RetentionTask, ServiceConfig,
    SweepMode, create_router,
};

#[derive(Parser, Debug)]
#[command(name = "idcard", version, about = "Serve freshly composited ID cards over HTTP")]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "IDCARD_BIND", default_value = "0.0.0.0:3005")]
    bind: SocketAddr,

    /// Directory the template and font paths are relative to.
    #[arg(long, env = "IDCARD_ASSET_ROOT", default_value = ".")]
    asset_root: PathBuf,

    /// Background template image.
    #[arg(long, env = "IDCARD_TEMPLATE", default_value = "bg2.png")]
    template: String,

    /// BMFont descriptor (`.fnt`); pages are resolved next to it.
    #[arg(long, env = "IDCARD_FONT", default_value = "temp_fonts/faustina.fnt")]
    font: String,

    /// Directory of avatar photos.
    #[arg(long, env = "IDCARD_AVATAR_DIR", default_value = "avatar")]
    avatar_dir: PathBuf,

    /// Directory generated cards are written to (created if missing).
    #[arg(long, env = "IDCARD_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Seconds a generated card stays downloadable.
    #[arg(long, env = "IDCARD_OUTPUT_TTL_SECS", default_value_t = 120)]
    output_ttl_secs: u64,

    /// Seconds between background sweeps.
    #[arg(long, env = "IDCARD_SWEEP_INTERVAL_SECS", default_value_t = 30)]
    sweep_interval_secs: u64,

    /// Sweep on a timer or before every generation.
    #[arg(long, env = "IDCARD_SWEEP_MODE", value_enum, default_value_t = SweepModeArg::Background)]
    sweep_mode: SweepModeArg,

    /// Registration prefix printed before the year.
    #[arg(long, env = "IDCARD_REGISTRATION_PREFIX", default_value = "BBDITM/BT-CS")]
    registration_prefix: String,

    /// Registration year [default: current UTC year].
    #[arg(long, env = "IDCARD_REGISTRATION_YEAR")]
    registration_year: Option<i32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SweepModeArg {
    Background,
    Inline,
}

impl From<SweepModeArg> for SweepMode {
    fn from(m: SweepModeArg) -> Self {
        match m {
            SweepModeArg::Background => SweepMode::Background,
            SweepModeArg::Inline => SweepMode::Inline,
        }
    }
}

impl Cli {
    fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let retention = RetentionPolicy::new(
            Duration::from_secs(self.output_ttl_secs),
            Duration::from_secs(self.sweep_interval_secs),
        )?;
        Ok(ServiceConfig {
            assets: AssetSources {
                root: self.asset_root.clone(),
                template: self.template.clone(),
                font: self.font.clone(),
            },
            avatar_dir: self.avatar_dir.clone(),
            output_dir: self.output_dir.clone(),
            retention,
            sweep_mode: self.sweep_mode.into(),
            registration_prefix: self.registration_prefix.clone(),
            registration_year: self
                .registration_year
                .unwrap_or_else(|| chrono::Utc::now().year()),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "idcard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.service_config()?;

    let service = CardGenerationService::from_config(&config).context("startup failed")?;
    let service = Arc::new(service);

    let retention = match config.sweep_mode {
        SweepMode::Background => Some(RetentionTask::spawn(
            service.output().clone(),
            config.retention,
        )),
        SweepMode::Inline => None,
    };

    let app = create_router(AppState::new(service)).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("bind {}", cli.bind))?;
    tracing::info!(
        addr = %cli.bind,
        output = %config.output_dir.display(),
        ttl_secs = config.retention.ttl.as_secs(),
        "listening; GET /genidcard/test or /genidcard/api/create"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(task) = retention {
        task.shutdown_and_join().await;
    }
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
