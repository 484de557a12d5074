use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::{
    fields::FixedFieldSource,
    test_support::{sample_fields, write_assets, write_png},
};

struct Fixture {
    _tmp: tempfile::TempDir,
    config: ServiceConfig,
}

fn fixture(avatars: &[(&str, u32, u32)]) -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let assets = write_assets(&tmp.path().join("assets"));
    let avatar_dir = tmp.path().join("avatars");
    std::fs::create_dir_all(&avatar_dir).unwrap();
    for (name, w, h) in avatars {
        write_png(&avatar_dir.join(name), *w, *h, [10, 120, 30, 255]);
    }
    let config = ServiceConfig {
        assets,
        avatar_dir,
        output_dir: tmp.path().join("out"),
        retention: RetentionPolicy::default(),
        sweep_mode: SweepMode::Background,
        registration_prefix: "BBDITM/BT-CS".to_string(),
        registration_year: 2025,
    };
    Fixture { _tmp: tmp, config }
}

struct CountingSource(AtomicUsize);

impl FieldSource for CountingSource {
    fn fields(&self) -> CardResult<CardFields> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(sample_fields())
    }
}

#[test]
fn from_config_creates_output_dir() {
    let fx = fixture(&[("a.png", 40, 60)]);
    assert!(!fx.config.output_dir.exists());
    let svc = CardGenerationService::from_config(&fx.config).unwrap();
    assert!(svc.output().dir().is_dir());
}

#[test]
fn missing_avatar_dir_fails_at_startup() {
    let mut fx = fixture(&[]);
    fx.config.avatar_dir = fx.config.avatar_dir.join("nope");
    let err = CardGenerationService::from_config(&fx.config).unwrap_err();
    assert!(matches!(err, CardError::AssetLoad(_)), "{err}");
}

#[test]
fn missing_template_fails_at_startup() {
    let mut fx = fixture(&[("a.png", 40, 60)]);
    fx.config.assets.template = "missing.png".to_string();
    let err = CardGenerationService::from_config(&fx.config).unwrap_err();
    assert!(matches!(err, CardError::AssetLoad(_)), "{err}");
}

#[test]
fn generate_writes_a_readable_png() {
    let fx = fixture(&[("a.png", 400, 600)]);
    let svc = CardGenerationService::from_config(&fx.config).unwrap();

    let id = svc.generate_blocking().unwrap();
    let bytes = svc.output().read(id).unwrap().unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!(img.width(), crate::test_support::TEMPLATE_W);
    assert_eq!(img.height(), crate::test_support::TEMPLATE_H);
}

#[test]
fn empty_pool_writes_nothing() {
    let fx = fixture(&[]);
    let svc = CardGenerationService::from_config(&fx.config).unwrap();

    let err = svc.generate_blocking().unwrap_err();
    assert!(matches!(err, CardError::NoAvatarsAvailable(_)), "{err}");
    let written = std::fs::read_dir(svc.output().dir()).unwrap().count();
    assert_eq!(written, 0);
}

#[test]
fn generate_asks_the_field_source_once() {
    let fx = fixture(&[("a.png", 40, 60)]);
    let base = CardGenerationService::from_config(&fx.config).unwrap();
    let source = Arc::new(CountingSource(AtomicUsize::new(0)));
    let svc = CardGenerationService::new(
        Arc::new(AssetStore::load(&fx.config.assets).unwrap()),
        AvatarLoader::new(&fx.config.avatar_dir),
        base.output().clone(),
        source.clone(),
        sample_fields(),
    );

    svc.generate_blocking().unwrap();
    svc.generate_blocking().unwrap();
    assert_eq!(source.0.load(Ordering::SeqCst), 2);
}

#[test]
fn sample_uses_first_avatar_and_fixed_fields() {
    let fx = fixture(&[("b.png", 40, 60), ("a.png", 40, 60)]);
    let svc = CardGenerationService::from_config(&fx.config).unwrap();
    assert_eq!(
        svc.sample.registration_number(),
        "BBDITM/BT-CS/2025/12345"
    );
    assert_eq!(svc.sample.name(), "Nguyen Van A");

    let first = svc.generate_sample_blocking().unwrap();
    let second = svc.generate_sample_blocking().unwrap();
    assert_ne!(first, second);
    assert_eq!(
        svc.output().read(first).unwrap(),
        svc.output().read(second).unwrap()
    );
}

#[test]
fn inline_mode_sweeps_before_generating() {
    let mut fx = fixture(&[("a.png", 40, 60)]);
    fx.config.sweep_mode = SweepMode::Inline;
    fx.config.retention = RetentionPolicy::new(Duration::ZERO, Duration::from_secs(30)).unwrap();
    let svc = CardGenerationService::from_config(&fx.config).unwrap();

    let old = svc.output().persist_png(b"old").unwrap();
    std::thread::sleep(Duration::from_millis(20));
    let fresh = svc.generate_blocking().unwrap();

    assert_eq!(svc.output().read(old).unwrap(), None);
    assert!(svc.output().read(fresh).unwrap().is_some());
}

#[test]
fn background_mode_leaves_old_artifacts_alone() {
    let mut fx = fixture(&[("a.png", 40, 60)]);
    fx.config.retention = RetentionPolicy::new(Duration::ZERO, Duration::from_secs(30)).unwrap();
    let svc = CardGenerationService::from_config(&fx.config).unwrap();

    let old = svc.output().persist_png(b"old").unwrap();
    std::thread::sleep(Duration::from_millis(20));
    svc.generate_blocking().unwrap();

    assert!(svc.output().read(old).unwrap().is_some());
}

#[tokio::test]
async fn async_facade_round_trips() {
    let fx = fixture(&[("a.png", 40, 60)]);
    let svc = Arc::new(CardGenerationService::from_config(&fx.config).unwrap());

    let id = svc.generate().await.unwrap();
    assert!(svc.read(id).await.unwrap().is_some());

    let sample = svc.generate_sample().await.unwrap();
    assert!(svc.read(sample).await.unwrap().is_some());

    let unknown = ArtifactId::from_bytes([0, 0, 0, 0]);
    assert_eq!(svc.read(unknown).await.unwrap(), None);
}

#[test]
fn fixed_source_is_used_verbatim() {
    let fx = fixture(&[("a.png", 40, 60)]);
    let base = CardGenerationService::from_config(&fx.config).unwrap();
    let fields = sample_fields();
    let svc = CardGenerationService::new(
        Arc::new(AssetStore::load(&fx.config.assets).unwrap()),
        AvatarLoader::new(&fx.config.avatar_dir),
        base.output().clone(),
        Arc::new(FixedFieldSource(fields.clone())),
        fields,
    );
    assert!(svc.generate_blocking().is_ok());
}
