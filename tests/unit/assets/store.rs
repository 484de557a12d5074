use super::*;
use crate::test_support;

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn load_reads_template_and_font() {
    let dir = tempfile::tempdir().unwrap();
    let sources = test_support::write_assets(dir.path());

    let store = AssetStore::load(&sources).unwrap();
    assert_eq!(
        store.template().dimensions(),
        (test_support::TEMPLATE_W, test_support::TEMPLATE_H)
    );
    assert_eq!(store.font().face(), "Block");
    assert!(store.font().glyph('A').is_some());
}

#[test]
fn load_fails_on_missing_template() {
    let dir = tempfile::tempdir().unwrap();
    let sources = test_support::write_assets(dir.path());
    std::fs::remove_file(dir.path().join("bg2.png")).unwrap();

    let err = AssetStore::load(&sources).unwrap_err();
    assert!(matches!(err, CardError::AssetLoad(_)), "{err}");
    assert!(err.to_string().contains("template"), "{err}");
}

#[test]
fn load_fails_on_malformed_font() {
    let dir = tempfile::tempdir().unwrap();
    let sources = test_support::write_assets(dir.path());
    std::fs::write(dir.path().join("temp_fonts/faustina.fnt"), "garbage").unwrap();

    assert!(matches!(
        AssetStore::load(&sources),
        Err(CardError::AssetLoad(_))
    ));
}

#[test]
fn load_rejects_escaping_sources() {
    let dir = tempfile::tempdir().unwrap();
    let mut sources = test_support::write_assets(dir.path());
    sources.template = "../bg2.png".to_string();

    assert!(matches!(
        AssetStore::load(&sources),
        Err(CardError::AssetLoad(_))
    ));
}
