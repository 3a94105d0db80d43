//! Asset store and scanner tests against a real directory

use std::fs;
use std::time::Duration;

use svgb_cropper::naming::NamingRules;
use svgb_cropper::scanner::scan_assets;
use svgb_cropper::store::AssetStore;
use svgb_cropper::Error;
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_scan_filters_and_sorts() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.svg"), "b").unwrap();
    fs::write(dir.path().join("A.SVG"), "a").unwrap();
    fs::write(dir.path().join("c.txt"), "c").unwrap();
    fs::create_dir(dir.path().join("folder.svg")).unwrap();

    let queue = scan_assets(dir.path(), &NamingRules::default(), TIMEOUT)
        .await
        .unwrap();

    assert_eq!(queue.names(), &["A.SVG".to_string(), "b.svg".to_string()][..]);
}

#[tokio::test]
async fn test_scan_is_repeatable() {
    let dir = TempDir::new().unwrap();
    for name in ["z.svg", "m.svg", "a.svg"] {
        fs::write(dir.path().join(name), name).unwrap();
    }

    let rules = NamingRules::default();
    let first = scan_assets(dir.path(), &rules, TIMEOUT).await.unwrap();
    let second = scan_assets(dir.path(), &rules, TIMEOUT).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_scan_missing_directory() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone");

    let err = scan_assets(&missing, &NamingRules::default(), TIMEOUT)
        .await
        .unwrap_err();
    match err {
        Error::DirectoryAccess { path, .. } => assert_eq!(path, missing),
        other => panic!("expected DirectoryAccess, got {:?}", other),
    }
}

#[tokio::test]
async fn test_read_asset() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.svg"), "<svg/>").unwrap();

    let content = AssetStore::new(TIMEOUT)
        .read_asset(dir.path(), "a.svg")
        .await
        .unwrap();
    assert_eq!(content, b"<svg/>");
}

#[tokio::test]
async fn test_read_missing_asset() {
    let dir = TempDir::new().unwrap();

    let err = AssetStore::new(TIMEOUT)
        .read_asset(dir.path(), "missing.svg")
        .await
        .unwrap_err();
    match err {
        Error::AssetRead { name, .. } => assert_eq!(name, "missing.svg"),
        other => panic!("expected AssetRead, got {:?}", other),
    }
}

#[tokio::test]
async fn test_write_creates_and_overwrites() {
    let dir = TempDir::new().unwrap();
    let store = AssetStore::new(TIMEOUT);

    store.write_asset(dir.path(), "icon--a.svg", b"first").await.unwrap();
    store.write_asset(dir.path(), "icon--a.svg", b"second").await.unwrap();

    assert_eq!(fs::read(dir.path().join("icon--a.svg")).unwrap(), b"second");

    // Only the target remains; the temp file was renamed away
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_write_rejects_path_names() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("out");
    fs::create_dir(&out).unwrap();
    let store = AssetStore::new(TIMEOUT);

    for name in ["../escape.svg", "sub/icon.svg", ".."] {
        let err = store.write_asset(&out, name, b"x").await.unwrap_err();
        assert!(matches!(err, Error::AssetWrite { .. }), "{} should be rejected", name);
    }
    assert!(!root.path().join("escape.svg").exists());
}

#[tokio::test]
async fn test_write_into_missing_directory_leaves_nothing() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("removed");

    let err = AssetStore::new(TIMEOUT)
        .write_asset(&out, "icon--a.svg", b"x")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AssetWrite { .. }));
    assert!(!out.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_stalled_read_times_out() {
    let dir = TempDir::new().unwrap();
    let pipe = dir.path().join("pipe.svg");
    let status = std::process::Command::new("mkfifo")
        .arg(&pipe)
        .status()
        .unwrap();
    assert!(status.success());

    // Opening a FIFO blocks until a writer shows up
    let err = AssetStore::new(Duration::from_millis(200))
        .read_asset(dir.path(), "pipe.svg")
        .await
        .unwrap_err();
    match err {
        Error::AssetRead { name, reason } => {
            assert_eq!(name, "pipe.svg");
            assert!(reason.contains("timed out"), "{}", reason);
        }
        other => panic!("expected AssetRead, got {:?}", other),
    }

    // Release the blocking thread still waiting in open()
    let writer = fs::OpenOptions::new().write(true).open(&pipe).unwrap();
    drop(writer);
}
