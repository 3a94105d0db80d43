//! Asset store
//!
//! Reads raw assets from the input directory and persists processed assets
//! into the output directory. Every operation is bounded by the configured
//! I/O timeout and fails with a typed error instead of blocking.
//!
//! Writes go through a hidden temp file in the target directory followed by
//! a rename, so a failed write never leaves a truncated asset behind.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default bound for a single read or write
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout-bounded reader/writer for asset files
#[derive(Debug, Clone, Copy)]
pub struct AssetStore {
    timeout: Duration,
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new(DEFAULT_IO_TIMEOUT)
    }
}

impl AssetStore {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Read the whole asset `name` from `dir`
    pub async fn read_asset(&self, dir: &Path, name: &str) -> Result<Vec<u8>> {
        let read_error = |reason: String| Error::AssetRead {
            name: name.to_string(),
            reason,
        };

        let path = asset_path(dir, name).map_err(read_error)?;

        let content = tokio::time::timeout(self.timeout, read_file(&path))
            .await
            .map_err(|_| read_error(format!("read timed out after {:?}", self.timeout)))?
            .map_err(|e| read_error(e.to_string()))?;

        debug!("Read {} bytes from {}", content.len(), path.display());
        Ok(content)
    }

    /// Create or replace `name` in `dir` with `content`
    pub async fn write_asset(&self, dir: &Path, name: &str, content: &[u8]) -> Result<()> {
        let write_error = |reason: String| Error::AssetWrite {
            name: name.to_string(),
            reason,
        };

        let target = asset_path(dir, name).map_err(write_error)?;
        let temp = dir.join(format!(".{}.partial", name));

        let outcome = tokio::time::timeout(self.timeout, write_then_rename(&temp, &target, content))
            .await
            .map_err(|_| format!("write timed out after {:?}", self.timeout))
            .and_then(|r| r.map_err(|e| e.to_string()));

        match outcome {
            Ok(()) => {
                debug!("Wrote {} bytes to {}", content.len(), target.display());
                Ok(())
            }
            Err(reason) => {
                if let Err(e) = fs::remove_file(&temp).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to remove temp file {}: {}", temp.display(), e);
                    }
                }
                Err(write_error(reason))
            }
        }
    }
}

/// Join `name` onto `dir`, refusing anything but a single plain file name
fn asset_path(dir: &Path, name: &str) -> std::result::Result<PathBuf, String> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(dir.join(name)),
        _ => Err(format!("{:?} is not a plain file name", name)),
    }
}

async fn read_file(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    let mut content = Vec::new();
    file.read_to_end(&mut content).await?;
    Ok(content)
}

async fn write_then_rename(temp: &Path, target: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(temp).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(temp, target).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_path_accepts_plain_names() {
        let dir = Path::new("/out");
        assert_eq!(asset_path(dir, "icon--a.svg").unwrap(), dir.join("icon--a.svg"));
    }

    #[test]
    fn test_asset_path_rejects_traversal() {
        let dir = Path::new("/out");
        assert!(asset_path(dir, "../a.svg").is_err());
        assert!(asset_path(dir, "sub/a.svg").is_err());
        assert!(asset_path(dir, "..").is_err());
        assert!(asset_path(dir, ".").is_err());
        assert!(asset_path(dir, "").is_err());
        assert!(asset_path(dir, "/etc/passwd").is_err());
        assert!(asset_path(dir, "a.svg/").is_err());
    }
}
