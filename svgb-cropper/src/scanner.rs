//! Asset directory scanner
//!
//! Lists the input directory (non-recursive) and keeps the entries whose
//! extension matches the naming rules, sorted ascending by name.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::naming::NamingRules;

/// Ordered asset names captured at session (re)start
///
/// Immutable once captured; rescanning produces a new queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetQueue {
    names: Vec<String>,
}

impl AssetQueue {
    /// Build a queue from arbitrary names, sorting them
    pub fn from_names(mut names: Vec<String>) -> Self {
        names.sort();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Keep names with the asset extension and sort them
pub fn filter_asset_names<I>(names: I, rules: &NamingRules) -> AssetQueue
where
    I: IntoIterator<Item = String>,
{
    AssetQueue::from_names(
        names
            .into_iter()
            .filter(|name| rules.has_extension(name) && name.len() > rules.extension.len())
            .collect(),
    )
}

/// Scan `dir` for assets
///
/// The whole listing runs under `timeout`; an expired timeout is reported as
/// a directory access failure.
pub async fn scan_assets(dir: &Path, rules: &NamingRules, timeout: Duration) -> Result<AssetQueue> {
    let names = tokio::time::timeout(timeout, list_file_names(dir))
        .await
        .map_err(|_| Error::DirectoryAccess {
            path: dir.to_path_buf(),
            reason: format!("listing timed out after {:?}", timeout),
        })??;

    debug!("{} entries in {}", names.len(), dir.display());

    let queue = filter_asset_names(names, rules);
    info!("Found {} SVG files.", queue.len());
    Ok(queue)
}

async fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let access_error = |e: std::io::Error| Error::DirectoryAccess {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(access_error)?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(access_error)? {
        let file_type = entry.file_type().await.map_err(access_error)?;
        if file_type.is_dir() {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!("Skipping non UTF-8 file name: {:?}", raw),
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_sorts_and_matches_case_insensitively() {
        let queue = filter_asset_names(names(&["b.svg", "A.SVG", "c.txt"]), &NamingRules::default());
        assert_eq!(queue.names(), &names(&["A.SVG", "b.svg"])[..]);
    }

    #[test]
    fn test_filter_skips_bare_extension_and_lookalikes() {
        let queue = filter_asset_names(
            names(&[".svg", "x.svg.bak", "y.svgz", "z.Svg"]),
            &NamingRules::default(),
        );
        assert_eq!(queue.names(), &names(&["z.Svg"])[..]);
    }

    #[test]
    fn test_queue_accessors() {
        let queue = AssetQueue::from_names(names(&["b.svg", "a.svg"]));
        assert_eq!(queue.len(), 2);
        assert!(!queue.is_empty());
        assert_eq!(queue.get(0), Some("a.svg"));
        assert_eq!(queue.get(2), None);
        assert!(AssetQueue::default().is_empty());
    }
}
