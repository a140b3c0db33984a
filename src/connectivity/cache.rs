//! Persistence for region reports, keyed by scene id and algorithm version.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    connectivity::analyzer::RegionReport,
    foundation::error::{NavTrackError, NavTrackResult},
};

const FILE_PREFIX: &str = "navmesh_connectivity_";
const FILE_SUFFIX: &str = ".json";

/// Narrow get/put store for [`RegionReport`]s.
///
/// An entry written under a different algorithm version is a miss, never an error.
pub trait RegionCache {
    /// Report stored for `key` under `version`, if any.
    fn get(&self, key: &str, version: &str) -> NavTrackResult<Option<RegionReport>>;

    /// Store `report` for `key` under `version`, replacing any previous entry.
    fn put(&mut self, key: &str, version: &str, report: &RegionReport) -> NavTrackResult<()>;
}

/// Cache key for a scene path: its last `/`-separated component.
pub fn cache_key_for_scene(scene: &str) -> &str {
    let trimmed = scene.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[derive(Debug, Default)]
/// Process-local cache.
pub struct MemoryRegionCache {
    entries: HashMap<String, RegionReport>,
}

impl MemoryRegionCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RegionCache for MemoryRegionCache {
    fn get(&self, key: &str, version: &str) -> NavTrackResult<Option<RegionReport>> {
        Ok(self
            .entries
            .get(key)
            .filter(|r| r.algorithm_version == version)
            .cloned())
    }

    fn put(&mut self, key: &str, version: &str, report: &RegionReport) -> NavTrackResult<()> {
        let mut stored = report.clone();
        stored.algorithm_version = version.to_string();
        self.entries.insert(key.to_string(), stored);
        Ok(())
    }
}

#[derive(Clone, Debug)]
/// One pretty-printed JSON file per scene under a directory.
pub struct JsonFileRegionCache {
    dir: PathBuf,
}

impl JsonFileRegionCache {
    /// Cache rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds the entry for `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{}{FILE_SUFFIX}", file_safe(key)))
    }

    /// Delete the entry for `key`, or every entry when `key` is `None`. Returns files removed.
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn clear(&self, key: Option<&str>) -> NavTrackResult<usize> {
        let targets = match key {
            Some(k) => vec![self.entry_path(k)],
            None => self.entry_files()?,
        };

        let mut removed = 0;
        for path in targets {
            if !path.is_file() {
                continue;
            }
            fs::remove_file(&path)
                .with_context(|| format!("remove cache entry '{}'", path.display()))?;
            tracing::debug!(path = %path.display(), "cache entry removed");
            removed += 1;
        }
        tracing::info!(removed, "region cache cleared");
        Ok(removed)
    }

    fn entry_files(&self) -> NavTrackResult<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("read cache dir '{}'", self.dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("read cache dir '{}'", self.dir.display()))?
                .path();
            let is_entry = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX));
            if is_entry {
                out.push(path);
            }
        }
        out.sort();
        Ok(out)
    }
}

impl RegionCache for JsonFileRegionCache {
    fn get(&self, key: &str, version: &str) -> NavTrackResult<Option<RegionReport>> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key, "region cache miss");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable cache entry, ignoring");
                return Ok(None);
            }
        };

        let report: RegionReport = match serde_json::from_slice(&bytes) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt cache entry, ignoring");
                return Ok(None);
            }
        };
        if report.algorithm_version != version {
            tracing::info!(
                key,
                cached = %report.algorithm_version,
                current = version,
                "stale cache entry, recomputing"
            );
            return Ok(None);
        }
        tracing::debug!(key, points = report.largest_region_size, "region cache hit");
        Ok(Some(report))
    }

    fn put(&mut self, key: &str, version: &str, report: &RegionReport) -> NavTrackResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            NavTrackError::cache(format!("create '{}': {e}", self.dir.display()))
        })?;
        let mut stored = report.clone();
        stored.algorithm_version = version.to_string();
        let json = serde_json::to_vec_pretty(&stored)?;
        let path = self.entry_path(key);
        fs::write(&path, json)
            .map_err(|e| NavTrackError::cache(format!("write '{}': {e}", path.display())))?;
        tracing::info!(path = %path.display(), "region cached");
        Ok(())
    }
}

fn file_safe(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/connectivity/cache.rs"]
mod tests;
