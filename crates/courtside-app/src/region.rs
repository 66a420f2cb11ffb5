// Named page regions and where their content goes.
//
// A region is the unit of replacement: each update swaps the whole content
// of one region or hides it. Updates for a region the page does not have are
// dropped quietly, since pages omit sections freely.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionUpdate {
    /// Replace the region's content and make it visible.
    Replace(String),
    /// Hide the region.
    Hide,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write region {region} to {path}: {source}")]
    Write {
        region: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait RegionSink: Send + Sync {
    /// Whether the page has a region called `name`.
    fn has_region(&self, name: &str) -> bool;

    /// Apply `update` to `region`. Returns `Ok(false)` when the region is
    /// absent and nothing was written.
    fn apply(&self, region: &str, update: RegionUpdate) -> Result<bool, SinkError>;
}

// ---------------------------------------------------------------------------
// File-backed sink
// ---------------------------------------------------------------------------

/// Writes each region to `<dir>/<region>.html`. A hidden region's file holds
/// only [`HIDDEN_MARKER`], so a static host can include it unconditionally.
pub struct FileRegionSink {
    dir: PathBuf,
    regions: HashSet<String>,
}

pub const HIDDEN_MARKER: &str = "<!-- hidden -->";

impl FileRegionSink {
    pub fn new(dir: impl Into<PathBuf>, regions: impl IntoIterator<Item = String>) -> Self {
        Self {
            dir: dir.into(),
            regions: regions.into_iter().collect(),
        }
    }

    pub fn region_path(&self, region: &str) -> PathBuf {
        self.dir.join(format!("{region}.html"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RegionSink for FileRegionSink {
    fn has_region(&self, name: &str) -> bool {
        self.regions.contains(name)
    }

    fn apply(&self, region: &str, update: RegionUpdate) -> Result<bool, SinkError> {
        if !self.has_region(region) {
            trace!(region, "region not on page, skipping update");
            return Ok(false);
        }

        let path = self.region_path(region);
        let content = match update {
            RegionUpdate::Replace(html) => html,
            RegionUpdate::Hide => HIDDEN_MARKER.to_string(),
        };

        // Write-then-rename so readers never observe a half-written region.
        let tmp = path.with_extension("html.tmp");
        let write = || -> std::io::Result<()> {
            fs::create_dir_all(&self.dir)?;
            fs::write(&tmp, content.as_bytes())?;
            fs::rename(&tmp, &path)
        };
        write().map_err(|source| SinkError::Write {
            region: region.to_string(),
            path: path.clone(),
            source,
        })?;

        debug!(region, bytes = content.len(), "region updated");
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// In-memory sink
// ---------------------------------------------------------------------------

/// Keeps every applied update in order.
#[derive(Default)]
pub struct MemoryRegionSink {
    regions: HashSet<String>,
    history: Mutex<Vec<(String, RegionUpdate)>>,
}

impl MemoryRegionSink {
    pub fn new<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// All updates applied so far, oldest first.
    pub fn history(&self) -> Vec<(String, RegionUpdate)> {
        self.lock().clone()
    }

    /// Updates applied to one region, oldest first.
    pub fn updates_for(&self, region: &str) -> Vec<RegionUpdate> {
        self.lock()
            .iter()
            .filter(|(name, _)| name == region)
            .map(|(_, update)| update.clone())
            .collect()
    }

    /// The most recent update applied to `region`.
    pub fn latest(&self, region: &str) -> Option<RegionUpdate> {
        self.lock()
            .iter()
            .rev()
            .find(|(name, _)| name == region)
            .map(|(_, update)| update.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, RegionUpdate)>> {
        // A panicking test thread must not hide the history from the others.
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RegionSink for MemoryRegionSink {
    fn has_region(&self, name: &str) -> bool {
        self.regions.contains(name)
    }

    fn apply(&self, region: &str, update: RegionUpdate) -> Result<bool, SinkError> {
        if !self.has_region(region) {
            return Ok(false);
        }
        self.lock().push((region.to_string(), update));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "courtside-region-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn file_sink_writes_and_hides() {
        let dir = temp_dir("write");
        let sink = FileRegionSink::new(&dir, vec!["liveGameCard".to_string()]);

        assert!(sink
            .apply("liveGameCard", RegionUpdate::Replace("<p>live</p>".into()))
            .unwrap());
        let path = sink.region_path("liveGameCard");
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>live</p>");
        assert!(!path.with_extension("html.tmp").exists());

        sink.apply("liveGameCard", RegionUpdate::Hide).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), HIDDEN_MARKER);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_sink_skips_unknown_region() {
        let dir = temp_dir("unknown");
        let sink = FileRegionSink::new(&dir, vec!["rosterContainer".to_string()]);

        let written = sink
            .apply("standingsTable", RegionUpdate::Replace("x".into()))
            .unwrap();
        assert!(!written);
        assert!(!dir.exists());
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryRegionSink::new(["a", "b"]);
        sink.apply("a", RegionUpdate::Replace("1".into())).unwrap();
        sink.apply("b", RegionUpdate::Hide).unwrap();
        sink.apply("a", RegionUpdate::Replace("2".into())).unwrap();
        sink.apply("missing", RegionUpdate::Hide).unwrap();

        assert_eq!(sink.history().len(), 3);
        assert_eq!(
            sink.updates_for("a"),
            vec![
                RegionUpdate::Replace("1".into()),
                RegionUpdate::Replace("2".into())
            ]
        );
        assert_eq!(sink.latest("b"), Some(RegionUpdate::Hide));
        assert_eq!(sink.latest("missing"), None);
    }
}
