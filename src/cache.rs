use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::ReviewRecord;

/// Disk cache for intermediate ingestion results.
///
/// Every artifact is a complete JSON snapshot replaced wholesale on each
/// write, never appended to. A file on disk is therefore always parseable as
/// the full accumulation at its last checkpoint, which keeps recovery after
/// an interrupted run trivial at the cost of rewriting the artifact on every
/// page.
pub struct ReviewCache {
    base_path: PathBuf,
}

impl ReviewCache {
    /// Open (creating if needed) the cache for one user+host identity
    pub fn new(base_dir: impl AsRef<Path>, user: &str, host: &str) -> Result<Self> {
        let base_path = base_dir.as_ref().join(format!("{}_{}", user, host));
        fs::create_dir_all(&base_path)?;

        info!(path = %base_path.display(), "Initialized review cache");

        Ok(Self { base_path })
    }

    fn projects_path(&self) -> PathBuf {
        self.base_path.join("cache_projects.json")
    }

    fn project_reviews_path(&self, project: &str) -> PathBuf {
        let pname = project.replace('/', "_");
        self.base_path.join(format!("cache_{}-reviews.json", pname))
    }

    fn dump_path(&self) -> PathBuf {
        self.base_path.join("reviews.json")
    }

    /// Reset the project-list artifact to the cleared state. Idempotent and
    /// safe to call when no artifact exists yet.
    pub fn clear(&self) -> Result<()> {
        fs::write(self.projects_path(), "")?;

        debug!("Cleared cache");

        Ok(())
    }

    /// Replace the project-list artifact with the complete list
    pub fn write_projects(&self, projects: &[String]) -> Result<()> {
        let content = serde_json::to_string(projects).map_err(io::Error::from)?;
        fs::write(self.projects_path(), content)?;

        debug!(count = projects.len(), "Wrote project list to cache");

        Ok(())
    }

    /// Read the previously written project list
    pub fn read_projects(&self) -> Result<Vec<String>> {
        let path = self.projects_path();
        if !path.exists() {
            return Err(Error::CacheMiss(format!("{}", path.display())));
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            // A cleared cache holds a truncated file, not corrupt data
            return Err(Error::CacheMiss(format!("{}", path.display())));
        }

        serde_json::from_str(&content).map_err(|e| Error::CacheCorrupt {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Checkpoint the full review accumulation for one project
    pub fn write_project_reviews(&self, project: &str, reviews: &[ReviewRecord]) -> Result<()> {
        let content = serde_json::to_string(reviews).map_err(io::Error::from)?;
        fs::write(self.project_reviews_path(project), content)?;

        debug!(project, count = reviews.len(), "Checkpointed project reviews");

        Ok(())
    }

    /// Read the cached review accumulation for one project.
    ///
    /// Absence is a normal outcome (nothing cached yet, fetch from the
    /// remote), not an error.
    pub fn read_project_reviews(&self, project: &str) -> Result<Option<Vec<ReviewRecord>>> {
        let path = self.project_reviews_path(project);
        if !path.exists() {
            debug!(project, "Cache incomplete, no review artifact");
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let reviews = serde_json::from_str(&content).map_err(|e| Error::CacheCorrupt {
            path: path.display().to_string(),
            source: e,
        })?;

        debug!(project, "Loaded reviews from cache");

        Ok(Some(reviews))
    }

    /// Write the whole-result snapshot used by history mode
    pub fn write_dump(&self, reviews: &[ReviewRecord]) -> Result<()> {
        let content = serde_json::to_string(reviews).map_err(io::Error::from)?;
        fs::write(self.dump_path(), content)?;

        debug!(count = reviews.len(), "Dumped full result set");

        Ok(())
    }

    /// Restore the whole-result snapshot written by a previous run
    pub fn restore_dump(&self) -> Result<Vec<ReviewRecord>> {
        let path = self.dump_path();
        if !path.exists() {
            return Err(Error::CacheMiss(format!("{}", path.display())));
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| Error::CacheCorrupt {
            path: path.display().to_string(),
            source: e,
        })
    }
}
