use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::cache::ReviewCache;
use crate::config::Config;
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::models::{ReviewPage, ReviewRecord};
use crate::version::GerritVersion;

const BACKEND_NAME: &str = "gerrit";

/// Pagination cursor, chosen per the remote server version.
///
/// Servers with offset pagination take `--start=<n>`; older servers resume
/// from the last record's sort key. The first sort-key query carries no
/// resume clause.
enum Cursor {
    Offset(u64),
    SortKey(Option<String>),
}

impl Cursor {
    fn new(version: GerritVersion) -> Self {
        if version.offset_pagination() {
            Cursor::Offset(0)
        } else {
            Cursor::SortKey(None)
        }
    }

    fn clause(&self) -> Option<String> {
        match self {
            Cursor::Offset(start) => Some(format!(" --start={}", start)),
            Cursor::SortKey(Some(key)) => Some(format!(" resume_sortkey:{}", key)),
            Cursor::SortKey(None) => None,
        }
    }

    fn advance(&mut self, page: &ReviewPage) {
        match self {
            Cursor::Offset(start) => *start += page.reviews.len() as u64,
            Cursor::SortKey(key) => {
                if let Some(last) = page.last_sort_key() {
                    *key = Some(last);
                }
            }
        }
    }
}

/// Review-ingestion engine for one Gerrit instance.
///
/// Discovers projects, pages through each project's reviews over the command
/// channel, and checkpoints progress to the disk cache so interrupted runs
/// can resume. Strictly sequential: one remote command at a time, and every
/// checkpoint write completes before the next page is requested.
pub struct GerritEngine<E: CommandExecutor> {
    executor: E,
    cache: ReviewCache,
    host: String,
    user: String,
    port: u16,
    page_size: usize,
    max_reviews: usize,
    use_cache: bool,
    use_history: bool,
    reviews: Vec<ReviewRecord>,
}

impl<E: CommandExecutor> GerritEngine<E> {
    /// Build an engine from configuration and operating-mode flags.
    ///
    /// `use_cache` serves project and review lists from disk when available;
    /// `use_history` restores a previous run's full result set instead of
    /// fetching. The two are mutually exclusive: cache reuse wins.
    pub fn new(config: &Config, executor: E, use_cache: bool, history: bool) -> Result<Self> {
        let cache = ReviewCache::new(&config.cache.dir, &config.gerrit.user, &config.gerrit.host)?;

        let mut engine = Self {
            executor,
            cache,
            host: config.gerrit.host.clone(),
            user: config.gerrit.user.clone(),
            port: config.gerrit.port,
            page_size: config.fetch.page_size,
            max_reviews: config.fetch.max_reviews,
            use_cache,
            // History data would be regenerated from the cache anyway
            use_history: history && !use_cache,
            reviews: Vec::new(),
        };

        if engine.use_history {
            match engine.cache.restore_dump() {
                Ok(reviews) => {
                    debug!(count = reviews.len(), "Restored full result set");
                    engine.reviews = reviews;
                }
                Err(e) => {
                    // A bad dump is not fatal, the run just starts empty
                    warn!(error = %e, "Restore failed, starting with an empty result set");
                }
            }
        } else if engine.use_cache {
            info!("Getting all data from cache");
            if let Err(e) = engine.cache.read_projects() {
                warn!(error = %e, "Cache unusable, disabling cache reuse");
                engine.use_cache = false;
                engine.cache.clear()?;
            }
        } else {
            // Cache will be refreshed during this run
            engine.cache.clear()?;
        }

        Ok(engine)
    }

    /// Stable identifier for the orchestrator managing multiple engines
    pub fn id(&self) -> String {
        format!("{}_{}", BACKEND_NAME, self.host)
    }

    /// Target URL of the remote instance
    pub fn url(&self) -> &str {
        &self.host
    }

    /// Direct access to the disk cache
    pub fn cache(&self) -> &ReviewCache {
        &self.cache
    }

    fn gerrit_cmd(&self, subcommand: &str) -> String {
        format!(
            "ssh -p {} {}@{} gerrit {}",
            self.port, self.user, self.host, subcommand
        )
    }

    fn detect_version(&self) -> Result<GerritVersion> {
        let banner = self.executor.execute(&self.gerrit_cmd("version"))?;
        GerritVersion::parse(&banner)
    }

    /// Get all project identifiers, from cache or from the remote instance.
    ///
    /// A remote listing refreshes the cached artifact. No retries: an
    /// executor failure propagates.
    pub fn list_projects(&self) -> Result<Vec<String>> {
        debug!("Getting list of gerrit projects");

        if self.use_cache {
            return self.cache.read_projects();
        }

        let raw = self.executor.execute(&self.gerrit_cmd("ls-projects"))?;

        let mut projects: Vec<String> = raw.split('\n').map(str::to_string).collect();
        // The listing ends with a newline, drop the trailing empty line
        projects.pop();

        self.cache.write_projects(&projects)?;

        debug!(count = projects.len(), "Done");

        Ok(projects)
    }

    /// Fetch all reviews for one project, checkpointing after every page.
    ///
    /// Boundary records duplicated across resumed runs are kept as-is;
    /// nothing deduplicates them.
    pub fn fetch_project_reviews(&self, project: &str) -> Result<Vec<ReviewRecord>> {
        if self.use_cache {
            if let Some(reviews) = self.cache.read_project_reviews(project)? {
                if !reviews.is_empty() {
                    return Ok(reviews);
                }
            }
        }

        let version = self.detect_version()?;
        let mut cursor = Cursor::new(version);

        let base_cmd = self.gerrit_cmd(&format!(
            "query project:{} limit:{} --all-approvals --comments --format=JSON",
            project, self.page_size
        ));

        let limit = self.page_size as u64;
        let mut number_results = limit;
        let mut reviews: Vec<ReviewRecord> = Vec::new();

        // wikimedia's gerrit returns limit+1 rows, hence the tolerance
        while number_results == limit || number_results == limit + 1 {
            let mut cmd = base_cmd.clone();
            if let Some(clause) = cursor.clause() {
                cmd.push_str(&clause);
            }

            let raw = self.executor.execute(&cmd)?;
            let page = ReviewPage::parse(&raw)?;

            cursor.advance(&page);
            if let Some(count) = page.row_count {
                number_results = count;
            }
            reviews.extend(page.reviews);

            // Checkpoint fully before the next page is requested
            self.cache.write_project_reviews(project, &reviews)?;
        }

        info!(project, total = reviews.len(), "Total reviews");

        Ok(reviews)
    }

    /// Ingest reviews across all projects until the cap is reached or the
    /// projects are exhausted, returning the accumulated result set.
    pub fn ingest_all(&mut self) -> Result<Vec<ReviewRecord>> {
        if self.use_history {
            info!(count = self.reviews.len(), "Serving result set restored from history");
            return Ok(std::mem::take(&mut self.reviews));
        }

        let projects = self.list_projects()?;
        let total = projects.len();

        for (index, project) in projects.iter().enumerate() {
            let started = Instant::now();

            let fetched = self.fetch_project_reviews(project)?;
            self.reviews.extend(fetched);

            let completed = index + 1;
            let eta_min = started.elapsed().as_secs_f64() * (total - completed) as f64 / 60.0;
            info!(
                project = %project,
                completed,
                total,
                "Completed project (ETA: {:.2} min)",
                eta_min
            );

            if self.reviews.len() >= self.max_reviews {
                // Expected capacity condition, not a failure
                error!(
                    max_reviews = self.max_reviews,
                    total = self.reviews.len(),
                    "Max reviews reached"
                );
                break;
            }

            debug!(in_memory = self.reviews.len(), "Total reviews in memory");
        }

        Ok(std::mem::take(&mut self.reviews))
    }
}
