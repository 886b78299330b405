use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One code-review record as returned by the remote service.
///
/// Opaque beyond its identifying fields: data rows carry a `project` key,
/// and older servers include the `sortKey` used to resume pagination.
/// Records are never mutated after retrieval.
pub type ReviewRecord = Map<String, Value>;

/// One parsed page of a paginated review query.
#[derive(Debug, Default)]
pub struct ReviewPage {
    /// Data rows, in response order
    pub reviews: Vec<ReviewRecord>,
    /// Total matched rows reported by the page's control record
    pub row_count: Option<u64>,
}

impl ReviewPage {
    /// Parse the raw output of a `gerrit query --format=JSON` invocation.
    ///
    /// The service emits one JSON object per line: data rows followed by a
    /// single control object reporting `rowCount`. Reframe that stream into
    /// one array (wrap in brackets, newlines become commas, drop the
    /// trailing-comma artifact) and parse it whole. Any malformed line fails
    /// the entire page.
    pub fn parse(raw: &str) -> Result<Self> {
        let framed = format!("[{}]", raw.replace('\n', ",")).replace(",]", "]");

        let entries: Vec<Map<String, Value>> = serde_json::from_str(&framed)
            .map_err(|e| Error::Protocol(format!("unparseable review page: {}", e)))?;

        let mut page = Self::default();

        for entry in entries {
            if entry.contains_key("project") {
                page.reviews.push(entry);
            } else if let Some(count) = entry.get("rowCount") {
                let count = count.as_u64().ok_or_else(|| {
                    Error::Protocol(format!("non-numeric rowCount: {}", count))
                })?;
                page.row_count = Some(count);
            }
            // Other control lines (e.g. runTimeMilliseconds on newer
            // servers) carry nothing we need.
        }

        Ok(page)
    }

    /// Sort key of the last data row, used to resume sort-key pagination
    pub fn last_sort_key(&self) -> Option<String> {
        self.reviews
            .last()
            .and_then(|r| r.get("sortKey"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
