use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static BANNER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gerrit version (\d+)\.(\d+).*").unwrap());

/// Gerrit server version extracted from the `gerrit version` banner.
///
/// Only major and minor matter here: they decide which pagination protocol
/// the query command supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GerritVersion {
    pub major: u32,
    pub minor: u32,
}

impl GerritVersion {
    /// Parse a banner like `gerrit version 2.10-rc1-988-g333a9dd`
    pub fn parse(banner: &str) -> Result<Self> {
        let captures = BANNER_PATTERN
            .captures(banner)
            .ok_or_else(|| Error::Protocol(format!("invalid gerrit version banner: {banner:?}")))?;

        let major = captures[1]
            .parse()
            .map_err(|_| Error::Protocol(format!("invalid gerrit version banner: {banner:?}")))?;
        let minor = captures[2]
            .parse()
            .map_err(|_| Error::Protocol(format!("invalid gerrit version banner: {banner:?}")))?;

        Ok(Self { major, minor })
    }

    /// Whether the server paginates with `--start=<offset>`.
    /// Older servers resume from the last record's sort key instead.
    pub fn offset_pagination(&self) -> bool {
        self.major == 2 && self.minor >= 9
    }
}
