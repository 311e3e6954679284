//! Release Check
//!
//! One lookup of the latest published release at startup. Any failure is
//! treated as "no update" and only logged.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Latest-release endpoint of the project repository
pub const RELEASES_URL: &str =
    "https://api.github.com/repos/dangerous-person/dopogoto/releases/latest";

/// Version reported by development builds; never checked.
pub const DEV_VERSION: &str = "dev";

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("release lookup failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("release lookup returned HTTP {0}")]
    Status(u16),
}

#[derive(Deserialize)]
struct Release {
    tag_name: String,
}

/// Looks up the newest release tag.
pub struct UpdateChecker {
    http: reqwest::Client,
    url: String,
    current: String,
}

impl UpdateChecker {
    pub fn new(current: impl Into<String>) -> Result<Self, UpdateError> {
        let current = current.into();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .user_agent(format!("dopogoto/{current}"))
            .build()?;
        Ok(Self {
            http,
            url: RELEASES_URL.to_string(),
            current,
        })
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// The newest release tag, if it is newer than the running version.
    pub async fn check(&self) -> Result<Option<String>, UpdateError> {
        if self.current.is_empty() || self.current == DEV_VERSION {
            return Ok(None);
        }

        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::Status(status.as_u16()));
        }
        let release: Release = response.json().await?;

        if is_newer(&release.tag_name, &self.current) {
            tracing::info!(latest = %release.tag_name, current = %self.current, "update available");
            Ok(Some(release.tag_name))
        } else {
            Ok(None)
        }
    }
}

/// Numeric components of a tag like `v1.2.10` or `1.2.10-beta`.
fn components(version: &str) -> Option<Vec<u64>> {
    let version = version.trim().trim_start_matches(['v', 'V']);
    let core = version.split(['-', '+']).next()?;
    core.split('.').map(|part| part.parse().ok()).collect()
}

/// Whether `latest` is a strictly higher version than `current`.
///
/// Components are compared numerically; missing trailing components count
/// as zero. Unparseable versions never count as newer.
pub fn is_newer(latest: &str, current: &str) -> bool {
    let (Some(mut latest), Some(mut current)) = (components(latest), components(current)) else {
        return false;
    };
    let len = latest.len().max(current.len());
    latest.resize(len, 0);
    current.resize(len, 0);
    latest > current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ordering() {
        assert!(is_newer("v1.2.10", "v1.2.9"));
        assert!(is_newer("v2.0.0", "1.9.9"));
        assert!(is_newer("1.3", "1.2.7"));
        assert!(!is_newer("v1.2.9", "v1.2.10"));
    }

    #[test]
    fn test_equal_versions_are_not_newer() {
        assert!(!is_newer("v0.3.0", "0.3.0"));
        assert!(!is_newer("1.0", "1.0.0"));
    }

    #[test]
    fn test_unparseable_versions_are_ignored() {
        assert!(!is_newer("nightly", "1.0.0"));
        assert!(!is_newer("2.0.0", "dev"));
    }

    #[test]
    fn test_prerelease_suffix_ignored() {
        assert!(is_newer("v1.1.0-rc1", "1.0.5"));
    }

    #[tokio::test]
    async fn test_dev_build_skips_lookup() {
        let checker = UpdateChecker::new(DEV_VERSION)
            .unwrap()
            .with_url("http://127.0.0.1:1/unreachable");
        assert!(checker.check().await.unwrap().is_none());
    }
}
