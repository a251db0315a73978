use crate::{constants::*, error::ConfigError};
use serde::Deserialize;
use std::time::Duration;

/// Tunables for a [`RequestVerifier`](crate::RequestVerifier). The trust
/// anchors (cert url allowlist, SAN domain) are fixed and not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Allowed skew between the body's timestamp and now, at most `3_600_000`
    pub timestamp_tolerance_millis: u64,
    /// `0` disables certificate caching, every verification fetches
    pub cache_max_entries: u64,
    pub cache_max_age_secs: u64,
    pub fetch_timeout_millis: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            timestamp_tolerance_millis: DEFAULT_TIMESTAMP_TOLERANCE_IN_MILLIS,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_IN_SECS,
            fetch_timeout_millis: DEFAULT_FETCH_TIMEOUT_IN_MILLIS,
        }
    }
}

impl VerifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Alexa never sends requests older than an hour
        if self.timestamp_tolerance_millis > MAX_TIMESTAMP_TOLERANCE_IN_MILLIS {
            return Err(ConfigError::ToleranceTooLarge {
                millis: self.timestamp_tolerance_millis,
            });
        }
        if self.fetch_timeout_millis == 0 {
            return Err(ConfigError::ZeroFetchTimeout);
        }
        Ok(())
    }

    pub fn timestamp_tolerance(&self) -> Duration {
        Duration::from_millis(self.timestamp_tolerance_millis)
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_millis)
    }
}
