use crate::{
    constants::MAX_CERT_RESPONSE_BYTES,
    error::{ConfigError, VerificationError},
};
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use moka::{future::Cache, policy::EvictionPolicy};
use reqwest::{redirect::Policy, Client, ClientBuilder};
use std::{sync::Arc, time::Duration};

/// Retrieves raw certificate bytes for an already validated url
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, VerificationError>;
}

/// Fetches certificates over HTTPS with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// HTTPS only, no redirects, every request bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = client_builder(timeout)
            .https_only(true)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(HttpFetcher { client })
    }

    /// Use a preconfigured client as is
    pub fn with_client(client: Client) -> Self {
        HttpFetcher { client }
    }
}

// A redirect could point outside the cert url allowlist
fn client_builder(timeout: Duration) -> ClientBuilder {
    Client::builder().redirect(Policy::none()).timeout(timeout)
}

fn fetch_failed(reason: impl Into<String>) -> VerificationError {
    VerificationError::CertFetchFailed {
        reason: reason.into(),
    }
}

#[async_trait]
impl CertificateFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, VerificationError> {
        debug!("getting certificate from {}", url);

        // Transport details stay in the debug log
        let resp = self.client.get(url).send().await.map_err(|e| {
            debug!("error getting certificate: {}", e);
            fetch_failed("request failed")
        })?;

        let status = resp.status();
        if !status.is_success() {
            debug!("invalid status code: {}", status);
            return Err(fetch_failed(format!(
                "invalid certificate response status {}",
                status.as_u16()
            )));
        }

        if let Some(len) = resp.content_length() {
            if len > MAX_CERT_RESPONSE_BYTES as u64 {
                return Err(fetch_failed("certificate response too large"));
            }
        }

        let bytes = resp.bytes().await.map_err(|e| {
            debug!("error reading certificate body: {}", e);
            fetch_failed("failed to read response body")
        })?;
        if bytes.len() > MAX_CERT_RESPONSE_BYTES {
            return Err(fetch_failed("certificate response too large"));
        }

        debug!("got certificate");
        Ok(bytes)
    }
}

/// Certificate bytes keyed by the exact validated url, bounded by entry count
/// (least recently used goes first) and age. Concurrent misses for the same
/// url share a single fetch.
pub struct CertificateStore {
    fetcher: Arc<dyn CertificateFetcher>,
    cache: Option<Cache<String, Bytes>>,
}

impl CertificateStore {
    /// `max_entries` of `0` disables caching and every call goes to `fetcher`
    pub fn new(fetcher: Arc<dyn CertificateFetcher>, max_entries: u64, max_age: Duration) -> Self {
        let cache = if max_entries == 0 {
            None
        } else {
            Some(
                Cache::builder()
                    .max_capacity(max_entries)
                    .time_to_live(max_age)
                    .eviction_policy(EvictionPolicy::lru())
                    .build(),
            )
        };

        CertificateStore { fetcher, cache }
    }

    pub async fn fetch(&self, url: &str) -> Result<Bytes, VerificationError> {
        let cache = match &self.cache {
            Some(cache) => cache,
            None => return self.fetcher.fetch(url).await,
        };

        let entry = cache
            .entry_by_ref(url)
            .or_try_insert_with(self.fetcher.fetch(url))
            .await
            .map_err(|e| (*e).clone())?;

        if !entry.is_fresh() {
            debug!("found {} in cert cache", url);
        }
        Ok(entry.into_value())
    }
}
