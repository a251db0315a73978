use crate::{
    cert_url::validate_cert_url,
    certificate::validate_certificate,
    config::VerifierConfig,
    error::{log_rejection, ConfigError, VerificationError},
    request::{RequestFields, VerificationRequest},
    signature::verify_signature,
    store::{CertificateFetcher, CertificateStore, HttpFetcher},
};
use log::debug;
use std::{sync::Arc, time::Duration};
use time::OffsetDateTime;

/// Exposes verify method and owns the certificate store its verifications
/// share. Distinct verifiers never share cached certificates.
pub struct RequestVerifier {
    store: CertificateStore,
    timestamp_tolerance: Duration,
}

impl RequestVerifier {
    /// Create instance from the default config: 150s tolerance, caching off
    pub fn new() -> Result<Self, ConfigError> {
        RequestVerifier::from_config(&VerifierConfig::default())
    }

    pub fn from_config(config: &VerifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.fetch_timeout())?;
        RequestVerifier::with_fetcher(Arc::new(fetcher), config)
    }

    /// Same as `from_config`, with certificates coming from `fetcher`
    pub fn with_fetcher(
        fetcher: Arc<dyn CertificateFetcher>,
        config: &VerifierConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = CertificateStore::new(
            fetcher,
            config.cache_max_entries,
            config.cache_max_age(),
        );
        Ok(RequestVerifier {
            store,
            timestamp_tolerance: config.timestamp_tolerance(),
        })
    }

    /// Asynchronously verify that the request came from Alexa.
    ///
    /// - `fields` gives access to the `SignatureCertChainUrl` and `Signature`
    ///   (or `Signature-256`) headers of the request
    ///
    /// - `body` is the entire body exactly as received, it is what the signature
    ///   is checked against
    ///
    /// - Timestamp comes from the body, `{ "request" : { "timestamp": "" } }`
    ///
    /// The first failing check is logged and returned, nothing is retried.
    pub async fn verify<F>(&self, fields: &F, body: &[u8]) -> Result<(), VerificationError>
    where
        F: RequestFields + ?Sized,
    {
        self.verify_at(fields, body, OffsetDateTime::now_utc()).await
    }

    /// `verify` with an explicit current time
    pub async fn verify_at<F>(
        &self,
        fields: &F,
        body: &[u8],
        now: OffsetDateTime,
    ) -> Result<(), VerificationError>
    where
        F: RequestFields + ?Sized,
    {
        match self.run(fields, body, now).await {
            Ok(()) => {
                debug!("verified request");
                Ok(())
            }
            Err(e) => log_rejection(e),
        }
    }

    async fn run<F>(&self, fields: &F, body: &[u8], now: OffsetDateTime) -> Result<(), VerificationError>
    where
        F: RequestFields + ?Sized,
    {
        let request = VerificationRequest::extract(fields, body)?;
        debug!("cert-url: {}", request.cert_chain_url);
        debug!("timestamp: {:?}", request.timestamp);

        check_timestamp(request.timestamp, now, self.timestamp_tolerance)?;

        let url = validate_cert_url(request.cert_chain_url)?;
        let cert_bytes = self.store.fetch(url).await?;
        let certificate = validate_certificate(&cert_bytes, now)?;

        verify_signature(
            &certificate.public_key,
            request.signature_scheme,
            request.signature,
            request.body,
        )
    }
}

/// Reject a request whose timestamp is further than `tolerance` from `now`,
/// in either direction. A missing timestamp counts as the Unix epoch, so it is
/// always stale.
pub fn check_timestamp(
    timestamp: Option<OffsetDateTime>,
    now: OffsetDateTime,
    tolerance: Duration,
) -> Result<(), VerificationError> {
    let timestamp = timestamp.unwrap_or(OffsetDateTime::UNIX_EPOCH);
    let skew_millis = (now - timestamp).whole_milliseconds().abs();

    if skew_millis > tolerance.as_millis() as i128 {
        return Err(VerificationError::StaleRequest { skew_millis });
    }
    Ok(())
}
