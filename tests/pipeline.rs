//! End to end verification against fixture certificates, with the network
//! replaced by an in-memory fetcher that counts calls.

use alexa_signature_verifier::{
    CertificateFetcher, CertificateRejection, ConfigError, RequestVerifier, UrlRejection,
    VerificationError, VerifierConfig,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use time::{macros::datetime, OffsetDateTime};

const CERT: &[u8] = include_bytes!("fixtures/echo-api-cert.pem");
const FOREIGN_SAN_CERT: &[u8] = include_bytes!("fixtures/foreign-san-cert.pem");
const BODY: &[u8] = include_bytes!("fixtures/request.json");
const SIGNATURE: &str = include_str!("fixtures/request.sig");
const SIGNATURE_256: &str = include_str!("fixtures/request.sig256");

const CERT_URL: &str = "https://s3.amazonaws.com/echo.api/echo-api-cert.pem";
// request.json carries 2027-01-01T00:00:00Z
const NOW: OffsetDateTime = datetime!(2027-01-01 0:00:10 UTC);

struct FixtureFetcher {
    cert: Result<&'static [u8], VerificationError>,
    calls: AtomicUsize,
}

impl FixtureFetcher {
    fn serving(cert: &'static [u8]) -> Arc<Self> {
        Arc::new(FixtureFetcher {
            cert: Ok(cert),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(FixtureFetcher {
            cert: Err(VerificationError::CertFetchFailed {
                reason: "invalid certificate response status 503".to_string(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateFetcher for FixtureFetcher {
    async fn fetch(&self, _url: &str) -> Result<Bytes, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cert.clone().map(Bytes::from_static)
    }
}

fn verifier(fetcher: &Arc<FixtureFetcher>, config: &VerifierConfig) -> RequestVerifier {
    RequestVerifier::with_fetcher(fetcher.clone(), config).unwrap()
}

fn headers(signature_header: &str, signature: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("SignatureCertChainUrl".to_string(), CERT_URL.to_string());
    headers.insert(signature_header.to_string(), signature.to_string());
    headers
}

#[tokio::test]
async fn accepts_signed_request() {
    let fetcher = FixtureFetcher::serving(CERT);
    let verifier = verifier(&fetcher, &VerifierConfig::default());

    verifier
        .verify_at(&headers("Signature", SIGNATURE), BODY, NOW)
        .await
        .unwrap();
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn accepts_sha256_signed_request() {
    let fetcher = FixtureFetcher::serving(CERT);
    let verifier = verifier(&fetcher, &VerifierConfig::default());

    verifier
        .verify_at(&headers("signature-256", SIGNATURE_256), BODY, NOW)
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_signature_is_rejected_before_fetching() {
    let fetcher = FixtureFetcher::serving(CERT);
    let verifier = verifier(&fetcher, &VerifierConfig::default());
    let fields: &[(&str, &str)] = &[("SignatureCertChainUrl", CERT_URL)];

    assert_eq!(
        verifier.verify_at(fields, BODY, NOW).await,
        Err(VerificationError::MissingHeader {
            header: "Signature"
        })
    );
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let fetcher = FixtureFetcher::serving(CERT);
    let verifier = verifier(&fetcher, &VerifierConfig::default());

    assert_eq!(
        verifier
            .verify_at(&headers("Signature", SIGNATURE), b"", NOW)
            .await,
        Err(VerificationError::MissingBody)
    );
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn stale_request_is_rejected_before_fetching() {
    let fetcher = FixtureFetcher::serving(CERT);
    let verifier = verifier(&fetcher, &VerifierConfig::default());
    let later = NOW + Duration::from_secs(151);

    assert!(matches!(
        verifier
            .verify_at(&headers("Signature", SIGNATURE), BODY, later)
            .await,
        Err(VerificationError::StaleRequest { .. })
    ));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn body_without_timestamp_is_stale() {
    let fetcher = FixtureFetcher::serving(CERT);
    let verifier = verifier(&fetcher, &VerifierConfig::default());

    assert!(matches!(
        verifier
            .verify_at(&headers("Signature", SIGNATURE), br#"{"request":{}}"#, NOW)
            .await,
        Err(VerificationError::StaleRequest { .. })
    ));
}

#[tokio::test]
async fn disallowed_cert_url_is_rejected_before_fetching() {
    let fetcher = FixtureFetcher::serving(CERT);
    let verifier = verifier(&fetcher, &VerifierConfig::default());
    let mut fields = headers("Signature", SIGNATURE);
    fields.insert(
        "SignatureCertChainUrl".to_string(),
        "https://s3.amazonaws.com/echo.api/../attacker/cert.pem".to_string(),
    );

    assert_eq!(
        verifier.verify_at(&fields, BODY, NOW).await,
        Err(VerificationError::InvalidCertUrl(UrlRejection::Path {
            path: "/attacker/cert.pem".to_string()
        }))
    );
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn fetch_failure_is_surfaced() {
    let fetcher = FixtureFetcher::failing();
    let verifier = verifier(&fetcher, &VerifierConfig::default());

    assert!(matches!(
        verifier
            .verify_at(&headers("Signature", SIGNATURE), BODY, NOW)
            .await,
        Err(VerificationError::CertFetchFailed { .. })
    ));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn untrusted_certificate_is_rejected() {
    let fetcher = FixtureFetcher::serving(FOREIGN_SAN_CERT);
    let verifier = verifier(&fetcher, &VerifierConfig::default());

    assert_eq!(
        verifier
            .verify_at(&headers("Signature", SIGNATURE), BODY, NOW)
            .await,
        Err(VerificationError::InvalidCertificate(
            CertificateRejection::DomainNotInSan
        ))
    );
}

#[tokio::test]
async fn tampered_body_is_rejected() {
    let fetcher = FixtureFetcher::serving(CERT);
    let verifier = verifier(&fetcher, &VerifierConfig::default());
    let tampered = String::from_utf8(BODY.to_vec())
        .unwrap()
        .replace("LaunchRequest", "IntentRequest");

    assert_eq!(
        verifier
            .verify_at(&headers("Signature", SIGNATURE), tampered.as_bytes(), NOW)
            .await,
        Err(VerificationError::SignatureMismatch)
    );
}

#[tokio::test]
async fn cached_certificate_is_reused_across_requests() {
    let fetcher = FixtureFetcher::serving(CERT);
    let config = VerifierConfig {
        cache_max_entries: 4,
        ..VerifierConfig::default()
    };
    let verifier = verifier(&fetcher, &config);

    for _ in 0..3 {
        verifier
            .verify_at(&headers("Signature", SIGNATURE), BODY, NOW)
            .await
            .unwrap();
    }
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn verifiers_do_not_share_caches() {
    let fetcher = FixtureFetcher::serving(CERT);
    let config = VerifierConfig {
        cache_max_entries: 4,
        ..VerifierConfig::default()
    };
    let first = verifier(&fetcher, &config);
    let second = verifier(&fetcher, &config);

    for each in [&first, &second] {
        each.verify_at(&headers("Signature", SIGNATURE), BODY, NOW)
            .await
            .unwrap();
    }
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn tolerance_over_an_hour_is_refused_at_construction() {
    let fetcher = FixtureFetcher::serving(CERT);
    let config = VerifierConfig {
        timestamp_tolerance_millis: 3_600_001,
        ..VerifierConfig::default()
    };

    assert!(matches!(
        RequestVerifier::with_fetcher(fetcher.clone(), &config),
        Err(ConfigError::ToleranceTooLarge { millis: 3_600_001 })
    ));
    assert_eq!(fetcher.calls(), 0);
}
