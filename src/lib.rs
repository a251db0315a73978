//! Verify that incoming requests were sent by Alexa to a custom, webservice skill.
//!
//! Built from the [Developer Documentation](https://developer.amazon.com/docs/custom-skills/host-a-custom-skill-as-a-web-service.html#manually-verify-request-sent-by-alexa).
//! A request is accepted only when, in this order:
//!
//! 1. `SignatureCertChainUrl`, `Signature` (or `Signature-256`) and a body are present
//! 2. `request.timestamp` in the body is within tolerance of now (150s by default)
//! 3. the cert chain url is `https://s3.amazonaws.com[:443]/echo.api/...`
//! 4. the certificate it points at names `echo-api.amazon.com` and is currently valid
//! 5. the signature matches the body bytes under the certificate's public key
//!
//! Certificates are fetched once per url and cached when `cache_max_entries`
//! is non zero.
//!
//! # Using
//! The verifier only needs something that can look up header values
//! ([`RequestFields`]) and the raw body. Reply with a 400 when it fails.
//!
//! ```rust,no_run
//! use alexa_signature_verifier::{RequestVerifier, VerifierConfig};
//! use reqwest::header::HeaderMap;
//!
//! async fn handle(verifier: &RequestVerifier, headers: &HeaderMap, body: &[u8]) -> u16 {
//!     if verifier.verify(headers, body).await.is_err() {
//!         return 400;
//!     }
//!     // hand `body` to the skill
//!     200
//! }
//!
//! fn build() -> Result<RequestVerifier, alexa_signature_verifier::ConfigError> {
//!     RequestVerifier::from_config(&VerifierConfig {
//!         cache_max_entries: 16,
//!         ..VerifierConfig::default()
//!     })
//! }
//! ```

mod cert_url;
mod certificate;
mod config;
mod constants;
mod error;
mod normalize;
mod request;
mod signature;
mod store;
mod verifier;

pub use cert_url::validate_cert_url;
pub use certificate::{validate_certificate, ParsedCertificate};
pub use config::VerifierConfig;
pub use constants::{CERT_CHAIN_URL_HEADER, SIGNATURE_256_HEADER, SIGNATURE_HEADER};
pub use error::{CertificateRejection, ConfigError, UrlRejection, VerificationError};
pub use request::{embedded_timestamp, RequestFields, VerificationRequest};
pub use signature::{verify_signature, SignatureScheme};
pub use store::{CertificateFetcher, CertificateStore, HttpFetcher};
pub use verifier::{check_timestamp, RequestVerifier};
