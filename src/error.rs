use log::error;
use std::error::Error as StdError;
use thiserror::Error;

/// Error detailing why verification failed. Only the first failing check is
/// ever reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Missing required header '{header}'")]
    MissingHeader { header: &'static str },
    #[error("Request body is empty")]
    MissingBody,
    #[error("Request timestamp is {skew_millis}ms away from now, outside of allowed tolerance")]
    StaleRequest { skew_millis: i128 },
    #[error("Invalid SignatureCertChainUrl")]
    InvalidCertUrl(#[source] UrlRejection),
    #[error("Failed to retrieve cert: {reason}")]
    CertFetchFailed { reason: String },
    #[error("Invalid signing certificate")]
    InvalidCertificate(#[source] CertificateRejection),
    #[error("Signature does not match request body")]
    SignatureMismatch,
}

/// The allowlist check a certificate chain url failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlRejection {
    #[error("Could not parse url '{url}'")]
    Parse { url: String },
    #[error("Expecting 'https', got '{scheme}'")]
    Scheme { scheme: String },
    #[error("Expecting 's3.amazonaws.com', got '{hostname}'")]
    Hostname { hostname: String },
    #[error("Expecting '/echo.api/', got '{path}'")]
    Path { path: String },
    #[error("Expecting '443', got '{port}'")]
    Port { port: u16 },
}

/// The leaf certificate check that failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateRejection {
    #[error("Failed to decode PEM")]
    PemParse,
    #[error("Failed to parse certificate to x509")]
    CertParse,
    #[error("No valid data in SAN extension")]
    SanExtension,
    #[error("'echo-api.amazon.com' not in SAN extension")]
    DomainNotInSan,
    #[error("Signing certificate not valid yet")]
    NotYetValid,
    #[error("Signing certificate expired")]
    Expired,
}

/// Error building a verifier from configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Provided tolerance of '{millis}' exceeds max of 3_600_000")]
    ToleranceTooLarge { millis: u64 },
    #[error("Fetch timeout must be greater than zero")]
    ZeroFetchTimeout,
    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

impl From<UrlRejection> for VerificationError {
    fn from(rejection: UrlRejection) -> Self {
        VerificationError::InvalidCertUrl(rejection)
    }
}

impl From<CertificateRejection> for VerificationError {
    fn from(rejection: CertificateRejection) -> Self {
        VerificationError::InvalidCertificate(rejection)
    }
}

pub fn log_rejection<T>(e: VerificationError) -> Result<T, VerificationError> {
    error!("{}", e);
    let mut cause = e.source();
    while let Some(c) = cause {
        error!("Caused by: {}", c);
        cause = c.source();
    }
    Err(e)
}
