pub const CERT_CHAIN_URL_SCHEME: &str = "https";
pub const CERT_CHAIN_URL_HOSTNAME: &str = "s3.amazonaws.com";
pub const CERT_CHAIN_URL_STARTPATH: &str = "/echo.api/";
pub const CERT_CHAIN_URL_PORT: u16 = 443;
pub const CERT_CHAIN_DOMAIN: &str = "echo-api.amazon.com";

pub const CERT_CHAIN_URL_HEADER: &str = "SignatureCertChainUrl";
pub const SIGNATURE_HEADER: &str = "Signature";
pub const SIGNATURE_256_HEADER: &str = "Signature-256";

pub const DEFAULT_TIMESTAMP_TOLERANCE_IN_MILLIS: u64 = 150_000;
pub const MAX_TIMESTAMP_TOLERANCE_IN_MILLIS: u64 = 3_600_000;

pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 0;
pub const DEFAULT_CACHE_MAX_AGE_IN_SECS: u64 = 86_400;
pub const DEFAULT_FETCH_TIMEOUT_IN_MILLIS: u64 = 5_000;
pub const MAX_CERT_RESPONSE_BYTES: usize = 256 * 1024;
