use crate::{
    constants::*,
    error::{UrlRejection, VerificationError},
    normalize,
};
use log::debug;
use url::{Host, Url};

/// Check a `SignatureCertChainUrl` against the fixed allowlist, returning the
/// same url when every check passes.
///
/// 1. The scheme is `https` (case insensitive).
/// 2. The hostname is `s3.amazonaws.com` (case insensitive).
/// 3. The normalized path starts with `/echo.api/` (case sensitive).
/// 4. If a port is present, it is `443`.
pub fn validate_cert_url(signature_cert_chain_url: &str) -> Result<&str, VerificationError> {
    let parsed_url = Url::parse(signature_cert_chain_url).map_err(|_| UrlRejection::Parse {
        url: signature_cert_chain_url.to_string(),
    })?;

    let scheme = parsed_url.scheme();
    if !scheme.eq_ignore_ascii_case(CERT_CHAIN_URL_SCHEME) {
        return Err(UrlRejection::Scheme {
            scheme: scheme.to_string(),
        }
        .into());
    }

    match parsed_url.host() {
        Some(Host::Domain(hostname)) => {
            if !hostname.eq_ignore_ascii_case(CERT_CHAIN_URL_HOSTNAME) {
                return Err(UrlRejection::Hostname {
                    hostname: hostname.to_string(),
                }
                .into());
            }
        }
        Some(Host::Ipv4(ip)) => {
            return Err(UrlRejection::Hostname {
                hostname: ip.to_string(),
            }
            .into())
        }
        Some(Host::Ipv6(ip)) => {
            return Err(UrlRejection::Hostname {
                hostname: ip.to_string(),
            }
            .into())
        }
        None => {
            return Err(UrlRejection::Hostname {
                hostname: String::new(),
            }
            .into())
        }
    }

    let normalized_path = normalize::normalize_path(parsed_url.path());
    if !normalized_path.starts_with(CERT_CHAIN_URL_STARTPATH) {
        return Err(UrlRejection::Path {
            path: normalized_path,
        }
        .into());
    }

    // `port()` is None for the scheme's default, so an explicit :443 passes here
    if let Some(port) = parsed_url.port() {
        if port != CERT_CHAIN_URL_PORT {
            return Err(UrlRejection::Port { port }.into());
        }
    }

    debug!("valid cert url: {}", signature_cert_chain_url);
    Ok(signature_cert_chain_url)
}
