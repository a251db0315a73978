use crate::{constants::*, error::VerificationError, signature::SignatureScheme};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::{collections::HashMap, hash::BuildHasher};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Read access to the named fields (headers) of an inbound request, so the
/// verifier doesn't depend on any one http server crate. Lookups are case
/// insensitive.
pub trait RequestFields {
    fn field(&self, name: &str) -> Option<&str>;
}

impl RequestFields for HeaderMap {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }
}

impl<S: BuildHasher> RequestFields for HashMap<String, String, S> {
    fn field(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl<'a> RequestFields for [(&'a str, &'a str)] {
    fn field(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| *v)
    }
}

/// Everything one verification needs, pulled out of a single inbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest<'a> {
    pub cert_chain_url: &'a str,
    pub signature: &'a str,
    pub signature_scheme: SignatureScheme,
    pub body: &'a [u8],
    /// `request.timestamp` from the body, if present and parseable
    pub timestamp: Option<OffsetDateTime>,
}

impl<'a> VerificationRequest<'a> {
    /// Requires `SignatureCertChainUrl`, a signature (`Signature-256` is
    /// preferred over `Signature`) and a non-empty body, checked in that order.
    pub fn extract<F>(fields: &'a F, body: &'a [u8]) -> Result<Self, VerificationError>
    where
        F: RequestFields + ?Sized,
    {
        let cert_chain_url =
            non_empty(fields, CERT_CHAIN_URL_HEADER).ok_or(VerificationError::MissingHeader {
                header: CERT_CHAIN_URL_HEADER,
            })?;

        let (signature, signature_scheme) = match non_empty(fields, SIGNATURE_256_HEADER) {
            Some(sig) => (sig, SignatureScheme::RsaSha256),
            None => (
                non_empty(fields, SIGNATURE_HEADER).ok_or(VerificationError::MissingHeader {
                    header: SIGNATURE_HEADER,
                })?,
                SignatureScheme::RsaSha1,
            ),
        };

        if body.is_empty() {
            return Err(VerificationError::MissingBody);
        }

        Ok(VerificationRequest {
            cert_chain_url,
            signature,
            signature_scheme,
            body,
            timestamp: embedded_timestamp(body),
        })
    }
}

fn non_empty<'a, F>(fields: &'a F, name: &str) -> Option<&'a str>
where
    F: RequestFields + ?Sized,
{
    fields.field(name).map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
struct Envelope {
    request: Option<RequestBody>,
}

#[derive(Deserialize)]
struct RequestBody {
    timestamp: Option<serde_json::Value>,
}

/// Timestamp comes from the body, `{ "request" : { "timestamp": "" } }`, as an
/// ISO 8601 string or epoch milliseconds
pub fn embedded_timestamp(body: &[u8]) -> Option<OffsetDateTime> {
    let envelope: Envelope = serde_json::from_slice(body).ok()?;
    match envelope.request?.timestamp? {
        serde_json::Value::String(s) => OffsetDateTime::parse(&s, &Rfc3339).ok(),
        serde_json::Value::Number(n) => {
            let millis = n.as_i64()?;
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
        }
        _ => None,
    }
}
