use crate::{
    constants::CERT_CHAIN_DOMAIN,
    error::{CertificateRejection, VerificationError},
};
use log::debug;
use time::OffsetDateTime;
use x509_parser::{certificate::X509Certificate, extensions::GeneralName};

/// Owned view of the leaf signing certificate, rebuilt on every verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    pub alt_names: Vec<String>,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    /// DER `RSAPublicKey` from the subject public key info
    pub public_key: Vec<u8>,
}

impl ParsedCertificate {
    /// Parse the first certificate of a PEM bundle, or a single DER certificate
    pub fn parse(cert_bytes: &[u8]) -> Result<Self, VerificationError> {
        if is_pem(cert_bytes) {
            let (_, pem) = x509_parser::pem::parse_x509_pem(cert_bytes)
                .map_err(|_| CertificateRejection::PemParse)?;
            let certificate = pem
                .parse_x509()
                .map_err(|_| CertificateRejection::CertParse)?;
            Self::from_x509(&certificate)
        } else {
            let (_, certificate) = x509_parser::parse_x509_certificate(cert_bytes)
                .map_err(|_| CertificateRejection::CertParse)?;
            Self::from_x509(&certificate)
        }
    }

    fn from_x509(certificate: &X509Certificate<'_>) -> Result<Self, VerificationError> {
        let mut alt_names = Vec::new();
        let san = certificate
            .subject_alternative_name()
            .map_err(|_| CertificateRejection::SanExtension)?;
        if let Some(san) = san {
            for name in &san.value.general_names {
                if let GeneralName::DNSName(dns) = name {
                    alt_names.push(dns.to_string());
                }
            }
        }

        let validity = certificate.validity();

        Ok(ParsedCertificate {
            alt_names,
            not_before: validity.not_before.to_datetime(),
            not_after: validity.not_after.to_datetime(),
            public_key: certificate.public_key().subject_public_key.data.to_vec(),
        })
    }

    pub fn has_alt_name(&self, name: &str) -> bool {
        self.alt_names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

/// Parse the signing certificate and check the leaf fields Alexa requires:
/// `echo-api.amazon.com` in the SAN extension and `now` strictly inside the
/// validity window. The chain is not walked to a root.
pub fn validate_certificate(
    cert_bytes: &[u8],
    now: OffsetDateTime,
) -> Result<ParsedCertificate, VerificationError> {
    let certificate = ParsedCertificate::parse(cert_bytes)?;

    if !certificate.has_alt_name(CERT_CHAIN_DOMAIN) {
        debug!("cert alt names: {:?}", certificate.alt_names);
        return Err(CertificateRejection::DomainNotInSan.into());
    }

    if now <= certificate.not_before {
        return Err(CertificateRejection::NotYetValid.into());
    }
    if now >= certificate.not_after {
        return Err(CertificateRejection::Expired.into());
    }

    debug!(
        "valid certificate, not before {} not after {}",
        certificate.not_before, certificate.not_after
    );
    Ok(certificate)
}

fn is_pem(bytes: &[u8]) -> bool {
    let marker = b"-----BEGIN";
    bytes.windows(marker.len()).any(|w| w == marker)
}
