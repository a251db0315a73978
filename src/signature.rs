use crate::error::VerificationError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use ring::signature::{self, UnparsedPublicKey, VerificationAlgorithm};

/// Digest used by the signature header that came with the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// `Signature` header, RSA PKCS#1 v1.5 over SHA-1
    RsaSha1,
    /// `Signature-256` header, RSA PKCS#1 v1.5 over SHA-256
    RsaSha256,
}

impl SignatureScheme {
    fn algorithm(self) -> &'static dyn VerificationAlgorithm {
        match self {
            SignatureScheme::RsaSha1 => &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
            SignatureScheme::RsaSha256 => &signature::RSA_PKCS1_2048_8192_SHA256,
        }
    }
}

/// Verify `signature` (base64) is a valid signature of `body` under the
/// certificate's public key.
///
/// `body` must be the exact bytes received on the wire. Re-serializing a
/// parsed body can reorder keys or change whitespace and break the signature.
pub fn verify_signature(
    public_key: &[u8],
    scheme: SignatureScheme,
    signature: &str,
    body: &[u8],
) -> Result<(), VerificationError> {
    let decoded_signature = STANDARD
        .decode(signature.trim())
        .map_err(|_| VerificationError::SignatureMismatch)?;

    UnparsedPublicKey::new(scheme.algorithm(), public_key)
        .verify(body, &decoded_signature)
        .map_err(|_| VerificationError::SignatureMismatch)?;

    debug!("signature matches body");
    Ok(())
}
