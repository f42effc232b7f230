//! Inbound request signature verification.
//!
//! Every interaction request carries an Ed25519 signature over the
//! timestamp header followed by the raw body, made with the application's
//! key. Requests are rejected before parsing if it does not verify.

use ed25519_dalek::{PUBLIC_KEY_LENGTH, Signature, Verifier, VerifyingKey};

use crate::error::{ServerError, ServerResult};

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

/// Checks request signatures against the application public key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Creates a verifier from the hex-encoded public key.
    pub fn from_hex(public_key: &str) -> ServerResult<Self> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| ServerError::config(format!("public key is not valid hex: {}", e)))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            ServerError::config(format!("public key must be {} bytes", PUBLIC_KEY_LENGTH))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| ServerError::config(format!("invalid public key: {}", e)))?;

        Ok(Self { key })
    }

    /// Verifies `signature` (hex) over `timestamp || body`.
    pub fn verify(&self, signature: &str, timestamp: &str, body: &[u8]) -> ServerResult<()> {
        let signature = hex::decode(signature)
            .map_err(|_| ServerError::invalid_signature("signature is not valid hex"))?;
        let signature = Signature::from_slice(&signature)
            .map_err(|_| ServerError::invalid_signature("malformed signature"))?;

        let mut signed = Vec::with_capacity(timestamp.len() + body.len());
        signed.extend_from_slice(timestamp.as_bytes());
        signed.extend_from_slice(body);

        self.key
            .verify(&signed, &signature)
            .map_err(|_| ServerError::invalid_signature("signature does not match"))
    }
}
