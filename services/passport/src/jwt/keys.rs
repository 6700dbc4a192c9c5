//! Key material for signing and verification.

use crate::config::{KeyFamily, SigningConfig};
use crate::error::AuthError;
use jsonwebtoken::{DecodingKey, EncodingKey};
use pkcs8::{Document, EncryptedPrivateKeyInfo, LineEnding};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

const ENCRYPTED_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const PRIVATE_LABEL: &str = "PRIVATE KEY";

/// Build the signing key for the configured algorithm.
///
/// # Errors
///
/// Returns [`AuthError::SigningFailed`] when key material is missing,
/// malformed, or cannot be decrypted.
pub fn encoding_key(config: &SigningConfig) -> Result<EncodingKey, AuthError> {
    let invalid =
        |e: jsonwebtoken::errors::Error| AuthError::signing(format!("Invalid private key: {e}"));

    match config.algorithm.family() {
        KeyFamily::Hmac => {
            let secret = non_empty_secret(config.secret.as_ref()).ok_or_else(|| {
                AuthError::signing(format!("{} requires a secret", config.algorithm))
            })?;
            Ok(EncodingKey::from_secret(secret.as_bytes()))
        }
        KeyFamily::Rsa => {
            EncodingKey::from_rsa_pem(private_pem(config)?.as_bytes()).map_err(invalid)
        }
        KeyFamily::Ec => EncodingKey::from_ec_pem(private_pem(config)?.as_bytes()).map_err(invalid),
        KeyFamily::Ed => EncodingKey::from_ed_pem(private_pem(config)?.as_bytes()).map_err(invalid),
    }
}

/// Build the verification key for the configured algorithm.
///
/// # Errors
///
/// Returns [`AuthError::Configuration`] when key material is missing or
/// malformed.
pub fn decoding_key(config: &SigningConfig) -> Result<DecodingKey, AuthError> {
    let invalid =
        |e: jsonwebtoken::errors::Error| AuthError::config(format!("Invalid public key: {e}"));

    match config.algorithm.family() {
        KeyFamily::Hmac => {
            let secret = non_empty_secret(config.secret.as_ref()).ok_or_else(|| {
                AuthError::config(format!("{} requires a secret", config.algorithm))
            })?;
            Ok(DecodingKey::from_secret(secret.as_bytes()))
        }
        KeyFamily::Rsa => DecodingKey::from_rsa_pem(public_pem(config)?).map_err(invalid),
        KeyFamily::Ec => DecodingKey::from_ec_pem(public_pem(config)?).map_err(invalid),
        KeyFamily::Ed => DecodingKey::from_ed_pem(public_pem(config)?).map_err(invalid),
    }
}

fn private_pem(config: &SigningConfig) -> Result<Zeroizing<String>, AuthError> {
    let pem = config.private_key.as_ref().ok_or_else(|| {
        AuthError::signing(format!("{} requires a private key", config.algorithm))
    })?;
    unlock_private_key(pem.expose_secret(), config.private_key_password.as_ref())
}

fn public_pem(config: &SigningConfig) -> Result<&[u8], AuthError> {
    config
        .public_key
        .as_deref()
        .map(str::as_bytes)
        .ok_or_else(|| AuthError::config(format!("{} requires a public key", config.algorithm)))
}

fn non_empty_secret(secret: Option<&SecretString>) -> Option<&str> {
    secret
        .map(ExposeSecret::expose_secret)
        .filter(|s| !s.is_empty())
}

/// Return a plain PKCS#8 PEM, decrypting `ENCRYPTED PRIVATE KEY` documents.
fn unlock_private_key(
    pem: &str,
    password: Option<&SecretString>,
) -> Result<Zeroizing<String>, AuthError> {
    if !pem.contains(ENCRYPTED_LABEL) {
        return Ok(Zeroizing::new(pem.to_string()));
    }

    let password = non_empty_secret(password)
        .ok_or_else(|| AuthError::signing("Encrypted private key requires a password"))?;

    let (label, document) = Document::from_pem(pem)
        .map_err(|e| AuthError::signing(format!("Invalid encrypted private key: {e}")))?;
    if label != ENCRYPTED_LABEL {
        return Err(AuthError::signing(format!("Unexpected PEM label: {label}")));
    }

    let info = EncryptedPrivateKeyInfo::try_from(document.as_bytes())
        .map_err(|e| AuthError::signing(format!("Invalid encrypted private key: {e}")))?;
    let decrypted = info
        .decrypt(password)
        .map_err(|_| AuthError::signing("Private key password rejected"))?;

    decrypted
        .to_pem(PRIVATE_LABEL, LineEnding::LF)
        .map_err(|e| AuthError::signing(format!("Cannot re-encode private key: {e}")))
}
