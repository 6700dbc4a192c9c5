//! AES-256-CBC claim cipher with an HMAC-SHA256 tag.
//!
//! Wire form of a sealed value: `base64(iv || ciphertext || tag)` where the
//! tag covers `iv || ciphertext`. The cipher key and the MAC key are both
//! derived from the passphrase under different labels.

use crate::error::AuthError;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use ring::hmac;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV_LEN: usize = 16;
const TAG_LEN: usize = 32;
const BLOCK_LEN: usize = 16;

const ENC_LABEL: &[u8] = b"passport.claim.enc";
const MAC_LABEL: &[u8] = b"passport.claim.mac";

/// Secret used to seal custom claims. Never empty.
#[derive(Clone)]
pub struct Passphrase(Zeroizing<Vec<u8>>);

impl Passphrase {
    /// Wrap raw passphrase bytes; an empty passphrase means no encryption.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            None
        } else {
            Some(Self(Zeroizing::new(bytes)))
        }
    }

    /// Decode a base64 passphrase as it appears in configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if `encoded` is not valid base64.
    pub fn from_base64(encoded: &str) -> Result<Option<Self>, AuthError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Ok(None);
        }
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| AuthError::config(format!("Invalid passphrase encoding: {e}")))?;
        Ok(Self::new(bytes))
    }

    fn derive(&self, label: &[u8]) -> Zeroizing<[u8; 32]> {
        let digest = Sha256::new()
            .chain_update(label)
            .chain_update(self.0.as_slice())
            .finalize();
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&digest);
        key
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase([REDACTED])")
    }
}

/// A sealed value failed authentication, padding or encoding checks.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("claim ciphertext rejected")]
pub struct CipherRejected;

/// Seal `value` under `passphrase` with a fresh random IV.
#[must_use]
pub fn encrypt_claim(value: &str, passphrase: &Passphrase) -> String {
    let enc_key = passphrase.derive(ENC_LABEL);
    let mac_key = hmac::Key::new(hmac::HMAC_SHA256, passphrase.derive(MAC_LABEL).as_slice());

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(
        GenericArray::from_slice(enc_key.as_slice()),
        GenericArray::from_slice(&iv),
    )
    .encrypt_padded_vec_mut::<Pkcs7>(value.as_bytes());

    let mut sealed = Vec::with_capacity(IV_LEN + ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&iv);
    sealed.extend_from_slice(&ciphertext);
    let tag = hmac::sign(&mac_key, &sealed);
    sealed.extend_from_slice(tag.as_ref());

    STANDARD.encode(sealed)
}

/// Open a value produced by [`encrypt_claim`].
///
/// Either the whole plaintext comes back or nothing does.
///
/// # Errors
///
/// Returns [`CipherRejected`] for bad base64, a short or misaligned body, a
/// tag mismatch, bad padding, or non UTF-8 plaintext.
pub fn decrypt_claim(sealed: &str, passphrase: &Passphrase) -> Result<String, CipherRejected> {
    let raw = STANDARD.decode(sealed).map_err(|_| CipherRejected)?;
    if raw.len() < IV_LEN + BLOCK_LEN + TAG_LEN || (raw.len() - IV_LEN - TAG_LEN) % BLOCK_LEN != 0
    {
        return Err(CipherRejected);
    }

    let (body, tag) = raw.split_at(raw.len() - TAG_LEN);
    let mac_key = hmac::Key::new(hmac::HMAC_SHA256, passphrase.derive(MAC_LABEL).as_slice());
    hmac::verify(&mac_key, body, tag).map_err(|_| CipherRejected)?;

    let (iv, ciphertext) = body.split_at(IV_LEN);
    let enc_key = passphrase.derive(ENC_LABEL);
    let plaintext = Aes256CbcDec::new_from_slices(enc_key.as_slice(), iv)
        .map_err(|_| CipherRejected)?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherRejected)?;
    let plaintext = Zeroizing::new(plaintext);

    String::from_utf8(plaintext.to_vec()).map_err(|_| CipherRejected)
}

/// Applies the claim cipher when a passphrase is configured.
#[derive(Debug, Clone, Default)]
pub struct ClaimCodec {
    passphrase: Option<Passphrase>,
}

impl ClaimCodec {
    /// Codec keyed by `passphrase`; `None` is the plaintext codec.
    #[must_use]
    pub fn new(passphrase: Option<Passphrase>) -> Self {
        Self { passphrase }
    }

    /// Codec that leaves every value as is.
    #[must_use]
    pub fn plaintext() -> Self {
        Self::default()
    }

    /// Whether values are sealed.
    #[must_use]
    pub fn is_encrypting(&self) -> bool {
        self.passphrase.is_some()
    }

    /// Seal a claim value, or return it unchanged without a passphrase.
    #[must_use]
    pub fn encrypt(&self, value: &str) -> String {
        match &self.passphrase {
            Some(passphrase) => encrypt_claim(value, passphrase),
            None => value.to_string(),
        }
    }

    /// Open the value of claim `name`.
    pub fn decrypt(&self, name: &str, value: &str) -> Result<String, AuthError> {
        match &self.passphrase {
            Some(passphrase) => {
                decrypt_claim(value, passphrase).map_err(|_| AuthError::decryption(name))
            }
            None => Ok(value.to_string()),
        }
    }
}
