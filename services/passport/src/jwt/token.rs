//! Compact JWS parsing without signature checks.

use crate::error::AuthError;
use crate::jwt::claims::Claims;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::Header;

/// A token split into its parts. Nothing here has been authenticated.
#[derive(Debug, Clone)]
pub struct ParsedToken {
    raw: String,
    header: Header,
    claims: Claims,
    signing_input_len: usize,
}

impl ParsedToken {
    /// Decode header and claims of a `header.payload.signature` token.
    ///
    /// Succeeds for expired, mis-addressed or forged tokens alike. The
    /// signature segment is kept verbatim and only decoded by verification.
    pub fn parse(token: &str) -> Result<Self, AuthError> {
        let token = token.trim();
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return Err(AuthError::malformed(format!(
                "expected 3 segments, found {}",
                parts.len()
            )));
        }

        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AuthError::malformed(format!("header: {e}")))?;

        let payload = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|e| AuthError::malformed(format!("payload encoding: {e}")))?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|e| AuthError::malformed(format!("payload: {e}")))?;

        Ok(Self {
            raw: token.to_string(),
            header,
            claims,
            signing_input_len: parts[0].len() + 1 + parts[1].len(),
        })
    }

    /// Decoded header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Decoded payload.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Give up the claims.
    #[must_use]
    pub fn into_claims(self) -> Claims {
        self.claims
    }

    /// `header.payload`, the bytes the signature covers.
    #[must_use]
    pub fn signing_input(&self) -> &str {
        &self.raw[..self.signing_input_len]
    }

    /// Base64url signature segment.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.raw[self.signing_input_len + 1..]
    }
}
