//! Errors for issuance, verification and revocation.

use chrono::{DateTime, Utc};
use passport_common::PlatformError;
use thiserror::Error;

/// Message returned to end clients for every authentication failure.
pub const UNAUTHENTICATED: &str = "unauthenticated";

/// Message returned to end clients for failures on the server side.
pub const INTERNAL_ERROR: &str = "internal error";

/// Every failure the token pipeline can report.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Not three dot-separated segments, or a segment fails to decode.
    #[error("Token malformed: {0}")]
    MalformedToken(String),

    /// Decodes, but a required claim is missing or out of range.
    #[error("Token structure invalid: {0}")]
    InvalidStructure(String),

    /// `exp` is in the past.
    #[error("Token expired at {expired_at}")]
    Expired {
        /// Moment the token stopped being valid.
        expired_at: DateTime<Utc>,
    },

    /// `nbf` is in the future.
    #[error("Token not valid before {valid_from}")]
    NotYetValid {
        /// Moment the token becomes valid.
        valid_from: DateTime<Utc>,
    },

    /// `aud`, `iss` or `sub` differs from the configured value.
    #[error("Claim `{claim}` does not match the signing configuration")]
    ClaimMismatch {
        /// Name of the offending claim.
        claim: &'static str,
    },

    /// `jti` names the other token kind.
    #[error("Wrong token kind: expected token id {expected}, found {found:?}")]
    WrongTokenKind {
        /// Token id the caller asked for.
        expected: String,
        /// Token id the token carries, if any.
        found: Option<String>,
    },

    /// Signature does not verify under the configured key.
    #[error("Token signature invalid")]
    SignatureInvalid,

    /// A custom claim was not sealed under the current passphrase.
    #[error("Claim `{claim}` could not be decrypted")]
    ClaimDecryptionFailed {
        /// Name of the claim.
        claim: String,
    },

    /// Key material is missing or unusable for signing.
    #[error("Token signing failed: {0}")]
    SigningFailed(String),

    /// The revocation store could not be reached.
    #[error("Revocation store failed: {0}")]
    RevocationStoreFailed(#[source] PlatformError),

    /// The refresh token was logged out.
    #[error("Token revoked")]
    TokenRevoked,

    /// Settings rejected at load or replace time.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Builds [`AuthError::MalformedToken`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        AuthError::MalformedToken(msg.into())
    }

    /// Builds [`AuthError::InvalidStructure`].
    pub fn invalid_structure(msg: impl Into<String>) -> Self {
        AuthError::InvalidStructure(msg.into())
    }

    /// Builds [`AuthError::SigningFailed`].
    pub fn signing(msg: impl Into<String>) -> Self {
        AuthError::SigningFailed(msg.into())
    }

    /// Builds [`AuthError::Configuration`].
    pub fn config(msg: impl Into<String>) -> Self {
        AuthError::Configuration(msg.into())
    }

    /// Builds [`AuthError::ClaimDecryptionFailed`].
    pub fn decryption(claim: impl Into<String>) -> Self {
        AuthError::ClaimDecryptionFailed {
            claim: claim.into(),
        }
    }

    pub(crate) fn expired_at(exp: i64) -> Self {
        AuthError::Expired {
            expired_at: timestamp(exp),
        }
    }

    pub(crate) fn not_before(nbf: i64) -> Self {
        AuthError::NotYetValid {
            valid_from: timestamp(nbf),
        }
    }

    /// True for failures that point at a forged or tampered token.
    #[must_use]
    pub fn is_security_event(&self) -> bool {
        matches!(self, AuthError::SignatureInvalid)
    }

    /// True only when the revocation store reported a transient failure.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            AuthError::RevocationStoreFailed(source) => source.is_retryable(),
            _ => false,
        }
    }

    /// The only text an end client may see. Token failures all collapse to
    /// [`UNAUTHENTICATED`] so responses never reveal why a token was refused.
    #[must_use]
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::SigningFailed(_)
            | AuthError::RevocationStoreFailed(_)
            | AuthError::Configuration(_) => INTERNAL_ERROR,
            _ => UNAUTHENTICATED,
        }
    }
}

impl From<PlatformError> for AuthError {
    fn from(err: PlatformError) -> Self {
        AuthError::RevocationStoreFailed(err)
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
