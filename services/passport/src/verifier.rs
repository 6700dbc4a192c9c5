//! Token verification pipeline.
//!
//! Stages run strictly in order and the first failure ends the run:
//! `Parsed -> StructurallyValid -> SignatureVerified -> ClaimsDecrypted -> Accepted`.

use crate::clock::{self, Clock};
use crate::config::SharedConfig;
use crate::error::AuthError;
use crate::issuer::{PrincipalClaims, TokenKind};
use crate::jwt::{Claims, JwtSigner, ReservedClaim};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Pipeline stage a token reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    /// Split and decoded
    Parsed,
    /// Reserved claims checked against configuration and clock
    StructurallyValid,
    /// Signature checked
    SignatureVerified,
    /// Custom claims opened
    ClaimsDecrypted,
    /// Handed to the caller
    Accepted,
}

impl PipelineStage {
    /// Name recorded in the `stage` log field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::StructurallyValid => "structurally_valid",
            Self::SignatureVerified => "signature_verified",
            Self::ClaimsDecrypted => "claims_decrypted",
            Self::Accepted => "accepted",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs for a single verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Run the signature stage. Validation always runs.
    pub verify_signature: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            verify_signature: true,
        }
    }
}

impl VerifyOptions {
    /// Skip the signature stage, for operator paths such as forced logout.
    #[must_use]
    pub const fn without_signature() -> Self {
        Self {
            verify_signature: false,
        }
    }
}

/// A token that passed the pipeline, with custom claims opened.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    kind: TokenKind,
    claims: Claims,
    custom: PrincipalClaims,
    signature_verified: bool,
}

impl VerifiedToken {
    /// Kind the token was verified as.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Reserved claims as carried in the token. `custom` holds the sealed
    /// values; use [`VerifiedToken::custom_claims`] for the opened ones.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Read a claim by name. Reserved claims bypass the codec.
    #[must_use]
    pub fn get_claim(&self, name: &str) -> Option<String> {
        match ReservedClaim::from_name(name) {
            Some(reserved) => self.claims.reserved(reserved),
            None => self.custom.get(name).cloned(),
        }
    }

    /// Opened custom claims.
    #[must_use]
    pub fn custom_claims(&self) -> &PrincipalClaims {
        &self.custom
    }

    /// Whether the signature stage ran.
    #[must_use]
    pub fn signature_verified(&self) -> bool {
        self.signature_verified
    }

    /// `iat`, unix seconds.
    #[must_use]
    pub fn issued_at(&self) -> i64 {
        self.claims.iat.unwrap_or_default()
    }

    /// `exp`, unix seconds.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.claims.exp.unwrap_or_default()
    }

    /// `exp` as a UTC timestamp.
    #[must_use]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at(), 0)
    }

    /// Full validity window, `exp - iat`.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        let secs = self.claims.lifetime().unwrap_or_default();
        Duration::from_secs(u64::try_from(secs).unwrap_or_default())
    }
}

/// Runs the verification pipeline against the configuration in force.
#[derive(Clone)]
pub struct TokenVerifier {
    config: SharedConfig,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    /// Verifier reading settings from `config` and time from `clock`.
    #[must_use]
    pub fn new(config: SharedConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Verifier on the wall clock.
    #[must_use]
    pub fn with_system_clock(config: SharedConfig) -> Self {
        Self::new(config, clock::system())
    }

    /// Full pipeline for a token of the given kind.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<VerifiedToken, AuthError> {
        self.verify_with(token, kind, VerifyOptions::default())
    }

    /// Shorthand for [`TokenVerifier::verify`] with [`TokenKind::Access`].
    pub fn verify_access(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        self.verify(token, TokenKind::Access)
    }

    /// Shorthand for [`TokenVerifier::verify`] with [`TokenKind::Refresh`].
    pub fn verify_refresh(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        self.verify(token, TokenKind::Refresh)
    }

    /// Pipeline with options.
    #[instrument(skip(self, token), fields(kind = %kind))]
    pub fn verify_with(
        &self,
        token: &str,
        kind: TokenKind,
        options: VerifyOptions,
    ) -> Result<VerifiedToken, AuthError> {
        match self.run(token, kind, options) {
            Ok(verified) => {
                debug!(stage = %PipelineStage::Accepted, "Token accepted");
                Ok(verified)
            }
            Err((stage, err)) => {
                debug!(failed_stage = %stage, error = %err, "Token rejected");
                Err(err)
            }
        }
    }

    /// Read one claim from a verified token.
    pub fn get_claim(
        &self,
        token: &str,
        kind: TokenKind,
        name: &str,
    ) -> Result<Option<String>, AuthError> {
        Ok(self.verify(token, kind)?.get_claim(name))
    }

    fn run(
        &self,
        token: &str,
        kind: TokenKind,
        options: VerifyOptions,
    ) -> Result<VerifiedToken, (PipelineStage, AuthError)> {
        let config = self.config.snapshot();
        let signer = JwtSigner::new(config.signing_for(kind), Arc::clone(&self.clock));
        let at = |stage: PipelineStage| move |err: AuthError| (stage, err);

        let parsed = signer.parse(token).map_err(at(PipelineStage::Parsed))?;
        signer
            .validate(&parsed)
            .map_err(at(PipelineStage::StructurallyValid))?;
        if options.verify_signature {
            signer
                .verify(&parsed)
                .map_err(at(PipelineStage::SignatureVerified))?;
        }

        let codec = config.claim_codec();
        let claims = parsed.into_claims();
        let custom = claims
            .custom
            .iter()
            .map(|(name, value)| {
                let opened = match value {
                    Value::String(sealed) => codec.decrypt(name, sealed)?,
                    _ if codec.is_encrypting() => return Err(AuthError::decryption(name)),
                    other => other.to_string(),
                };
                Ok((name.clone(), opened))
            })
            .collect::<Result<PrincipalClaims, AuthError>>()
            .map_err(at(PipelineStage::ClaimsDecrypted))?;

        Ok(VerifiedToken {
            kind,
            claims,
            custom,
            signature_verified: options.verify_signature,
        })
    }
}
