//! Access and refresh token issuance.

use crate::clock::{self, Clock};
use crate::config::{AuthConfig, SharedConfig};
use crate::error::AuthError;
use crate::jwt::{CustomClaims, JwtSigner};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Principal identity carried as custom claims, e.g. `{"id": "42"}`.
pub type PrincipalClaims = BTreeMap<String, String>;

/// Purpose of a token. Each kind has its own token id and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived, presented on every request
    Access,
    /// Long-lived, exchanged for new access tokens
    Refresh,
}

impl TokenKind {
    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access and refresh tokens issued together.
#[derive(Clone, Serialize)]
pub struct TokenPair {
    /// Compact access token.
    pub access_token: String,
    /// Compact refresh token.
    pub refresh_token: String,
    /// Seconds
    pub access_expires_in: i64,
    /// Seconds
    pub refresh_expires_in: i64,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_expires_in", &self.access_expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .finish_non_exhaustive()
    }
}

/// Issues tokens from the configuration in force at call time.
#[derive(Clone)]
pub struct TokenIssuer {
    config: SharedConfig,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Issuer reading settings from `config` and time from `clock`.
    #[must_use]
    pub fn new(config: SharedConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Issuer on the wall clock.
    #[must_use]
    pub fn with_system_clock(config: SharedConfig) -> Self {
        Self::new(config, clock::system())
    }

    /// Issue an access token; every claim value is sealed first.
    pub fn issue_access_token(&self, claims: &PrincipalClaims) -> Result<String, AuthError> {
        self.issue(TokenKind::Access, claims)
    }

    /// Issue a refresh token; every claim value is sealed first.
    pub fn issue_refresh_token(&self, claims: &PrincipalClaims) -> Result<String, AuthError> {
        self.issue(TokenKind::Refresh, claims)
    }

    /// Issue a token of `kind` from the current configuration.
    #[instrument(skip(self, claims), fields(kind = %kind))]
    pub fn issue(&self, kind: TokenKind, claims: &PrincipalClaims) -> Result<String, AuthError> {
        let config = self.config.snapshot();
        self.issue_from(&config, kind, claims)
    }

    /// Issue both kinds from a single configuration snapshot.
    #[instrument(skip_all)]
    pub fn issue_pair(&self, claims: &PrincipalClaims) -> Result<TokenPair, AuthError> {
        let config = self.config.snapshot();
        Ok(TokenPair {
            access_token: self.issue_from(&config, TokenKind::Access, claims)?,
            refresh_token: self.issue_from(&config, TokenKind::Refresh, claims)?,
            access_expires_in: config.passport.access_expires_in,
            refresh_expires_in: config.passport.refresh_expires_in,
        })
    }

    /// Issue a general-purpose token with the default token id and lifetime.
    ///
    /// Claims are written as given, without sealing.
    pub fn issue_with_defaults(&self, claims: &PrincipalClaims) -> Result<String, AuthError> {
        let config = self.config.snapshot();
        let custom = claims
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        JwtSigner::new(config.jwt.clone(), Arc::clone(&self.clock)).sign(custom)
    }

    fn issue_from(
        &self,
        config: &AuthConfig,
        kind: TokenKind,
        claims: &PrincipalClaims,
    ) -> Result<String, AuthError> {
        let codec = config.claim_codec();
        let custom: CustomClaims = claims
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(codec.encrypt(value))))
            .collect();

        let signer = JwtSigner::new(config.signing_for(kind), Arc::clone(&self.clock));
        let token = signer.sign(custom)?;
        debug!(
            kind = %kind,
            claims = claims.len(),
            encrypted = codec.is_encrypting(),
            "Token issued"
        );
        Ok(token)
    }
}
