//! Login, authentication, refresh and logout flows.
//!
//! Access tokens are never looked up in the revocation ledger; they are
//! short-lived and a lookup per request is not worth its cost. Refresh tokens
//! are checked against the ledger before anything else is done with them.

use crate::clock::{self, Clock};
use crate::config::{AuthConfig, SharedConfig};
use crate::error::AuthError;
use crate::issuer::{PrincipalClaims, TokenIssuer, TokenKind, TokenPair};
use crate::revocation::{fingerprint, RevocationLedger};
use crate::storage;
use crate::verifier::{TokenVerifier, VerifiedToken, VerifyOptions};
use passport_common::CacheStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Entry point tying issuer, verifier and ledger together.
#[derive(Clone)]
pub struct Passport {
    config: SharedConfig,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    ledger: RevocationLedger,
}

impl Passport {
    /// Facade on the wall clock, revoking into `store`.
    #[must_use]
    pub fn new(config: SharedConfig, store: Arc<dyn CacheStore>) -> Self {
        Self::with_clock(config, store, clock::system())
    }

    /// Same as [`Passport::new`] with an explicit clock.
    #[must_use]
    pub fn with_clock(
        config: SharedConfig,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer: TokenIssuer::new(config.clone(), Arc::clone(&clock)),
            verifier: TokenVerifier::new(config.clone(), clock),
            ledger: RevocationLedger::new(store),
            config,
        }
    }

    /// Validate `config` and connect the cache it names.
    pub async fn from_config(config: AuthConfig) -> Result<Self, AuthError> {
        let store = storage::build_store(&config.cache).await?;
        Ok(Self::new(SharedConfig::new(config)?, store))
    }

    /// Live configuration; replace it to rotate keys.
    #[must_use]
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Token issuer sharing this configuration.
    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Verification pipeline sharing this configuration.
    #[must_use]
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Revocation ledger.
    #[must_use]
    pub fn ledger(&self) -> &RevocationLedger {
        &self.ledger
    }

    /// Issue an access/refresh pair for a freshly authenticated principal.
    pub fn issue_pair(&self, principal: &PrincipalClaims) -> Result<TokenPair, AuthError> {
        self.issuer.issue_pair(principal)
    }

    /// Authenticate a request by its access token.
    pub fn authenticate(&self, access_token: &str) -> Result<VerifiedToken, AuthError> {
        report(TokenKind::Access, self.verifier.verify_access(access_token))
    }

    /// Trade a refresh token for a new access token carrying the same claims.
    ///
    /// A revoked refresh token is refused before it is parsed or its
    /// signature checked.
    #[instrument(skip_all)]
    pub async fn exchange(&self, refresh_token: &str) -> Result<String, AuthError> {
        if self.ledger.is_revoked(refresh_token).await? {
            info!(fingerprint = %fingerprint(refresh_token), "Revoked refresh token presented");
            return Err(AuthError::TokenRevoked);
        }

        let verified = report(TokenKind::Refresh, self.verifier.verify_refresh(refresh_token))?;
        self.issuer.issue_access_token(verified.custom_claims())
    }

    /// Revoke a refresh token until it would have expired.
    ///
    /// The signature is not checked so an operator can revoke a token
    /// issued under keys that have since been rotated.
    #[instrument(skip_all)]
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        if self.ledger.is_revoked(refresh_token).await? {
            return Err(AuthError::TokenRevoked);
        }

        let verified = self.verifier.verify_with(
            refresh_token,
            TokenKind::Refresh,
            VerifyOptions::without_signature(),
        )?;
        let ttl = verified.lifetime();
        if ttl.is_zero() {
            return Err(AuthError::invalid_structure("refresh token has no lifetime"));
        }
        self.ledger.revoke(refresh_token, ttl).await
    }
}

fn report<T>(kind: TokenKind, result: Result<T, AuthError>) -> Result<T, AuthError> {
    if let Err(err) = &result {
        if err.is_security_event() {
            warn!(kind = %kind, error = %err, "Token signature rejected, possible tampering");
        }
    }
    result
}
