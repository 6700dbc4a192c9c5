//! Signing, structural validation and signature verification.
//!
//! The three steps are separate so a caller can parse a token and inspect it
//! (for instance to look it up in the revocation ledger) before paying for a
//! signature check.

use crate::clock::Clock;
use crate::config::SigningConfig;
use crate::error::AuthError;
use crate::jwt::claims::{Audience, Claims, CustomClaims, ReservedClaim};
use crate::jwt::keys;
use crate::jwt::token::ParsedToken;
use jsonwebtoken::{encode, Header};
use std::sync::Arc;
use tracing::instrument;

/// Signs and checks tokens for one [`SigningConfig`].
#[derive(Clone)]
pub struct JwtSigner {
    config: SigningConfig,
    clock: Arc<dyn Clock>,
}

impl JwtSigner {
    /// Signer for `config`, reading time from `clock`.
    #[must_use]
    pub fn new(config: SigningConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Settings this signer was built from.
    #[must_use]
    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Sign `custom` together with the configured reserved claims.
    ///
    /// `iat` is now, `nbf` and `exp` are offsets from it.
    #[instrument(skip_all, fields(jti = %self.config.token_id, alg = %self.config.algorithm))]
    pub fn sign(&self, custom: CustomClaims) -> Result<String, AuthError> {
        if let Some(name) = custom.keys().find(|k| ReservedClaim::from_name(k).is_some()) {
            return Err(AuthError::signing(format!(
                "custom claim `{name}` collides with a reserved claim"
            )));
        }

        let now = self.clock.now();
        let claims = Claims {
            aud: non_empty(&self.config.audience).map(Audience::One),
            iss: non_empty(&self.config.issuer),
            sub: non_empty(&self.config.subject),
            jti: Some(self.config.token_id.clone()),
            iat: Some(now),
            nbf: Some(now + self.config.not_before),
            exp: Some(now + self.config.expires_in),
            custom,
        };

        let key = keys::encoding_key(&self.config)?;
        let header = Header::new(self.config.algorithm.to_jwt());
        encode(&header, &claims, &key).map_err(|e| AuthError::signing(e.to_string()))
    }

    /// Split and decode a token. No checks beyond well-formedness.
    pub fn parse(&self, token: &str) -> Result<ParsedToken, AuthError> {
        ParsedToken::parse(token)
    }

    /// Check reserved claims against the configuration and the clock.
    pub fn validate(&self, parsed: &ParsedToken) -> Result<(), AuthError> {
        self.validate_at(parsed, self.clock.now())
    }

    /// [`JwtSigner::validate`] at an explicit unix time.
    pub fn validate_at(&self, parsed: &ParsedToken, now: i64) -> Result<(), AuthError> {
        let claims = parsed.claims();

        let exp = claims
            .exp
            .ok_or_else(|| AuthError::invalid_structure("missing exp"))?;
        let iat = claims
            .iat
            .ok_or_else(|| AuthError::invalid_structure("missing iat"))?;
        let nbf = claims.nbf.unwrap_or(iat);
        if nbf < iat || exp <= nbf {
            return Err(AuthError::invalid_structure(
                "temporal claims out of order (iat <= nbf < exp)",
            ));
        }
        if exp.checked_sub(iat).is_none() {
            return Err(AuthError::invalid_structure("token lifetime out of range"));
        }

        if claims.jti.as_deref() != Some(self.config.token_id.as_str()) {
            return Err(AuthError::WrongTokenKind {
                expected: self.config.token_id.clone(),
                found: claims.jti.clone(),
            });
        }

        if !self.config.issuer.is_empty()
            && claims.iss.as_deref() != Some(self.config.issuer.as_str())
        {
            return Err(AuthError::ClaimMismatch { claim: "iss" });
        }
        if !self.config.audience.is_empty()
            && !claims
                .aud
                .as_ref()
                .is_some_and(|aud| aud.contains(&self.config.audience))
        {
            return Err(AuthError::ClaimMismatch { claim: "aud" });
        }
        if !self.config.subject.is_empty()
            && claims.sub.as_deref() != Some(self.config.subject.as_str())
        {
            return Err(AuthError::ClaimMismatch { claim: "sub" });
        }

        if now < nbf {
            return Err(AuthError::not_before(nbf));
        }
        if now >= exp {
            return Err(AuthError::expired_at(exp));
        }

        Ok(())
    }

    /// Check the signature with the configured key.
    ///
    /// The header must name the configured algorithm; a token cannot pick
    /// its own.
    pub fn verify(&self, parsed: &ParsedToken) -> Result<(), AuthError> {
        let algorithm = self.config.algorithm.to_jwt();
        if parsed.header().alg != algorithm {
            return Err(AuthError::SignatureInvalid);
        }

        let key = keys::decoding_key(&self.config)?;
        match jsonwebtoken::crypto::verify(
            parsed.signature(),
            parsed.signing_input().as_bytes(),
            &key,
            algorithm,
        ) {
            Ok(true) => Ok(()),
            _ => Err(AuthError::SignatureInvalid),
        }
    }
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
