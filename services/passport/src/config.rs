//! Configuration for token issuance, verification and revocation.
//!
//! Configuration is an immutable value: every `with_*` method consumes the
//! value and returns a new one. [`SharedConfig`] hands out snapshots so each
//! issuance or verification call reads the configuration in force at that
//! moment and nothing else.

use crate::crypto::{ClaimCodec, Passphrase};
use crate::error::AuthError;
use crate::issuer::TokenKind;
use arc_swap::ArcSwap;
use passport_common::CacheClientConfig;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// JWT signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtAlgorithm {
    /// HMAC with SHA-256
    HS256,
    /// HMAC with SHA-384
    HS384,
    /// HMAC with SHA-512
    HS512,
    /// RSA PKCS#1 v1.5 with SHA-256
    RS256,
    /// RSA PKCS#1 v1.5 with SHA-384
    RS384,
    /// RSA PKCS#1 v1.5 with SHA-512
    RS512,
    /// RSA-PSS with SHA-256
    PS256,
    /// RSA-PSS with SHA-384
    PS384,
    /// RSA-PSS with SHA-512
    PS512,
    /// ECDSA with P-256 and SHA-256
    ES256,
    /// ECDSA with P-384 and SHA-384
    ES384,
    /// Ed25519
    EdDSA,
}

/// Kind of key material an algorithm needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    /// Shared secret
    Hmac,
    /// RSA key pair
    Rsa,
    /// NIST curve key pair
    Ec,
    /// Edwards curve key pair
    Ed,
}

impl JwtAlgorithm {
    /// Get algorithm name for JWT header.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::EdDSA => "EdDSA",
        }
    }

    /// The matching `jsonwebtoken` algorithm.
    #[must_use]
    pub const fn to_jwt(self) -> jsonwebtoken::Algorithm {
        use jsonwebtoken::Algorithm;
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
            Self::RS512 => Algorithm::RS512,
            Self::PS256 => Algorithm::PS256,
            Self::PS384 => Algorithm::PS384,
            Self::PS512 => Algorithm::PS512,
            Self::ES256 => Algorithm::ES256,
            Self::ES384 => Algorithm::ES384,
            Self::EdDSA => Algorithm::EdDSA,
        }
    }

    /// Key material family required by this algorithm.
    #[must_use]
    pub const fn family(self) -> KeyFamily {
        match self {
            Self::HS256 | Self::HS384 | Self::HS512 => KeyFamily::Hmac,
            Self::RS256 | Self::RS384 | Self::RS512 | Self::PS256 | Self::PS384 | Self::PS512 => {
                KeyFamily::Rsa
            }
            Self::ES256 | Self::ES384 => KeyFamily::Ec,
            Self::EdDSA => KeyFamily::Ed,
        }
    }
}

impl FromStr for JwtAlgorithm {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            "PS256" => Ok(Self::PS256),
            "PS384" => Ok(Self::PS384),
            "PS512" => Ok(Self::PS512),
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            "EDDSA" => Ok(Self::EdDSA),
            _ => Err(AuthError::config(format!("Invalid JWT algorithm: {s}"))),
        }
    }
}

impl fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signing configuration shared by every token kind.
///
/// `token_id`, `expires_in` and `not_before` are the defaults; the issuer
/// derives a per-kind copy with [`AuthConfig::signing_for`].
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Signing algorithm
    pub algorithm: JwtAlgorithm,
    /// HMAC secret
    pub secret: Option<SecretString>,
    /// PEM private key, possibly `ENCRYPTED PRIVATE KEY`
    pub private_key: Option<SecretString>,
    /// PEM public key
    pub public_key: Option<String>,
    /// Password for an encrypted private key
    pub private_key_password: Option<SecretString>,
    /// `aud` written on issue and required on validation when non-empty
    pub audience: String,
    /// `iss` written on issue and required on validation when non-empty
    pub issuer: String,
    /// `sub` written on issue and required on validation when non-empty
    pub subject: String,
    /// `jti` written on issue and required on validation
    pub token_id: String,
    /// Seconds from issue until `exp`
    pub expires_in: i64,
    /// Seconds from issue until `nbf`
    pub not_before: i64,
}

impl SigningConfig {
    /// Create a configuration for `algorithm` with no key material.
    #[must_use]
    pub fn new(algorithm: JwtAlgorithm) -> Self {
        Self {
            algorithm,
            secret: None,
            private_key: None,
            public_key: None,
            private_key_password: None,
            audience: String::new(),
            issuer: String::new(),
            subject: String::new(),
            token_id: "passport".to_string(),
            expires_in: 3600,
            not_before: 0,
        }
    }

    /// HS256 configuration with the given secret.
    #[must_use]
    pub fn hmac(secret: impl Into<String>) -> Self {
        Self::new(JwtAlgorithm::HS256).with_secret(secret)
    }

    /// Signing algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: JwtAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// HMAC secret.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(SecretString::from(secret.into()));
        self
    }

    /// PEM private key, PKCS#1, SEC1 or PKCS#8.
    #[must_use]
    pub fn with_private_key(mut self, pem: impl Into<String>) -> Self {
        self.private_key = Some(SecretString::from(pem.into()));
        self
    }

    /// PEM public key.
    #[must_use]
    pub fn with_public_key(mut self, pem: impl Into<String>) -> Self {
        self.public_key = Some(pem.into());
        self
    }

    /// Password for an encrypted PKCS#8 private key.
    #[must_use]
    pub fn with_private_key_password(mut self, password: impl Into<String>) -> Self {
        self.private_key_password = Some(SecretString::from(password.into()));
        self
    }

    /// `aud` to stamp and enforce; empty disables it.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// `iss` to stamp and enforce; empty disables it.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// `sub` to stamp and enforce; empty disables it.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// `jti` stamped on every token.
    #[must_use]
    pub fn with_token_id(mut self, token_id: impl Into<String>) -> Self {
        self.token_id = token_id.into();
        self
    }

    /// Lifetime in seconds.
    #[must_use]
    pub fn with_expires_in(mut self, secs: i64) -> Self {
        self.expires_in = secs;
        self
    }

    /// Seconds after issue before the token becomes valid.
    #[must_use]
    pub fn with_not_before(mut self, secs: i64) -> Self {
        self.not_before = secs;
        self
    }

    /// Check lifetimes and that the algorithm has the material it needs.
    ///
    /// Asymmetric keys are only parsed when used, so a verifier-only
    /// deployment may omit the private key and vice versa.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.token_id.is_empty() {
            return Err(AuthError::config("token id must not be empty"));
        }
        check_lifetime("jwt", self.expires_in, self.not_before)?;

        match self.algorithm.family() {
            KeyFamily::Hmac => {
                let has_secret = self
                    .secret
                    .as_ref()
                    .is_some_and(|s| !s.expose_secret().is_empty());
                if !has_secret {
                    return Err(AuthError::config(format!(
                        "{} requires a non-empty secret",
                        self.algorithm
                    )));
                }
            }
            _ => {
                if self.private_key.is_none() && self.public_key.is_none() {
                    return Err(AuthError::config(format!(
                        "{} requires a private or public key",
                        self.algorithm
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Per-kind token settings.
#[derive(Debug, Clone)]
pub struct PassportConfig {
    /// `jti` of access tokens
    pub access_token_id: String,
    /// `jti` of refresh tokens
    pub refresh_token_id: String,
    /// Access token lifetime in seconds
    pub access_expires_in: i64,
    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
    /// Claim encryption passphrase; `None` leaves custom claims readable
    pub passphrase: Option<Passphrase>,
}

impl Default for PassportConfig {
    fn default() -> Self {
        Self {
            access_token_id: "passport-access-token".to_string(),
            refresh_token_id: "passport-refresh-token".to_string(),
            access_expires_in: 900,
            refresh_expires_in: 604_800,
            passphrase: None,
        }
    }
}

impl PassportConfig {
    /// `jti` marking access tokens.
    #[must_use]
    pub fn with_access_token_id(mut self, id: impl Into<String>) -> Self {
        self.access_token_id = id.into();
        self
    }

    /// `jti` marking refresh tokens.
    #[must_use]
    pub fn with_refresh_token_id(mut self, id: impl Into<String>) -> Self {
        self.refresh_token_id = id.into();
        self
    }

    /// Access token lifetime in seconds.
    #[must_use]
    pub fn with_access_expires_in(mut self, secs: i64) -> Self {
        self.access_expires_in = secs;
        self
    }

    /// Refresh token lifetime in seconds.
    #[must_use]
    pub fn with_refresh_expires_in(mut self, secs: i64) -> Self {
        self.refresh_expires_in = secs;
        self
    }

    /// Claim passphrase; `None` stores claims in the clear.
    #[must_use]
    pub fn with_passphrase(mut self, passphrase: Option<Passphrase>) -> Self {
        self.passphrase = passphrase;
        self
    }

    /// Token id and lifetime for `kind`.
    #[must_use]
    pub fn settings_for(&self, kind: TokenKind) -> (&str, i64) {
        match kind {
            TokenKind::Access => (&self.access_token_id, self.access_expires_in),
            TokenKind::Refresh => (&self.refresh_token_id, self.refresh_expires_in),
        }
    }
}

/// Where revocations are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDriver {
    /// In-process store
    Memory,
    /// Redis
    Redis,
}

impl FromStr for CacheDriver {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(AuthError::config(format!("Invalid cache driver: {s}"))),
        }
    }
}

/// Revocation cache connection settings.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Store backend
    pub driver: CacheDriver,
    /// Redis connection URL
    pub redis_url: String,
    /// Key prefix
    pub prefix: String,
    /// Timeout for a single cache round-trip
    pub timeout: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            driver: CacheDriver::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            prefix: "passport".to_string(),
            timeout: Duration::from_millis(500),
        }
    }
}

impl CacheSettings {
    /// Client config for the common cache stores.
    #[must_use]
    pub fn client_config(&self) -> CacheClientConfig {
        CacheClientConfig::default()
            .with_namespace(self.prefix.clone())
            .with_operation_timeout(self.timeout)
    }
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Signing defaults and key material
    pub jwt: SigningConfig,
    /// Access/refresh settings and claim passphrase
    pub passport: PassportConfig,
    /// Revocation cache
    pub cache: CacheSettings,
}

impl AuthConfig {
    /// Configuration with the in-memory revocation cache.
    #[must_use]
    pub fn new(jwt: SigningConfig, passport: PassportConfig) -> Self {
        Self {
            jwt,
            passport,
            cache: CacheSettings::default(),
        }
    }

    /// Replace the signing settings.
    #[must_use]
    pub fn with_jwt(mut self, jwt: SigningConfig) -> Self {
        self.jwt = jwt;
        self
    }

    /// Replace the token-kind settings.
    #[must_use]
    pub fn with_passport(mut self, passport: PassportConfig) -> Self {
        self.passport = passport;
        self
    }

    /// Replace the revocation cache settings.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheSettings) -> Self {
        self.cache = cache;
        self
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), AuthError> {
        self.jwt.validate()?;

        let p = &self.passport;
        if p.access_token_id.is_empty() || p.refresh_token_id.is_empty() {
            return Err(AuthError::config("token ids must not be empty"));
        }
        if p.access_token_id == p.refresh_token_id {
            return Err(AuthError::config(
                "access and refresh tokens must use different token ids",
            ));
        }
        check_lifetime("access token", p.access_expires_in, self.jwt.not_before)?;
        check_lifetime("refresh token", p.refresh_expires_in, self.jwt.not_before)?;

        Ok(())
    }

    /// Signing configuration bound to the token id and lifetime of `kind`.
    #[must_use]
    pub fn signing_for(&self, kind: TokenKind) -> SigningConfig {
        let (token_id, expires_in) = self.passport.settings_for(kind);
        self.jwt
            .clone()
            .with_token_id(token_id)
            .with_expires_in(expires_in)
    }

    /// Claim codec for the configured passphrase.
    #[must_use]
    pub fn claim_codec(&self) -> ClaimCodec {
        ClaimCodec::new(self.passport.passphrase.clone())
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed or the result fails
    /// [`AuthConfig::validate`].
    pub fn from_env() -> Result<Self, AuthError> {
        dotenvy::dotenv().ok();

        let algorithm: JwtAlgorithm = env::var("PASSPORT_JWT_ALGORITHM")
            .unwrap_or_else(|_| "HS256".to_string())
            .parse()?;

        let mut jwt = SigningConfig::new(algorithm)
            .with_audience(env_or("PASSPORT_JWT_AUD", ""))
            .with_issuer(env_or("PASSPORT_JWT_ISS", ""))
            .with_subject(env_or("PASSPORT_JWT_SUB", ""))
            .with_token_id(env_or("PASSPORT_JWT_JTI", "passport"))
            .with_expires_in(parse_env("PASSPORT_JWT_EXP", 3600)?)
            .with_not_before(parse_env("PASSPORT_JWT_NBF", 0)?);

        if let Some(secret) = non_empty_env("PASSPORT_JWT_SECRET") {
            jwt = jwt.with_secret(secret);
        }
        if let Some(pem) = env_or_file("PASSPORT_JWT_PRIVATE_KEY")? {
            jwt = jwt.with_private_key(pem);
        }
        if let Some(pem) = env_or_file("PASSPORT_JWT_PUBLIC_KEY")? {
            jwt = jwt.with_public_key(pem);
        }
        if let Some(password) = non_empty_env("PASSPORT_JWT_PRIVATE_KEY_PASSWORD") {
            jwt = jwt.with_private_key_password(password);
        }

        let defaults = PassportConfig::default();
        let passport = PassportConfig {
            access_token_id: env_or("PASSPORT_ACCESS_TOKEN_ID", &defaults.access_token_id),
            refresh_token_id: env_or("PASSPORT_REFRESH_TOKEN_ID", &defaults.refresh_token_id),
            access_expires_in: parse_env("PASSPORT_ACCESS_EXPIRES_IN", defaults.access_expires_in)?,
            refresh_expires_in: parse_env(
                "PASSPORT_REFRESH_EXPIRES_IN",
                defaults.refresh_expires_in,
            )?,
            passphrase: Passphrase::from_base64(&env_or("PASSPORT_JWT_PASSPHRASE", ""))?,
        };

        let cache_defaults = CacheSettings::default();
        let cache = CacheSettings {
            driver: env_or("PASSPORT_CACHE_DRIVER", "memory").parse()?,
            redis_url: env_or("PASSPORT_REDIS_URL", &cache_defaults.redis_url),
            prefix: env_or("PASSPORT_CACHE_PREFIX", &cache_defaults.prefix),
            timeout: Duration::from_millis(parse_env("PASSPORT_CACHE_TIMEOUT_MS", 500)?),
        };

        let config = Self {
            jwt,
            passport,
            cache,
        };
        config.validate()?;
        Ok(config)
    }
}

fn check_lifetime(what: &str, expires_in: i64, not_before: i64) -> Result<(), AuthError> {
    if not_before < 0 {
        return Err(AuthError::config("not-before offset must not be negative"));
    }
    if expires_in <= not_before {
        return Err(AuthError::config(format!(
            "{what} lifetime ({expires_in}s) must exceed the not-before offset ({not_before}s)"
        )));
    }
    Ok(())
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Read `NAME`, or the file named by `NAME_FILE`.
fn env_or_file(name: &str) -> Result<Option<String>, AuthError> {
    if let Some(value) = non_empty_env(name) {
        return Ok(Some(value));
    }
    match non_empty_env(&format!("{name}_FILE")) {
        Some(path) => std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| AuthError::config(format!("Cannot read {name}_FILE ({path}): {e}"))),
        None => Ok(None),
    }
}

/// Parse environment variable with default value.
fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, AuthError>
where
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| AuthError::config(format!("Invalid {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Configuration handle shared by the issuer, verifier and facade.
///
/// Reads are lock-free snapshots. [`SharedConfig::replace`] swaps the whole
/// configuration; calls already in flight finish with the old snapshot.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<ArcSwap<AuthConfig>>,
}

impl SharedConfig {
    /// Validate and wrap `config`.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        })
    }

    /// The configuration in force right now.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AuthConfig> {
        self.inner.load_full()
    }

    /// Swap in a new configuration.
    ///
    /// Rotation hazard: the passphrase and keys are read on every call, so
    /// replacing them makes every token issued under the old values fail
    /// signature verification or claim decryption from this point on.
    pub fn replace(&self, config: AuthConfig) -> Result<(), AuthError> {
        config.validate()?;
        self.inner.store(Arc::new(config));
        tracing::info!("Auth configuration replaced");
        Ok(())
    }
}

impl fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedConfig")
            .field("config", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new(SigningConfig::hmac("secret"), PassportConfig::default())
    }

    #[test]
    fn test_jwt_algorithm_parsing() {
        assert_eq!("HS256".parse::<JwtAlgorithm>().unwrap(), JwtAlgorithm::HS256);
        assert_eq!("rs256".parse::<JwtAlgorithm>().unwrap(), JwtAlgorithm::RS256);
        assert_eq!("EdDSA".parse::<JwtAlgorithm>().unwrap(), JwtAlgorithm::EdDSA);
        assert!("none".parse::<JwtAlgorithm>().is_err());
    }

    #[test]
    fn test_jwt_algorithm_family() {
        assert_eq!(JwtAlgorithm::HS512.family(), KeyFamily::Hmac);
        assert_eq!(JwtAlgorithm::PS256.family(), KeyFamily::Rsa);
        assert_eq!(JwtAlgorithm::ES384.family(), KeyFamily::Ec);
        assert_eq!(JwtAlgorithm::EdDSA.to_jwt(), jsonwebtoken::Algorithm::EdDSA);
    }

    #[test]
    fn test_builder_returns_new_value() {
        let base = SigningConfig::hmac("secret");
        let derived = base.clone().with_token_id("other").with_expires_in(60);

        assert_eq!(base.token_id, "passport");
        assert_eq!(base.expires_in, 3600);
        assert_eq!(derived.token_id, "other");
        assert_eq!(derived.expires_in, 60);
    }

    #[test]
    fn test_signing_for_kind() {
        let config = config();
        let access = config.signing_for(TokenKind::Access);
        let refresh = config.signing_for(TokenKind::Refresh);

        assert_eq!(access.token_id, "passport-access-token");
        assert_eq!(access.expires_in, 900);
        assert_eq!(refresh.token_id, "passport-refresh-token");
        assert_eq!(refresh.expires_in, 604_800);
    }

    #[test]
    fn test_validate_rejects_shared_token_id() {
        let config = config().with_passport(
            PassportConfig::default()
                .with_access_token_id("same")
                .with_refresh_token_id("same"),
        );
        assert!(matches!(config.validate(), Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_lifetime_not_after_nbf() {
        let config = config().with_jwt(SigningConfig::hmac("secret").with_not_before(900));
        assert!(config.validate().is_err());

        let config = config.with_jwt(SigningConfig::hmac("secret").with_not_before(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_key_material() {
        assert!(SigningConfig::new(JwtAlgorithm::HS256).validate().is_err());
        assert!(SigningConfig::hmac("").validate().is_err());
        assert!(SigningConfig::new(JwtAlgorithm::RS256).validate().is_err());
        assert!(SigningConfig::new(JwtAlgorithm::RS256)
            .with_public_key("-----BEGIN PUBLIC KEY-----")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = SigningConfig::hmac("super-secret-value");
        assert!(!format!("{config:?}").contains("super-secret-value"));
    }

    #[test]
    fn test_shared_config_replace() {
        let shared = SharedConfig::new(config()).unwrap();
        let before = shared.snapshot();

        shared
            .replace(config().with_passport(PassportConfig::default().with_access_expires_in(60)))
            .unwrap();

        assert_eq!(before.passport.access_expires_in, 900);
        assert_eq!(shared.snapshot().passport.access_expires_in, 60);
    }

    #[test]
    fn test_shared_config_rejects_invalid() {
        let invalid = config().with_jwt(SigningConfig::hmac("secret").with_token_id(""));
        assert!(SharedConfig::new(invalid).is_err());
    }

    const ENV_VARS: [&str; 22] = [
        "PASSPORT_JWT_ALGORITHM",
        "PASSPORT_JWT_SECRET",
        "PASSPORT_JWT_PRIVATE_KEY",
        "PASSPORT_JWT_PRIVATE_KEY_FILE",
        "PASSPORT_JWT_PUBLIC_KEY",
        "PASSPORT_JWT_PUBLIC_KEY_FILE",
        "PASSPORT_JWT_PRIVATE_KEY_PASSWORD",
        "PASSPORT_JWT_AUD",
        "PASSPORT_JWT_ISS",
        "PASSPORT_JWT_SUB",
        "PASSPORT_JWT_JTI",
        "PASSPORT_JWT_EXP",
        "PASSPORT_JWT_NBF",
        "PASSPORT_JWT_PASSPHRASE",
        "PASSPORT_ACCESS_TOKEN_ID",
        "PASSPORT_REFRESH_TOKEN_ID",
        "PASSPORT_ACCESS_EXPIRES_IN",
        "PASSPORT_REFRESH_EXPIRES_IN",
        "PASSPORT_CACHE_DRIVER",
        "PASSPORT_REDIS_URL",
        "PASSPORT_CACHE_PREFIX",
        "PASSPORT_CACHE_TIMEOUT_MS",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            env::remove_var(name);
        }
    }

    // Every case lives in one test: the process environment is shared
    // between test threads.
    #[test]
    fn test_from_env() {
        clear_env();

        env::set_var("PASSPORT_JWT_SECRET", "env-secret");
        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.jwt.algorithm, JwtAlgorithm::HS256);
        assert_eq!(config.jwt.token_id, "passport");
        assert_eq!(config.jwt.expires_in, 3600);
        assert_eq!(config.passport.access_token_id, "passport-access-token");
        assert_eq!(config.passport.refresh_expires_in, 604_800);
        assert!(config.passport.passphrase.is_none());
        assert_eq!(config.cache.driver, CacheDriver::Memory);
        assert_eq!(config.cache.timeout, Duration::from_millis(500));

        env::set_var("PASSPORT_JWT_PASSPHRASE", "c2VjcmV0");
        assert!(AuthConfig::from_env().unwrap().passport.passphrase.is_some());
        env::set_var("PASSPORT_JWT_PASSPHRASE", "");
        assert!(AuthConfig::from_env().unwrap().passport.passphrase.is_none());
        env::set_var("PASSPORT_JWT_PASSPHRASE", "***");
        assert!(matches!(AuthConfig::from_env(), Err(AuthError::Configuration(_))));
        env::remove_var("PASSPORT_JWT_PASSPHRASE");

        env::set_var("PASSPORT_CACHE_DRIVER", "memcached");
        assert!(matches!(AuthConfig::from_env(), Err(AuthError::Configuration(_))));
        env::set_var("PASSPORT_CACHE_DRIVER", "redis");
        assert_eq!(AuthConfig::from_env().unwrap().cache.driver, CacheDriver::Redis);
        env::remove_var("PASSPORT_CACHE_DRIVER");

        env::set_var("PASSPORT_ACCESS_TOKEN_ID", "same");
        env::set_var("PASSPORT_REFRESH_TOKEN_ID", "same");
        assert!(matches!(AuthConfig::from_env(), Err(AuthError::Configuration(_))));
        env::remove_var("PASSPORT_ACCESS_TOKEN_ID");
        env::remove_var("PASSPORT_REFRESH_TOKEN_ID");

        env::set_var("PASSPORT_ACCESS_EXPIRES_IN", "soon");
        assert!(matches!(AuthConfig::from_env(), Err(AuthError::Configuration(_))));
        env::remove_var("PASSPORT_ACCESS_EXPIRES_IN");

        env::remove_var("PASSPORT_JWT_SECRET");
        env::set_var("PASSPORT_JWT_ALGORITHM", "ES256");
        assert!(matches!(AuthConfig::from_env(), Err(AuthError::Configuration(_))));
        env::set_var(
            "PASSPORT_JWT_PUBLIC_KEY_FILE",
            concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ec_public.pem"),
        );
        let config = AuthConfig::from_env().unwrap();
        assert_eq!(
            config.jwt.public_key.as_deref(),
            Some(include_str!("../tests/fixtures/ec_public.pem"))
        );
        env::set_var("PASSPORT_JWT_PUBLIC_KEY_FILE", "/nonexistent/passport.pem");
        assert!(matches!(AuthConfig::from_env(), Err(AuthError::Configuration(_))));

        clear_env();
    }

    #[test]
    fn test_cache_driver_parsing() {
        assert_eq!("Redis".parse::<CacheDriver>().unwrap(), CacheDriver::Redis);
        assert_eq!("memory".parse::<CacheDriver>().unwrap(), CacheDriver::Memory);
        assert!("memcached".parse::<CacheDriver>().is_err());
    }
}
