//! Shared fixtures for passport integration tests.

#![allow(dead_code)]

use passport::{
    AuthConfig, ManualClock, Passphrase, Passport, PassportConfig, PrincipalClaims, SharedConfig,
    SigningConfig, TokenIssuer, TokenVerifier,
};
use passport_common::MemoryCache;
use std::sync::Arc;

pub const NOW: i64 = 1_700_000_000;
pub const SECRET: &str = "test-secret-key-for-testing-only";

pub const RSA_PRIVATE: &str = include_str!("../fixtures/rsa_private.pem");
pub const RSA_PUBLIC: &str = include_str!("../fixtures/rsa_public.pem");
pub const RSA_PRIVATE_ENCRYPTED: &str = include_str!("../fixtures/rsa_private_encrypted.pem");
pub const RSA_PASSWORD: &str = "passport-test";
pub const EC_PRIVATE: &str = include_str!("../fixtures/ec_private.pem");
pub const EC_PUBLIC: &str = include_str!("../fixtures/ec_public.pem");
pub const ED_PRIVATE: &str = include_str!("../fixtures/ed25519_private.pem");
pub const ED_PUBLIC: &str = include_str!("../fixtures/ed25519_public.pem");

/// Everything a test needs, wired to one config, clock and store.
pub struct Harness {
    pub config: SharedConfig,
    pub clock: ManualClock,
    pub store: MemoryCache,
    pub issuer: TokenIssuer,
    pub verifier: TokenVerifier,
    pub passport: Passport,
}

pub fn auth_config(passphrase: &str) -> AuthConfig {
    AuthConfig::new(
        SigningConfig::hmac(SECRET),
        PassportConfig::default()
            .with_access_expires_in(900)
            .with_passphrase(Passphrase::new(passphrase)),
    )
}

pub fn harness(passphrase: &str) -> Harness {
    harness_with(auth_config(passphrase))
}

pub fn harness_with(config: AuthConfig) -> Harness {
    let config = SharedConfig::new(config).unwrap();
    let clock = ManualClock::new(NOW);
    let store = MemoryCache::default();

    Harness {
        issuer: TokenIssuer::new(config.clone(), Arc::new(clock.clone())),
        verifier: TokenVerifier::new(config.clone(), Arc::new(clock.clone())),
        passport: Passport::with_clock(
            config.clone(),
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
        ),
        config,
        clock,
        store,
    }
}

pub fn principal(id: &str) -> PrincipalClaims {
    PrincipalClaims::from([("id".to_string(), id.to_string())])
}

/// Replace the character at `index` of the signature segment.
pub fn tamper_signature(token: &str, index: usize, replacement: char) -> String {
    let split = token.rfind('.').unwrap() + 1;
    let mut signature: Vec<char> = token[split..].chars().collect();
    let index = index % signature.len();
    signature[index] = replacement;
    format!("{}{}", &token[..split], signature.into_iter().collect::<String>())
}
