//! Passport token core.
//!
//! Issues signed access and refresh tokens with per-claim encryption,
//! verifies them through an ordered pipeline, and revokes refresh tokens
//! through a cache-backed ledger.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod issuer;
pub mod jwt;
pub mod passport;
pub mod revocation;
pub mod storage;
pub mod verifier;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, JwtAlgorithm, PassportConfig, SharedConfig, SigningConfig};
pub use crypto::{ClaimCodec, Passphrase};
pub use error::AuthError;
pub use issuer::{PrincipalClaims, TokenIssuer, TokenKind, TokenPair};
pub use passport::Passport;
pub use revocation::RevocationLedger;
pub use verifier::{PipelineStage, TokenVerifier, VerifiedToken, VerifyOptions};
