//! Per-claim encryption.
//!
//! Custom claim values are sealed one at a time so the token signature and
//! the claim cipher stay independent of each other.

pub mod claim_cipher;

// Re-exports
pub use claim_cipher::{decrypt_claim, encrypt_claim, CipherRejected, ClaimCodec, Passphrase};
