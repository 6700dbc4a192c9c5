//! Token revocation.

pub mod ledger;

pub use ledger::{fingerprint, RevocationLedger};
