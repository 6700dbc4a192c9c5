//! JWT claims, keys, parsing and signing.

pub mod claims;
pub mod keys;
pub mod signer;
pub mod token;

pub use claims::{Audience, Claims, CustomClaims, ReservedClaim};
pub use signer::JwtSigner;
pub use token::ParsedToken;
