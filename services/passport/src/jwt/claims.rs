//! JWT claim set with typed reserved fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Claims outside the reserved set, keyed by name.
pub type CustomClaims = BTreeMap<String, Value>;

/// `aud` is either a single string or an array on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience
    One(String),
    /// Several audiences
    Many(Vec<String>),
}

impl Audience {
    /// Whether `audience` is among the token's audiences.
    #[must_use]
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::One(aud) => aud == audience,
            Self::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::One(aud) => f.write_str(aud),
            Self::Many(auds) => f.write_str(&auds.join(",")),
        }
    }
}

/// Names with identity or temporal meaning. Never encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedClaim {
    /// `aud`
    Audience,
    /// `iss`
    Issuer,
    /// `sub`
    Subject,
    /// `jti`
    TokenId,
    /// `iat`
    IssuedAt,
    /// `nbf`
    NotBefore,
    /// `exp`
    Expiry,
}

impl ReservedClaim {
    /// Every reserved claim.
    pub const ALL: [Self; 7] = [
        Self::Audience,
        Self::Issuer,
        Self::Subject,
        Self::TokenId,
        Self::IssuedAt,
        Self::NotBefore,
        Self::Expiry,
    ];

    /// Claim name as it appears in the payload.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Audience => "aud",
            Self::Issuer => "iss",
            Self::Subject => "sub",
            Self::TokenId => "jti",
            Self::IssuedAt => "iat",
            Self::NotBefore => "nbf",
            Self::Expiry => "exp",
        }
    }

    /// Look up a reserved claim by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|claim| claim.as_str() == name)
    }
}

/// Claim set carried in the token payload.
///
/// Reserved fields are optional so a token missing them still parses and
/// can be inspected; [`crate::jwt::JwtSigner::validate`] decides whether
/// their absence is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Audience, one string or a list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Token id; tells access from refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Issued at, unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Not before, unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Expiry, unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Everything else
    #[serde(flatten)]
    pub custom: CustomClaims,
}

impl Claims {
    /// String form of a reserved claim, if present.
    #[must_use]
    pub fn reserved(&self, claim: ReservedClaim) -> Option<String> {
        match claim {
            ReservedClaim::Audience => self.aud.as_ref().map(ToString::to_string),
            ReservedClaim::Issuer => self.iss.clone(),
            ReservedClaim::Subject => self.sub.clone(),
            ReservedClaim::TokenId => self.jti.clone(),
            ReservedClaim::IssuedAt => self.iat.map(|v| v.to_string()),
            ReservedClaim::NotBefore => self.nbf.map(|v| v.to_string()),
            ReservedClaim::Expiry => self.exp.map(|v| v.to_string()),
        }
    }

    /// Seconds between issue and expiry, when both are present and the
    /// difference fits in an `i64`.
    #[must_use]
    pub fn lifetime(&self) -> Option<i64> {
        self.exp?.checked_sub(self.iat?)
    }
}
