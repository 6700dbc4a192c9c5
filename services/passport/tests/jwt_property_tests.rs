//! Property-based tests for issuance and the verification pipeline.
//!
//! Property 1: Issue/verify round-trip returns the principal claims
//! Property 2: Any signature change is rejected as SignatureInvalid
//! Property 3: Tokens are valid strictly before exp and expired from exp on
//! Property 4: Token kinds are never interchangeable

mod common;

use common::{harness, tamper_signature, NOW};
use passport::{AuthError, PrincipalClaims, TokenKind};
use proptest::prelude::*;

const RESERVED: [&str; 7] = ["aud", "iss", "sub", "jti", "iat", "nbf", "exp"];

/// Generate claim names that do not collide with reserved claims.
fn arb_claim_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_filter("reserved claim name", |name| {
        !RESERVED.contains(&name.as_str())
    })
}

/// Generate principal claim sets.
fn arb_principal() -> impl Strategy<Value = PrincipalClaims> {
    prop::collection::btree_map(arb_claim_name(), ".{0,48}", 1..6)
}

/// Generate passphrases, empty meaning no encryption.
fn arb_passphrase() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[ -~]{1,32}"]
}

fn arb_replacement() -> impl Strategy<Value = char> {
    prop::sample::select(
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789"
            .chars()
            .collect::<Vec<_>>(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property 1: Issue/verify round-trip.
    #[test]
    fn prop_round_trip(principal in arb_principal(), passphrase in arb_passphrase()) {
        let h = harness(&passphrase);

        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let token = h.issuer.issue(kind, &principal).unwrap();
            let verified = h.verifier.verify(&token, kind).unwrap();

            prop_assert_eq!(verified.custom_claims(), &principal);
            prop_assert_eq!(verified.kind(), kind);
            for (name, value) in &principal {
                let opened = verified.get_claim(name);
                prop_assert_eq!(opened.as_deref(), Some(value.as_str()));
            }
        }
    }

    /// Property 2: Mutating the signature segment fails verification.
    #[test]
    fn prop_signature_mutation_rejected(
        principal in arb_principal(),
        index in 0usize..512,
        replacement in arb_replacement(),
    ) {
        let h = harness("secret");
        let token = h.issuer.issue_access_token(&principal).unwrap();

        let tampered = tamper_signature(&token, index, replacement);
        prop_assume!(tampered != token);

        let result = h.verifier.verify_access(&tampered);
        prop_assert!(matches!(result, Err(AuthError::SignatureInvalid)), "got {:?}", result);
    }

    /// Property 3: Expiry boundary.
    #[test]
    fn prop_expiry_boundary(offset in 0i64..1_800) {
        let h = harness("");
        let token = h.issuer.issue_access_token(&common::principal("42")).unwrap();

        h.clock.set(NOW + offset);
        let result = h.verifier.verify_access(&token);
        if offset < 900 {
            prop_assert!(result.is_ok(), "offset {} rejected: {:?}", offset, result);
        } else {
            prop_assert!(
                matches!(result, Err(AuthError::Expired { .. })),
                "offset {}: {:?}",
                offset,
                result
            );
        }
    }

    /// Property 4: Kinds are bound to their token ids.
    #[test]
    fn prop_kinds_not_interchangeable(principal in arb_principal()) {
        let h = harness("secret");
        let access = h.issuer.issue_access_token(&principal).unwrap();
        let refresh = h.issuer.issue_refresh_token(&principal).unwrap();

        let as_refresh = h.verifier.verify_refresh(&access);
        prop_assert!(
            matches!(as_refresh, Err(AuthError::WrongTokenKind { .. })),
            "access accepted as refresh: {:?}",
            as_refresh
        );
        let as_access = h.verifier.verify_access(&refresh);
        prop_assert!(
            matches!(as_access, Err(AuthError::WrongTokenKind { .. })),
            "refresh accepted as access: {:?}",
            as_access
        );
    }
}

#[test]
fn test_garbage_is_malformed() {
    let h = harness("");
    for token in ["", "abc", "a.b", "a.b.c.d", "!!!.???.***"] {
        assert!(
            matches!(h.verifier.verify_access(token), Err(AuthError::MalformedToken(_))),
            "{token:?}"
        );
    }
}
