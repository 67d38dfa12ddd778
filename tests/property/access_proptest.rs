//! Property-based tests for the access evaluator

use collabnotes::backend::access::{can_access, evaluate, AccessGrant};
use collabnotes::shared::{SharingMetadata, UserId};
use proptest::prelude::*;
use uuid::Uuid;

fn user_id() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::new(Uuid::from_u128(n)))
}

fn sharing() -> impl Strategy<Value = SharingMetadata> {
    (
        user_id(),
        any::<bool>(),
        proptest::option::of("[a-z0-9]{0,8}"),
        proptest::collection::vec(user_id(), 0..4),
    )
        .prop_map(|(owner_id, is_public, share_token, shared_with)| SharingMetadata {
            owner_id,
            is_public,
            share_token,
            shared_with,
        })
}

proptest! {
    #[test]
    fn test_evaluation_is_deterministic(
        meta in sharing(),
        identity in proptest::option::of(user_id()),
        token in proptest::option::of("[a-z0-9]{0,8}"),
    ) {
        let first = evaluate(&meta, identity.as_ref(), token.as_deref());
        let second = evaluate(&meta, identity.as_ref(), token.as_deref());
        prop_assert_eq!(first, second);
        prop_assert_eq!(first.is_some(), can_access(&meta, identity.as_ref(), token.as_deref()));
    }

    #[test]
    fn test_public_always_wins(mut meta in sharing(), identity in proptest::option::of(user_id())) {
        meta.is_public = true;
        prop_assert_eq!(evaluate(&meta, identity.as_ref(), None), Some(AccessGrant::Public));
    }

    #[test]
    fn test_owner_always_allowed(mut meta in sharing()) {
        meta.is_public = false;
        let owner = meta.owner_id;
        prop_assert!(can_access(&meta, Some(&owner), None));
    }

    #[test]
    fn test_anonymous_without_token_denied_on_private(mut meta in sharing()) {
        meta.is_public = false;
        prop_assert_eq!(evaluate(&meta, None, None), None);
        prop_assert_eq!(evaluate(&meta, None, Some("")), None);
    }

    #[test]
    fn test_stranger_denied_on_private(mut meta in sharing(), stranger in user_id()) {
        prop_assume!(stranger != meta.owner_id && !meta.shared_with.contains(&stranger));
        meta.is_public = false;
        prop_assert!(!can_access(&meta, Some(&stranger), None));
    }

    #[test]
    fn test_matching_token_grants(mut meta in sharing(), token in "[a-z0-9]{1,8}") {
        meta.is_public = false;
        meta.share_token = Some(token.clone());
        prop_assert_eq!(evaluate(&meta, None, Some(token.as_str())), Some(AccessGrant::ShareToken));
    }
}
