//! Access Control Module
//!
//! Decides whether a connection may read and write a document. The decision
//! is a pure function of the document's sharing metadata, the connection's
//! identity and an optional share code; callers fetch fresh metadata before
//! every decision.
//!
//! # Decision order
//!
//! First match wins:
//!
//! 1. Public document → allow
//! 2. Share code supplied and equal to the document's → allow
//! 3. No identity → deny
//! 4. Identity is the owner → allow
//! 5. Identity is in the shared-with set → allow
//! 6. Deny
//!
//! Read and write are not distinguished: any grant allows both.

use subtle::ConstantTimeEq;

use crate::shared::{SharingMetadata, UserId};

/// Which rule granted access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessGrant {
    Public,
    ShareToken,
    Owner,
    SharedWith,
}

fn share_token_matches(stored: Option<&str>, supplied: Option<&str>) -> bool {
    match (stored, supplied) {
        (Some(stored), Some(supplied)) if !supplied.is_empty() => {
            stored.as_bytes().ct_eq(supplied.as_bytes()).into()
        }
        _ => false,
    }
}

/// Evaluate access, naming the rule that matched
pub fn evaluate(
    sharing: &SharingMetadata,
    identity: Option<&UserId>,
    share_token: Option<&str>,
) -> Option<AccessGrant> {
    if sharing.is_public {
        return Some(AccessGrant::Public);
    }
    if share_token_matches(sharing.share_token.as_deref(), share_token) {
        return Some(AccessGrant::ShareToken);
    }
    let identity = identity?;
    if *identity == sharing.owner_id {
        return Some(AccessGrant::Owner);
    }
    if sharing.shared_with.contains(identity) {
        return Some(AccessGrant::SharedWith);
    }
    None
}

/// Whether access is granted at all
pub fn can_access(
    sharing: &SharingMetadata,
    identity: Option<&UserId>,
    share_token: Option<&str>,
) -> bool {
    evaluate(sharing, identity, share_token).is_some()
}
