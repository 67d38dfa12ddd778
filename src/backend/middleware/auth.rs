/**
 * Connection Identity Extraction
 *
 * Pulls the bearer credential off the socket handshake request and runs it
 * through the Identity Gate. Unlike a protected-route middleware this never
 * rejects: a missing or bad token yields an anonymous connection.
 *
 * Credential sources, in order:
 * 1. `Authorization: Bearer <token>` header
 * 2. `token` query parameter (browsers cannot set headers on WebSocket handshakes)
 */

use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Uri},
};
use std::collections::HashMap;
use std::convert::Infallible;

use crate::backend::server::state::AppState;
use crate::shared::UserId;

/// Identity bound to a connection at handshake time, if any
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionIdentity(pub Option<UserId>);

/// Find the bearer credential on a handshake request
pub fn extract_bearer_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    if from_header.is_some() {
        return from_header;
    }

    Query::<HashMap<String, String>>::try_from_uri(uri)
        .ok()
        .and_then(|Query(params)| params.get("token").cloned())
        .filter(|t| !t.trim().is_empty())
}

impl FromRequestParts<AppState> for ConnectionIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers, &parts.uri);
        if token.is_none() {
            tracing::debug!("[Auth] No credential on handshake, connecting anonymously");
        }
        Ok(ConnectionIdentity(state.identity.identify(token.as_deref())))
    }
}
