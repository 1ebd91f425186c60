//! Bearer-token extractor
//!
//! Never rejects: a missing, malformed, or expired token yields
//! `MaybePrincipal(None)` and the calculation service answers
//! `Unauthenticated`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts, HeaderMap};
use tally_ledger::Principal;
use tracing::debug;

use super::jwt::JwtManager;

/// The authenticated principal, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybePrincipal(pub Option<Principal>);

impl MaybePrincipal {
    pub fn from_headers(headers: &HeaderMap, jwt: &JwtManager) -> Self {
        let Some(token) = bearer_token(headers) else {
            return Self(None);
        };

        match jwt.verify(token).and_then(|claims| claims.principal()) {
            Ok(principal) => Self(Some(principal)),
            Err(e) => {
                debug!("Token rejected: {}", e);
                Self(None)
            },
        }
    }
}

impl<S> FromRequestParts<S> for MaybePrincipal
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jwt = Arc::<JwtManager>::from_ref(state);
        Ok(Self::from_headers(&parts.headers, &jwt))
    }
}

/// Token from `Authorization: Bearer <token>`; scheme is case-insensitive
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
