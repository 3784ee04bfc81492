use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::backend::domain::errors::DomainError;
use crate::backend::domain::session::SessionContext;
use crate::backend::AppState;

/// The signed-in parent behind `Authorization: Bearer <token>`
pub struct ParentSession(pub SessionContext);

/// Token from an `Authorization: Bearer` header, if present
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for ParentSession {
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(DomainError::Unauthenticated)?;
        let session = state.auth_service.current(token)?;
        Ok(ParentSession(session))
    }
}
