use axum::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::errors::AppError;

/// Stable user id injected by the upstream auth gateway. The sync engine
/// trusts it completely and never re-verifies identity.
///
/// A request without a resolvable user is rejected with a not-found-class
/// error rather than a silent no-op.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::NotFound)?;
        Ok(AuthUser(user_id.to_string()))
    }
}
