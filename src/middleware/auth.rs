use crate::{config::auth::decode_identity_token, error::AppError};
use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

/// Authenticated actor extracted from an identity-provider token.
///
/// Identity lives outside this service: the token already carries the
/// display fields, so no user table is consulted here. Ownership and role
/// checks are re-done by the stores on every mutating operation.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// JWT authentication middleware for write routes.
pub async fn auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let auth_user = decode_auth_user(&token).ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

fn decode_auth_user(token: &str) -> Option<AuthUser> {
    let claims = decode_identity_token(token).ok()?;
    let user_id: i32 = claims.sub.parse().ok()?;

    Some(AuthUser {
        user_id,
        display_name: claims.name,
        avatar_url: claims.avatar,
        role: claims.role,
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Verify the current actor has the admin role.
pub fn require_admin(auth_user: &AuthUser) -> crate::error::AppResult<()> {
    if !auth_user.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

use axum::extract::FromRequestParts;

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional actor for public read routes. A missing or invalid token
/// degrades to an anonymous read instead of rejecting the request.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user = extract_bearer_token(&parts.headers).and_then(|t| decode_auth_user(&t));
        Ok(MaybeAuthUser(user))
    }
}
