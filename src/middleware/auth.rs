use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Claims, ADMIN_ROLE};
use crate::error::ApiError;

/// Authenticated caller extracted from the JWT
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Validates the bearer token and injects [`AuthUser`] into the request.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = auth::decode_jwt(&token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Must run after [`jwt_auth_middleware`].
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if user.role != ADMIN_ROLE {
        tracing::warn!("User {} with role '{}' denied management access", user.email, user.role);
        return Err(ApiError::forbidden("Administrator role required"));
    }

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
