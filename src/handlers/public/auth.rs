// handlers/public/auth.rs - POST /auth/sign-in

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::handlers::{json_rejection, AppState};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::SignedIn;
use crate::types::SignInParams;

/// POST /auth/sign-in - exchange e-mail and password for a JWT
pub async fn sign_in_post(
    State(state): State<AppState>,
    body: Result<Json<SignInParams>, JsonRejection>,
) -> ApiResult<SignedIn> {
    let Json(params) = body.map_err(json_rejection)?;
    let signed_in = state.users.sign_in(params).await?;
    Ok(ApiResponse::success(signed_in))
}
