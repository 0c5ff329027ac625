use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Profile of the authenticated caller.
pub async fn me(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .user_service
        .get_user(&caller.user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
