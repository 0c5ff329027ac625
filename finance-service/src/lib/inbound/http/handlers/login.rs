use auth::IssuedToken;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use validation::Constraint;
use validation::FieldRule;
use validation::InputShape;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::extract::ValidatedJson;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    // An address the domain refuses cannot belong to any account
    let email =
        EmailAddress::new(body.email).map_err(|_| ApiError::from(UserError::InvalidCredentials))?;

    let (user, issued) = state.user_service.login(&email, &body.password).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData::new(UserData::from(&user), issued),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

impl InputShape for LoginRequest {
    const RULES: &'static [FieldRule] = &[
        FieldRule::text("email", &[Constraint::Required, Constraint::Email]),
        FieldRule::text("password", &[Constraint::Required]),
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub user: UserData,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl LoginResponseData {
    fn new(user: UserData, issued: IssuedToken) -> Self {
        Self {
            user,
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}
