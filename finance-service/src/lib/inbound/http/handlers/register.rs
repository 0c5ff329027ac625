use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use validation::Constraint;
use validation::FieldRule;
use validation::InputShape;
use validation::ValidationErrors;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::errors::EmailError;
use crate::domain::user::errors::UserNameError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UserName;
use crate::inbound::http::extract::ValidatedJson;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

impl InputShape for RegisterRequest {
    const RULES: &'static [FieldRule] = &[
        FieldRule::text(
            "name",
            &[
                Constraint::Required,
                Constraint::MinLength(UserName::MIN_LENGTH),
                Constraint::MaxLength(UserName::MAX_LENGTH),
            ],
        ),
        FieldRule::text(
            "email",
            &[
                Constraint::Required,
                Constraint::Email,
                Constraint::MaxLength(255),
            ],
        ),
        FieldRule::text(
            "password",
            &[
                Constraint::Required,
                Constraint::MinLength(6),
                Constraint::MaxLength(128),
            ],
        ),
    ];
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid name: {0}")]
    Name(#[from] UserNameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, ParseRegisterRequestError> {
        let name = UserName::new(self.name)?;
        let email = EmailAddress::new(self.email)?;
        Ok(RegisterUserCommand::new(name, email, self.password))
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        tracing::debug!(error = %err, "Register request rejected by domain rules");
        let errors = match err {
            ParseRegisterRequestError::Name(UserNameError::TooShort { min, .. }) => {
                ValidationErrors::single("name", Constraint::MinLength(min).message())
            }
            ParseRegisterRequestError::Name(UserNameError::TooLong { max, .. }) => {
                ValidationErrors::single("name", Constraint::MaxLength(max).message())
            }
            ParseRegisterRequestError::Email(_) => {
                ValidationErrors::single("email", Constraint::Email.message())
            }
        };
        ApiError::Validation(errors)
    }
}
