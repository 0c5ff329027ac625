use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use auth::JwtError;

use super::handlers::ApiError;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

const MISSING_CREDENTIAL: &str = "authorization required";
const MALFORMED_CREDENTIAL: &str = "invalid authorization header";
const INVALID_TOKEN: &str = "invalid or expired token";
const UNKNOWN_PRINCIPAL: &str = "user does not exist";

/// Identity of the caller, attached to request extensions by [`authenticate`].
///
/// Handlers take it as an extractor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                ApiError::Unauthorized(MISSING_CREDENTIAL.to_string())
            })
    }
}

/// Progress of a single request through the gate.
///
/// `Unauthenticated → CredentialExtracted → TokenVerified → PrincipalLoaded → Attached`;
/// every transition either moves one step forward or rejects the request.
#[derive(Debug)]
enum GateState {
    Unauthenticated,
    CredentialExtracted(String),
    TokenVerified(UserId),
    PrincipalLoaded(User),
    Attached(AuthenticatedUser),
}

/// Why the gate turned a request away.
#[derive(Debug)]
enum GateRejection {
    MissingCredential,
    MalformedCredential,
    InvalidToken(JwtError),
    UnknownPrincipal(UserId),
    LookupFailed(UserError),
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let error = match self {
            GateRejection::MissingCredential => {
                tracing::warn!("Rejected request without Authorization header");
                ApiError::Unauthorized(MISSING_CREDENTIAL.to_string())
            }
            GateRejection::MalformedCredential => {
                tracing::warn!("Rejected request with malformed Authorization header");
                ApiError::Unauthorized(MALFORMED_CREDENTIAL.to_string())
            }
            GateRejection::InvalidToken(e) => {
                tracing::warn!(kind = e.kind(), "Token verification failed");
                ApiError::Unauthorized(INVALID_TOKEN.to_string())
            }
            GateRejection::UnknownPrincipal(user_id) => {
                tracing::warn!(user_id = %user_id, "Token subject does not exist");
                ApiError::Unauthorized(UNKNOWN_PRINCIPAL.to_string())
            }
            GateRejection::LookupFailed(e) => ApiError::InternalServerError(format!(
                "Principal lookup failed: {}",
                e
            )),
        };

        error.into_response()
    }
}

/// Middleware that resolves the bearer token to a stored user and attaches
/// its identity to the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let mut gate = GateState::Unauthenticated;

    let authenticated = loop {
        gate = match advance(gate, req.headers(), &state).await {
            Ok(GateState::Attached(user)) => break user,
            Ok(next_state) => next_state,
            Err(rejection) => return Err(rejection.into_response()),
        };
    };

    req.extensions_mut().insert(authenticated);

    Ok(next.run(req).await)
}

async fn advance(
    gate: GateState,
    headers: &HeaderMap,
    state: &AppState,
) -> Result<GateState, GateRejection> {
    match gate {
        GateState::Unauthenticated => {
            extract_credential(headers).map(|token| GateState::CredentialExtracted(token.to_string()))
        }
        GateState::CredentialExtracted(token) => state
            .authenticator
            .verify_token(&token)
            .map(|principal| GateState::TokenVerified(UserId::from(principal)))
            .map_err(GateRejection::InvalidToken),
        GateState::TokenVerified(user_id) => match state.user_service.get_user(&user_id).await {
            Ok(user) => Ok(GateState::PrincipalLoaded(user)),
            Err(UserError::NotFound(_)) => Err(GateRejection::UnknownPrincipal(user_id)),
            Err(e) => Err(GateRejection::LookupFailed(e)),
        },
        GateState::PrincipalLoaded(user) => {
            Ok(GateState::Attached(AuthenticatedUser { user_id: user.id }))
        }
        GateState::Attached(user) => Ok(GateState::Attached(user)),
    }
}

/// Accepts exactly `Bearer <token>`: one space, a non-empty token, nothing after it.
fn extract_credential(headers: &HeaderMap) -> Result<&str, GateRejection> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(GateRejection::MissingCredential)?;

    let value = header
        .to_str()
        .map_err(|_| GateRejection::MalformedCredential)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(GateRejection::MalformedCredential)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(GateRejection::MalformedCredential);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = headers("Bearer abc.def.ghi");
        assert_eq!(extract_credential(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            extract_credential(&HeaderMap::new()),
            Err(GateRejection::MissingCredential)
        ));
    }

    #[test]
    fn test_malformed_headers() {
        for value in [
            "abc.def.ghi",
            "Bearer",
            "Bearer ",
            "bearer abc.def.ghi",
            "Basic dXNlcjpwYXNz",
            "Bearer  abc.def.ghi",
            "Bearer abc.def.ghi extra",
        ] {
            assert!(
                matches!(
                    extract_credential(&headers(value)),
                    Err(GateRejection::MalformedCredential)
                ),
                "accepted {:?}",
                value
            );
        }
    }

    #[test]
    fn test_non_visible_header_value_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );

        assert!(matches!(
            extract_credential(&headers),
            Err(GateRejection::MalformedCredential)
        ));
    }

    #[tokio::test]
    async fn test_extractor_requires_gate() {
        let (mut parts, _) = Request::new(axum::body::Body::empty()).into_parts();

        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert_eq!(
            result,
            Err(ApiError::Unauthorized("authorization required".to_string()))
        );

        let user = AuthenticatedUser {
            user_id: UserId::new(),
        };
        parts.extensions.insert(user);
        let extracted = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert_eq!(extracted, Ok(user));
    }
}
