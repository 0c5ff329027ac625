use axum::async_trait;
use axum::body::Bytes;
use axum::extract::FromRequest;
use axum::extract::Request;
use validation::InputShape;

use super::handlers::ApiError;

/// JSON body extractor that runs the declared field rules of `T`.
///
/// Rejects with a 422 carrying the field → message map instead of axum's
/// plain-text `Json` rejection. An empty body binds as `{}`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: InputShape,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        validation::bind::<T>(&bytes)
            .map(ValidatedJson)
            .map_err(|errors| {
                tracing::debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Request body rejected");
                ApiError::Validation(errors)
            })
    }
}
