use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use chrono::FixedOffset;
use http::Request;
use http::Response;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_expense::create_expense;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::monthly_summary::monthly_summary;
use super::handlers::ping::ping;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::expense::ports::ExpenseServicePort;
use crate::domain::user::ports::UserServicePort;

/// Shared, read-only handles cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub expense_service: Arc<dyn ExpenseServicePort>,
    pub authenticator: Arc<Authenticator>,
    /// Zone used to read transaction timestamps
    pub time_zone: FixedOffset,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    expense_service: Arc<dyn ExpenseServicePort>,
    authenticator: Arc<Authenticator>,
    time_zone: FixedOffset,
) -> Router {
    let state = AppState {
        user_service,
        expense_service,
        authenticator,
        time_zone,
    };

    let public_routes = Router::new()
        .route("/ping", get(ping))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login));

    let protected_routes = Router::new()
        .route("/api/users/me", get(me))
        .route("/api/expenses", post(create_expense))
        .route("/api/expenses/monthly-summary", get(monthly_summary))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Headers stay out of the span: they carry the bearer token
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
