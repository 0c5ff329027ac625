use std::sync::Arc;

use auth::Authenticator;
use finance_service::config::Config;
use finance_service::domain::expense::ports::ExpenseServicePort;
use finance_service::domain::expense::service::ExpenseService;
use finance_service::domain::user::ports::UserServicePort;
use finance_service::domain::user::service::UserService;
use finance_service::inbound::http::router::create_router;
use finance_service::outbound::repositories::PostgresExpenseRepository;
use finance_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finance_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "finance-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let time_zone = config.server.time_zone()?;

    tracing::info!(
        http_port = config.server.http_port,
        utc_offset_minutes = config.server.utc_offset_minutes,
        jwt_expiration_hours = config.jwt.expiration_hours,
        max_connections = config.database.max_connections,
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::with_hash_cost(
        config.jwt.secret.as_bytes(),
        config.jwt.ttl(),
        config.password.cost(),
    )?);

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let expense_repository = Arc::new(PostgresExpenseRepository::new(pg_pool));

    let user_service: Arc<dyn UserServicePort> = Arc::new(UserService::new(
        user_repository,
        Arc::clone(&authenticator),
    ));
    let expense_service: Arc<dyn ExpenseServicePort> =
        Arc::new(ExpenseService::new(expense_repository, time_zone));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, expense_service, authenticator, time_zone);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
