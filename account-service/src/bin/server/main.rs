use std::sync::Arc;

use account_service::authentication::service::AuthService;
use account_service::config::Config;
use account_service::domain::user::ports::UserServicePort;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        algorithm = %config.jwt.algorithm,
        access_token_expire_minutes = config.jwt.access_token_expire_minutes,
        refresh_token_expire_minutes = config.jwt.refresh_token_expire_minutes,
        gate_refresh_on_active_status = config.jwt.gate_refresh_on_active_status,
        "Configuration loaded"
    );

    // Misconfigured secrets or lifetimes must stop the service before it binds.
    let authenticator = Arc::new(Authenticator::new(
        config.password.hasher()?,
        &config.jwt.token_settings(),
    )?);

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repository),
        config.password.hasher()?,
    ));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repository),
        Arc::clone(&authenticator),
        config.jwt.gate_refresh_on_active_status,
    ));

    if let Some(bootstrap) = &config.bootstrap {
        match user_service
            .ensure_bootstrap_user(bootstrap.to_command()?)
            .await?
        {
            Some(user) => tracing::info!(
                user_id = %user.id,
                username = %user.username,
                "Bootstrap admin created"
            ),
            None => tracing::debug!(
                username = %bootstrap.username,
                "Bootstrap admin already present"
            ),
        }
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        user_service,
        auth_service,
        authenticator,
        &config.server.cors_origins,
    );

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
