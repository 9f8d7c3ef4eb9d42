use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::account::ports::AccountRepository;
use account_service::domain::account::service::AccountService;
use account_service::domain::errors::DomainError;
use account_service::inbound::http::router::create_router;
use account_service::logging::init_tracing;
use account_service::logging::AccountLogRegistry;
use account_service::outbound::repositories::InMemoryAccountRepository;
use account_service::outbound::repositories::PostgresAccountRepository;
use auth::Authenticator;
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_tracing();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    config.validate()?;

    tracing::info!(
        http_port = config.server.http_port,
        request_timeout_secs = config.server.request_timeout_secs,
        access_ttl_hours = config.jwt.expiration_hours,
        memory_store = config.uses_memory_store(),
        "Configuration loaded"
    );

    let password_hasher = PasswordHasher::with_cost(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )
    .map_err(|_| DomainError::configuration("password", "valid Argon2 cost parameters"))?;

    let authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes(), config.access_ttl())
            .with_password_hasher(password_hasher),
    );
    let loggers = Arc::new(AccountLogRegistry::new(config.account_log_dir()));

    if config.uses_memory_store() {
        tracing::warn!("Using in-memory account store, data is lost on shutdown");
        let repository = Arc::new(InMemoryAccountRepository::new());
        return serve(&config, repository, authenticator, loggers).await;
    }

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            DomainError::database_connection("postgresql", "failed to connect to database", e)
        })?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    if config.database.auto_migrate {
        sqlx::migrate!("./migrations")
            .run(&pg_pool)
            .await
            .map_err(|e| DomainError::migration("create_accounts", e))?;
        tracing::info!(database = "postgresql", "Database migrations completed");
    }

    let repository = Arc::new(PostgresAccountRepository::new(pg_pool));
    serve(&config, repository, authenticator, loggers).await
}

async fn serve<R: AccountRepository>(
    config: &Config,
    repository: Arc<R>,
    authenticator: Arc<Authenticator>,
    loggers: Arc<AccountLogRegistry>,
) -> Result<(), anyhow::Error> {
    let account_service = Arc::new(
        AccountService::new(repository, Arc::clone(&authenticator), loggers)
            .with_operation_timeout(config.request_timeout()),
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(account_service, authenticator);
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
