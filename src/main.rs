use std::sync::Arc;

use authd::auth::jwt::TokenSigner;
use authd::auth::services::AuthService;
use authd::config::Config;
use authd::migrate::runner::MigrationRunner;
use authd::{app::build_router, setup_logging};

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();
    tracing::info!("Starting authd...");

    let config = Config::from_env()?;

    // Startup is strictly sequential: database, migrations, cache, router.
    authd::db::connection::init_pool_with_retry(&config.database_url)?;

    let runner = MigrationRunner::new(&config.migrations_dir, config.environment.as_str());
    let report = runner.apply()?;
    if let Some(failed) = report.failed {
        anyhow::bail!(
            "Startup migration {} ({}) failed: {}",
            failed.version,
            failed.name,
            failed.error
        );
    }
    if !report.applied.is_empty() {
        tracing::info!("🎉 Applied {} startup migrations", report.applied.len());
    }

    authd::cache::connection::init_cache_with_url(&config.redis_url)?;

    // Hourly sweep of expired and revoked sessions.
    tokio::spawn(async {
        use authd::db::repositories::session_repository::SessionRepository;

        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        interval.tick().await;
        loop {
            interval.tick().await;
            match tokio::task::spawn_blocking(SessionRepository::cleanup_expired).await {
                Ok(Ok(removed)) if removed > 0 => {
                    tracing::info!("🧹 Removed {removed} expired sessions");
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::warn!("Session cleanup failed: {e}"),
                Err(e) => tracing::warn!("Session cleanup task panicked: {e}"),
            }
        }
    });

    let signer = TokenSigner::new(
        &config.jwt_access_secret,
        &config.jwt_refresh_secret,
        config.jwt_issuer.clone(),
        config.jwt_access_expiry_secs,
        config.jwt_refresh_expiry_secs,
    );
    let auth_service = Arc::new(AuthService::new(signer, config.min_password_len));

    let app = build_router(auth_service);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 authd listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("🛑 authd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
