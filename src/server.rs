use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::app::app;
use crate::auth::{AuthGate, RemoteJwks};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgDrinkRepository};
use crate::state::AppState;

/// Connect storage and the signing-key source described by `config`
pub async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if config.database.reset_on_start {
        tracing::warn!("DATABASE_RESET_ON_START is set, dropping all drinks");
        DatabaseManager::reset(&pool).await?;
    } else {
        DatabaseManager::ensure_schema(&pool).await?;
    }

    let keys = RemoteJwks::from_config(&config.auth).context("failed to build JWKS client")?;
    tracing::info!("Verifying tokens against {}", keys.url());
    let gate = AuthGate::from_config(Arc::new(keys), &config.auth);

    Ok(AppState::new(config, Arc::new(PgDrinkRepository::new(pool)), gate))
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr();
    let state = build_state(config).await?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Coffee shop API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutting down");
}
