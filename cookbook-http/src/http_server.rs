// Cookbook HTTP server using Axum

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cookbook_http::{build_router, AppState, CookiePolicy, ServerConfig};
use cookbook_lakehouse::{Cookbook, CookbookConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cookbook_http=debug,cookbook_lakehouse=info,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env()?;
    let config = CookbookConfig::from_env().context("loading cookbook configuration")?;
    let cookbook = Cookbook::open(config)
        .await
        .context("opening cookbook tables")?;

    if let Some(admin) = &server.admin {
        let view = admin.apply(&cookbook).await?;
        tracing::info!(identity_id = %view.id, "Bootstrap admin available");
    }

    if !server.cookie_secure {
        tracing::warn!("Session cookies are sent without the Secure attribute");
    }
    let state = AppState::new(
        cookbook,
        CookiePolicy {
            secure: server.cookie_secure,
        },
    );
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Cookbook HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
