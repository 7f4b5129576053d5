//! Web command — serve the HTTP JSON API.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use dishscout_core::{Dataset, LoadReport, SearchDefaults};
use tracing::{info, instrument};

use crate::http::{AppState, router};

/// Arguments for the `web` subcommand.
#[derive(Args, Debug, Default)]
pub struct WebArgs {
    /// Address to listen on (overrides configuration)
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,
}

/// Serve the API until interrupted with Ctrl-C.
#[instrument(name = "cmd_web", skip_all, fields(listen = %listen))]
pub async fn cmd_web(
    dataset: Dataset,
    report: LoadReport,
    defaults: SearchDefaults,
    listen: String,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(Arc::new(dataset), report, defaults));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    let addr = listener
        .local_addr()
        .context("failed to read bound address")?;

    info!(address = %addr, "server listening");
    eprintln!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
