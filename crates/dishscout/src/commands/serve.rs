//! Serve command — run the MCP server on stdio.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use dishscout_core::{Dataset, LoadReport, SearchDefaults};
use rmcp::ServiceExt;
use tracing::{info, instrument};

use crate::server::DishServer;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    // stdio is the only transport
}

/// Serve dish searches over MCP until the client disconnects.
///
/// stdout carries JSON-RPC, so nothing else may print to it while this runs.
#[instrument(name = "cmd_serve", skip_all)]
pub async fn cmd_serve(
    _args: ServeArgs,
    dataset: Dataset,
    report: LoadReport,
    defaults: SearchDefaults,
) -> anyhow::Result<()> {
    info!(
        businesses = dataset.catalog().len(),
        reviews = dataset.corpus().len(),
        "starting MCP server on stdio"
    );

    let server = DishServer::new(Arc::new(dataset), report, defaults)
        .serve(rmcp::transport::io::stdio())
        .await
        .context("failed to start MCP server")?;

    server.waiting().await.context("MCP server error")?;

    info!("MCP server shutting down");
    Ok(())
}
