use anyhow::Context;
use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;

use gemini_relay::config::{Args, Secrets};
use gemini_relay::startup::{build_router, build_state};
use gemini_relay::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // parse cli arguments
    let args = Args::parse();
    telemetry::init_tracing(args.log_json);

    // missing secrets abort startup here, before anything binds
    let secrets = Secrets::from_env().context("refusing to start")?;
    let state = Arc::new(build_state(&args, secrets)?);
    let app = build_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(addr = %addr, "Gemini relay listening");
    tracing::info!(model = %args.model, upstream = %args.upstream_url, timeout_secs = args.upstream_timeout, "Forwarding to Gemini");
    if args.rate_limit > 0 {
        tracing::info!(
            "Rate limit: {} requests per {} seconds per client",
            args.rate_limit, args.rate_window
        );
    } else {
        tracing::info!("Rate limiting disabled");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
