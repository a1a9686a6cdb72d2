use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Args, Secrets};
use crate::error::ConfigError;
use crate::handlers::{ask_handler, health_handler, metrics_handler, root_handler};
use crate::rate_limit::{InMemoryQuota, QuotaStore};
use crate::relay::Relay;
use crate::state::AppState;
use crate::upstream::{GeminiClient, GeminiConfig};

/// Wire the relay together from parsed arguments and secrets.
pub fn build_state(args: &Args, secrets: Secrets) -> Result<AppState, ConfigError> {
    let upstream = GeminiClient::new(GeminiConfig {
        base_url: args.upstream_url.clone(),
        model: args.model.clone(),
        api_key: secrets.api_key,
        timeout: args.upstream_timeout(),
        generation_config: args.generation_config(),
    })?;

    // 0 turns the quota off
    let quota = (args.rate_limit > 0).then(|| {
        Arc::new(InMemoryQuota::new(args.rate_limit, args.rate_window())) as Arc<dyn QuotaStore>
    });

    Ok(AppState {
        relay: Relay::new(secrets.auth_token, quota, Arc::new(upstream)),
        cors_origins: args.cors_origins.clone(),
        trusted_proxy_hops: args.trusted_proxy_hops,
    })
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/ask", post(ask_handler))
        .route("/get_ai_answer", post(ask_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(allowed)
}
