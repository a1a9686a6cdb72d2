use axum::{
    Json,
    body::Bytes,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::error::RelayError;
use crate::metrics::{REJECTIONS, REQUEST_TOTAL};
use crate::models::{AskRequest, AskResponse};
use crate::state::AppState;

/// Key the quota is counted against.
///
/// The peer socket IP, unless the relay sits behind `trusted_proxy_hops`
/// proxies, in which case it is the `X-Forwarded-For` entry the outermost
/// trusted proxy appended. Entries that are not IP addresses are ignored.
pub struct ClientIdentity(pub String);

impl FromRequestParts<Arc<AppState>> for ClientIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // also picks up MockConnectInfo in tests
        let peer = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Self(client_identity(
            &parts.headers,
            peer,
            state.trusted_proxy_hops,
        )))
    }
}

pub fn client_identity(headers: &HeaderMap, peer: Option<IpAddr>, trusted_hops: usize) -> String {
    let forwarded = (trusted_hops > 0)
        .then(|| forwarded_client(headers, trusted_hops))
        .flatten();

    forwarded
        .or(peer)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// each trusted proxy appends one entry, so the client is `hops` from the right
fn forwarded_client(headers: &HeaderMap, hops: usize) -> Option<IpAddr> {
    let hops_seen: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .collect();

    let idx = hops_seen.len().checked_sub(hops)?;
    hops_seen[idx].parse::<IpAddr>().ok()
}

// body is taken raw so a bad body is reported only after the auth and quota checks
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    ClientIdentity(client): ClientIdentity,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AskResponse>, RelayError> {
    REQUEST_TOTAL.inc();

    let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let request = AskRequest::from_body(&body);

    match state.relay.handle(request.question.as_deref(), auth, &client).await {
        Ok(answer) => {
            tracing::info!(client = %client, answer_len = answer.len(), "Answered question");
            Ok(Json(AskResponse { answer }))
        }
        Err(e) => {
            REJECTIONS.with_label_values(&[e.reason()]).inc();
            tracing::info!(client = %client, reason = e.reason(), error = %e, "Ask request rejected");
            Err(e)
        }
    }
}
