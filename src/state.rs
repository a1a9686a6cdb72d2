use crate::relay::Relay;

// app's shared state
pub struct AppState {
    pub relay: Relay,
    pub cors_origins: Vec<String>, // empty -> any origin
    pub trusted_proxy_hops: usize, // 0 -> peer address only
}
