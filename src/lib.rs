pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod relay;
pub mod startup;
pub mod state;
pub mod telemetry;
pub mod upstream;

pub use state::AppState;
