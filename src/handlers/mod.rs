mod ask;
mod health;
mod metrics;

pub use ask::{ClientIdentity, ask_handler};
pub use health::{health_handler, root_handler};
pub use metrics::metrics_handler;
