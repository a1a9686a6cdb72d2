use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Histogram, register_counter, register_counter_vec, register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("relay_requests_total", "Total number of ask requests").unwrap();
    pub static ref REJECTIONS: CounterVec = register_counter_vec!(
        "relay_rejections_total",
        "Ask requests answered with an error, by reason",
        &["reason"]
    )
    .unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("relay_upstream_failures_total", "Failed Gemini calls").unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "relay_upstream_latency_seconds",
        "Gemini call latency in seconds"
    )
    .unwrap();
}
