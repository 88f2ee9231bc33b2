use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter = register_counter!(
        "passcraft_generate_requests_total",
        "Total number of generate requests"
    )
    .unwrap();
    pub static ref RATE_LIMITED: Counter = register_counter!(
        "passcraft_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref ORIGIN_REJECTED: Counter = register_counter!(
        "passcraft_origin_rejected_total",
        "Requests rejected for their origin"
    )
    .unwrap();
    pub static ref STORE_ERRORS: Counter = register_counter!(
        "passcraft_counter_store_errors_total",
        "Failed counter store calls"
    )
    .unwrap();
    pub static ref PASSWORDS_GENERATED: Counter = register_counter!(
        "passcraft_passwords_generated_total",
        "Passwords generated"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "passcraft_generate_latency_seconds",
        "Generate request latency in seconds"
    )
    .unwrap();
}

// Prometheus text exposition of the default registry
pub fn render() -> Result<String, prometheus::Error> {
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
