use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "collection_requests_total",
        "Collection requests by entity and outcome",
        &["entity", "outcome"]
    )
    .expect("collection_requests_total registers once")
});

pub static QUERY_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "collection_query_seconds",
        "Compile plus execute latency per collection request",
        &["entity"],
        vec![0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("collection_query_seconds registers once")
});

pub static ROWS_RETURNED: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "collection_rows_returned",
        "Rows in each returned page",
        &["entity"],
        vec![0.0, 1.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0]
    )
    .expect("collection_rows_returned registers once")
});
