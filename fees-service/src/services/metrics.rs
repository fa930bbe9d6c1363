//! Metrics module for fees-service.
//! Provides Prometheus metrics for fee operations and per-school metering.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!("fees_db_query_duration_seconds", "Database query duration"),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Ledger entries counter (per-school metering)
pub static PAYMENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Collected amount counter by method (monetary tracking)
pub static PAYMENT_AMOUNT_TOTAL: OnceLock<prometheus::CounterVec> = OnceLock::new();

/// Dues statement counter (per-school metering)
pub static DUES_STATEMENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Fee structure operations counter (per-school metering)
pub static FEE_STRUCTURE_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Error counter for alerting
pub static ERRORS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    PAYMENTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "fees_payments_total",
                "Total ledger entries by school and method"
            ),
            &["school_id", "method"]
        )
        .expect("Failed to register PAYMENTS_TOTAL")
    });

    PAYMENT_AMOUNT_TOTAL.get_or_init(|| {
        prometheus::register_counter_vec!(
            prometheus::opts!(
                "fees_payment_amount_total",
                "Total collected amount by school and method"
            ),
            &["school_id", "method"]
        )
        .expect("Failed to register PAYMENT_AMOUNT_TOTAL")
    });

    DUES_STATEMENTS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "fees_dues_statements_total",
                "Total dues statements computed by school"
            ),
            &["school_id"]
        )
        .expect("Failed to register DUES_STATEMENTS_TOTAL")
    });

    FEE_STRUCTURE_OPERATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "fees_fee_structure_operations_total",
                "Total fee structure operations by school and operation type"
            ),
            &["school_id", "operation"]
        )
        .expect("Failed to register FEE_STRUCTURE_OPERATIONS_TOTAL")
    });

    ERRORS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!("fees_errors_total", "Total errors by type for alerting"),
            &["error_type", "operation"]
        )
        .expect("Failed to register ERRORS_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*DB_QUERY_DURATION;
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Failed to convert metrics to string")
}

/// Record a ledger entry and its amount.
pub fn record_payment(school_id: &str, method: &str, amount: f64) {
    if let Some(counter) = PAYMENTS_TOTAL.get() {
        counter.with_label_values(&[school_id, method]).inc();
    }
    if let Some(counter) = PAYMENT_AMOUNT_TOTAL.get() {
        counter
            .with_label_values(&[school_id, method])
            .inc_by(amount.abs());
    }
}

/// Record a dues statement computation.
pub fn record_dues_statement(school_id: &str) {
    if let Some(counter) = DUES_STATEMENTS_TOTAL.get() {
        counter.with_label_values(&[school_id]).inc();
    }
}

/// Record a fee structure operation.
pub fn record_fee_structure_operation(school_id: &str, operation: &str) {
    if let Some(counter) = FEE_STRUCTURE_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[school_id, operation]).inc();
    }
}

/// Record an error for alerting.
pub fn record_error(error_type: &str, operation: &str) {
    if let Some(counter) = ERRORS_TOTAL.get() {
        counter.with_label_values(&[error_type, operation]).inc();
    }
}
