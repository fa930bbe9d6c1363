//! Services module for fees-service.

pub mod database;
pub mod dues;
pub mod metrics;
pub mod payments;

pub use database::Database;
pub use dues::DuesCalculator;
pub use metrics::{
    get_metrics, init_metrics, record_dues_statement, record_error,
    record_fee_structure_operation, record_payment,
};
pub use payments::PaymentCollector;
