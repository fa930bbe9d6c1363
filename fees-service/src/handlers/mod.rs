//! HTTP handlers for fees-service.
//!
//! All fee operations are scoped to the school from the request context and
//! authorized through the central policy.

pub mod dues;
pub mod fee_structures;
pub mod health;
pub mod payments;
pub mod reports;

pub use dues::student_dues;
pub use fee_structures::{
    archive_fee_structure, create_fee_structure, get_fee_structure, list_fee_structures,
    update_fee_structure,
};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use payments::{collect_payment, list_payments, record_waiver};
pub use reports::{audit_trail, daily_collections};
