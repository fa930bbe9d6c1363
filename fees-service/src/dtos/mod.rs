//! Request/response DTOs for the HTTP surface.

mod fee_structures;
mod payments;
mod reports;

pub use fee_structures::{
    CreateFeeStructureRequest, FeeStructureResponse, ListFeeStructuresQuery,
    UpdateFeeStructureRequest,
};
pub use payments::{
    CollectPaymentRequest, ListPaymentsQuery, PaymentResponse, RecordWaiverRequest,
};
pub use reports::{AuditTrailQuery, DailyCollectionsQuery};

use rust_decimal::Decimal;
use validator::ValidationError;

/// Monetary inputs must be strictly positive.
pub(crate) fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    Ok(())
}
