//! Domain models for fees-service.

mod audit;
mod dues;
mod fee_structure;
mod payment;
mod student;

pub use audit::{AuditAction, AuditEntry, RecordAudit};
pub use dues::{DuesLine, DuesStatement, DuesSummary};
pub use fee_structure::{
    CreateFeeStructure, FeeFrequency, FeeStructure, FeeType, ListFeeStructuresFilter,
    UpdateFeeStructure,
};
pub use payment::{
    format_receipt_number, CreatePayment, DailyCollectionReport, DailyCollectionRow, FeePayment,
    ListPaymentsFilter, PaymentMethod, PaymentStatus,
};
pub use student::{Student, StudentStatus, TransportRoute};
