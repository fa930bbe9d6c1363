//! Dues statement view model.

use crate::models::FeePayment;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// One line of a student's fee breakdown.
///
/// Catalog lines carry their `fee_id`; the synthesized transport line has
/// none, since it is derived from the route assignment rather than the
/// catalog.
#[derive(Debug, Clone, Serialize)]
pub struct DuesLine {
    pub fee_id: Option<Uuid>,
    pub name: String,
    pub fee_type: String,
    pub frequency: String,
    pub amount: Decimal,
    pub discount: Decimal,
    pub payable: Decimal,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuesSummary {
    pub total_fees: Decimal,
    pub total_discount: Decimal,
    pub net_payable: Decimal,
    pub total_paid: Decimal,
    pub balance_due: Decimal,
    pub sibling_discount_percent: Decimal,
}

/// Full dues statement for a student: breakdown, summary and ledger history.
#[derive(Debug, Clone, Serialize)]
pub struct DuesStatement {
    pub student_id: Uuid,
    pub student_name: String,
    pub class_id: Uuid,
    pub breakdown: Vec<DuesLine>,
    pub summary: DuesSummary,
    pub history: Vec<FeePayment>,
}
