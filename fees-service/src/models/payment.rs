//! Payment ledger model and receipt numbering.

use crate::policy::Role;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How a ledger entry was settled. `Waiver` entries reduce the balance
/// without a cash/bank transaction and are gated to admin actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Cheque,
    Waiver,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Waiver => "waiver",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "card" => PaymentMethod::Card,
            "upi" => PaymentMethod::Upi,
            "bank_transfer" => PaymentMethod::BankTransfer,
            "cheque" => PaymentMethod::Cheque,
            "waiver" => PaymentMethod::Waiver,
            _ => PaymentMethod::Cash,
        }
    }

    pub fn is_waiver(&self) -> bool {
        matches!(self, PaymentMethod::Waiver)
    }

    fn receipt_prefix(&self) -> &'static str {
        if self.is_waiver() { "WVR" } else { "RCP" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
        }
    }
}

/// Append-only ledger entry. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeePayment {
    pub payment_id: Uuid,
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub receipt_number: String,
    pub amount_paid: Decimal,
    pub payment_date: NaiveDate,
    pub method: String,
    pub status: String,
    pub remarks: Option<String>,
    pub collected_by: Uuid,
    pub created_utc: DateTime<Utc>,
}

/// Input for recording a payment or waiver.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub school_id: Uuid,
    pub student_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub remarks: Option<String>,
    pub collected_by: Uuid,
    pub collected_by_role: Role,
}

/// Filter parameters for listing ledger entries.
#[derive(Debug, Clone, Default)]
pub struct ListPaymentsFilter {
    pub student_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_size: i32,
    pub page_token: Option<Uuid>,
}

/// One method's aggregate in a daily collection report.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyCollectionRow {
    pub method: String,
    pub receipt_count: i64,
    pub total_amount: Decimal,
}

/// Per-method totals for one school-day of the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct DailyCollectionReport {
    pub date: NaiveDate,
    pub rows: Vec<DailyCollectionRow>,
    pub collected_total: Decimal,
    pub waived_total: Decimal,
    pub grand_total: Decimal,
}

impl DailyCollectionReport {
    pub fn from_rows(date: NaiveDate, rows: Vec<DailyCollectionRow>) -> Self {
        let mut collected_total = Decimal::ZERO;
        let mut waived_total = Decimal::ZERO;
        for row in &rows {
            if row.method == PaymentMethod::Waiver.as_str() {
                waived_total += row.total_amount;
            } else {
                collected_total += row.total_amount;
            }
        }
        Self {
            date,
            rows,
            collected_total,
            waived_total,
            grand_total: collected_total + waived_total,
        }
    }
}

/// Format a receipt number from the school's daily sequence value.
///
/// Cash-equivalent methods mint `RCP-YYYYMMDD-NNNN`, waivers `WVR-YYYYMMDD-NNNN`.
/// The sequence is zero-padded to four digits and widens past 9999.
pub fn format_receipt_number(method: PaymentMethod, date: NaiveDate, sequence: i64) -> String {
    format!(
        "{}-{}-{:04}",
        method.receipt_prefix(),
        date.format("%Y%m%d"),
        sequence
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_receipts_use_rcp_prefix() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(
            format_receipt_number(PaymentMethod::Cash, date, 1),
            "RCP-20260314-0001"
        );
    }

    #[test]
    fn waivers_use_wvr_prefix() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(
            format_receipt_number(PaymentMethod::Waiver, date, 7),
            "WVR-20260314-0007"
        );
    }

    #[test]
    fn sequence_widens_past_four_digits() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(
            format_receipt_number(PaymentMethod::Upi, date, 12345),
            "RCP-20260314-12345"
        );
    }

    #[test]
    fn report_separates_waivers_from_collections() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let report = DailyCollectionReport::from_rows(
            date,
            vec![
                DailyCollectionRow {
                    method: "cash".to_string(),
                    receipt_count: 2,
                    total_amount: Decimal::from(1500),
                },
                DailyCollectionRow {
                    method: "waiver".to_string(),
                    receipt_count: 1,
                    total_amount: Decimal::from(200),
                },
            ],
        );
        assert_eq!(report.collected_total, Decimal::from(1500));
        assert_eq!(report.waived_total, Decimal::from(200));
        assert_eq!(report.grand_total, Decimal::from(1700));
    }
}
