use crate::dtos::validate_positive_amount;
use crate::models::{FeePayment, PaymentMethod};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CollectPaymentRequest {
    pub student_id: Uuid,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordWaiverRequest {
    pub student_id: Uuid,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    pub student_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_size: Option<i32>,
    pub page_token: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment_id: Uuid,
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

impl From<FeePayment> for PaymentResponse {
    fn from(payment: FeePayment) -> Self {
        Self {
            payment_id: payment.payment_id,
            student_id: payment.student_id,
            receipt_number: payment.receipt_number,
            amount_paid: payment.amount_paid,
            payment_date: payment.payment_date,
            method: payment.method,
            status: payment.status,
            remarks: payment.remarks,
            collected_by: payment.collected_by,
            created_utc: payment.created_utc,
        }
    }
}
