use crate::dtos::validate_positive_amount;
use crate::models::{FeeFrequency, FeeStructure, FeeType};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFeeStructureRequest {
    pub class_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub fee_type: FeeType,
    pub frequency: FeeFrequency,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFeeStructureRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ListFeeStructuresQuery {
    pub class_id: Option<Uuid>,
    pub include_archived: Option<bool>,
    pub page_size: Option<i32>,
    pub page_token: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct FeeStructureResponse {
    pub fee_id: Uuid,
    pub class_id: Uuid,
    pub name: String,
    pub fee_type: String,
    pub frequency: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub is_archived: bool,
    pub created_utc: DateTime<Utc>,
}

impl From<FeeStructure> for FeeStructureResponse {
    fn from(fee: FeeStructure) -> Self {
        Self {
            fee_id: fee.fee_id,
            class_id: fee.class_id,
            name: fee.name,
            fee_type: fee.fee_type,
            frequency: fee.frequency,
            amount: fee.amount,
            due_date: fee.due_date,
            is_archived: fee.is_archived,
            created_utc: fee.created_utc,
        }
    }
}
