//! Fee structure catalog model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Category of a fee line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    Tuition,
    Admission,
    Exam,
    Transport,
    Hostel,
    Library,
    Sports,
    Other,
}

impl FeeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeType::Tuition => "tuition",
            FeeType::Admission => "admission",
            FeeType::Exam => "exam",
            FeeType::Transport => "transport",
            FeeType::Hostel => "hostel",
            FeeType::Library => "library",
            FeeType::Sports => "sports",
            FeeType::Other => "other",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "tuition" => FeeType::Tuition,
            "admission" => FeeType::Admission,
            "exam" => FeeType::Exam,
            "transport" => FeeType::Transport,
            "hostel" => FeeType::Hostel,
            "library" => FeeType::Library,
            "sports" => FeeType::Sports,
            _ => FeeType::Other,
        }
    }

    /// Only tuition line items participate in the sibling discount.
    pub fn discount_eligible(&self) -> bool {
        matches!(self, FeeType::Tuition)
    }
}

/// Billing cadence of a fee line item. Descriptive only; dues calculation
/// sums the catalog amounts as defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeFrequency {
    Monthly,
    Quarterly,
    Annually,
    OneTime,
}

impl FeeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeFrequency::Monthly => "monthly",
            FeeFrequency::Quarterly => "quarterly",
            FeeFrequency::Annually => "annually",
            FeeFrequency::OneTime => "one_time",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "monthly" => FeeFrequency::Monthly,
            "quarterly" => FeeFrequency::Quarterly,
            "annually" => FeeFrequency::Annually,
            _ => FeeFrequency::OneTime,
        }
    }
}

/// Per-class fee line item.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeeStructure {
    pub fee_id: Uuid,
    pub school_id: Uuid,
    pub class_id: Uuid,
    pub name: String,
    pub fee_type: String,
    pub frequency: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub is_archived: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating a fee structure.
#[derive(Debug, Clone)]
pub struct CreateFeeStructure {
    pub school_id: Uuid,
    pub class_id: Uuid,
    pub name: String,
    pub fee_type: FeeType,
    pub frequency: FeeFrequency,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// Input for updating a fee structure.
#[derive(Debug, Clone, Default)]
pub struct UpdateFeeStructure {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}

/// Filter parameters for listing fee structures.
#[derive(Debug, Clone, Default)]
pub struct ListFeeStructuresFilter {
    pub class_id: Option<Uuid>,
    pub include_archived: bool,
    pub page_size: i32,
    pub page_token: Option<Uuid>,
}
