//! Student and transport route records.
//!
//! Owned by the admissions system; this service only reads them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Admission status of a student record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    Admitted,
    Enquiry,
    Withdrawn,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Admitted => "admitted",
            StudentStatus::Enquiry => "enquiry",
            StudentStatus::Withdrawn => "withdrawn",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub student_id: Uuid,
    pub school_id: Uuid,
    pub class_id: Uuid,
    pub admission_no: String,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
    pub primary_guardian_id: Option<Uuid>,
    pub transport_route_id: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransportRoute {
    pub route_id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub monthly_cost: Decimal,
    pub is_active: bool,
    pub created_utc: DateTime<Utc>,
}
