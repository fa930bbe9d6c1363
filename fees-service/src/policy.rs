//! Role policy for fee operations.
//!
//! Single decision point for (actor role, action); handlers never compare
//! role strings inline.

use serde::{Deserialize, Serialize};
use service_core::error::AppError;

/// Actor role carried in the `X-User-Role` header by the authenticating
/// frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Accountant,
    Teacher,
    Parent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Accountant => "accountant",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }

    /// Parse a role header value. Unknown roles are rejected rather than
    /// defaulted, so a misconfigured frontend cannot widen access.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "accountant" => Some(Role::Accountant),
            "teacher" => Some(Role::Teacher),
            "parent" => Some(Role::Parent),
            _ => None,
        }
    }
}

/// Fee operations subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageFeeStructures,
    ViewDues,
    CollectPayment,
    RecordWaiver,
    ViewReports,
}

impl Action {
    pub fn describe(&self) -> &'static str {
        match self {
            Action::ManageFeeStructures => "manage fee structures",
            Action::ViewDues => "view dues",
            Action::CollectPayment => "collect payments",
            Action::RecordWaiver => "record waivers",
            Action::ViewReports => "view reports",
        }
    }
}

pub struct Policy;

impl Policy {
    pub fn allows(role: Role, action: Action) -> bool {
        match action {
            Action::ManageFeeStructures => matches!(role, Role::Admin),
            Action::ViewDues => true,
            Action::CollectPayment => matches!(role, Role::Admin | Role::Accountant),
            Action::RecordWaiver => matches!(role, Role::Admin),
            Action::ViewReports => matches!(role, Role::Admin | Role::Accountant),
        }
    }

    /// Evaluate the policy, returning a 403 error on denial.
    pub fn authorize(role: Role, action: Action) -> Result<(), AppError> {
        if Self::allows(role, action) {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "Role '{}' is not permitted to {}",
                role.as_str(),
                action.describe()
            )))
        }
    }
}
