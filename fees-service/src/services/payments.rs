//! Payment collection over the append-only ledger.

use crate::middleware::SchoolContext;
use crate::models::{CreatePayment, FeePayment, PaymentMethod};
use crate::policy::{Action, Policy};
use crate::services::metrics::record_payment;
use crate::services::Database;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct PaymentCollector {
    db: Arc<Database>,
}

impl PaymentCollector {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Record a cash-equivalent payment against a student's dues.
    #[instrument(skip(self, ctx), fields(school_id = %ctx.school_id, student_id = %student_id))]
    pub async fn collect(
        &self,
        ctx: &SchoolContext,
        student_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        remarks: Option<String>,
    ) -> Result<FeePayment, AppError> {
        Policy::authorize(ctx.role, Action::CollectPayment)?;

        if method.is_waiver() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Waivers are recorded through the waiver endpoint"
            )));
        }

        self.append(ctx, student_id, amount, method, remarks).await
    }

    /// Record a waiver: a zero-cash ledger entry reducing the balance.
    #[instrument(skip(self, ctx), fields(school_id = %ctx.school_id, student_id = %student_id))]
    pub async fn waive(
        &self,
        ctx: &SchoolContext,
        student_id: Uuid,
        amount: Decimal,
        remarks: Option<String>,
    ) -> Result<FeePayment, AppError> {
        Policy::authorize(ctx.role, Action::RecordWaiver)?;

        self.append(ctx, student_id, amount, PaymentMethod::Waiver, remarks)
            .await
    }

    async fn append(
        &self,
        ctx: &SchoolContext,
        student_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        remarks: Option<String>,
    ) -> Result<FeePayment, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Amount must be greater than zero"
            )));
        }

        // The ledger references students, but resolve first for a clean 404.
        self.db
            .get_student(ctx.school_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Student not found")))?;

        let payment = self
            .db
            .collect_payment(&CreatePayment {
                school_id: ctx.school_id,
                student_id,
                amount,
                method,
                remarks,
                collected_by: ctx.user_id,
                collected_by_role: ctx.role,
            })
            .await?;

        record_payment(
            &ctx.school_id.to_string(),
            payment.method.as_str(),
            payment.amount_paid.to_f64().unwrap_or(0.0),
        );

        Ok(payment)
    }
}
