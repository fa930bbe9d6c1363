//! Dues statement handler.

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    middleware::SchoolContext,
    models::DuesStatement,
    policy::{Action, Policy},
    services::record_dues_statement,
    startup::AppState,
};

/// Compute the dues statement for a student: fee breakdown with sibling
/// discount and transport, summary totals and payment history.
pub async fn student_dues(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Path(student_id): Path<Uuid>,
) -> Result<Json<DuesStatement>, AppError> {
    Policy::authorize(ctx.role, Action::ViewDues)?;

    let statement = state.dues.statement(ctx.school_id, student_id).await?;

    record_dues_statement(&ctx.school_id.to_string());

    tracing::info!(
        student_id = %student_id,
        net_payable = %statement.summary.net_payable,
        balance_due = %statement.summary.balance_due,
        "Dues statement computed"
    );

    Ok(Json(statement))
}
