//! Reporting handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use service_core::error::AppError;

use crate::{
    dtos::{AuditTrailQuery, DailyCollectionsQuery},
    middleware::SchoolContext,
    models::{AuditEntry, DailyCollectionReport},
    policy::{Action, Policy},
    startup::AppState,
};

const DEFAULT_AUDIT_LIMIT: i64 = 100;

/// Per-method ledger totals for one school-day.
pub async fn daily_collections(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Query(query): Query<DailyCollectionsQuery>,
) -> Result<Json<DailyCollectionReport>, AppError> {
    Policy::authorize(ctx.role, Action::ViewReports)?;

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let rows = state.db.daily_collections(ctx.school_id, date).await?;

    Ok(Json(DailyCollectionReport::from_rows(date, rows)))
}

/// Most recent audit entries for the school.
pub async fn audit_trail(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Query(query): Query<AuditTrailQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    Policy::authorize(ctx.role, Action::ViewReports)?;

    let entries = state
        .db
        .list_audit_entries(ctx.school_id, query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT))
        .await?;

    Ok(Json(entries))
}
