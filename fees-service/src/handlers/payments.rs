//! Payment ledger handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::{CollectPaymentRequest, ListPaymentsQuery, PaymentResponse, RecordWaiverRequest},
    middleware::SchoolContext,
    models::ListPaymentsFilter,
    policy::{Action, Policy},
    startup::AppState,
};

const DEFAULT_PAGE_SIZE: i32 = 50;

/// Record a payment against a student's dues.
pub async fn collect_payment(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Json(payload): Json<CollectPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    payload.validate()?;

    let payment = state
        .collector
        .collect(
            &ctx,
            payload.student_id,
            payload.amount,
            payload.method,
            payload.remarks,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

/// Record a waiver. Admin only; rejected requests write nothing.
pub async fn record_waiver(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Json(payload): Json<RecordWaiverRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    payload.validate()?;

    let payment = state
        .collector
        .waive(&ctx, payload.student_id, payload.amount, payload.remarks)
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

/// List ledger entries for the school.
pub async fn list_payments(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    Policy::authorize(ctx.role, Action::ViewDues)?;

    let payments = state
        .db
        .list_payments(
            ctx.school_id,
            &ListPaymentsFilter {
                student_id: query.student_id,
                start_date: query.start_date,
                end_date: query.end_date,
                page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
                page_token: query.page_token,
            },
        )
        .await?;

    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}
