//! Fee structure catalog handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        CreateFeeStructureRequest, FeeStructureResponse, ListFeeStructuresQuery,
        UpdateFeeStructureRequest,
    },
    middleware::SchoolContext,
    models::{
        AuditAction, CreateFeeStructure, ListFeeStructuresFilter, RecordAudit, UpdateFeeStructure,
    },
    policy::{Action, Policy},
    services::record_fee_structure_operation,
    startup::AppState,
};

const DEFAULT_PAGE_SIZE: i32 = 50;

async fn audit_catalog_change(
    state: &AppState,
    ctx: &SchoolContext,
    action: AuditAction,
    fee_id: Uuid,
    name: &str,
) {
    let result = state
        .db
        .record_audit(&RecordAudit {
            school_id: ctx.school_id,
            actor_id: ctx.user_id,
            actor_role: ctx.role.as_str().to_string(),
            action,
            student_id: None,
            receipt_number: None,
            amount: None,
            details: Some(serde_json::json!({ "fee_id": fee_id, "name": name })),
        })
        .await;

    // Catalog mutations succeed even if the audit write fails; the failure is
    // surfaced through logs and the error counter instead.
    if let Err(e) = result {
        tracing::error!(error = %e, fee_id = %fee_id, "Failed to audit catalog change");
        crate::services::record_error("audit_write", "fee_structures");
    }
}

/// Create a fee structure line item for a class.
pub async fn create_fee_structure(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Json(payload): Json<CreateFeeStructureRequest>,
) -> Result<(StatusCode, Json<FeeStructureResponse>), AppError> {
    Policy::authorize(ctx.role, Action::ManageFeeStructures)?;
    payload.validate()?;

    let fee = state
        .db
        .create_fee_structure(&CreateFeeStructure {
            school_id: ctx.school_id,
            class_id: payload.class_id,
            name: payload.name,
            fee_type: payload.fee_type,
            frequency: payload.frequency,
            amount: payload.amount,
            due_date: payload.due_date,
        })
        .await?;

    audit_catalog_change(&state, &ctx, AuditAction::FeeStructureCreated, fee.fee_id, &fee.name)
        .await;
    record_fee_structure_operation(&ctx.school_id.to_string(), "create");

    Ok((StatusCode::CREATED, Json(FeeStructureResponse::from(fee))))
}

/// Get a fee structure by ID.
pub async fn get_fee_structure(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Path(fee_id): Path<Uuid>,
) -> Result<Json<FeeStructureResponse>, AppError> {
    Policy::authorize(ctx.role, Action::ViewDues)?;

    let fee = state
        .db
        .get_fee_structure(ctx.school_id, fee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Fee structure not found")))?;

    Ok(Json(FeeStructureResponse::from(fee)))
}

/// List fee structures, optionally filtered by class.
pub async fn list_fee_structures(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Query(query): Query<ListFeeStructuresQuery>,
) -> Result<Json<Vec<FeeStructureResponse>>, AppError> {
    Policy::authorize(ctx.role, Action::ViewDues)?;

    let fees = state
        .db
        .list_fee_structures(
            ctx.school_id,
            &ListFeeStructuresFilter {
                class_id: query.class_id,
                include_archived: query.include_archived.unwrap_or(false),
                page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
                page_token: query.page_token,
            },
        )
        .await?;

    Ok(Json(fees.into_iter().map(FeeStructureResponse::from).collect()))
}

/// Update a fee structure's name, amount or due date.
pub async fn update_fee_structure(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Path(fee_id): Path<Uuid>,
    Json(payload): Json<UpdateFeeStructureRequest>,
) -> Result<Json<FeeStructureResponse>, AppError> {
    Policy::authorize(ctx.role, Action::ManageFeeStructures)?;
    payload.validate()?;

    let fee = state
        .db
        .update_fee_structure(
            ctx.school_id,
            fee_id,
            &UpdateFeeStructure {
                name: payload.name,
                amount: payload.amount,
                due_date: payload.due_date,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Fee structure not found or archived")))?;

    audit_catalog_change(&state, &ctx, AuditAction::FeeStructureUpdated, fee.fee_id, &fee.name)
        .await;
    record_fee_structure_operation(&ctx.school_id.to_string(), "update");

    Ok(Json(FeeStructureResponse::from(fee)))
}

/// Archive a fee structure, excluding it from dues calculation.
pub async fn archive_fee_structure(
    State(state): State<AppState>,
    ctx: SchoolContext,
    Path(fee_id): Path<Uuid>,
) -> Result<Json<FeeStructureResponse>, AppError> {
    Policy::authorize(ctx.role, Action::ManageFeeStructures)?;

    let fee = state
        .db
        .archive_fee_structure(ctx.school_id, fee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Fee structure not found or archived")))?;

    audit_catalog_change(&state, &ctx, AuditAction::FeeStructureArchived, fee.fee_id, &fee.name)
        .await;
    record_fee_structure_operation(&ctx.school_id.to_string(), "archive");

    Ok(Json(FeeStructureResponse::from(fee)))
}
