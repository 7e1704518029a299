use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use teamup_shared::errors::{AppError, AppResult, ErrorCode};
use teamup_shared::types::auth::AuthUser;
use teamup_shared::types::ApiResponse;

use crate::models::{Block, NewBlock, NewReport, Report};
use crate::store::StoreError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub blocked_user_id: Uuid,
}

/// Blocks a user. Blocked users disappear from the feed in both directions;
/// existing matches and history are left as they are.
pub async fn block_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<BlockRequest>,
) -> AppResult<Json<ApiResponse<Block>>> {
    if req.blocked_user_id == auth.id {
        return Err(AppError::new(
            ErrorCode::CannotBlockSelf,
            "cannot block yourself",
        ));
    }
    if state.store.user_by_id(req.blocked_user_id)?.is_none() {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }
    let block = state
        .store
        .create_block(NewBlock {
            user_id: auth.id,
            blocked_user_id: req.blocked_user_id,
            created_at: Utc::now(),
        })
        .map_err(|e| match e {
            StoreError::Conflict => {
                AppError::new(ErrorCode::AlreadyBlocked, "user is already blocked")
            }
            other => other.into(),
        })?;
    tracing::info!(user_id = %auth.id, blocked = %req.blocked_user_id, "user blocked");
    Ok(Json(ApiResponse::ok(block)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReportRequest {
    pub reported_user_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "reason must be 1 to 100 characters"))]
    pub reason: String,
    #[validate(length(max = 1000, message = "details must be at most 1000 characters"))]
    pub details: Option<String>,
}

/// Files a report against a user. Reports are append-only and start in the
/// `pending` state.
pub async fn report_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<ReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    if req.reported_user_id == auth.id {
        return Err(AppError::new(
            ErrorCode::CannotReportSelf,
            "cannot report yourself",
        ));
    }
    if state.store.user_by_id(req.reported_user_id)?.is_none() {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }
    let report = state.store.create_report(NewReport {
        id: Uuid::now_v7(),
        reporter_id: auth.id,
        reported_user_id: req.reported_user_id,
        reason: req.reason,
        details: req.details,
        status: "pending".to_string(),
        created_at: Utc::now(),
    })?;
    tracing::info!(
        report_id = %report.id,
        reporter = %auth.id,
        reported = %report.reported_user_id,
        "report filed"
    );
    Ok(Json(ApiResponse::ok(report)))
}
