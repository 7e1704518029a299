use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use teamup_shared::errors::{AppError, AppResult, ErrorCode};
use teamup_shared::types::auth::{AccessToken, AuthUser};
use teamup_shared::types::ApiResponse;

use crate::models::NewUser;
use crate::services::{auth_service, profile_service, token_service};
use crate::store::StoreError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    auth_service::validate_password(&req.password)?;

    let password_hash = auth_service::hash_password(&req.password)?;
    let user = state
        .store
        .create_user(NewUser {
            id: Uuid::now_v7(),
            email: req.email.to_lowercase(),
            password_hash,
            created_at: Utc::now(),
        })
        .map_err(|e| match e {
            StoreError::Conflict => {
                AppError::new(ErrorCode::EmailAlreadyExists, "email already registered")
            }
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, "user registered");

    let token = token_service::create_access_token(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_expiration_secs(),
    )?;
    Ok(Json(ApiResponse::ok(AccessToken::new(
        token,
        state.config.jwt_expiration_secs(),
    ))))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    let user = state
        .store
        .user_by_email(&req.email.to_lowercase())?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"))?;

    let valid = auth_service::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::new(
            ErrorCode::InvalidCredentials,
            "invalid email or password",
        ));
    }

    let token = token_service::create_access_token(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_expiration_secs(),
    )?;
    Ok(Json(ApiResponse::ok(AccessToken::new(
        token,
        state.config.jwt_expiration_secs(),
    ))))
}

/// The caller's own profile, games and availability included.
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<profile_service::ProfileView>>> {
    let view = profile_service::get_view(state.store.as_ref(), auth.id)?;
    Ok(Json(ApiResponse::ok(view)))
}
