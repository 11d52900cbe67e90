//! User handlers: create, read, list, page, stats, role update, delete.

use crate::error::AppError;
use crate::model::{NewUser, Role, Status, User, UserId, NAME_MAX_CHARS};
use crate::pagination::{Page, PageRequest};
use crate::repository::UserStats;
use crate::response::{codes, handle_or_raise, ApiResponse, BusinessError};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::fmt::Display;

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub name: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleBody {
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Malformed bodies, query strings and path ids are all reported as validation failures.
fn rejected(rejection: impl Display) -> AppError {
    AppError::Validation(rejection.to_string())
}

/// POST /users
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateUserBody>, JsonRejection>,
) -> Result<ApiResponse<User>, AppError> {
    let Json(body) = body.map_err(rejected)?;
    handle_or_raise(|| async move {
        let new_user = NewUser::new(body.name)?.with_status(body.status).with_role(body.role);
        if new_user.name().chars().count() > NAME_MAX_CHARS {
            return Err(BusinessError::new(
                codes::NAME_TOO_LONG,
                format!("name must be at most {} characters", NAME_MAX_CHARS),
            )
            .into());
        }
        let user = state.users.create(new_user).await?;
        tracing::info!(id = user.id, role = %user.role, "user created");
        Ok(user)
    })
    .await
}

/// GET /users/:id
pub async fn read(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<ApiResponse<User>, AppError> {
    let Path(id) = id.map_err(rejected)?;
    handle_or_raise(|| async move {
        state
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(AppError::user_not_found)
    })
    .await
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<User>>, AppError> {
    handle_or_raise(|| async move { Ok(state.users.list().await?) }).await
}

/// GET /users/page?page=&page_size=
pub async fn page(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<ApiResponse<Page<User>>, AppError> {
    let Query(params) = params.map_err(rejected)?;
    let request = PageRequest::new(params.page, params.page_size)?;
    handle_or_raise(|| async move { Ok(state.users.page(request).await?) }).await
}

/// GET /users/stats
pub async fn stats(State(state): State<AppState>) -> Result<ApiResponse<UserStats>, AppError> {
    handle_or_raise(|| async move { Ok(state.users.stats().await?) }).await
}

/// PATCH /users/:id/role
pub async fn update_role(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    body: Result<Json<UpdateRoleBody>, JsonRejection>,
) -> Result<ApiResponse<User>, AppError> {
    let Path(id) = id.map_err(rejected)?;
    let Json(body) = body.map_err(rejected)?;
    handle_or_raise(|| async move {
        let user = state
            .users
            .update_role(id, body.role)
            .await?
            .ok_or_else(AppError::user_not_found)?;
        tracing::info!(id, role = %user.role, "user role updated");
        Ok(user)
    })
    .await
}

/// DELETE /users/:id
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<ApiResponse<bool>, AppError> {
    let Path(id) = id.map_err(rejected)?;
    handle_or_raise(|| async move {
        if !state.users.delete(id).await? {
            return Err(AppError::user_not_found());
        }
        tracing::info!(id, "user deleted");
        Ok(true)
    })
    .await
}
