use super::{LIST_LIMIT, LIST_OFFSET, USERS_PATH};
use crate::db::{NewUser, User};
use crate::error::ApiError;
use crate::server::request_id::RequestId;
use crate::server::router::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, State,
        rejection::{BytesRejection, PathRejection},
    },
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use debez_schema::{CreateUserDto, UpdateUserDto, UserDto};
use serde::de::DeserializeOwned;
use tracing::debug;

fn user_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|rejection| ApiError::InvalidId {
        detail: rejection.body_text(),
    })
}

fn decode_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError> {
    let bytes = body.map_err(|rejection| ApiError::BodyRead {
        detail: rejection.body_text(),
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// GET /api/v1/users
///
/// Query parameters are ignored; the first page is always returned.
pub async fn list_users(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    debug!(%request_id, offset = LIST_OFFSET, limit = LIST_LIMIT, "listing users");

    let users = state
        .users
        .get_users(LIST_OFFSET, LIST_LIMIT)
        .await
        .map_err(ApiError::store("Failed to get users"))?;

    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// GET /api/v1/users/{id}
pub async fn get_user_by_id(
    State(state): State<AppState>,
    request_id: RequestId,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let id = user_id(id)?;
    debug!(%request_id, id, "fetching user");

    let user = state
        .users
        .get_user_by_id(id)
        .await
        .map_err(ApiError::store("Failed to get user"))?;

    Ok(Json(UserDto::from(user)))
}

/// POST /api/v1/create_user
///
/// Answers 201 with an empty body and a `Location` pointing at the new record.
pub async fn create_user(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let dto: CreateUserDto = decode_body(body)?;
    let user = NewUser::from(dto);

    let id = state
        .users
        .save_user(user)
        .await
        .map_err(ApiError::store("Failed to save user"))?;
    debug!(%request_id, id, "user created");

    Ok((StatusCode::CREATED, [(LOCATION, format!("{USERS_PATH}/{id}"))]).into_response())
}

/// PUT /api/v1/update_user
pub async fn update_user(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Bytes, BytesRejection>,
) -> Result<StatusCode, ApiError> {
    let dto: UpdateUserDto = decode_body(body)?;
    let user = User::from(dto);
    let id = user.id;

    state
        .users
        .update_user(user)
        .await
        .map_err(ApiError::store("Failed to update user"))?;
    debug!(%request_id, id, "user updated");

    Ok(StatusCode::OK)
}

/// DELETE /api/v1/delete_user/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    request_id: RequestId,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = user_id(id)?;

    state
        .users
        .delete_user(id)
        .await
        .map_err(ApiError::store("Failed to delete user"))?;
    debug!(%request_id, id, "user deleted");

    Ok(StatusCode::OK)
}
