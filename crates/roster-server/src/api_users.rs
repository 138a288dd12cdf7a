//! Handlers for the `/api/users` resource.
//!
//! Every success response is wrapped in an [`Envelope`] whose `status`
//! mirrors the HTTP status code. Failures render through [`ApiError`].

use crate::error::{ApiError, ErrorBody};
use crate::session::with_session;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Json, Path, Query,
    },
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use roster_users::{create_user, delete_user, get_user, list_users, User, UserError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const MSG_SUCCESS: &str = "Success";
const MSG_CREATED: &str = "User berhasil dibuat";
const MSG_DELETED: &str = "Data berhasil dihapus";

const DETAIL_EMPTY: &str = "Tidak ada data";
const DETAIL_USER_MISSING: &str = "User tidak ada";
const DETAIL_DELETE_MISSING: &str = "User tidak ditemukan";
const DETAIL_DUPLICATE_ID: &str = "Coba dengan id berbeda";

/// Success envelope carrying a payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    /// Mirrors the HTTP status code.
    #[schema(example = 200)]
    pub status: u16,
    /// Human-readable outcome, e.g. `Success` or `User berhasil dibuat`.
    #[schema(example = "Success")]
    pub message: String,
    /// One user, or every user for the list route.
    pub data: T,
}

impl<T> Envelope<T> {
    fn new(status: StatusCode, message: &str, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message: message.to_string(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Success envelope without a payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageEnvelope {
    /// Mirrors the HTTP status code.
    #[schema(example = 200)]
    pub status: u16,
    /// Human-readable outcome.
    #[schema(example = "Data berhasil dihapus")]
    pub message: String,
}

impl IntoResponse for MessageEnvelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Query parameters accepted by the legacy `POST /api/user` route.
#[derive(Debug, Deserialize)]
pub struct LegacyCreateParams {
    pub id: i64,
    pub nama: String,
    pub umur: i64,
    pub alamat: Option<String>,
}

impl From<LegacyCreateParams> for User {
    fn from(params: LegacyCreateParams) -> Self {
        User {
            id: params.id,
            name: params.nama,
            age: params.umur,
            address: params.alamat,
        }
    }
}

fn internal(context: &str, err: UserError) -> ApiError {
    tracing::error!(error = %err, "{}", context);
    ApiError::InternalServerError(format!("{}: {}", context, err))
}

/// GET /api/users/
#[utoipa::path(
    get,
    path = "/api/users/",
    tag = "users",
    responses(
        (status = 200, description = "Every stored user", body = Envelope<Vec<User>>),
        (status = 404, description = "No users stored", body = ErrorBody)
    )
)]
pub async fn list_users_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Envelope<Vec<User>>, ApiError> {
    let users = with_session(&state.pool, |conn| {
        list_users(conn).map_err(|e| internal("Gagal mengambil data", e))
    })
    .await?;

    if users.is_empty() {
        return Err(ApiError::NotFound(DETAIL_EMPTY.to_string()));
    }
    Ok(Envelope::new(StatusCode::OK, MSG_SUCCESS, users))
}

/// GET /api/users/{user_id}
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "users",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = Envelope<User>),
        (status = 404, description = "No user with that id", body = ErrorBody),
        (status = 422, description = "Id is not an integer", body = ErrorBody)
    )
)]
pub async fn get_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Envelope<User>, ApiError> {
    let Path(user_id) = path?;

    let user = with_session(&state.pool, move |conn| {
        get_user(conn, user_id).map_err(|e| match e {
            UserError::NotFound(_) => ApiError::NotFound(DETAIL_USER_MISSING.to_string()),
            other => internal("Gagal mengambil user", other),
        })
    })
    .await?;

    Ok(Envelope::new(StatusCode::OK, MSG_SUCCESS, user))
}

/// POST /api/users/
#[utoipa::path(
    post,
    path = "/api/users/",
    tag = "users",
    request_body = User,
    responses(
        (status = 201, description = "User created", body = Envelope<User>),
        (status = 400, description = "Id already taken", body = ErrorBody),
        (status = 422, description = "Malformed body", body = ErrorBody),
        (status = 500, description = "Write failed and was rolled back", body = ErrorBody)
    )
)]
pub async fn create_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<User>, JsonRejection>,
) -> Result<Envelope<User>, ApiError> {
    let Json(user) = payload?;
    create(&state, user).await
}

/// POST /api/user
///
/// Scalar-parameter form of create kept for old clients. The JSON body form
/// on `/api/users/` is canonical.
#[utoipa::path(
    post,
    path = "/api/user",
    tag = "users",
    params(
        ("id" = i64, Query, description = "User id"),
        ("nama" = String, Query, description = "Name"),
        ("umur" = i64, Query, description = "Age"),
        ("alamat" = Option<String>, Query, description = "Address")
    ),
    responses(
        (status = 201, description = "User created", body = Envelope<User>),
        (status = 400, description = "Id already taken", body = ErrorBody),
        (status = 422, description = "Missing or malformed parameters", body = ErrorBody)
    )
)]
pub async fn legacy_create_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<LegacyCreateParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query?;
    tracing::warn!(
        user_id = params.id,
        "deprecated POST /api/user called; use POST /api/users/ with a JSON body"
    );

    let mut response = create(&state, params.into()).await?.into_response();
    response.headers_mut().insert(
        HeaderName::from_static("deprecation"),
        HeaderValue::from_static("true"),
    );
    Ok(response)
}

async fn create(state: &AppState, user: User) -> Result<Envelope<User>, ApiError> {
    let user_id = user.id;
    let created = with_session(&state.pool, move |conn| {
        create_user(conn, &user).map_err(|e| match e {
            UserError::Duplicate(_) => ApiError::BadRequest(DETAIL_DUPLICATE_ID.to_string()),
            other => internal("Gagal membuat user", other),
        })
    })
    .await?;

    tracing::info!(user_id, "user created");
    Ok(Envelope::new(StatusCode::CREATED, MSG_CREATED, created))
}

/// DELETE /api/users/{user_id}
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    tag = "users",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageEnvelope),
        (status = 404, description = "No user with that id", body = ErrorBody),
        (status = 500, description = "Write failed and was rolled back", body = ErrorBody)
    )
)]
pub async fn delete_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<MessageEnvelope, ApiError> {
    let Path(user_id) = path?;

    with_session(&state.pool, move |conn| {
        delete_user(conn, user_id).map_err(|e| match e {
            UserError::NotFound(_) => ApiError::NotFound(DETAIL_DELETE_MISSING.to_string()),
            other => internal("Gagal menghapus user", other),
        })
    })
    .await?;

    tracing::info!(user_id, "user deleted");
    Ok(MessageEnvelope {
        status: StatusCode::OK.as_u16(),
        message: MSG_DELETED.to_string(),
    })
}
