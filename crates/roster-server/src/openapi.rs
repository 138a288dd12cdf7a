//! OpenAPI document for the HTTP surface.

use crate::api_users::{self, MessageEnvelope};
use crate::error::ErrorBody;
use axum::Json;
use roster_users::User;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roster",
        description = "Simple REST API with GET, POST, and DELETE operations over users"
    ),
    paths(
        api_users::list_users_handler,
        api_users::get_user_handler,
        api_users::create_user_handler,
        api_users::legacy_create_user_handler,
        api_users::delete_user_handler
    ),
    components(schemas(User, ErrorBody, MessageEnvelope)),
    tags((name = "users", description = "User records"))
)]
pub struct ApiDoc;

/// GET /api/openapi.json
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
