use crate::database::{Database, DuplicateUser, NewBook, NewUser, Permission};
use crate::search_query::parse_search_query;
use crate::validation::{validate_new_book, validate_new_user};
use poem::{
    handler,
    http::StatusCode,
    web::{Data, Json, Path, Query},
    IntoResponse, Response,
};
use query_filter::FilterError;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;

/// Envelope for every JSON reply. `cause` is a stable machine-readable
/// reason, set on failures only.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(status: StatusCode, data: T) -> Self {
        Self {
            success: true,
            code: status.as_u16(),
            data: Some(data),
            error: None,
            cause: None,
        }
    }

    pub fn error(status: StatusCode, msg: String, cause: &str) -> Self {
        Self {
            success: false,
            code: status.as_u16(),
            data: None,
            error: Some(msg),
            cause: Some(cause.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub environment: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

fn reply<T: Serialize + Send>(status: StatusCode, data: T) -> Response {
    (status, Json(ApiResponse::success(status, data))).into_response()
}

fn failure(status: StatusCode, msg: String, cause: &str) -> Response {
    (status, Json(ApiResponse::<()>::error(status, msg, cause))).into_response()
}

fn filter_error_response(e: &FilterError) -> Response {
    if e.is_client_error() {
        tracing::debug!("Rejected search filter: {}", e);
        failure(StatusCode::BAD_REQUEST, e.to_string(), e.cause())
    } else {
        tracing::error!("Failed to compile search: {}", e);
        failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), e.cause())
    }
}

fn conflict() -> Response {
    failure(
        StatusCode::CONFLICT,
        "Username or email already registered".to_string(),
        "conflict",
    )
}

/// Filter errors keep their own status and cause, duplicate registrations
/// are a 409. Anything else is a 500 whose detail is only logged.
fn error_response(e: anyhow::Error) -> Response {
    if let Some(filter_error) = e.downcast_ref::<FilterError>() {
        return filter_error_response(filter_error);
    }
    if let Some(duplicate) = e.downcast_ref::<DuplicateUser>() {
        tracing::info!("{}", duplicate);
        return conflict();
    }
    tracing::error!("Request failed: {:#}", e);
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
        "internal_error",
    )
}

fn search_filters(params: &SearchParams) -> Result<Option<Vec<serde_json::Value>>, Response> {
    parse_search_query(params.q.as_deref()).map_err(|e| filter_error_response(&e))
}

#[handler]
pub async fn health() -> Json<HealthResponse> {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    Json(HealthResponse {
        success: true,
        message: "Bookstore API is running".to_string(),
        environment,
    })
}

#[handler]
pub async fn search_books(db: Data<&Arc<Database>>, Query(params): Query<SearchParams>) -> Response {
    let filters = match search_filters(&params) {
        Ok(filters) => filters,
        Err(response) => return response,
    };
    match db.search_books(filters.as_deref()).await {
        Ok(books) => reply(StatusCode::OK, books),
        Err(e) => error_response(e),
    }
}

#[handler]
pub async fn get_book(db: Data<&Arc<Database>>, Path(id): Path<i64>) -> Response {
    match db.get_book(id).await {
        Ok(Some(book)) => reply(StatusCode::OK, book),
        Ok(None) => failure(
            StatusCode::NOT_FOUND,
            format!("Book {} not found", id),
            "not_found",
        ),
        Err(e) => error_response(e),
    }
}

#[handler]
pub async fn publish_book(
    db: Data<&Arc<Database>>,
    body: poem::Result<Json<NewBook>>,
) -> Response {
    let book = match body {
        Ok(Json(book)) => book,
        Err(e) => return failure(StatusCode::BAD_REQUEST, e.to_string(), "invalid_body"),
    };
    if let Err(e) = validate_new_book(&book) {
        return failure(StatusCode::BAD_REQUEST, e.to_string(), "validation_error");
    }

    match db.user_can(book.author_id, Permission::PUBLISH).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!("User {} tried to publish without permission", book.author_id);
            return failure(
                StatusCode::FORBIDDEN,
                format!("User {} is not allowed to publish books", book.author_id),
                "forbidden",
            );
        }
        Err(e) => return error_response(e),
    }

    match db.create_book(&book).await {
        Ok(created) => reply(StatusCode::CREATED, created),
        Err(e) => error_response(e),
    }
}

#[handler]
pub async fn search_users(db: Data<&Arc<Database>>, Query(params): Query<SearchParams>) -> Response {
    let filters = match search_filters(&params) {
        Ok(filters) => filters,
        Err(response) => return response,
    };
    match db.search_users(filters.as_deref()).await {
        Ok(users) => reply(StatusCode::OK, users),
        Err(e) => error_response(e),
    }
}

#[handler]
pub async fn get_user(db: Data<&Arc<Database>>, Path(id): Path<i64>) -> Response {
    match db.get_user(id).await {
        Ok(Some(user)) => reply(StatusCode::OK, user),
        Ok(None) => failure(
            StatusCode::NOT_FOUND,
            format!("User {} not found", id),
            "not_found",
        ),
        Err(e) => error_response(e),
    }
}

#[handler]
pub async fn register_user(
    db: Data<&Arc<Database>>,
    body: poem::Result<Json<NewUser>>,
) -> Response {
    let user = match body {
        Ok(Json(user)) => user,
        Err(e) => return failure(StatusCode::BAD_REQUEST, e.to_string(), "invalid_body"),
    };
    if let Err(e) = validate_new_user(&user) {
        return failure(StatusCode::BAD_REQUEST, e.to_string(), "validation_error");
    }

    match db
        .is_username_or_email_taken(&user.username, &user.email)
        .await
    {
        Ok(false) => {}
        Ok(true) => return conflict(),
        Err(e) => return error_response(e),
    }

    match db.create_user(&user).await {
        Ok(created) => reply(StatusCode::CREATED, created),
        Err(e) => error_response(e),
    }
}

/// Books by one author, optionally narrowed by `q`.
#[handler]
pub async fn get_user_books(
    db: Data<&Arc<Database>>,
    Path(id): Path<i64>,
    Query(params): Query<SearchParams>,
) -> Response {
    let filters = match search_filters(&params) {
        Ok(filters) => filters,
        Err(response) => return response,
    };
    match db.get_user(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return failure(
                StatusCode::NOT_FOUND,
                format!("User {} not found", id),
                "not_found",
            )
        }
        Err(e) => return error_response(e),
    }
    match db.search_books_by_author(id, filters.as_deref()).await {
        Ok(books) => reply(StatusCode::OK, books),
        Err(e) => error_response(e),
    }
}
