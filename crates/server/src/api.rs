//! Quote routes.
//!
//! - `GET    /quote/`               list every quote
//! - `GET    /quote/{id}`           fetch one quote
//! - `POST   /quote/`               create a quote
//! - `PUT    /quote/{id}`           edit a quote
//! - `DELETE /quote/{id}`           delete a quote
//! - `POST   /quote/searchByAuthor` case-insensitive author substring search
//!
//! Every route is also reachable with or without a trailing slash. The
//! `#[utoipa::path]` annotations feed [`crate::openapi::ApiDoc`].

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, MethodRouter},
    Json, Router,
};
use quotebook_core::{
    domain::quote::{Quote, QuoteId},
    errors::ApplicationError,
    validation::{parse_author_query, parse_quote_body, require_body},
};
use quotebook_db::QuoteRepository;
use tracing::{debug, info};

use crate::error::{ApiError, ErrorBody};
use crate::openapi::{AuthorSearch, QuoteDocument, QuoteInput};

#[derive(Clone)]
pub struct QuoteState {
    repository: Arc<dyn QuoteRepository>,
}

pub fn router(repository: Arc<dyn QuoteRepository>) -> Router {
    Router::new()
        .route("/quote", get(list_quotes).post(create_quote))
        .route("/quote/", get(list_quotes).post(create_quote))
        .route("/quote/searchByAuthor", search_routes())
        .route("/quote/searchByAuthor/", search_routes())
        .route("/quote/{id}", by_id_routes())
        .route("/quote/{id}/", by_id_routes())
        .with_state(QuoteState { repository })
}

const SEARCH_SEGMENT: &str = "searchByAuthor";

fn by_id_routes() -> MethodRouter<QuoteState> {
    get(get_quote).put(edit_quote).delete(delete_quote)
}

/// The static path has no `{id}` capture, so the id handlers get the segment
/// itself. Any method other than POST fails id validation there.
fn search_routes() -> MethodRouter<QuoteState> {
    post(search_by_author)
        .get(|state: State<QuoteState>| get_quote(state, Path(SEARCH_SEGMENT.to_string())))
        .put(|state: State<QuoteState>, body: Bytes| {
            edit_quote(state, Path(SEARCH_SEGMENT.to_string()), body)
        })
        .delete(|state: State<QuoteState>| delete_quote(state, Path(SEARCH_SEGMENT.to_string())))
}

#[utoipa::path(
    get,
    path = "/quote/",
    tag = "quote",
    responses((status = 200, description = "List of all the quotes", body = [QuoteDocument]))
)]
pub async fn list_quotes(
    State(state): State<QuoteState>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let quotes =
        state.repository.list_all().await.map_err(|error| ApiError::store("quote.list", error))?;
    Ok(Json(quotes))
}

#[utoipa::path(
    get,
    path = "/quote/{id}",
    tag = "quote",
    params(("id" = String, Path, description = "24-character hex quote id")),
    responses(
        (status = 200, description = "Quote with given id", body = QuoteDocument),
        (status = 404, description = "Quote with given id has not been found", body = ErrorBody)
    )
)]
pub async fn get_quote(
    State(state): State<QuoteState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    let id = QuoteId::parse(&raw_id)
        .map_err(|_| ApiError::not_found(ApplicationError::NotFound(raw_id.clone())))?;

    let quote = state
        .repository
        .find_by_id(&id)
        .await
        .map_err(|error| ApiError::store("quote.get", error))?;

    quote
        .map(Json)
        .ok_or_else(|| ApiError::not_found(ApplicationError::NotFound(id.to_string())))
}

#[utoipa::path(
    post,
    path = "/quote/",
    tag = "quote",
    request_body = QuoteInput,
    responses(
        (status = 201, description = "The quote has been added", body = QuoteDocument),
        (status = 400, description = "Missing or incorrect data in the request", body = ErrorBody)
    )
)]
pub async fn create_quote(
    State(state): State<QuoteState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Quote>), ApiError> {
    let content = parse_quote_body(&body).map_err(ApiError::bad_request)?;

    let quote = state
        .repository
        .create(content)
        .await
        .map_err(|error| ApiError::store("quote.create", error))?;

    info!(
        event_name = "api.quote.created",
        quote_id = %quote.id,
        author = %quote.author,
        "quote created"
    );
    Ok((StatusCode::CREATED, Json(quote)))
}

/// An unknown id answers 400 here, unlike the 404 from `get_quote`; existing
/// clients depend on it.
#[utoipa::path(
    put,
    path = "/quote/{id}",
    tag = "quote",
    params(("id" = String, Path, description = "24-character hex quote id")),
    request_body = QuoteInput,
    responses(
        (status = 200, description = "Quote has been modified", body = QuoteDocument),
        (status = 400, description = "Unknown id, malformed id, or missing data", body = ErrorBody)
    )
)]
pub async fn edit_quote(
    State(state): State<QuoteState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Quote>, ApiError> {
    require_body(&body).map_err(ApiError::bad_request)?;
    let id = QuoteId::parse(&raw_id).map_err(ApiError::bad_request)?;
    let content = parse_quote_body(&body).map_err(ApiError::bad_request)?;

    let updated = state
        .repository
        .update(&id, content)
        .await
        .map_err(|error| ApiError::store("quote.edit", error))?;

    match updated {
        Some(quote) => {
            info!(event_name = "api.quote.edited", quote_id = %quote.id, "quote edited");
            Ok(Json(quote))
        }
        None => Err(ApiError::bad_request(ApplicationError::NotFound(id.to_string()))),
    }
}

#[utoipa::path(
    delete,
    path = "/quote/{id}",
    tag = "quote",
    params(("id" = String, Path, description = "24-character hex quote id")),
    responses(
        (status = 204, description = "Quote has been deleted"),
        (status = 400, description = "Malformed quote id", body = ErrorBody)
    )
)]
pub async fn delete_quote(
    State(state): State<QuoteState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = QuoteId::parse(&raw_id).map_err(ApiError::bad_request)?;

    let removed = state
        .repository
        .delete(&id)
        .await
        .map_err(|error| ApiError::store("quote.delete", error))?;

    if removed {
        info!(event_name = "api.quote.deleted", quote_id = %id, "quote deleted");
    } else {
        debug!(event_name = "api.quote.delete_missing", quote_id = %id, "delete of absent quote");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/quote/searchByAuthor",
    tag = "quote",
    request_body = AuthorSearch,
    responses(
        (status = 200, description = "Array of found quotes", body = [QuoteDocument]),
        (status = 400, description = "Missing or empty 'author'", body = ErrorBody)
    )
)]
pub async fn search_by_author(
    State(state): State<QuoteState>,
    body: Bytes,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let query = parse_author_query(&body).map_err(ApiError::bad_request)?;

    let quotes = state
        .repository
        .find_by_author(query.as_str())
        .await
        .map_err(|error| ApiError::store("quote.search_by_author", error))?;

    Ok(Json(quotes))
}
