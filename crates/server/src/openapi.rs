use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::error::ErrorBody;

pub const UI_PATH: &str = "/api-docs";
pub const DOCUMENT_PATH: &str = "/api-docs/openapi.json";

/// Stored quote as returned by every read and write route.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct QuoteDocument {
    /// 24-character lowercase hex id.
    #[schema(example = "62efe4f29a85d0a4a9d18cfe")]
    id: String,
    /// Trimmed, HTML-escaped quote text.
    quote: String,
    author: String,
    #[schema(example = "2022-08-07T16:18:26.000Z")]
    created_at: String,
    /// Absent until the first edit.
    modified_at: Option<String>,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct QuoteInput {
    #[schema(example = "Hard work beats talent when talent doesn't work hard.")]
    quote: String,
    #[schema(example = "Tim Notke")]
    author: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AuthorSearch {
    /// Case-insensitive substring, matched literally.
    #[schema(example = "churchill")]
    author: String,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Quotes API", version = "1.0.0", description = "Simple API for storing quotes"),
    paths(
        api::list_quotes,
        api::get_quote,
        api::create_quote,
        api::edit_quote,
        api::delete_quote,
        api::search_by_author
    ),
    components(schemas(QuoteDocument, QuoteInput, AuthorSearch, ErrorBody)),
    tags((name = "quote", description = "Quote storage"))
)]
pub struct ApiDoc;

/// Interactive explorer at `/api-docs/` plus the raw document it loads.
pub fn router() -> Router {
    Router::new().merge(SwaggerUi::new(UI_PATH).url(DOCUMENT_PATH, ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{router, DOCUMENT_PATH, UI_PATH};

    #[tokio::test]
    async fn serves_document_for_every_quote_route() {
        let request = Request::builder().uri(DOCUMENT_PATH).body(Body::empty()).expect("request");

        let response = router().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let document: Value = serde_json::from_slice(&bytes).expect("json");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(document["info"]["title"], "Quotes API");
        let paths = document["paths"].as_object().expect("paths");
        assert!(paths.contains_key("/quote/"));
        assert!(paths.contains_key("/quote/searchByAuthor"));
        let by_id = paths["/quote/{id}"].as_object().expect("id path");
        for method in ["get", "put", "delete"] {
            assert!(by_id.contains_key(method), "missing {method} on /quote/{{id}}");
        }
        let quote_fields = &document["components"]["schemas"]["QuoteDocument"]["properties"];
        assert!(quote_fields.get("createdAt").is_some());
        assert!(quote_fields.get("modifiedAt").is_some());
    }

    #[tokio::test]
    async fn serves_interactive_explorer() {
        let uri = format!("{UI_PATH}/");
        let request = Request::builder().uri(uri).body(Body::empty()).expect("request");

        let response = router().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");

        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8_lossy(&bytes).contains("swagger"));
    }
}
