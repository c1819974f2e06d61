//! HTTP endpoint handlers.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::ui::{html, state::AppState};

const INDEX_HTML: &str = include_str!("../../../assets/index.html");

#[derive(Debug, Deserialize)]
pub struct AddTagForm {
    #[serde(rename = "tagInput", default)]
    pub tag_input: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Landing page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Tag list fragment
pub async fn list_tags(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(html::tag_list(&state.tag_catalog.list().await))
}

/// Add a tag and return the resulting list fragment.
///
/// A rejected or failed add still renders the (unchanged) list.
pub async fn add_tag(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AddTagForm>,
) -> Html<String> {
    if let Err(e) = state.tag_catalog.add(&form.tag_input).await {
        tracing::warn!("Failed to add tag '{}': {}", form.tag_input, e);
    }
    Html(html::tag_list(&state.tag_catalog.list().await))
}

/// Delete a tag. `200` with an empty body on success, `204` when the store
/// rejected the change (the list is left as it was).
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.tag_catalog.remove(&name).await {
        Ok(_) => (StatusCode::OK, Html("")).into_response(),
        Err(e) => {
            tracing::warn!("Failed to delete tag '{}': {}", name, e);
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// Search results fragment
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Response {
    match state.search_messages.execute(&query.q).await {
        Ok(hits) => Html(html::message_list(&hits)).into_response(),
        Err(e) => {
            tracing::warn!("Search '{}' failed: {}", query.q, e);
            (StatusCode::BAD_GATEWAY, "search backend unavailable").into_response()
        }
    }
}
