use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use outline_flow::{MindmapView, OutlineError, OutlineNode, OutlineSession, SelectOutcome, collapse_root_chain};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::models::{
    HistoryItem, HistoryItemResponse, HistoryListResponse, QuestionQuery, QuestionResponse,
    RegisterDocumentRequest,
};
use crate::storage::{HistoryStore, StorageError};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "history_id": id
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn storage_error(err: StorageError, id: &str) -> ApiError {
    match err {
        StorageError::NotFound(_) => not_found_error("History item not found", id),
        other => {
            error!("history store error for {}: {}", id, other);
            internal_error("History store error", &other.to_string())
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<HistoryStore>,
    pub session: Arc<OutlineSession>,
}

pub fn create_app(storage_root: &str) -> anyhow::Result<Router> {
    let store = Arc::new(HistoryStore::new(storage_root)?);
    let session = Arc::new(OutlineSession::new(store.clone()));
    Ok(build_router(AppState { store, session }))
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/mindmap", get(get_mindmap))
        .route("/api/mindmap/view", get(get_view))
        .route("/api/mindmap/question", get(get_question))
        .route("/api/history", get(list_history).post(register_document))
        .route(
            "/api/history/{history_id}",
            get(get_history_item).delete(delete_history_item),
        )
        .route("/api/history/{history_id}/select", post(select_history_item))
        .route("/api/clear", post(clear_selection))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Mindmap Service",
        "version": "1.0.0",
        "description": "Serves document mindmaps, per-node annotations and upload history",
        "endpoints": {
            "GET /api/mindmap": "Active document's mindmap structure",
            "GET /api/mindmap/view": "Derived view: flattened text, identified tree, annotations",
            "GET /api/mindmap/question": "Resolve a node's follow-up question",
            "GET /api/history": "List previously processed documents",
            "POST /api/history": "Register a generated mindmap",
            "GET /api/history/{id}": "A document's mindmap data",
            "POST /api/history/{id}/select": "Make a document the active one",
            "DELETE /api/history/{id}": "Delete a history item",
            "POST /api/clear": "Clear the active selection",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Fallback structure served before any document has been selected.
fn welcome_mindmap() -> Value {
    json!({
        "title": "Welcome to Mind Map",
        "description": "Upload a document to generate a mind map.",
        "question": "What would you like to explore?",
        "children": []
    })
}

/// Root-collapse a stored payload; payloads that do not parse as an
/// outline pass through untouched (the view layer substitutes the
/// placeholder for them).
fn collapsed(payload: Value) -> Value {
    if payload.get("title").is_none() && payload.get("children").is_none() {
        return payload;
    }
    match serde_json::from_value::<OutlineNode>(payload.clone()) {
        Ok(outline) => serde_json::to_value(collapse_root_chain(outline)).unwrap_or(payload),
        Err(_) => payload,
    }
}

async fn get_mindmap(State(state): State<AppState>) -> ApiResult<Value> {
    let Some(active) = state.session.current().await else {
        return Ok(Json(welcome_mindmap()));
    };
    match state.store.load_mindmap(&active.document_id) {
        Ok(payload) => Ok(Json(collapsed(payload))),
        Err(StorageError::NotFound(_)) => {
            // The active document was deleted from under the selection.
            Ok(Json(welcome_mindmap()))
        }
        Err(err) => Err(storage_error(err, &active.document_id)),
    }
}

async fn get_view(State(state): State<AppState>) -> ApiResult<MindmapView> {
    match state.session.current().await {
        Some(active) => Ok(Json(active.view.as_ref().clone())),
        None => Ok(Json(MindmapView::from_value(&welcome_mindmap()))),
    }
}

async fn get_question(
    State(state): State<AppState>,
    Query(query): Query<QuestionQuery>,
) -> ApiResult<QuestionResponse> {
    let question = match state.session.current().await {
        Some(active) => active
            .view
            .resolver
            .resolve(
                query.node_id.as_deref().unwrap_or(""),
                query.text.as_deref().unwrap_or(""),
            )
            .map(str::to_string),
        None => None,
    };
    Ok(Json(QuestionResponse { question }))
}

async fn list_history(State(state): State<AppState>) -> ApiResult<HistoryListResponse> {
    let items = state
        .store
        .list()
        .map_err(|err| storage_error(err, ""))?
        .into_iter()
        .map(|(metadata, has_mindmap)| HistoryItem {
            id: metadata.id,
            document_name: metadata.document_name,
            created_at: metadata.created_at,
            has_mindmap,
        })
        .collect();
    Ok(Json(HistoryListResponse { items }))
}

async fn register_document(
    State(state): State<AppState>,
    Json(request): Json<RegisterDocumentRequest>,
) -> ApiResult<Value> {
    if request.document_name.trim().is_empty() {
        return Err(bad_request_error("document_name is required"));
    }

    let metadata = state
        .store
        .create(&request.document_name, &request.mindmap)
        .map_err(|err| storage_error(err, &request.document_name))?;

    info!(
        "Registered mindmap for {} as {}",
        metadata.document_name, metadata.id
    );
    Ok(Json(json!({
        "message": "Mindmap registered successfully",
        "history_id": metadata.id,
        "document_name": metadata.document_name
    })))
}

async fn get_history_item(
    State(state): State<AppState>,
    Path(history_id): Path<String>,
) -> ApiResult<HistoryItemResponse> {
    let metadata = state
        .store
        .metadata(&history_id)
        .map_err(|err| storage_error(err, &history_id))?;
    let mindmap = state
        .store
        .load_mindmap(&history_id)
        .map_err(|err| storage_error(err, &history_id))?;

    Ok(Json(HistoryItemResponse {
        id: metadata.id,
        document_name: metadata.document_name,
        created_at: metadata.created_at,
        mindmap: collapsed(mindmap),
    }))
}

async fn select_history_item(
    State(state): State<AppState>,
    Path(history_id): Path<String>,
) -> ApiResult<Value> {
    info!("Selecting history item {}", history_id);

    match state.session.select(&history_id).await {
        Ok(SelectOutcome::Installed) => Ok(Json(json!({
            "message": "History item selected",
            "history_id": history_id
        }))),
        Ok(SelectOutcome::Superseded) => Ok(Json(json!({
            "message": "Selection superseded by a newer one",
            "history_id": history_id
        }))),
        Err(OutlineError::DocumentNotFound(id)) => {
            Err(not_found_error("History item not found", &id))
        }
        Err(err) => {
            error!("Failed to select history item {}: {}", history_id, err);
            Err(internal_error("Failed to select history item", &err.to_string()))
        }
    }
}

async fn delete_history_item(
    State(state): State<AppState>,
    Path(history_id): Path<String>,
) -> ApiResult<Value> {
    state
        .store
        .delete(&history_id)
        .map_err(|err| storage_error(err, &history_id))?;

    // Deleting the active document also clears the selection.
    if let Some(active) = state.session.current().await {
        if active.document_id == history_id {
            state.session.clear().await;
        }
    }

    Ok(Json(json!({
        "message": "History item deleted successfully",
        "history_id": history_id
    })))
}

async fn clear_selection(State(state): State<AppState>) -> ApiResult<Value> {
    state.session.clear().await;
    Ok(Json(json!({ "message": "Context cleared successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(HistoryStore::new(dir.path()).unwrap());
        let session = Arc::new(OutlineSession::new(store.clone()));
        (dir, AppState { store, session })
    }

    #[tokio::test]
    async fn mindmap_falls_back_to_welcome_structure() {
        let (_dir, state) = state();
        let Json(payload) = get_mindmap(State(state)).await.unwrap();
        assert_eq!(payload["title"], "Welcome to Mind Map");
    }

    #[tokio::test]
    async fn select_then_fetch_mindmap_and_question() {
        let (_dir, state) = state();
        let metadata = state
            .store
            .create(
                "doc.pdf",
                &json!({
                    "title": "Mind Map",
                    "children": [{"title": "Intro", "question": "What is this about?"}]
                }),
            )
            .unwrap();

        let Json(selected) = select_history_item(State(state.clone()), Path(metadata.id.clone()))
            .await
            .unwrap();
        assert_eq!(selected["message"], "History item selected");

        // Single generic-rooted child collapses into the root position.
        let Json(mindmap) = get_mindmap(State(state.clone())).await.unwrap();
        assert_eq!(mindmap["title"], "Intro");

        let Json(answer) = get_question(
            State(state.clone()),
            Query(QuestionQuery {
                node_id: Some("0".to_string()),
                text: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(answer.question.as_deref(), Some("What is this about?"));
    }

    #[tokio::test]
    async fn selecting_missing_document_is_not_found() {
        let (_dir, state) = state();
        let result = select_history_item(State(state), Path("missing".to_string())).await;
        assert_eq!(result.unwrap_err().0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_active_document_clears_selection() {
        let (_dir, state) = state();
        let metadata = state.store.create("doc.pdf", &json!({"title": "Doc"})).unwrap();
        select_history_item(State(state.clone()), Path(metadata.id.clone()))
            .await
            .unwrap();

        delete_history_item(State(state.clone()), Path(metadata.id))
            .await
            .unwrap();
        assert!(state.session.current().await.is_none());

        let Json(payload) = get_mindmap(State(state)).await.unwrap();
        assert_eq!(payload["title"], "Welcome to Mind Map");
    }
}
