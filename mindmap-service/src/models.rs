use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub document_name: String,
    pub created_at: String,
    pub has_mindmap: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryListResponse {
    pub items: Vec<HistoryItem>,
}

/// Registers a document whose mindmap was generated elsewhere. Parsing
/// and LLM transformation live outside this service.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterDocumentRequest {
    pub document_name: String,
    pub mindmap: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryItemResponse {
    pub id: String,
    pub document_name: String,
    pub created_at: String,
    pub mindmap: Value,
}

#[derive(Debug, Deserialize)]
pub struct QuestionQuery {
    pub node_id: Option<String>,
    pub text: Option<String>,
}

/// `question` is null when no annotation resolves; the client renders a
/// neutral state rather than an error.
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: Option<String>,
}
