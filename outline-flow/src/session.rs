use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::source::OutlineSource;
use crate::view::MindmapView;

/// The currently displayed document and its derived view.
#[derive(Debug, Clone)]
pub struct ActiveDocument {
    pub document_id: String,
    pub view: Arc<MindmapView>,
}

/// Outcome of a selection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The fetched outline became the active view.
    Installed,
    /// A newer selection was made while this one was in flight; the
    /// stale result was discarded.
    Superseded,
}

/// Reservation for one selection; see [`OutlineSession::begin`].
#[derive(Debug)]
pub struct SelectTicket {
    generation: u64,
    document_id: String,
}

/// Tracks the active document with last-selection-wins semantics.
///
/// Selecting a document while an earlier fetch is still in flight does
/// not queue behind it: the newer selection bumps the generation counter
/// and the stale completion is dropped when it arrives. Cancellation is
/// advisory only; in-flight fetches are never aborted at the transport
/// level. The view is replaced wholesale, never merged.
pub struct OutlineSession {
    source: Arc<dyn OutlineSource>,
    generation: AtomicU64,
    current: RwLock<Option<ActiveDocument>>,
}

impl OutlineSession {
    pub fn new(source: Arc<dyn OutlineSource>) -> Self {
        Self {
            source,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Make `document_id` the active document: fetch its outline and
    /// derive the view. Returns `Superseded` when a newer selection
    /// raced past this one.
    pub async fn select(&self, document_id: &str) -> Result<SelectOutcome> {
        let ticket = self.begin(document_id);
        let outline = self.source.fetch_outline(document_id).await?;
        self.complete(ticket, &outline).await
    }

    /// Reserve the next selection slot. Exposed together with
    /// [`complete`](Self::complete) so callers driving their own fetch
    /// get the same supersede semantics as [`select`](Self::select).
    pub fn begin(&self, document_id: &str) -> SelectTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        SelectTicket {
            generation,
            document_id: document_id.to_string(),
        }
    }

    /// Install a fetched outline, unless the ticket has been superseded.
    pub async fn complete(&self, ticket: SelectTicket, outline: &Value) -> Result<SelectOutcome> {
        if ticket.generation != self.generation.load(Ordering::SeqCst) {
            debug!(document_id = %ticket.document_id, "discarding stale outline fetch");
            return Ok(SelectOutcome::Superseded);
        }
        let view = Arc::new(MindmapView::from_value(outline));
        let mut current = self.current.write().await;
        // Re-check under the lock: another completion may have landed
        // between the generation check and acquiring the write lock.
        if ticket.generation != self.generation.load(Ordering::SeqCst) {
            return Ok(SelectOutcome::Superseded);
        }
        *current = Some(ActiveDocument {
            document_id: ticket.document_id,
            view,
        });
        Ok(SelectOutcome::Installed)
    }

    pub async fn current(&self) -> Option<ActiveDocument> {
        self.current.read().await.clone()
    }

    /// Drop the active document. Also supersedes any in-flight fetch.
    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.current.write().await = None;
    }
}
