use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::annotations::AnnotationIndex;
use crate::model::{OutlineNode, collapse_root_chain};
use crate::normalize::{flatten_or_placeholder, placeholder_text};
use crate::rendered::{RenderedNode, assign_ids, parse};
use crate::resolve::QuestionResolver;

/// Everything the UI needs for one loaded document, derived in a single
/// pass from the raw outline payload: the collapsed outline, its
/// flattened markup, the identified rendered tree, the annotation index
/// and the question resolver.
///
/// A view is a pure function of the payload. It is rebuilt wholesale
/// whenever the active document changes and never mutated in place, so
/// no invalidation bookkeeping is needed.
#[derive(Debug, Clone, Serialize)]
pub struct MindmapView {
    pub outline: OutlineNode,
    pub text: String,
    pub tree: RenderedNode,
    pub annotations: AnnotationIndex,
    #[serde(skip)]
    pub resolver: QuestionResolver,
}

impl MindmapView {
    /// Derive a view from a raw payload. Total over its input: malformed
    /// or unknown payloads degrade to the placeholder heading, never to
    /// an error.
    pub fn from_value(payload: &Value) -> Self {
        if let Some(markdown) = payload.get("markdown").and_then(Value::as_str) {
            return Self::from_markdown(markdown);
        }
        if payload.get("title").is_some() || payload.get("children").is_some() {
            match serde_json::from_value::<OutlineNode>(payload.clone()) {
                Ok(outline) => return Self::from_outline(outline),
                Err(err) => warn!("outline payload did not match the expected shape: {err}"),
            }
        } else {
            warn!("outline payload has neither markdown nor title/children, using placeholder");
        }
        Self::from_markdown(&placeholder_text())
    }

    pub fn from_outline(outline: OutlineNode) -> Self {
        let outline = collapse_root_chain(outline);
        let text = flatten_or_placeholder(&outline);
        let annotations = AnnotationIndex::build(&outline);
        let mut tree = parse(&text);
        assign_ids(&mut tree, "0");
        let resolver = QuestionResolver::build(&tree, &annotations);
        Self {
            outline,
            text,
            tree,
            annotations,
            resolver,
        }
    }

    /// Payloads that already carry flattened markup skip normalization;
    /// they have no annotations to index.
    fn from_markdown(markdown: &str) -> Self {
        let text = if markdown.trim().is_empty() {
            placeholder_text()
        } else {
            markdown.to_string()
        };
        let annotations = AnnotationIndex::default();
        let mut tree = parse(&text);
        assign_ids(&mut tree, "0");
        let resolver = QuestionResolver::build(&tree, &annotations);
        Self {
            outline: OutlineNode::default(),
            text,
            tree,
            annotations,
            resolver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::PLACEHOLDER_TITLE;
    use serde_json::json;

    #[test]
    fn derives_view_from_structured_payload() {
        let view = MindmapView::from_value(&json!({
            "title": "Mind Map",
            "children": [
                {"title": "Intro", "question": "What is this about?"},
                {"title": "Details", "items": ["fact one"]}
            ]
        }));

        assert!(view.text.starts_with("# Intro\n"));
        assert_eq!(view.tree.children.len(), 2);
        assert_eq!(
            view.resolver.resolve("0.0", "Intro"),
            Some("What is this about?")
        );
    }

    #[test]
    fn markdown_payload_is_used_verbatim() {
        let view = MindmapView::from_value(&json!({"markdown": "# Ready Made\n\n- bullet\n"}));
        assert_eq!(view.text, "# Ready Made\n\n- bullet\n");
        assert_eq!(view.tree.text, "Ready Made");
        assert!(view.annotations.questions.is_empty());
    }

    #[test]
    fn unknown_format_degrades_to_placeholder() {
        let view = MindmapView::from_value(&json!({"unexpected": true}));
        assert!(view.text.contains(PLACEHOLDER_TITLE));
        assert_eq!(view.tree.text, PLACEHOLDER_TITLE);
    }

    #[test]
    fn empty_outline_degrades_to_placeholder() {
        let view = MindmapView::from_value(&json!({"title": "", "children": []}));
        assert!(view.text.contains(PLACEHOLDER_TITLE));
    }
}
