use crate::annotations::{AnnotationIndex, AnnotationMap};
use crate::rendered::RenderedNode;
use crate::text::normalize_text;

/// Bridges the renderer's tree back to outline annotations.
///
/// Resolution is a best-effort heuristic, not an exact-match contract:
/// an identifier hit first, then an exact normalized-text lookup, then a
/// linear scan accepting the first key that equals, contains, or is
/// contained in the fallback text (case-insensitive). For short or
/// repeated labels the scan can be ambiguous; the first inserted match
/// wins and callers must not expect anything stronger.
#[derive(Debug, Clone, Default)]
pub struct QuestionResolver {
    by_id: AnnotationMap<String>,
    questions: AnnotationMap<String>,
}

impl QuestionResolver {
    /// Walk the rendered tree and, for every node with an identifier and
    /// resolvable text, record its question under the identifier.
    pub fn build(tree: &RenderedNode, index: &AnnotationIndex) -> Self {
        let mut by_id = AnnotationMap::new();
        tree.visit(&mut |node| {
            if let Some(id) = node.id.as_deref() {
                let text = normalize_text(&node.text);
                if !text.is_empty() {
                    if let Some(question) = index.questions.get(&text) {
                        by_id.insert(id, question.clone());
                    }
                }
            }
        });
        Self {
            by_id,
            questions: index.questions.clone(),
        }
    }

    /// Resolve the follow-up question for a clicked node. `None` means
    /// no match at any step; the caller renders a neutral state rather
    /// than substituting unrelated content.
    pub fn resolve(&self, identifier: &str, text_fallback: &str) -> Option<&str> {
        if let Some(question) = self.by_id.get(identifier) {
            return Some(question.as_str());
        }

        let wanted = normalize_text(text_fallback);
        if let Some(question) = self.questions.get(&wanted) {
            return Some(question.as_str());
        }

        let wanted = wanted.to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        for (key, question) in self.questions.iter() {
            let key = normalize_text(key).to_lowercase();
            if key == wanted || key.contains(&wanted) || wanted.contains(&key) {
                return Some(question.as_str());
            }
        }
        None
    }
}
