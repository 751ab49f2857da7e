use serde::{Deserialize, Serialize};

use crate::text::is_generic_root_title;

/// A single node of the backend-produced document outline. The shape is
/// deliberately loose: any field except `title` may be missing, and
/// `title` itself may be empty for pure leaf-list nodes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlineNode {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OutlineItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<OutlineNode>>,
}

/// Leaf entry under a node. Older payloads carried bare strings, newer
/// ones objects with an optional follow-up question; both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutlineItem {
    Text(String),
    Annotated {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        question: Option<String>,
    },
}

impl OutlineItem {
    pub fn text(&self) -> &str {
        match self {
            OutlineItem::Text(text) => text,
            OutlineItem::Annotated { text, .. } => text,
        }
    }

    pub fn question(&self) -> Option<&str> {
        match self {
            OutlineItem::Text(_) => None,
            OutlineItem::Annotated { question, .. } => question.as_deref(),
        }
    }
}

impl OutlineNode {
    /// Items, with an empty list behaving the same as an absent one.
    pub fn items(&self) -> &[OutlineItem] {
        self.items.as_deref().unwrap_or(&[])
    }

    /// Children, with an empty list behaving the same as an absent one.
    pub fn children(&self) -> &[OutlineNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// True when this node, sitting at the root, carries a generic
    /// placeholder title that must be elided. Its children are then
    /// promoted without shifting their rendering depth.
    pub fn is_elided_root(&self, is_root: bool) -> bool {
        is_root && is_generic_root_title(&self.title) && !self.children().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.items().is_empty() && self.children().is_empty()
    }
}

/// Upper bound on root-chain collapsing passes.
const MAX_ROOT_COLLAPSE: usize = 10;

/// Collapse a chain of single-child nodes at the root so the displayed
/// tree fans out instead of opening with a straight line. Only the root
/// is collapsed; deeper unary nodes are legitimate structure and are
/// left alone.
///
/// Merge rules when promoting the only child: keep the root title unless
/// it is empty or generic, prefer the longer description, take the
/// child's question only if the root has none, union keywords in
/// first-seen order, adopt the child's children.
pub fn collapse_root_chain(mut root: OutlineNode) -> OutlineNode {
    for _ in 0..MAX_ROOT_COLLAPSE {
        let child = match root.children.as_mut() {
            Some(children) if children.len() == 1 => children.remove(0),
            _ => break,
        };

        let child_description_wins = match (root.description.as_deref(), child.description.as_deref())
        {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(current), Some(candidate)) => candidate.len() > current.len(),
        };

        if root.title.trim().is_empty() || is_generic_root_title(&root.title) {
            root.title = child.title;
        }
        if child_description_wins {
            root.description = child.description;
        }
        if root.question.is_none() {
            root.question = child.question;
        }
        root.keywords = merge_keywords(root.keywords.take(), child.keywords);
        root.children = child.children;
    }
    root
}

fn merge_keywords(
    parent: Option<Vec<String>>,
    child: Option<Vec<String>>,
) -> Option<Vec<String>> {
    let mut merged: Vec<String> = Vec::new();
    for keyword in parent.into_iter().flatten().chain(child.into_iter().flatten()) {
        if !merged.contains(&keyword) {
            merged.push(keyword);
        }
    }
    if merged.is_empty() { None } else { Some(merged) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_both_item_forms() {
        let node: OutlineNode = serde_json::from_value(json!({
            "title": "Topics",
            "items": ["plain entry", {"text": "annotated entry", "question": "Why?"}]
        }))
        .unwrap();

        let items = node.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text(), "plain entry");
        assert_eq!(items[0].question(), None);
        assert_eq!(items[1].text(), "annotated entry");
        assert_eq!(items[1].question(), Some("Why?"));
    }

    #[test]
    fn empty_lists_behave_as_absent() {
        let node: OutlineNode = serde_json::from_value(json!({
            "title": "Mind Map",
            "items": [],
            "children": []
        }))
        .unwrap();

        assert!(node.items().is_empty());
        assert!(node.children().is_empty());
        // Generic title without children is NOT elided.
        assert!(!node.is_elided_root(true));
    }

    #[test]
    fn collapses_root_chain_and_merges_fields() {
        let root: OutlineNode = serde_json::from_value(json!({
            "title": "Mind Map",
            "keywords": ["alpha"],
            "children": [{
                "title": "Benefits Guide",
                "description": "Everything about the benefits program",
                "question": "What does the guide cover?",
                "keywords": ["alpha", "beta"],
                "children": [
                    {"title": "Plans"},
                    {"title": "Enrollment"}
                ]
            }]
        }))
        .unwrap();

        let collapsed = collapse_root_chain(root);
        assert_eq!(collapsed.title, "Benefits Guide");
        assert_eq!(
            collapsed.description.as_deref(),
            Some("Everything about the benefits program")
        );
        assert_eq!(collapsed.question.as_deref(), Some("What does the guide cover?"));
        assert_eq!(
            collapsed.keywords.as_deref(),
            Some(["alpha".to_string(), "beta".to_string()].as_slice())
        );
        assert_eq!(collapsed.children().len(), 2);
    }

    #[test]
    fn collapse_keeps_meaningful_root_title() {
        let root: OutlineNode = serde_json::from_value(json!({
            "title": "Annual Report",
            "children": [{
                "title": "Overview",
                "children": [{"title": "Q1"}, {"title": "Q2"}]
            }]
        }))
        .unwrap();

        let collapsed = collapse_root_chain(root);
        assert_eq!(collapsed.title, "Annual Report");
        assert_eq!(collapsed.children().len(), 2);
    }

    #[test]
    fn collapse_leaves_deeper_unary_nodes_alone() {
        let root: OutlineNode = serde_json::from_value(json!({
            "title": "Root",
            "children": [
                {"title": "A", "children": [{"title": "A1"}]},
                {"title": "B"}
            ]
        }))
        .unwrap();

        let collapsed = collapse_root_chain(root);
        assert_eq!(collapsed.children().len(), 2);
        assert_eq!(collapsed.children()[0].children().len(), 1);
    }
}
