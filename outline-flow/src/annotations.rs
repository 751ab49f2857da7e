use std::collections::HashMap;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::model::OutlineNode;
use crate::text::normalize_text;

/// Insertion-ordered map with last-write-wins values.
///
/// The resolver's linear-scan fallback needs a deterministic scan order,
/// so keys keep the position of their first insertion even when a later
/// duplicate overwrites the value.
#[derive(Debug, Clone)]
pub struct AnnotationMap<V> {
    keys: Vec<String>,
    values: HashMap<String, V>,
}

impl<V> AnnotationMap<V> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if !self.values.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.values.get(key)
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.keys.iter().map(|key| (key.as_str(), &self.values[key]))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<V> Default for AnnotationMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Serialize> Serialize for AnnotationMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.keys.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Per-outline lookup tables keyed by normalized node text, built once
/// per loaded outline and rebuilt wholesale when the outline changes.
/// Duplicate titles are last-write-wins; duplicate-title nodes are
/// expected to share semantics in practice.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnotationIndex {
    pub questions: AnnotationMap<String>,
    pub descriptions: AnnotationMap<String>,
    pub keywords: AnnotationMap<Vec<String>>,
}

impl AnnotationIndex {
    pub fn build(root: &OutlineNode) -> Self {
        let mut index = Self::default();
        collect_questions(root, true, &mut index.questions);
        collect_descriptions(root, true, &mut index.descriptions);
        collect_keywords(root, true, &mut index.keywords);
        index
    }
}

fn title_key(node: &OutlineNode) -> Option<String> {
    let key = normalize_text(&node.title);
    if key.is_empty() { None } else { Some(key) }
}

/// `title -> question`, plus `item text -> item question` for items that
/// carry one. Elided generic roots contribute no entry of their own.
fn collect_questions(node: &OutlineNode, is_root: bool, map: &mut AnnotationMap<String>) {
    if !node.is_elided_root(is_root) {
        if let (Some(key), Some(question)) = (title_key(node), node.question.as_deref()) {
            map.insert(key, question.to_string());
        }
        for item in node.items() {
            if let Some(question) = item.question() {
                let key = normalize_text(item.text());
                if !key.is_empty() {
                    map.insert(key, question.to_string());
                }
            }
        }
    }
    for child in node.children() {
        collect_questions(child, false, map);
    }
}

fn collect_descriptions(node: &OutlineNode, is_root: bool, map: &mut AnnotationMap<String>) {
    if !node.is_elided_root(is_root) {
        if let (Some(key), Some(description)) = (title_key(node), node.description.as_deref()) {
            map.insert(key, description.to_string());
        }
    }
    for child in node.children() {
        collect_descriptions(child, false, map);
    }
}

/// `title -> keywords`, non-empty lists only.
fn collect_keywords(node: &OutlineNode, is_root: bool, map: &mut AnnotationMap<Vec<String>>) {
    if !node.is_elided_root(is_root) {
        if let (Some(key), Some(keywords)) = (title_key(node), node.keywords.as_deref()) {
            if !keywords.is_empty() {
                map.insert(key, keywords.to_vec());
            }
        }
    }
    for child in node.children() {
        collect_keywords(child, false, map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outline(value: serde_json::Value) -> OutlineNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn indexes_titles_and_item_questions() {
        let root = outline(json!({
            "title": "Mind Map",
            "question": "ignored, root is elided",
            "children": [{
                "title": "Plans",
                "question": "What plans exist?",
                "description": "The available plans",
                "keywords": ["hmo", "ppo"],
                "items": [
                    {"text": "HSA", "question": "How does the HSA work?"},
                    "FSA"
                ]
            }]
        }));

        let index = AnnotationIndex::build(&root);
        assert_eq!(index.questions.get("Plans").map(String::as_str), Some("What plans exist?"));
        assert_eq!(
            index.questions.get("HSA").map(String::as_str),
            Some("How does the HSA work?")
        );
        // String-form items contribute no question entry.
        assert!(index.questions.get("FSA").is_none());
        assert!(index.questions.get("Mind Map").is_none());
        assert_eq!(
            index.descriptions.get("Plans").map(String::as_str),
            Some("The available plans")
        );
        assert_eq!(
            index.keywords.get("Plans").map(Vec::as_slice),
            Some(["hmo".to_string(), "ppo".to_string()].as_slice())
        );
    }

    #[test]
    fn duplicate_titles_are_last_write_wins() {
        let root = outline(json!({
            "title": "Doc",
            "children": [
                {"title": "Overview", "description": "first description"},
                {"title": "Overview", "description": "second description"}
            ]
        }));

        let index = AnnotationIndex::build(&root);
        assert_eq!(index.descriptions.len(), 1);
        assert_eq!(
            index.descriptions.get("Overview").map(String::as_str),
            Some("second description")
        );
    }

    #[test]
    fn keys_are_normalized_and_keep_first_insertion_order() {
        let mut map = AnnotationMap::new();
        map.insert("b", 1);
        map.insert("a", 2);
        map.insert("b", 3);

        let entries: Vec<_> = map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        assert_eq!(entries, vec![("b".to_string(), 3), ("a".to_string(), 2)]);

        let root = outline(json!({
            "title": "Doc",
            "children": [{"title": "  Q&amp;A  ", "description": "questions"}]
        }));
        let index = AnnotationIndex::build(&root);
        assert_eq!(index.descriptions.get("Q&A").map(String::as_str), Some("questions"));
    }

    #[test]
    fn empty_keyword_lists_are_skipped() {
        let root = outline(json!({
            "title": "Doc",
            "children": [{"title": "Bare", "keywords": []}]
        }));
        assert!(AnnotationIndex::build(&root).keywords.is_empty());
    }

    #[test]
    fn serializes_in_insertion_order() {
        let mut map = AnnotationMap::new();
        map.insert("zeta", "1");
        map.insert("alpha", "2");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"zeta":"1","alpha":"2"}"#);
    }
}
