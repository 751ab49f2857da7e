use crate::model::OutlineNode;

/// Heading substituted when an outline yields no renderable content.
pub const PLACEHOLDER_TITLE: &str = "Unable to Generate Mind Map";

pub fn placeholder_text() -> String {
    format!("# {PLACEHOLDER_TITLE}\n\n")
}

/// Flatten an outline into the heading/bullet markup the renderer
/// consumes: headings nested strictly by `#` count, flat `-` bullets
/// under their nearest heading.
///
/// The function is pure and total: absent fields contribute nothing,
/// output order follows input order, and the same tree always yields the
/// same text. A generic placeholder root is elided with its children
/// promoted to the same heading level. Item questions are
/// display-suppressed here; they surface only through the annotation
/// index.
pub fn flatten(node: &OutlineNode) -> String {
    let mut out = String::new();
    write_node(node, 1, true, &mut out);
    out
}

/// [`flatten`], substituting the placeholder heading when the outline
/// produces no visible content.
pub fn flatten_or_placeholder(node: &OutlineNode) -> String {
    let text = flatten(node);
    if text.trim().is_empty() {
        placeholder_text()
    } else {
        text
    }
}

fn write_node(node: &OutlineNode, level: usize, is_root: bool, out: &mut String) {
    if node.is_elided_root(is_root) {
        // The promoted children are effective roots for rendering depth,
        // but the generic-title check applies to the real root only.
        for child in node.children() {
            write_node(child, level, false, out);
        }
        return;
    }

    let title = node.title.trim();
    if !title.is_empty() {
        out.push_str(&"#".repeat(level));
        out.push(' ');
        out.push_str(title);
        out.push_str("\n\n");
    }

    let mut wrote_items = false;
    for item in node.items() {
        let text = item.text().trim();
        if text.is_empty() {
            continue;
        }
        out.push_str("- ");
        out.push_str(text);
        out.push('\n');
        wrote_items = true;
    }
    if wrote_items {
        out.push('\n');
    }

    for child in node.children() {
        write_node(child, level + 1, false, out);
    }
}
