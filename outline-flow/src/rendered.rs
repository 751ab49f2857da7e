use serde::Serialize;

/// Node of the renderer-side tree, re-parsed from flattened markup.
///
/// This tree's shape can differ from the source outline (root elision,
/// synthetic root for multiple top-level headings), so it carries only
/// the rendered text plus the identifier assigned by [`assign_ids`]. The
/// two trees are connected solely through normalized-text
/// cross-referencing; positional equivalence must not be assumed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderedNode {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedNode>,
}

impl RenderedNode {
    fn leaf(text: &str) -> Self {
        Self {
            text: text.to_string(),
            id: None,
            children: Vec::new(),
        }
    }

    /// Depth-first visit, parents before children.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a RenderedNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

/// Re-parse flattened heading/bullet markup into a rendered tree.
/// Bullets attach to the nearest heading; multiple top-level headings
/// hang off a synthetic blank root. Lines that are neither headings nor
/// bullets are renderer noise and are ignored.
pub fn parse(text: &str) -> RenderedNode {
    let mut stack: Vec<(usize, RenderedNode)> = vec![(0, RenderedNode::default())];

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((level, title)) = heading(line) {
            while stack.len() > 1 && stack.last().is_some_and(|(depth, _)| *depth >= level) {
                pop_into_parent(&mut stack);
            }
            stack.push((level, RenderedNode::leaf(title)));
        } else if let Some(text) = bullet(line) {
            if let Some((_, parent)) = stack.last_mut() {
                parent.children.push(RenderedNode::leaf(text));
            }
        }
    }

    while stack.len() > 1 {
        pop_into_parent(&mut stack);
    }
    let root = stack.pop().map(|(_, node)| node).unwrap_or_default();

    if root.text.is_empty() && root.children.len() == 1 {
        root.children.into_iter().next().unwrap_or_default()
    } else {
        root
    }
}

/// Attach a stable dot-joined child-index path to every node, top-down.
/// Identity depends only on tree shape, so duplicate-labeled siblings
/// stay distinguishable, and re-traversing the same tree reproduces the
/// same identifiers.
pub fn assign_ids(node: &mut RenderedNode, path: &str) {
    node.id = Some(path.to_string());
    for (index, child) in node.children.iter_mut().enumerate() {
        let child_path = format!("{path}.{index}");
        assign_ids(child, &child_path);
    }
}

fn pop_into_parent(stack: &mut Vec<(usize, RenderedNode)>) {
    if let Some((_, node)) = stack.pop() {
        if let Some((_, parent)) = stack.last_mut() {
            parent.children.push(node);
        }
    }
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || !line[level..].starts_with(' ') {
        return None;
    }
    let title = line[level..].trim();
    if title.is_empty() { None } else { Some((level, title)) }
}

fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
