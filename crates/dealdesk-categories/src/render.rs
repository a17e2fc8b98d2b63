//! Pure projection of a [`TreeStore`] into a displayable tree.

use serde::{Deserialize, Serialize};

use crate::node::{CategoryId, CategoryNode};
use crate::store::TreeStore;

/// Expand/collapse glyph state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpandIndicator {
    /// Children not fetched yet, or fetched and folded away.
    Collapsed,
    Expanded,
    /// Fetched, and there are none. Terminal.
    Leaf,
}

impl ExpandIndicator {
    pub fn of(node: &CategoryNode) -> Self {
        if node.is_leaf() {
            ExpandIndicator::Leaf
        } else if node.expanded {
            ExpandIndicator::Expanded
        } else {
            ExpandIndicator::Collapsed
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ExpandIndicator::Collapsed => "+",
            ExpandIndicator::Expanded => "-",
            ExpandIndicator::Leaf => "·",
        }
    }
}

/// One rendered row plus its visible children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedNode {
    pub id: CategoryId,
    pub label: String,
    pub indicator: ExpandIndicator,
    pub checked: bool,
    pub depth: usize,
    /// Present only for expanded nodes.
    pub children: Vec<RenderedNode>,
}

/// Render the top-level list and every expanded subtree.
pub fn render(store: &TreeStore) -> Vec<RenderedNode> {
    store
        .roots()
        .into_iter()
        .map(|node| render_node(store, node, 0))
        .collect()
}

fn render_node(store: &TreeStore, node: &CategoryNode, depth: usize) -> RenderedNode {
    let indicator = ExpandIndicator::of(node);
    let children = if indicator == ExpandIndicator::Expanded {
        store
            .children_of(&node.id)
            .into_iter()
            .map(|child| render_node(store, child, depth + 1))
            .collect()
    } else {
        Vec::new()
    };

    RenderedNode {
        id: node.id.clone(),
        label: node.label(),
        indicator,
        checked: node.selected,
        depth,
        children,
    }
}

/// Format as a tree string for display.
pub fn format_tree(store: &TreeStore) -> String {
    let mut output = String::new();
    for root in render(store) {
        format_subtree(&root, "", None, &mut output);
    }
    output
}

fn format_subtree(node: &RenderedNode, prefix: &str, is_last: Option<bool>, output: &mut String) {
    let connector = match is_last {
        None => "",
        Some(true) => "└── ",
        Some(false) => "├── ",
    };
    let checkbox = if node.checked { "[x]" } else { "[ ]" };

    output.push_str(&format!(
        "{}{}{} {} {}\n",
        prefix,
        connector,
        node.indicator.glyph(),
        checkbox,
        node.label
    ));

    let child_prefix = match is_last {
        None => String::new(),
        Some(true) => format!("{}    ", prefix),
        Some(false) => format!("{}│   ", prefix),
    };

    for (i, child) in node.children.iter().enumerate() {
        format_subtree(child, &child_prefix, Some(i == node.children.len() - 1), output);
    }
}
