//! In-memory category tree with fast lookups.

use std::collections::HashMap;

use crate::node::{Category, CategoryId, CategoryNode};

/// Owner of every known category node.
///
/// Nodes enter the store in fetch batches and leave only through [`TreeStore::clear`].
/// Each node is linked into exactly one list: the top-level list or its
/// parent's `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStore {
    nodes: HashMap<CategoryId, CategoryNode>,
    roots: Vec<CategoryId>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fetched batch under `parent` (or at top level), keeping backend order.
    ///
    /// A record whose id is already known refreshes that node's name and is
    /// not linked a second time, with one exception: a top-level node that
    /// the batch places under `parent`, and whose `parent_id` says so, moves
    /// into `parent`'s children. Returns the ids newly linked under `parent`
    /// (or at top level), moved nodes included.
    pub fn upsert_nodes(&mut self, records: Vec<Category>, parent: Option<&str>) -> Vec<CategoryId> {
        let mut linked = Vec::new();

        for record in records {
            if let Some(existing) = self.nodes.get_mut(&record.id) {
                existing.name = record.name;
                let id = record.id;
                if let Some(parent) = parent {
                    if self.adopt_root(&id, parent) {
                        linked.push(id);
                    }
                }
                continue;
            }

            let id = record.id.clone();
            self.nodes.insert(id.clone(), CategoryNode::from_category(record));

            match parent.and_then(|p| self.nodes.get_mut(p)) {
                Some(parent_node) => parent_node.children.push(id.clone()),
                None => self.roots.push(id.clone()),
            }
            linked.push(id);
        }

        linked
    }

    /// Move top-level `id` under `parent` when its `parent_id` names `parent`.
    fn adopt_root(&mut self, id: &str, parent: &str) -> bool {
        let claims_parent = self
            .nodes
            .get(id)
            .is_some_and(|node| node.parent_id.as_deref() == Some(parent));
        if !claims_parent || !self.nodes.contains_key(parent) || self.in_subtree(id, parent) {
            return false;
        }
        let Some(pos) = self.roots.iter().position(|r| r == id) else {
            return false;
        };

        self.roots.remove(pos);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id.to_string());
        }
        true
    }

    /// Whether `target` is `root` or one of its linked descendants.
    fn in_subtree(&self, root: &str, target: &str) -> bool {
        if root == target {
            return true;
        }
        self.nodes
            .get(root)
            .is_some_and(|node| node.children.iter().any(|c| self.in_subtree(c, target)))
    }

    pub fn get(&self, id: &str) -> Option<&CategoryNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Mark a node's subtree as fetched. Idempotent; `false` if the id is unknown.
    pub fn mark_children_loaded(&mut self, id: &str) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.children_loaded = true;
                true
            }
            None => false,
        }
    }

    /// Returns `false` if the id is unknown.
    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.expanded = expanded;
                true
            }
            None => false,
        }
    }

    /// Returns `false` if the id is unknown.
    pub fn set_selected(&mut self, id: &str, selected: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Select `id` and unselect every other node in the store.
    ///
    /// Returns the ids that were unselected, or `None` if `id` is unknown.
    pub fn select_exclusive(&mut self, id: &str) -> Option<Vec<CategoryId>> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        let mut cleared = Vec::new();
        for node in self.nodes.values_mut() {
            if node.id == id {
                node.selected = true;
            } else if node.selected {
                node.selected = false;
                cleared.push(node.id.clone());
            }
        }
        cleared.sort();
        Some(cleared)
    }

    /// Selected ids across the whole store, collapsed subtrees included,
    /// in depth-first display order.
    pub fn selected_ids(&self) -> Vec<CategoryId> {
        self.walk()
            .into_iter()
            .filter(|(node, _)| node.selected)
            .map(|(node, _)| node.id.clone())
            .collect()
    }

    /// Top-level nodes in backend order.
    pub fn roots(&self) -> Vec<&CategoryNode> {
        self.roots.iter().filter_map(|id| self.nodes.get(id)).collect()
    }

    /// Direct children of a node in backend order.
    pub fn children_of(&self, id: &str) -> Vec<&CategoryNode> {
        self.nodes
            .get(id)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|c| self.nodes.get(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every linked node with its depth, depth-first from the top-level list.
    pub fn walk(&self) -> Vec<(&CategoryNode, usize)> {
        let mut result = Vec::with_capacity(self.nodes.len());
        for id in &self.roots {
            self.collect_subtree(id, 0, &mut result);
        }
        result
    }

    fn collect_subtree<'a>(&'a self, id: &str, depth: usize, result: &mut Vec<(&'a CategoryNode, usize)>) {
        if let Some(node) = self.nodes.get(id) {
            result.push((node, depth));
            for child in &node.children {
                self.collect_subtree(child, depth + 1, result);
            }
        }
    }

    /// Drop every node, for a full reload.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
