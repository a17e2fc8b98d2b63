//! Selection rules for the two tree modes.
//!
//! ```text
//! Unselected ──toggle──▶ Selected ──toggle──▶ Unselected
//! ```
//!
//! Admin mode is exclusive: selecting one node unselects every other node in
//! the store. Community mode is free multi-select, seeded from the user's
//! saved set. Saved ids whose nodes have not been fetched yet are parked as
//! *pending* until a child batch brings them in, so that a save issued before
//! every subtree was explored still includes them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::CategoryId;
use crate::store::TreeStore;

/// How the tree is being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Single-select; a selection drives the discounted-product lookup.
    Admin,
    /// Multi-select; the selection is the user's persisted subscription set.
    Community,
}

impl SelectionMode {
    pub fn is_admin(&self) -> bool {
        matches!(self, SelectionMode::Admin)
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Admin => write!(f, "admin"),
            SelectionMode::Community => write!(f, "community"),
        }
    }
}

/// Result of toggling a node's checkbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// The node became selected; `cleared` lists nodes that lost their selection.
    Selected { cleared: Vec<CategoryId> },
    Deselected,
}

/// Mode-specific selection state layered over a [`TreeStore`].
#[derive(Debug, Clone)]
pub struct SelectionController {
    mode: SelectionMode,
    pending_saved: BTreeSet<CategoryId>,
}

impl SelectionController {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            pending_saved: BTreeSet::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Apply a saved id set after a root load. Ignored in admin mode.
    pub fn seed<I>(&mut self, store: &mut TreeStore, saved: I)
    where
        I: IntoIterator<Item = CategoryId>,
    {
        self.pending_saved.clear();
        if self.mode.is_admin() {
            return;
        }

        for id in saved {
            if !store.set_selected(&id, true) {
                self.pending_saved.insert(id);
            }
        }
    }

    /// Select newly fetched nodes that were waiting in the pending set.
    ///
    /// Returns the ids that moved from pending to live selection.
    pub fn reconcile(&mut self, store: &mut TreeStore, linked: &[CategoryId]) -> Vec<CategoryId> {
        let mut reconciled = Vec::new();
        for id in linked {
            if self.pending_saved.remove(id) && store.set_selected(id, true) {
                reconciled.push(id.clone());
            }
        }
        reconciled
    }

    /// Flip a node's selection. `None` if the node is unknown.
    pub fn toggle(&mut self, store: &mut TreeStore, id: &str) -> Option<SelectionChange> {
        let currently = store.get(id)?.selected;

        if currently {
            store.set_selected(id, false);
            return Some(SelectionChange::Deselected);
        }

        match self.mode {
            SelectionMode::Admin => store
                .select_exclusive(id)
                .map(|cleared| SelectionChange::Selected { cleared }),
            SelectionMode::Community => {
                store.set_selected(id, true);
                Some(SelectionChange::Selected { cleared: Vec::new() })
            }
        }
    }

    /// The replacement set to persist: live selection plus pending saved ids.
    pub fn ids_to_save(&self, store: &TreeStore) -> Vec<CategoryId> {
        let mut ids = store.selected_ids();
        ids.extend(self.pending_saved.iter().filter(|id| !store.contains(id)).cloned());
        ids
    }

    pub fn pending(&self) -> impl Iterator<Item = &CategoryId> {
        self.pending_saved.iter()
    }

    /// Forget pending ids, for a full reload.
    pub fn reset(&mut self) {
        self.pending_saved.clear();
    }
}
