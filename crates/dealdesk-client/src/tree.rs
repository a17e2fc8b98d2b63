//! The lazily loaded category tree component.
//!
//! [`CategoryTree`] ties a [`TreeStore`] to the backend: it loads the first
//! batch, fetches a node's children the first time it is expanded, and runs
//! the selection side effects of the tree's mode.
//!
//! Operations take `&self` and may overlap while they wait on the network.
//! State sits behind one mutex that is never held across an `.await`. Two
//! counters keep late responses from landing on newer state: `epoch` changes
//! on every root load, `ticket` on every admin selection change.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use dealdesk_categories::{
    format_tree, render, CategoryId, CategoryNode, RenderedNode, SelectionChange,
    SelectionController, SelectionMode, TreeStore,
};

use crate::api::{CategoryApi, Product};
use crate::error::{ApiError, Result, TreeError};
use crate::loader::TreeLoader;
use crate::notify::{Notification, Notifier, TracingNotifier};

/// Result of an expand/collapse toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    Expanded,
    Collapsed,
    /// The node has no children; nothing was fetched or the fetch came back empty.
    NoChildren,
    /// A child fetch for this node is already pending.
    AlreadyLoading,
    /// The tree was reloaded while the fetch was pending; the batch was dropped.
    Stale,
    NotFound,
}

/// Result of a checkbox toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    Deselected,
    /// A newer selection replaced this one before its products arrived.
    Superseded,
    NotFound,
}

struct TreeState {
    store: TreeStore,
    selection: SelectionController,
    in_flight: HashSet<CategoryId>,
    products: Option<Vec<Product>>,
    epoch: u64,
    ticket: u64,
}

impl TreeState {
    fn new(mode: SelectionMode) -> Self {
        Self {
            store: TreeStore::new(),
            selection: SelectionController::new(mode),
            in_flight: HashSet::new(),
            products: None,
            epoch: 0,
            ticket: 0,
        }
    }

    fn reset(&mut self) {
        self.store.clear();
        self.selection.reset();
        self.in_flight.clear();
        self.products = None;
        self.epoch += 1;
        self.ticket += 1;
    }
}

/// Category tree bound to a backend and a notification sink.
pub struct CategoryTree<A, N = TracingNotifier> {
    loader: TreeLoader<A>,
    notifier: N,
    user_id: Option<String>,
    min_discount: u32,
    state: Mutex<TreeState>,
}

impl<A: CategoryApi> CategoryTree<A, TracingNotifier> {
    pub fn new(api: A, mode: SelectionMode) -> Self {
        Self {
            loader: TreeLoader::new(api),
            notifier: TracingNotifier,
            user_id: None,
            min_discount: 20,
            state: Mutex::new(TreeState::new(mode)),
        }
    }
}

impl<A: CategoryApi, N: Notifier> CategoryTree<A, N> {
    pub fn with_notifier<M: Notifier>(self, notifier: M) -> CategoryTree<A, M> {
        CategoryTree {
            loader: self.loader,
            notifier,
            user_id: self.user_id,
            min_discount: self.min_discount,
            state: self.state,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_min_discount(mut self, min_discount: u32) -> Self {
        self.min_discount = min_discount;
        self
    }

    pub fn api(&self) -> &A {
        self.loader.api()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn mode(&self) -> SelectionMode {
        self.state().selection.mode()
    }

    /// Replace the tree with a fresh root batch.
    ///
    /// On failure the tree is left empty. Returns the number of top-level
    /// nodes, or 0 when a newer load started while this one was pending; that
    /// batch (or its error) is dropped.
    pub async fn load_roots(&self) -> Result<usize> {
        let (mode, epoch) = {
            let mut state = self.state();
            state.reset();
            (state.selection.mode(), state.epoch)
        };

        let result = self.loader.load_roots(self.user_id.as_deref(), mode).await;

        let mut state = self.state();
        if state.epoch != epoch {
            tracing::debug!("Dropping root batch replaced by a newer load");
            return Ok(0);
        }
        let batch = match result {
            Ok(batch) => batch,
            Err(error) => {
                drop(state);
                self.report("Failed to load categories", &error);
                return Err(error.into());
            }
        };

        let state = &mut *state;
        state.store.clear();
        let linked = state.store.upsert_nodes(batch.categories, None);
        state.selection.seed(&mut state.store, batch.saved);

        tracing::info!(
            "Loaded {} categories ({} mode, {} saved pending)",
            linked.len(),
            mode,
            state.selection.pending().count()
        );
        Ok(linked.len())
    }

    /// Expand or collapse a node, fetching its children on first expand.
    ///
    /// Collapsing never fetches. A failed fetch leaves the node unloaded so
    /// the next toggle tries again.
    pub async fn toggle_expand(&self, id: &str) -> Result<ExpandOutcome> {
        let epoch = {
            let mut state = self.state();
            let (leaf, expanded, loaded) = match state.store.get(id) {
                Some(node) => (node.is_leaf(), node.expanded, node.children_loaded),
                None => return Ok(ExpandOutcome::NotFound),
            };

            if leaf {
                return Ok(ExpandOutcome::NoChildren);
            }
            if expanded {
                state.store.set_expanded(id, false);
                return Ok(ExpandOutcome::Collapsed);
            }
            if loaded {
                state.store.set_expanded(id, true);
                return Ok(ExpandOutcome::Expanded);
            }
            if !state.in_flight.insert(id.to_string()) {
                tracing::debug!("Children of {} already loading", id);
                return Ok(ExpandOutcome::AlreadyLoading);
            }
            state.epoch
        };

        let result = self.loader.load_children(id).await;

        let mut state = self.state();
        if state.epoch != epoch {
            return Ok(ExpandOutcome::Stale);
        }
        state.in_flight.remove(id);

        match result {
            Ok(children) => {
                let state = &mut *state;
                let linked = state.store.upsert_nodes(children, Some(id));
                state.store.mark_children_loaded(id);
                let reconciled = state.selection.reconcile(&mut state.store, &linked);
                if !reconciled.is_empty() {
                    tracing::debug!("Restored saved selection for {:?}", reconciled);
                }

                if state.store.get(id).map_or(true, CategoryNode::is_leaf) {
                    Ok(ExpandOutcome::NoChildren)
                } else {
                    state.store.set_expanded(id, true);
                    Ok(ExpandOutcome::Expanded)
                }
            }
            Err(error) => {
                drop(state);
                self.report(&format!("Failed to load subcategories of {}", id), &error);
                Err(error.into())
            }
        }
    }

    /// Toggle a node's checkbox and run the mode's side effect.
    ///
    /// In admin mode a selection queries discounted products for the node; a
    /// failed query reverts the selection and clears any shown products.
    pub async fn toggle_selected(&self, id: &str) -> Result<SelectOutcome> {
        let ticket = {
            let mut state = self.state();
            let state = &mut *state;
            let change = match state.selection.toggle(&mut state.store, id) {
                Some(change) => change,
                None => return Ok(SelectOutcome::NotFound),
            };

            if !state.selection.mode().is_admin() {
                return Ok(match change {
                    SelectionChange::Selected { .. } => SelectOutcome::Selected,
                    SelectionChange::Deselected => SelectOutcome::Deselected,
                });
            }

            state.ticket += 1;
            match change {
                SelectionChange::Deselected => {
                    state.products = None;
                    return Ok(SelectOutcome::Deselected);
                }
                SelectionChange::Selected { cleared } => {
                    if !cleared.is_empty() {
                        tracing::debug!("Selecting {} cleared {:?}", id, cleared);
                    }
                    state.ticket
                }
            }
        };

        let result = self
            .api()
            .fetch_discounted_products(id, self.min_discount)
            .await;

        let mut state = self.state();
        if state.ticket != ticket {
            return Ok(SelectOutcome::Superseded);
        }

        match result {
            Ok(products) => {
                tracing::debug!("{} discounted products in {}", products.len(), id);
                state.products = Some(products);
                Ok(SelectOutcome::Selected)
            }
            Err(error) => {
                state.store.set_selected(id, false);
                state.products = None;
                drop(state);
                self.report(&format!("Failed to load discounted products for {}", id), &error);
                Err(error.into())
            }
        }
    }

    /// Persist the community selection as a full replacement set.
    ///
    /// Saved ids under subtrees that were never expanded are kept. Returns
    /// the number of ids written.
    pub async fn save_categories(&self) -> Result<usize> {
        let mode = self.mode();
        if mode.is_admin() {
            return Err(TreeError::WrongMode {
                operation: "save_categories",
                mode,
            });
        }

        let user_id = match self.user_id.as_deref() {
            Some(user_id) => user_id,
            None => {
                self.notifier
                    .notify(Notification::error("Log in to save your categories"));
                return Err(TreeError::MissingUser);
            }
        };

        let ids = {
            let state = self.state();
            state.selection.ids_to_save(&state.store)
        };

        match self.api().save_categories(user_id, &ids).await {
            Ok(()) => {
                tracing::info!("Saved {} categories for user {}", ids.len(), user_id);
                self.notifier
                    .notify(Notification::success("Categories saved"));
                Ok(ids.len())
            }
            Err(error) => {
                self.report("Failed to save categories", &error);
                Err(error.into())
            }
        }
    }

    /// Current tree as a serializable structure.
    pub fn render(&self) -> Vec<RenderedNode> {
        render(&self.state().store)
    }

    /// Current tree as text.
    pub fn format_tree(&self) -> String {
        format_tree(&self.state().store)
    }

    pub fn node(&self, id: &str) -> Option<CategoryNode> {
        self.state().store.get(id).cloned()
    }

    /// Selected ids in display order.
    pub fn selected_ids(&self) -> Vec<CategoryId> {
        self.state().store.selected_ids()
    }

    /// Saved ids whose nodes have not been fetched yet.
    pub fn pending_saved(&self) -> Vec<CategoryId> {
        self.state().selection.pending().cloned().collect()
    }

    /// Products for the current admin selection, if any are shown.
    pub fn discounted_products(&self) -> Option<Vec<Product>> {
        self.state().products.clone()
    }

    /// Read-only access to the underlying store.
    pub fn inspect<R>(&self, f: impl FnOnce(&TreeStore) -> R) -> R {
        f(&self.state().store)
    }

    fn state(&self) -> MutexGuard<'_, TreeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, context: &str, error: &ApiError) {
        tracing::warn!("{}: {}", context, error);
        match error {
            ApiError::Unauthorized => self.notifier.session_expired(),
            _ => self
                .notifier
                .notify(Notification::error(format!("{}: {}", context, error))),
        }
    }
}
