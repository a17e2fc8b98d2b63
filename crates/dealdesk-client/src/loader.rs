//! Fetching category batches for the tree.

use dealdesk_categories::{Category, CategoryId, SelectionMode};

use crate::api::CategoryApi;
use crate::error::ApiError;

/// What a root load produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootBatch {
    pub categories: Vec<Category>,
    /// The user's saved selection; always empty in admin mode.
    pub saved: Vec<CategoryId>,
}

/// Bridge between the tree and the category endpoints.
pub struct TreeLoader<A> {
    api: A,
}

impl<A: CategoryApi> TreeLoader<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch the first batch for a fresh tree.
    ///
    /// Community mode keeps only top-level categories and, when a user is
    /// known, fetches their saved ids. Admin mode returns the full flat list.
    pub async fn load_roots(
        &self,
        user_id: Option<&str>,
        mode: SelectionMode,
    ) -> Result<RootBatch, ApiError> {
        let categories = self.api.fetch_categories(None).await?;
        tracing::debug!("Fetched {} categories ({} mode)", categories.len(), mode);

        if mode.is_admin() {
            return Ok(RootBatch {
                categories,
                saved: Vec::new(),
            });
        }

        let categories: Vec<Category> = categories.into_iter().filter(|c| c.is_root()).collect();
        let saved = match user_id {
            Some(user_id) => self.api.fetch_saved_categories(user_id).await?,
            None => Vec::new(),
        };

        Ok(RootBatch { categories, saved })
    }

    /// Children of one node; an empty list is a valid answer.
    pub async fn load_children(&self, parent_id: &str) -> Result<Vec<Category>, ApiError> {
        let children = self.api.fetch_categories(Some(parent_id)).await?;
        tracing::debug!("Fetched {} children of {}", children.len(), parent_id);
        Ok(children)
    }
}
