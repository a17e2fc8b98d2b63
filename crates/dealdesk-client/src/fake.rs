//! In-memory `CategoryApi` for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use dealdesk_categories::{Category, CategoryId};

use crate::api::{CategoryApi, Product};
use crate::error::ApiError;

#[derive(Default)]
pub struct FakeApi {
    categories: Vec<Category>,
    saved: Mutex<HashMap<String, Vec<CategoryId>>>,
    products: HashMap<String, Vec<Product>>,
    failing: Mutex<HashMap<String, ApiError>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    /// Electronics(1) > Phones(10) > Android(100); Books(2) > Novels(20);
    /// Garden(3) with no children.
    pub fn catalogue() -> Self {
        Self::new(vec![
            Category::new("1", "Electronics", None),
            Category::new("2", "Books", None),
            Category::new("3", "Garden", None),
            Category::new("10", "Phones", Some("1")),
            Category::new("11", "Laptops", Some("1")),
            Category::new("100", "Android", Some("10")),
            Category::new("20", "Novels", Some("2")),
        ])
    }

    pub fn with_saved(self, user_id: &str, ids: &[&str]) -> Self {
        if let Ok(mut saved) = self.saved.lock() {
            saved.insert(user_id.to_string(), ids.iter().map(|s| s.to_string()).collect());
        }
        self
    }

    pub fn with_products(mut self, category_id: &str, titles: &[&str]) -> Self {
        let products = titles.iter().map(|t| product(category_id, t)).collect();
        self.products.insert(category_id.to_string(), products);
        self
    }

    /// Hold the next request for `key` until the returned handle is notified.
    pub fn gated(mut self, key: &str) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        if let Ok(gates) = self.gates.get_mut() {
            gates.insert(key.to_string(), gate.clone());
        }
        (self, gate)
    }

    /// Make requests for `key` fail until [`FakeApi::heal`] is called.
    ///
    /// Keys: `categories`, `children:{id}`, `saved:{user}`, `save:{user}`, `products:{id}`.
    pub fn fail(&self, key: &str, error: ApiError) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(key.to_string(), error);
        }
    }

    pub fn heal(&self, key: &str) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.remove(key);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn saved_for(&self, user_id: &str) -> Option<Vec<CategoryId>> {
        self.saved.lock().ok().and_then(|s| s.get(user_id).cloned())
    }

    async fn enter(&self, key: &str, call: String) -> Result<(), ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        let gate = self.gates.lock().ok().and_then(|mut g| g.remove(key));
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let failure = self.failing.lock().ok().and_then(|f| f.get(key).cloned());
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub fn product(category_id: &str, title: &str) -> Product {
    Product {
        category: Some(category_id.to_string()),
        title: title.to_string(),
        product_url: format!("https://shop.example.com/{}", title.to_lowercase()),
        current_price: 8.0,
        original_price: 10.0,
        discount_percent: Some(20.0),
        image_url: None,
        qty: Some(1.0),
    }
}

pub fn server_error() -> ApiError {
    ApiError::Http {
        status: 500,
        body: "boom".to_string(),
    }
}

#[async_trait]
impl CategoryApi for FakeApi {
    async fn fetch_categories(&self, parent_id: Option<&str>) -> Result<Vec<Category>, ApiError> {
        match parent_id {
            None => {
                self.enter("categories", "categories".to_string()).await?;
                Ok(self.categories.clone())
            }
            Some(parent) => {
                self.enter(
                    &format!("children:{}", parent),
                    format!("categories?parent_id={}", parent),
                )
                .await?;
                Ok(self
                    .categories
                    .iter()
                    .filter(|c| c.parent_id.as_deref() == Some(parent))
                    .cloned()
                    .collect())
            }
        }
    }

    async fn fetch_saved_categories(&self, user_id: &str) -> Result<Vec<CategoryId>, ApiError> {
        self.enter(&format!("saved:{}", user_id), format!("{}/mycategories", user_id))
            .await?;
        Ok(self.saved_for(user_id).unwrap_or_default())
    }

    async fn save_categories(&self, user_id: &str, ids: &[CategoryId]) -> Result<(), ApiError> {
        self.enter(&format!("save:{}", user_id), format!("PUT {}/mycategories", user_id))
            .await?;
        if let Ok(mut saved) = self.saved.lock() {
            saved.insert(user_id.to_string(), ids.to_vec());
        }
        Ok(())
    }

    async fn fetch_discounted_products(
        &self,
        category_id: &str,
        min_discount: u32,
    ) -> Result<Vec<Product>, ApiError> {
        self.enter(
            &format!("products:{}", category_id),
            format!(
                "discounted-products?category_id={}&min_discount={}",
                category_id, min_discount
            ),
        )
        .await?;
        Ok(self.products.get(category_id).cloned().unwrap_or_default())
    }
}

