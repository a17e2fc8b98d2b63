//! Category REST endpoints
//!
//! Shapes consumed:
//!
//! ```text
//! GET  {base}/categories                       -> { categories: [{ id, name, parent_id }] }
//! GET  {base}/categories?parent_id={id}        -> { categories: [...] }
//! GET  {base}/{user}/mycategories              -> { categories: [id, ...] }
//! PUT  {base}/{user}/mycategories              <- { categories: [id, ...] }
//! GET  {base}/discounted-products?category_id={id}&min_discount={n}
//!                                              -> { products: [...] }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dealdesk_categories::{deserialize_id, deserialize_id_option, Category, CategoryId};

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::http::HttpClient;
use crate::session::Session;

/// A discounted product offered in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "deserialize_id_option")]
    pub category: Option<String>,
    pub title: String,
    pub product_url: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub current_price: f64,
    #[serde(deserialize_with = "deserialize_amount")]
    pub original_price: f64,
    #[serde(default, deserialize_with = "deserialize_amount_option")]
    pub discount_percent: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(rename = "QTY", default, deserialize_with = "deserialize_amount_option")]
    pub qty: Option<f64>,
}

impl Product {
    /// Reported discount, or one derived from the two prices.
    pub fn discount(&self) -> Option<f64> {
        self.discount_percent.or_else(|| {
            (self.original_price > 0.0)
                .then(|| (1.0 - self.current_price / self.original_price) * 100.0)
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Amount::Number(n) => Ok(n),
            Amount::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("not a number: {:?}", s))),
        }
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Amount::deserialize(deserializer)?.into_f64()
}

fn deserialize_amount_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Amount>::deserialize(deserializer)?
        .map(Amount::into_f64)
        .transpose()
}

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct WireId(#[serde(deserialize_with = "deserialize_id")] CategoryId);

#[derive(Debug, Deserialize)]
struct SavedCategoriesResponse {
    #[serde(default)]
    categories: Vec<WireId>,
}

#[derive(Debug, Serialize)]
struct SaveCategoriesRequest<'a> {
    categories: &'a [CategoryId],
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<Product>,
}

/// Backend operations the category tree depends on.
#[async_trait]
pub trait CategoryApi: Send + Sync {
    /// All categories, or the children of `parent_id`.
    async fn fetch_categories(&self, parent_id: Option<&str>) -> Result<Vec<Category>, ApiError>;

    async fn fetch_saved_categories(&self, user_id: &str) -> Result<Vec<CategoryId>, ApiError>;

    /// Replace the user's saved set.
    async fn save_categories(&self, user_id: &str, ids: &[CategoryId]) -> Result<(), ApiError>;

    async fn fetch_discounted_products(
        &self,
        category_id: &str,
        min_discount: u32,
    ) -> Result<Vec<Product>, ApiError>;
}

/// [`CategoryApi`] over the dashboard REST backend.
pub struct RestCategoryApi {
    http: HttpClient,
}

impl RestCategoryApi {
    pub fn new(session: Session, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(session, timeout)?,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let session = Session::from_config(config)?;
        Self::new(session, Duration::from_secs(config.timeout_secs)).map_err(ConfigError::from)
    }

    pub fn session(&self) -> &Session {
        self.http.session()
    }
}

#[async_trait]
impl CategoryApi for RestCategoryApi {
    async fn fetch_categories(&self, parent_id: Option<&str>) -> Result<Vec<Category>, ApiError> {
        let query: Vec<(&str, &str)> = parent_id.map(|id| ("parent_id", id)).into_iter().collect();
        let url = self.session().endpoint(&["categories"], &query)?;
        let response: CategoriesResponse = self.http.get_json(url).await?;
        Ok(response.categories)
    }

    async fn fetch_saved_categories(&self, user_id: &str) -> Result<Vec<CategoryId>, ApiError> {
        let url = self.session().endpoint(&[user_id, "mycategories"], &[])?;
        let response: SavedCategoriesResponse = self.http.get_json(url).await?;
        Ok(response.categories.into_iter().map(|WireId(id)| id).collect())
    }

    async fn save_categories(&self, user_id: &str, ids: &[CategoryId]) -> Result<(), ApiError> {
        let url = self.session().endpoint(&[user_id, "mycategories"], &[])?;
        let _ack: serde_json::Value = self
            .http
            .put_json(url, &SaveCategoriesRequest { categories: ids })
            .await?;
        Ok(())
    }

    async fn fetch_discounted_products(
        &self,
        category_id: &str,
        min_discount: u32,
    ) -> Result<Vec<Product>, ApiError> {
        let min_discount = min_discount.to_string();
        let url = self.session().endpoint(
            &["discounted-products"],
            &[("category_id", category_id), ("min_discount", &min_discount)],
        )?;
        let response: ProductsResponse = self.http.get_json(url).await?;
        Ok(response.products)
    }
}
