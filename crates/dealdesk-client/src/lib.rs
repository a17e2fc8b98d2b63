//! dealdesk-client: REST access and the lazily loaded category tree.
//!
//! The dashboards show the shop's category hierarchy as a checkbox tree.
//! Admins pick one category to see its discounted products; community
//! members pick any number of categories and save them as their subscription.
//!
//! ```no_run
//! use dealdesk_categories::SelectionMode;
//! use dealdesk_client::{CategoryTree, ClientConfig, RestCategoryApi};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load(None)?;
//! let api = RestCategoryApi::from_config(&config)?;
//! let tree = CategoryTree::new(api, SelectionMode::Community).with_user("42");
//! tree.load_roots().await?;
//! tree.toggle_expand("1").await?;
//! println!("{}", tree.format_tree());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod loader;
pub mod notify;
pub mod session;
pub mod tree;

#[cfg(test)]
mod fake;

pub use api::{CategoryApi, Product, RestCategoryApi};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, Result, TreeError};
pub use loader::{RootBatch, TreeLoader};
pub use notify::{CollectingNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use session::Session;
pub use tree::{CategoryTree, ExpandOutcome, SelectOutcome};
