//! dealdesk-categories: Category tree store, selection rules, and rendering.
//!
//! The product catalogue is a tree of categories fetched lazily from the
//! backend. [`TreeStore`] is the single source of truth for node state;
//! [`render`] is a pure projection of it, so the tree can be driven and
//! tested without any UI attached.

pub mod node;
pub mod render;
pub mod selection;
pub mod store;

pub use node::*;
pub use render::*;
pub use selection::*;
pub use store::*;
