//! Core category types.

use serde::{Deserialize, Serialize};

/// A category identifier as the backend reports it.
pub type CategoryId = String;

/// Category record as delivered by the `categories` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(deserialize_with = "deserialize_id_option", default)]
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub fn new(id: &str, name: &str, parent_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
        }
    }

    /// Whether this is a top-level category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A node of the in-memory category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    /// Set once the first child fetch for this node succeeded, even if empty.
    pub children_loaded: bool,
    pub expanded: bool,
    pub selected: bool,
    pub children: Vec<CategoryId>,
}

impl CategoryNode {
    pub fn from_category(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            parent_id: category.parent_id,
            children_loaded: false,
            expanded: false,
            selected: false,
            children: Vec::new(),
        }
    }

    /// Display label, e.g. `Books (2)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }

    /// Loaded, and the backend reported no children.
    pub fn is_leaf(&self) -> bool {
        self.children_loaded && self.children.is_empty()
    }
}

/// Accepts an id sent either as a JSON string or as an integer.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<CategoryId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_any(IdVisitor)
}

/// Like [`deserialize_id`], also accepting `null`.
pub fn deserialize_id_option<'de, D>(deserializer: D) -> Result<Option<CategoryId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct OptionalIdVisitor;

    impl<'de> Visitor<'de> for OptionalIdVisitor {
        type Value = Option<CategoryId>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, integer, or null")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(IdVisitor).map(Some)
        }
    }

    deserializer.deserialize_option(OptionalIdVisitor)
}

struct IdVisitor;

impl<'de> serde::de::Visitor<'de> for IdVisitor {
    type Value = CategoryId;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a string or integer id")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(v.to_string())
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(v)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(v.to_string())
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(v.to_string())
    }
}
