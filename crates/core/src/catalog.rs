//! Catalog domain types and the storefront filter.
//!
//! The storefront loads the whole catalog for every view and narrows it in
//! memory with [`CatalogQuery`]. There is no pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    pub image_url: String,
    /// Units on hand. The database rejects negative values.
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether at least one unit can be put in a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Fields an admin submits to create or update a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_id: Option<CategoryId>,
    pub image_url: String,
    pub stock: i32,
}

/// Category part of a catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No category restriction.
    #[default]
    All,
    /// Only products in this category.
    Only(CategoryId),
    /// A value that names no category. Matches nothing.
    Unmatched,
}

impl CategoryFilter {
    /// Value used by the category selector for "all categories".
    pub const ALL: &'static str = "all";

    /// Parse the `category` query parameter.
    ///
    /// `""` and `"all"` select everything; a category UUID selects one
    /// category. Anything else, including `"ALL"` or a padded `" all"`,
    /// matches nothing.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value == Self::ALL {
            return Self::All;
        }
        uuid::Uuid::parse_str(value).map_or(Self::Unmatched, |id| Self::Only(id.into()))
    }

    /// Whether a product with the given category passes this filter.
    #[must_use]
    pub fn accepts(self, category_id: Option<CategoryId>) -> bool {
        match self {
            Self::All => true,
            Self::Only(id) => category_id == Some(id),
            Self::Unmatched => false,
        }
    }

    /// The selected category, if one is selected.
    #[must_use]
    pub const fn selected(self) -> Option<CategoryId> {
        match self {
            Self::Only(id) => Some(id),
            Self::All | Self::Unmatched => None,
        }
    }
}

/// Category and free-text search applied to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: CategoryFilter,
    search: String,
}

impl CatalogQuery {
    /// Build a query from raw request parameters.
    #[must_use]
    pub fn new(category: CategoryFilter, search: &str) -> Self {
        Self {
            category,
            search: search.to_lowercase(),
        }
    }

    /// The lower-cased search text. Whitespace is kept as typed.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// A product matches when its category passes the filter AND the search
    /// text is a case-insensitive substring of its name or description.
    /// Empty search text matches every product.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !self.category.accepts(product.category_id) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        product.name.to_lowercase().contains(&self.search)
            || product.description.to_lowercase().contains(&self.search)
    }

    /// Keep the products that match, preserving input order.
    pub fn filter<'a, I>(&self, products: I) -> Vec<&'a Product>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}
