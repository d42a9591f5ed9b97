//! Catalog route handler.
//!
//! The whole catalog is loaded on every request and narrowed in memory.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{CatalogQuery, Category, CategoryFilter, CategoryId, Product};

use super::MessageQuery;
use crate::db::CatalogRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Catalog filter parameters.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub q: String,
}

impl CatalogParams {
    /// Parse into a catalog query.
    #[must_use]
    pub fn query(&self) -> CatalogQuery {
        CatalogQuery::new(CategoryFilter::parse(&self.category), &self.q)
    }
}

/// One entry of the category selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Product tile data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub category_name: Option<String>,
    pub stock: i32,
    pub in_stock: bool,
}

/// Everything the catalog page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogView {
    pub categories: Vec<CategoryOption>,
    pub products: Vec<ProductCard>,
    /// Raw search text, echoed back into the search box.
    pub search: String,
    /// Raw category value, echoed back into the add-to-cart forms.
    pub category: String,
    pub all_selected: bool,
}

impl CatalogView {
    /// Apply the filter and build the view.
    #[must_use]
    pub fn build(categories: &[Category], products: &[Product], params: &CatalogParams) -> Self {
        let query = params.query();
        let names: HashMap<CategoryId, &str> = categories
            .iter()
            .map(|c| (c.id, c.name.as_str()))
            .collect();

        let products = query
            .filter(products)
            .into_iter()
            .map(|p| ProductCard {
                id: p.id.to_string(),
                name: p.name.clone(),
                description: p.description.clone(),
                price: p.price.display(),
                image_url: p.image_url.clone(),
                category_name: p
                    .category_id
                    .and_then(|id| names.get(&id))
                    .map(|name| (*name).to_string()),
                stock: p.stock,
                in_stock: p.in_stock(),
            })
            .collect();

        let selected = query.category.selected();
        let categories = categories
            .iter()
            .map(|c| CategoryOption {
                id: c.id.to_string(),
                name: c.name.clone(),
                selected: selected == Some(c.id),
            })
            .collect();

        Self {
            categories,
            products,
            search: params.q.clone(),
            category: params.category.clone(),
            all_selected: query.category == CategoryFilter::All,
        }
    }
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub user: Option<CurrentUser>,
    pub messages: MessageQuery,
    pub catalog: CatalogView,
}

/// Display the catalog.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(params): Query<CatalogParams>,
    Query(messages): Query<MessageQuery>,
) -> Result<CatalogTemplate> {
    let repo = CatalogRepository::new(state.pool());
    let categories = repo.list_categories().await?;
    let products = repo.list_products().await?;

    Ok(CatalogTemplate {
        user,
        messages,
        catalog: CatalogView::build(&categories, &products, &params),
    })
}
