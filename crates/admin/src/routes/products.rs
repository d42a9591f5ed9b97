//! Product management route handlers.
//!
//! Create and edit share one form. Invalid input re-renders the form with the
//! submitted values and a 400 status; nothing is written.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use shopfront_core::{Category, CategoryId, Price, Product, ProductId, ProductInput};

use super::{MessageQuery, redirect_with_success};
use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Product form as submitted. Every field arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    /// Empty for "no category".
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub stock: String,
}

/// Why a product form was rejected before reaching the database.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductFormError {
    #[error("Name is required")]
    MissingName,
    #[error("Price must be a decimal amount, got \"{0}\"")]
    InvalidPrice(String),
    #[error("Stock must be a whole number, got \"{0}\"")]
    InvalidStock(String),
    #[error("Unknown category")]
    InvalidCategory,
}

impl ProductForm {
    /// Parse the submitted text into a product input.
    ///
    /// Only presence and number formats are checked. Negative prices and
    /// stock pass through; the database constraints decide.
    ///
    /// # Errors
    ///
    /// Returns the first field that could not be parsed.
    pub fn parse(&self) -> std::result::Result<ProductInput, ProductFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductFormError::MissingName);
        }

        let price = self
            .price
            .parse::<Price>()
            .map_err(|_| ProductFormError::InvalidPrice(self.price.trim().to_owned()))?;

        let stock = self
            .stock
            .trim()
            .parse::<i32>()
            .map_err(|_| ProductFormError::InvalidStock(self.stock.trim().to_owned()))?;

        let category_id = match self.category_id.trim() {
            "" => None,
            id => Some(
                id.parse::<CategoryId>()
                    .map_err(|_| ProductFormError::InvalidCategory)?,
            ),
        };

        Ok(ProductInput {
            name: name.to_owned(),
            description: self.description.trim().to_owned(),
            price,
            category_id,
            image_url: self.image_url.trim().to_owned(),
            stock,
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            category_id: product
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            image_url: product.image_url.clone(),
            stock: product.stock.to_string(),
        }
    }
}

// =============================================================================
// View Types
// =============================================================================

/// Product row for the listing.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub name: String,
    pub category_name: String,
    pub price: String,
    pub stock: i32,
}

/// One entry of the category selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

fn category_options(categories: &[Category], selected: &str) -> Vec<CategoryOption> {
    categories
        .iter()
        .map(|c| {
            let id = c.id.to_string();
            CategoryOption {
                selected: id == selected.trim(),
                id,
                name: c.name.clone(),
            }
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Products list page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin: Option<CurrentAdmin>,
    pub messages: MessageQuery,
    pub products: Vec<ProductRowView>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub admin: Option<CurrentAdmin>,
    pub messages: MessageQuery,
    pub heading: String,
    pub action: String,
    pub form: ProductForm,
    pub categories: Vec<CategoryOption>,
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "products/delete.html")]
pub struct ConfirmDeleteTemplate {
    pub admin: Option<CurrentAdmin>,
    pub messages: MessageQuery,
    pub id: String,
    pub name: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Products list page handler.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(messages): Query<MessageQuery>,
) -> Result<ProductsIndexTemplate> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let products = ProductRepository::new(state.pool()).list().await?;

    let names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let products = products
        .iter()
        .map(|p| ProductRowView {
            id: p.id.to_string(),
            name: p.name.clone(),
            category_name: p
                .category_id
                .and_then(|id| names.get(&id).copied())
                .unwrap_or("None")
                .to_string(),
            price: p.price.display(),
            stock: p.stock,
        })
        .collect();

    Ok(ProductsIndexTemplate {
        admin: Some(admin),
        messages,
        products,
    })
}

/// New product form.
#[instrument(skip(admin, state))]
pub async fn new(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<ProductFormTemplate> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let form = ProductForm {
        stock: "0".to_string(),
        ..ProductForm::default()
    };

    Ok(ProductFormTemplate {
        admin: Some(admin),
        messages: MessageQuery::default(),
        heading: "New product".to_string(),
        action: "/products".to_string(),
        categories: category_options(&categories, &form.category_id),
        form,
    })
}

/// Edit product form.
#[instrument(skip(admin, state))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let form = ProductForm::from(&product);

    Ok(ProductFormTemplate {
        admin: Some(admin),
        messages: MessageQuery::default(),
        heading: format!("Edit {}", product.name),
        action: format!("/products/{id}"),
        categories: category_options(&categories, &form.category_id),
        form,
    })
}

/// Create a product.
#[instrument(skip(admin, state, form), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(e) => return rejected(&state, admin, "New product", "/products", form, e.to_string()).await,
    };

    match ProductRepository::new(state.pool()).create(&input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product created");
            Ok(redirect_with_success("/products", &format!("Created {}", product.name)).into_response())
        }
        Err(RepositoryError::Invalid(message)) => {
            rejected(&state, admin, "New product", "/products", form, message).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Update a product.
#[instrument(skip(admin, state, form), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let action = format!("/products/{id}");
    let input = match form.parse() {
        Ok(input) => input,
        Err(e) => return rejected(&state, admin, "Edit product", &action, form, e.to_string()).await,
    };

    match ProductRepository::new(state.pool()).update(id, &input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product updated");
            Ok(redirect_with_success("/products", &format!("Saved {}", product.name)).into_response())
        }
        Err(RepositoryError::Invalid(message)) => {
            rejected(&state, admin, "Edit product", &action, form, message).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete confirmation page.
#[instrument(skip(admin, state))]
pub async fn confirm_delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<ConfirmDeleteTemplate> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    Ok(ConfirmDeleteTemplate {
        admin: Some(admin),
        messages: MessageQuery::default(),
        id: product.id.to_string(),
        name: product.name,
    })
}

/// Delete a product once confirmed.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(redirect_with_success("/products", "Product deleted"))
}

/// Re-render the form with the submitted values and why they were rejected.
async fn rejected(
    state: &AppState,
    admin: CurrentAdmin,
    heading: &str,
    action: &str,
    form: ProductForm,
    message: String,
) -> Result<Response> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let template = ProductFormTemplate {
        admin: Some(admin),
        messages: MessageQuery::error(message),
        heading: heading.to_string(),
        action: action.to_string(),
        categories: category_options(&categories, &form.category_id),
        form,
    };
    Ok((StatusCode::BAD_REQUEST, template).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn form(name: &str, price: &str, stock: &str, category_id: &str) -> ProductForm {
        ProductForm {
            name: name.to_owned(),
            description: " Loose leaf ".to_owned(),
            price: price.to_owned(),
            category_id: category_id.to_owned(),
            image_url: String::new(),
            stock: stock.to_owned(),
        }
    }

    #[test]
    fn test_parse_valid_form() {
        let category = CategoryId::random();
        let input = form("  Sencha ", "12.50", "7", &category.to_string())
            .parse()
            .unwrap();

        assert_eq!(input.name, "Sencha");
        assert_eq!(input.description, "Loose leaf");
        assert_eq!(input.price, Price::from_cents(1250));
        assert_eq!(input.stock, 7);
        assert_eq!(input.category_id, Some(category));
    }

    #[test]
    fn test_parse_empty_category_is_none() {
        let input = form("Mug", "8", "0", "").parse().unwrap();
        assert_eq!(input.category_id, None);
    }

    #[test]
    fn test_parse_passes_negative_values_through() {
        let input = form("Mug", "-1.00", "-3", "").parse().unwrap();
        assert_eq!(input.stock, -3);
        assert_eq!(input.price, Price::from_cents(-100));
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!(
            form("   ", "1", "1", "").parse().unwrap_err(),
            ProductFormError::MissingName
        );
        assert_eq!(
            form("Mug", "cheap", "1", "").parse().unwrap_err(),
            ProductFormError::InvalidPrice("cheap".to_owned())
        );
        assert_eq!(
            form("Mug", "1", "2.5", "").parse().unwrap_err(),
            ProductFormError::InvalidStock("2.5".to_owned())
        );
        assert_eq!(
            form("Mug", "1", "1", "tea").parse().unwrap_err(),
            ProductFormError::InvalidCategory
        );
    }

    #[test]
    fn test_form_from_product_round_trips() {
        let product = Product {
            id: ProductId::random(),
            name: "Sencha".to_owned(),
            description: "Loose leaf".to_owned(),
            price: Price::from_cents(1250),
            category_id: None,
            image_url: "https://img.example.com/sencha.jpg".to_owned(),
            stock: 4,
            created_at: Utc::now(),
        };

        let form = ProductForm::from(&product);
        assert_eq!(form.price, "12.50");
        assert_eq!(form.category_id, "");

        let input = form.parse().unwrap();
        assert_eq!(input.price, product.price);
        assert_eq!(input.stock, product.stock);
    }

    #[test]
    fn test_category_options_mark_selection() {
        let tea = Category {
            id: CategoryId::random(),
            name: "Tea".to_owned(),
            description: String::new(),
        };
        let options = category_options(std::slice::from_ref(&tea), &tea.id.to_string());
        assert!(options[0].selected);
        assert!(!category_options(&[tea], "")[0].selected);
    }
}
