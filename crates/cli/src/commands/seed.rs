//! Demo data for local development.
//!
//! Categories are upserted by name; products are skipped when one with the
//! same name already exists, so the command can run repeatedly.

use shopfront_admin::db::{CategoryRepository, ProductRepository, RepositoryError};
use shopfront_core::{Price, ProductInput};
use thiserror::Error;

use super::CommandError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

struct SeedProduct {
    category: &'static str,
    name: &'static str,
    description: &'static str,
    cents: i64,
    stock: i32,
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Coffee", "Whole bean and ground coffee"),
    ("Tea", "Loose leaf teas"),
    ("Brewing", "Kettles, filters and grinders"),
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        category: "Coffee",
        name: "House Blend",
        description: "Medium roast with notes of cocoa and hazelnut.",
        cents: 1450,
        stock: 40,
    },
    SeedProduct {
        category: "Coffee",
        name: "Ethiopia Guji",
        description: "Light roast, floral and bright.",
        cents: 1900,
        stock: 15,
    },
    SeedProduct {
        category: "Tea",
        name: "Sencha",
        description: "Steamed Japanese green tea.",
        cents: 1200,
        stock: 25,
    },
    SeedProduct {
        category: "Tea",
        name: "Earl Grey",
        description: "Black tea with bergamot.",
        cents: 950,
        stock: 0,
    },
    SeedProduct {
        category: "Brewing",
        name: "Paper Filters (100)",
        description: "Unbleached cone filters.",
        cents: 600,
        stock: 100,
    },
    SeedProduct {
        category: "Brewing",
        name: "Hand Grinder",
        description: "Ceramic burrs, adjustable grind size.",
        cents: 4500,
        stock: 5,
    },
];

/// Insert demo categories and products.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    let pool = super::connect().await?;
    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let category = categories.ensure(name, description).await?;
        category_ids.push((*name, category.id));
    }

    let mut created = 0_usize;
    for seed in PRODUCTS {
        if products.exists_named(seed.name).await? {
            tracing::debug!(name = seed.name, "Product exists, skipping");
            continue;
        }

        let category_id = category_ids
            .iter()
            .find(|(name, _)| *name == seed.category)
            .map(|(_, id)| *id);

        products
            .create(&ProductInput {
                name: seed.name.to_owned(),
                description: seed.description.to_owned(),
                price: Price::from_cents(seed.cents),
                category_id,
                image_url: String::new(),
                stock: seed.stock,
            })
            .await?;
        created += 1;
    }

    tracing::info!(
        categories = CATEGORIES.len(),
        products = created,
        "Seed complete!"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_product_has_a_known_category() {
        for product in PRODUCTS {
            assert!(
                CATEGORIES.iter().any(|(name, _)| *name == product.category),
                "{} has unknown category {}",
                product.name,
                product.category
            );
        }
    }

    #[test]
    fn test_seed_values_are_valid() {
        for product in PRODUCTS {
            assert!(product.cents > 0);
            assert!(product.stock >= 0);
        }
    }
}
