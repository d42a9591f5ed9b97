//! Cart workflow tests against `PostgreSQL`.
//!
//! Run with a `DATABASE_URL` pointing at a server `sqlx::test` may create
//! databases on: `cargo test -p shopfront-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use sqlx::PgPool;

use shopfront_admin::db::ProductRepository;
use shopfront_core::{CatalogQuery, CategoryFilter};
use shopfront_integration_tests::{count_for_user, customer, product, product_in, product_input};
use shopfront_storefront::db::{CartRepository, CatalogRepository};
use shopfront_storefront::services::{CartError, CartService};

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_adding_twice_keeps_one_line(pool: PgPool) {
    let user = customer(&pool, "twice@example.com").await;
    let teapot = product(&pool, "Teapot", 2400, 10).await;
    let cart = CartService::new(&pool);

    assert_eq!(cart.add(user, teapot).await.unwrap(), 1);
    assert_eq!(cart.add(user, teapot).await.unwrap(), 2);

    let lines = CartRepository::new(&pool).lines(user).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    assert_eq!(lines[0].product.id, teapot);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_concurrent_adds_do_not_lose_increments(pool: PgPool) {
    let user = customer(&pool, "racer@example.com").await;
    let mug = product(&pool, "Mug", 800, 100).await;

    let adds = (0..8).map(|_| {
        let pool = pool.clone();
        tokio::spawn(async move { CartService::new(&pool).add(user, mug).await })
    });
    for handle in adds.collect::<Vec<_>>() {
        handle.await.unwrap().unwrap();
    }

    let lines = CartRepository::new(&pool).lines(user).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 8);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_update_below_one_is_ignored(pool: PgPool) {
    let user = customer(&pool, "below@example.com").await;
    let kettle = product(&pool, "Kettle", 3900, 10).await;
    let cart = CartService::new(&pool);
    cart.add(user, kettle).await.unwrap();
    cart.add(user, kettle).await.unwrap();
    let line_id = CartRepository::new(&pool).lines(user).await.unwrap()[0].id;

    for requested in [0, -1, -50] {
        cart.update_quantity(user, line_id, requested).await.unwrap();
    }

    let lines = CartRepository::new(&pool).lines(user).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);

    cart.update_quantity(user, line_id, 5).await.unwrap();
    let lines = CartRepository::new(&pool).lines(user).await.unwrap();
    assert_eq!(lines[0].quantity, 5);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_quantity_is_capped_at_stock(pool: PgPool) {
    let user = customer(&pool, "cap@example.com").await;
    let rare = product(&pool, "Rare Oolong", 5200, 2).await;
    let sold_out = product(&pool, "Sold Out", 500, 0).await;
    let cart = CartService::new(&pool);

    cart.add(user, rare).await.unwrap();
    cart.add(user, rare).await.unwrap();
    assert!(matches!(
        cart.add(user, rare).await,
        Err(CartError::StockExceeded)
    ));
    assert!(matches!(
        cart.add(user, sold_out).await,
        Err(CartError::StockExceeded)
    ));

    let line_id = CartRepository::new(&pool).lines(user).await.unwrap()[0].id;
    assert!(matches!(
        cart.update_quantity(user, line_id, 3).await,
        Err(CartError::StockExceeded)
    ));

    let lines = CartRepository::new(&pool).lines(user).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_quantity_can_be_lowered_after_stock_drops(pool: PgPool) {
    let user = customer(&pool, "lower@example.com").await;
    let matcha = product(&pool, "Matcha Tin", 3100, 10).await;
    let cart = CartService::new(&pool);
    cart.add(user, matcha).await.unwrap();
    let line_id = CartRepository::new(&pool).lines(user).await.unwrap()[0].id;
    cart.update_quantity(user, line_id, 5).await.unwrap();

    ProductRepository::new(&pool)
        .update(matcha, &product_input("Matcha Tin", 3100, 2))
        .await
        .unwrap();

    assert!(matches!(
        cart.update_quantity(user, line_id, 6).await,
        Err(CartError::StockExceeded)
    ));
    cart.update_quantity(user, line_id, 5).await.unwrap();
    cart.update_quantity(user, line_id, 4).await.unwrap();

    let lines = CartRepository::new(&pool).lines(user).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 4);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_lines_are_private_to_their_owner(pool: PgPool) {
    let owner = customer(&pool, "owner@example.com").await;
    let other = customer(&pool, "other@example.com").await;
    let cup = product(&pool, "Cup", 600, 10).await;
    let cart = CartService::new(&pool);
    cart.add(owner, cup).await.unwrap();
    let line_id = CartRepository::new(&pool).lines(owner).await.unwrap()[0].id;

    assert!(matches!(
        cart.update_quantity(other, line_id, 3).await,
        Err(CartError::LineNotFound)
    ));
    cart.remove(other, line_id).await.unwrap();
    assert_eq!(count_for_user(&pool, "cart_items", owner).await, 1);

    cart.remove(owner, line_id).await.unwrap();
    assert_eq!(count_for_user(&pool, "cart_items", owner).await, 0);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_unknown_product_is_rejected(pool: PgPool) {
    let user = customer(&pool, "ghost@example.com").await;

    assert!(matches!(
        CartService::new(&pool)
            .add(user, shopfront_core::ProductId::random())
            .await,
        Err(CartError::ProductNotFound)
    ));
    assert_eq!(count_for_user(&pool, "cart_items", user).await, 0);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_catalog_filter_over_stored_products(pool: PgPool) {
    let tea = shopfront_admin::db::CategoryRepository::new(&pool)
        .ensure("Tea", "")
        .await
        .unwrap();
    product_in(&pool, "Green Tea", 900, 5, Some(tea.id)).await;
    product_in(&pool, "Black Tea", 900, 5, Some(tea.id)).await;
    product(&pool, "Tea Towel", 700, 5).await;

    let products = CatalogRepository::new(&pool).list_products().await.unwrap();
    assert_eq!(products.len(), 3);

    let query = CatalogQuery::new(CategoryFilter::Only(tea.id), "GREEN");
    let matched = query.filter(&products);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "Green Tea");

    let everything_tea = CatalogQuery::new(CategoryFilter::All, "tea").filter(&products);
    assert_eq!(everything_tea.len(), 3);
}
