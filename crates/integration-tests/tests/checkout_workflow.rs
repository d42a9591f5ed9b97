//! Checkout workflow tests against `PostgreSQL`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use sqlx::PgPool;

use shopfront_admin::db::ProductRepository;
use shopfront_core::{OrderStatus, Price};
use shopfront_integration_tests::{
    count_for_user, customer, order_item_count, product, product_input,
};
use shopfront_storefront::db::{CartRepository, CheckoutOutcome, OrderRepository};
use shopfront_storefront::services::{CartService, CheckoutService};

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_checkout_places_order_and_clears_cart(pool: PgPool) {
    let user = customer(&pool, "buyer@example.com").await;
    let a = product(&pool, "Product A", 1000, 10).await;
    let b = product(&pool, "Product B", 500, 10).await;
    let cart = CartService::new(&pool);
    cart.add(user, a).await.unwrap();
    cart.add(user, a).await.unwrap();
    cart.add(user, b).await.unwrap();

    let outcome = CheckoutService::new(&pool).checkout(user).await.unwrap();
    let CheckoutOutcome::Placed(order) = outcome else {
        panic!("expected an order, got {outcome:?}");
    };

    assert_eq!(order.total, Price::from_cents(2500));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id, user);
    assert_eq!(count_for_user(&pool, "cart_items", user).await, 0);
    assert_eq!(count_for_user(&pool, "orders", user).await, 1);

    let (stored, mut items) = OrderRepository::new(&pool)
        .get_for_user(user, order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total, Price::from_cents(2500));

    items.sort_by(|x, y| x.product_name.cmp(&y.product_name));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].product_name, "Product A");
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].price, Price::from_cents(1000));
    assert_eq!(items[1].product_name, "Product B");
    assert_eq!(items[1].quantity, 1);
    assert_eq!(items[1].price, Price::from_cents(500));
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_empty_cart_checkout_writes_nothing(pool: PgPool) {
    let user = customer(&pool, "empty@example.com").await;

    let outcome = CheckoutService::new(&pool).checkout(user).await.unwrap();

    assert_eq!(outcome, CheckoutOutcome::EmptyCart);
    assert_eq!(count_for_user(&pool, "orders", user).await, 0);
    assert_eq!(order_item_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_price_change_does_not_touch_placed_orders(pool: PgPool) {
    let user = customer(&pool, "snapshot@example.com").await;
    let beans = product(&pool, "Beans", 1450, 10).await;
    CartService::new(&pool).add(user, beans).await.unwrap();
    let CheckoutOutcome::Placed(order) = CheckoutService::new(&pool).checkout(user).await.unwrap()
    else {
        panic!("expected an order");
    };

    ProductRepository::new(&pool)
        .update(beans, &product_input("Beans (new label)", 9900, 10))
        .await
        .unwrap();

    let (stored, items) = OrderRepository::new(&pool)
        .get_for_user(user, order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total, Price::from_cents(1450));
    assert_eq!(items[0].price, Price::from_cents(1450));
    assert_eq!(items[0].product_name, "Beans");
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_failed_checkout_leaves_cart_and_orders_untouched(pool: PgPool) {
    let user = customer(&pool, "rollback@example.com").await;
    let a = product(&pool, "Product A", 1000, 10).await;
    let b = product(&pool, "Product B", 500, 10).await;
    let cart = CartService::new(&pool);
    cart.add(user, a).await.unwrap();
    cart.add(user, b).await.unwrap();

    // Fail the second statement of the transaction.
    sqlx::raw_sql(
        r"
        CREATE FUNCTION shop.reject_order_items() RETURNS trigger AS $$
        BEGIN
            RAISE EXCEPTION 'order items rejected';
        END;
        $$ LANGUAGE plpgsql;

        CREATE TRIGGER reject_order_items BEFORE INSERT ON shop.order_items
            FOR EACH ROW EXECUTE FUNCTION shop.reject_order_items();
        ",
    )
    .execute(&pool)
    .await
    .unwrap();

    assert!(CheckoutService::new(&pool).checkout(user).await.is_err());

    assert_eq!(count_for_user(&pool, "orders", user).await, 0);
    assert_eq!(order_item_count(&pool).await, 0);
    assert_eq!(count_for_user(&pool, "cart_items", user).await, 2);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_orders_are_private_to_their_owner(pool: PgPool) {
    let buyer = customer(&pool, "mine@example.com").await;
    let other = customer(&pool, "theirs@example.com").await;
    let cup = product(&pool, "Cup", 600, 10).await;
    CartService::new(&pool).add(buyer, cup).await.unwrap();
    let CheckoutOutcome::Placed(order) = CheckoutService::new(&pool).checkout(buyer).await.unwrap()
    else {
        panic!("expected an order");
    };

    let orders = OrderRepository::new(&pool);
    assert!(orders.get_for_user(other, order.id).await.unwrap().is_none());
    assert!(orders.list_for_user(other).await.unwrap().is_empty());
    assert_eq!(orders.list_for_user(buyer).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL"]
async fn test_line_added_during_checkout_stays_in_cart(pool: PgPool) {
    let user = customer(&pool, "second-tab@example.com").await;
    let kettle = product(&pool, "Kettle", 4500, 10).await;
    let filters = product(&pool, "Paper Filters", 300, 10).await;
    let cart = CartService::new(&pool);
    cart.add(user, kettle).await.unwrap();

    // Hold the existing line so checkout blocks on its locking read.
    let mut holder = pool.begin().await.unwrap();
    sqlx::query("SELECT 1 FROM shop.cart_items WHERE user_id = $1 FOR UPDATE")
        .bind(user)
        .execute(&mut *holder)
        .await
        .unwrap();

    let checkout_pool = pool.clone();
    let checkout =
        tokio::spawn(async move { CheckoutService::new(&checkout_pool).checkout(user).await });

    let mut waiting = false;
    for _ in 0..200 {
        let blocked: i64 = sqlx::query_scalar(
            r"
            SELECT count(*) FROM pg_stat_activity
            WHERE datname = current_database() AND wait_event_type = 'Lock'
            ",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        if blocked > 0 {
            waiting = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(waiting, "checkout never blocked on the held cart line");

    cart.add(user, filters).await.unwrap();
    holder.commit().await.unwrap();

    let CheckoutOutcome::Placed(order) = checkout.await.unwrap().unwrap() else {
        panic!("expected an order");
    };
    let (_, items) = OrderRepository::new(&pool)
        .get_for_user(user, order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_name, "Kettle");
    assert_eq!(order.total, Price::from_cents(4500));

    let lines = CartRepository::new(&pool).lines(user).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product.id, filters);
    assert_eq!(lines[0].quantity, 1);
}
