use axum_storefront_api::{
    cart::Cart,
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{cart_service, order_service},
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

// Integration flow over the service layer: session cart -> checkout ->
// order history. Skips when no database is configured.
async fn try_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    Ok(Some(AppState { pool, orm }))
}

async fn create_user(state: &AppState) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(format!("shopper-{}", Uuid::new_v4())),
        password_hash: Set("dummy".into()),
        role: Set("user".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: "user".into(),
    })
}

async fn create_product(state: &AppState, price: Decimal, stock: i32) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("widget-{}", Uuid::new_v4())),
        description: Set(Some("A product for testing".into())),
        price: Set(price),
        stock: Set(stock),
        category_id: Set(None),
        image_url: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}

async fn stock_of(state: &AppState, id: Uuid) -> anyhow::Result<i32> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .expect("product exists");
    Ok(product.stock)
}

#[tokio::test]
async fn cart_checkout_flow() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let user = create_user(&state).await?;
    let p1 = create_product(&state, Decimal::new(1000, 2), 5).await?;
    let p2 = create_product(&state, Decimal::new(450, 2), 3).await?;

    // Adding the same product twice accumulates its quantity.
    let mut cart = Cart::default();
    cart_service::add_to_cart(&state, &mut cart, p1, 1).await?;
    cart_service::add_to_cart(&state, &mut cart, p1, 1).await?;
    cart_service::add_to_cart(&state, &mut cart, p2, 1).await?;
    assert_eq!(cart.quantity(p1), 2);

    let view = cart_service::view_cart(&state, &cart).await?;
    assert_eq!(view.data.unwrap().total, Decimal::new(2450, 2));

    let resp = order_service::checkout(&state, &user, &cart).await?;
    let placed = resp.data.unwrap();
    assert_eq!(placed.order.total_price, Decimal::new(2450, 2));
    assert_eq!(placed.items.len(), 2);

    assert_eq!(stock_of(&state, p1).await?, 3);
    assert_eq!(stock_of(&state, p2).await?, 2);

    let history = order_service::list_orders(&state, &user).await?;
    let items = history.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, placed.order.id);

    Ok(())
}

#[tokio::test]
async fn empty_cart_checkout_creates_no_order() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let user = create_user(&state).await?;
    let cart = Cart::default();

    let err = order_service::checkout(&state, &user, &cart)
        .await
        .expect_err("empty cart must not check out");
    assert!(matches!(err, AppError::CartEmpty));

    let history = order_service::list_orders(&state, &user).await?;
    assert!(history.data.unwrap().items.is_empty());

    Ok(())
}

#[tokio::test]
async fn insufficient_stock_rolls_back_everything() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let user = create_user(&state).await?;
    let p1 = create_product(&state, Decimal::new(1000, 2), 1).await?;

    let mut cart = Cart::default();
    cart_service::add_to_cart(&state, &mut cart, p1, 2).await?;

    let err = order_service::checkout(&state, &user, &cart)
        .await
        .expect_err("oversized order must fail");
    assert!(matches!(err, AppError::BadRequest(_)));

    // Nothing was written: stock untouched, no order rows.
    assert_eq!(stock_of(&state, p1).await?, 1);
    let history = order_service::list_orders(&state, &user).await?;
    assert!(history.data.unwrap().items.is_empty());

    Ok(())
}

#[tokio::test]
async fn concurrent_checkouts_cannot_oversell() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    // Stock covers one of the two orders, never both.
    let buyer_a = create_user(&state).await?;
    let buyer_b = create_user(&state).await?;
    let product = create_product(&state, Decimal::new(700, 2), 3).await?;

    let mut cart_a = Cart::default();
    cart_service::add_to_cart(&state, &mut cart_a, product, 2).await?;
    let mut cart_b = Cart::default();
    cart_service::add_to_cart(&state, &mut cart_b, product, 2).await?;

    let (res_a, res_b) = tokio::join!(
        order_service::checkout(&state, &buyer_a, &cart_a),
        order_service::checkout(&state, &buyer_b, &cart_b),
    );

    // The row lock serializes the two transactions: whichever runs
    // second sees the decremented stock and fails validation.
    let successes = [&res_a, &res_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for res in [res_a, res_b] {
        if let Err(err) = res {
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }
    assert_eq!(stock_of(&state, product).await?, 1);

    Ok(())
}

#[tokio::test]
async fn duplicate_product_names_are_allowed() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let name = format!("widget-{}", Uuid::new_v4());
    for _ in 0..2 {
        ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.clone()),
            description: Set(None),
            price: Set(Decimal::ONE),
            stock: Set(1),
            category_id: Set(None),
            image_url: Set(None),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;
    }

    let count = Products::find()
        .filter(ProdCol::Name.eq(name.as_str()))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 2);

    Ok(())
}

#[tokio::test]
async fn vanished_product_fails_whole_checkout() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let user = create_user(&state).await?;
    let p1 = create_product(&state, Decimal::new(500, 2), 10).await?;

    let mut cart = Cart::default();
    cart_service::add_to_cart(&state, &mut cart, p1, 1).await?;
    // Added to the cart, then deleted before checkout.
    cart_service::add_to_cart(&state, &mut cart, Uuid::new_v4(), 1).await?;

    let err = order_service::checkout(&state, &user, &cart)
        .await
        .expect_err("missing product must fail the whole checkout");
    assert!(matches!(err, AppError::BadRequest(_)));

    assert_eq!(stock_of(&state, p1).await?, 10);
    let history = order_service::list_orders(&state, &user).await?;
    assert!(history.data.unwrap().items.is_empty());

    Ok(())
}

#[tokio::test]
async fn price_change_is_reflected_at_checkout() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let user = create_user(&state).await?;
    let p1 = create_product(&state, Decimal::new(1000, 2), 5).await?;

    let mut cart = Cart::default();
    cart_service::add_to_cart(&state, &mut cart, p1, 1).await?;

    // Price changes after the product went into the cart.
    let existing = Products::find_by_id(p1).one(&state.orm).await?.unwrap();
    let mut active: ProductActive = existing.into();
    active.price = Set(Decimal::new(1250, 2));
    active.update(&state.orm).await?;

    let view = cart_service::view_cart(&state, &cart).await?;
    assert_eq!(view.data.unwrap().total, Decimal::new(1250, 2));

    let resp = order_service::checkout(&state, &user, &cart).await?;
    assert_eq!(resp.data.unwrap().order.total_price, Decimal::new(1250, 2));

    Ok(())
}

#[tokio::test]
async fn cart_view_propagates_missing_product() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let mut cart = Cart::default();
    cart_service::add_to_cart(&state, &mut cart, Uuid::new_v4(), 1).await?;

    let err = cart_service::view_cart(&state, &cart)
        .await
        .expect_err("total over a vanished product must fail");
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}
