use axum_storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{categories::ActiveModel as CategoryActive, products::ActiveModel as ProductActive},
    routes::params::RawCatalogQuery,
    services::catalog_service,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

// Catalog query behavior against a live database. Each test scopes its
// products with a unique marker in the name so runs do not interfere.
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

async fn create_product(
    state: &AppState,
    name: &str,
    description: Option<&str>,
    price: Decimal,
    category_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.map(String::from)),
        price: Set(price),
        stock: Set(10),
        category_id: Set(category_id),
        image_url: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

// Explicit timestamps so insertion-order assertions cannot tie.
async fn create_product_at(
    state: &AppState,
    name: &str,
    price: Decimal,
    created_at: chrono::DateTime<chrono::Utc>,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        price: Set(price),
        stock: Set(10),
        category_id: Set(None),
        image_url: Set(None),
        created_at: Set(created_at.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

fn query_with_marker(marker: &str) -> RawCatalogQuery {
    RawCatalogQuery {
        q: Some(marker.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn malformed_filters_never_error_and_are_not_applied() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let marker = format!("mf-{}", Uuid::new_v4().simple());
    for i in 0..3 {
        create_product(
            &state,
            &format!("{marker}-item-{i}"),
            None,
            Decimal::new(500 + i, 2),
            None,
        )
        .await?;
    }

    let raw = RawCatalogQuery {
        q: Some(marker.clone()),
        category: Some("not-a-uuid".into()),
        min_price: Some("-4".into()),
        max_price: Some("plenty".into()),
        sort: Some("banana".into()),
        page: Some("9999".into()),
    };

    let resp = catalog_service::list_products(&state, raw.parse()).await?;
    let page = resp.data.unwrap();
    // None of the malformed filters applied; page clamped to the last
    // page rather than erroring.
    assert_eq!(page.products.len(), 3);
    assert_eq!(page.filters.category, None);
    assert_eq!(page.filters.min_price, None);
    assert_eq!(page.filters.max_price, None);
    assert_eq!(page.filters.sort, None);
    assert_eq!(page.filters.page, 1);

    Ok(())
}

#[tokio::test]
async fn text_filter_matches_name_or_description() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let marker = format!("tx-{}", Uuid::new_v4().simple());
    create_product(&state, &format!("{marker}-named"), None, Decimal::ONE, None).await?;
    create_product(
        &state,
        &format!("plain-{}", Uuid::new_v4().simple()),
        Some(&format!("described {marker}")),
        Decimal::ONE,
        None,
    )
    .await?;

    let resp = catalog_service::list_products(&state, query_with_marker(&marker).parse()).await?;
    assert_eq!(resp.data.unwrap().products.len(), 2);

    Ok(())
}

#[tokio::test]
async fn sort_keys_order_products() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let marker = format!("so-{}", Uuid::new_v4().simple());
    // Insertion order deliberately differs from both name and price
    // order.
    let base = chrono::Utc::now();
    create_product_at(&state, &format!("{marker}-c"), Decimal::new(200, 2), base).await?;
    create_product_at(
        &state,
        &format!("{marker}-a"),
        Decimal::new(300, 2),
        base + chrono::Duration::seconds(1),
    )
    .await?;
    create_product_at(
        &state,
        &format!("{marker}-b"),
        Decimal::new(100, 2),
        base + chrono::Duration::seconds(2),
    )
    .await?;

    let cases = [
        ("price_asc", vec!["b", "c", "a"]),
        ("price_desc", vec!["a", "c", "b"]),
        ("name_asc", vec!["a", "b", "c"]),
        ("name_desc", vec!["c", "b", "a"]),
    ];

    for (sort, expected) in cases {
        let raw = RawCatalogQuery {
            q: Some(marker.clone()),
            sort: Some(sort.to_string()),
            ..Default::default()
        };
        let resp = catalog_service::list_products(&state, raw.parse()).await?;
        let suffixes: Vec<String> = resp
            .data
            .unwrap()
            .products
            .iter()
            .map(|p| p.name.rsplit('-').next().unwrap().to_string())
            .collect();
        assert_eq!(suffixes, expected, "sort key {sort}");
    }

    // Unrecognized sort key keeps insertion order.
    let raw = RawCatalogQuery {
        q: Some(marker.clone()),
        sort: Some("oldest_first".to_string()),
        ..Default::default()
    };
    let resp = catalog_service::list_products(&state, raw.parse()).await?;
    let suffixes: Vec<String> = resp
        .data
        .unwrap()
        .products
        .iter()
        .map(|p| p.name.rsplit('-').next().unwrap().to_string())
        .collect();
    assert_eq!(suffixes, vec!["c", "a", "b"]);

    Ok(())
}

#[tokio::test]
async fn price_bounds_filter_inclusively() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let marker = format!("pb-{}", Uuid::new_v4().simple());
    create_product(&state, &format!("{marker}-cheap"), None, Decimal::new(100, 2), None).await?;
    create_product(&state, &format!("{marker}-mid"), None, Decimal::new(500, 2), None).await?;
    create_product(&state, &format!("{marker}-dear"), None, Decimal::new(900, 2), None).await?;

    let raw = RawCatalogQuery {
        q: Some(marker.clone()),
        min_price: Some("2.00".into()),
        max_price: Some("8.99".into()),
        ..Default::default()
    };
    let resp = catalog_service::list_products(&state, raw.parse()).await?;
    let products = resp.data.unwrap().products;
    assert_eq!(products.len(), 1);
    assert!(products[0].name.ends_with("mid"));

    Ok(())
}

#[tokio::test]
async fn category_filter_is_exact() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let marker = format!("ca-{}", Uuid::new_v4().simple());
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("cat-{marker}")),
    }
    .insert(&state.orm)
    .await?;

    create_product(
        &state,
        &format!("{marker}-in"),
        None,
        Decimal::ONE,
        Some(category.id),
    )
    .await?;
    create_product(&state, &format!("{marker}-out"), None, Decimal::ONE, None).await?;

    let raw = RawCatalogQuery {
        q: Some(marker.clone()),
        category: Some(category.id.to_string()),
        ..Default::default()
    };
    let resp = catalog_service::list_products(&state, raw.parse()).await?;
    let page = resp.data.unwrap();
    assert_eq!(page.products.len(), 1);
    assert!(page.products[0].name.ends_with("in"));
    // The category list for the filter UI rides along.
    assert!(page.categories.iter().any(|c| c.id == category.id));

    Ok(())
}

#[tokio::test]
async fn out_of_range_page_clamps_to_last_page() -> anyhow::Result<()> {
    let Some(state) = try_state().await? else {
        return Ok(());
    };

    let marker = format!("pg-{}", Uuid::new_v4().simple());
    // Twelve products: two pages at nine per page.
    for i in 0..12 {
        create_product(
            &state,
            &format!("{marker}-item-{i:02}"),
            None,
            Decimal::ONE,
            None,
        )
        .await?;
    }

    let raw = RawCatalogQuery {
        q: Some(marker.clone()),
        page: Some("50".into()),
        ..Default::default()
    };
    let resp = catalog_service::list_products(&state, raw.parse()).await?;
    let meta = resp.meta.clone().unwrap();
    let page = resp.data.unwrap();
    assert_eq!(page.filters.page, 2);
    assert_eq!(page.products.len(), 3);
    assert_eq!(meta.total, Some(12));
    assert_eq!(meta.total_pages, Some(2));

    Ok(())
}
