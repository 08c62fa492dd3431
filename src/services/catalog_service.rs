use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CatalogPage, CategoryList, EffectiveFilters},
    entity::{
        categories::{Column as CatCol, Entity as Categories, Model as CategoryModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    routes::params::{CATALOG_PAGE_SIZE, CatalogFilters, ProductSort},
    state::AppState,
};

/// Catalog listing over untrusted, already-parsed filters. Never
/// errors for bad input: malformed values were dropped during parsing
/// and an out-of-range page clamps to the last page here.
pub async fn list_products(
    state: &AppState,
    filters: CatalogFilters,
) -> AppResult<ApiResponse<CatalogPage>> {
    let mut condition = Condition::all();

    if let Some(search) = filters.q.as_ref() {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ProdCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ProdCol::Description).ilike(pattern)),
        );
    }

    if let Some(category_id) = filters.category {
        condition = condition.add(ProdCol::CategoryId.eq(category_id));
    }

    if let Some(min_price) = filters.min_price {
        condition = condition.add(ProdCol::Price.gte(min_price));
    }

    if let Some(max_price) = filters.max_price {
        condition = condition.add(ProdCol::Price.lte(max_price));
    }

    let mut finder = Products::find().filter(condition);
    finder = match filters.sort {
        Some(ProductSort::PriceAsc) => finder.order_by_asc(ProdCol::Price),
        Some(ProductSort::PriceDesc) => finder.order_by_desc(ProdCol::Price),
        Some(ProductSort::NameAsc) => finder.order_by_asc(ProdCol::Name),
        Some(ProductSort::NameDesc) => finder.order_by_desc(ProdCol::Name),
        // Insertion order when no recognized sort key was given.
        None => finder.order_by_asc(ProdCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let last_page = ((total + CATALOG_PAGE_SIZE - 1) / CATALOG_PAGE_SIZE).max(1);
    let page = filters.page.min(last_page);
    let offset = (page - 1) * CATALOG_PAGE_SIZE;

    let products = finder
        .limit(CATALOG_PAGE_SIZE as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let categories = Categories::find()
        .order_by_asc(CatCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    let data = CatalogPage {
        products,
        categories,
        filters: EffectiveFilters {
            q: filters.q,
            category: filters.category,
            min_price: filters.min_price,
            max_price: filters.max_price,
            sort: filters.sort.map(|s| s.as_str().to_string()),
            page,
        },
    };

    let meta = Meta::new(page, CATALOG_PAGE_SIZE, total);
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", result, None))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CatCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    ))
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        category_id: model.category_id,
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
    }
}
