use axum::{
    Json, Router,
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    cart::CartStore,
    dto::cart::{AddToCartRequest, CartView},
    error::{AppResult, CART_PATH},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(view_cart))
        .route("/add/{product_id}", post(add_to_cart))
        .route("/remove/{product_id}", post(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current cart with line totals", body = ApiResponse<CartView>),
        (status = 404, description = "A cart entry references a product that no longer exists"),
    ),
    tag = "Cart"
)]
pub async fn view_cart(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = CartStore::new(&session).load().await?;
    let resp = cart_service::view_cart(&state, &cart).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/add/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 303, description = "Redirects to the cart view"),
        (status = 400, description = "Non-positive quantity"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<Uuid>,
    payload: Option<Json<AddToCartRequest>>,
) -> AppResult<Redirect> {
    let Json(payload) = payload.unwrap_or_default();
    let store = CartStore::new(&session);
    let mut cart = store.load().await?;
    cart_service::add_to_cart(&state, &mut cart, product_id, payload.quantity).await?;
    store.save(&cart).await?;
    Ok(Redirect::to(CART_PATH))
}

#[utoipa::path(
    post,
    path = "/api/cart/remove/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 303, description = "Redirects to the cart view; removing an absent product is a no-op"),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<Uuid>,
) -> AppResult<Redirect> {
    let store = CartStore::new(&session);
    let mut cart = store.load().await?;
    cart_service::remove_from_cart(&state, &mut cart, product_id).await?;
    store.save(&cart).await?;
    Ok(Redirect::to(CART_PATH))
}
