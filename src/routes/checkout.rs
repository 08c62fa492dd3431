use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::{
    cart::CartStore,
    dto::{cart::CartView, orders::OrderWithItems},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{cart_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(review))
        .route("/", post(place_order))
}

#[utoipa::path(
    get,
    path = "/api/checkout",
    responses(
        (status = 200, description = "Checkout review: cart lines and recomputed total", body = ApiResponse<CartView>),
        (status = 303, description = "Redirects to login when unauthenticated, or to the cart view when the cart is empty"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn review(
    State(state): State<AppState>,
    _user: AuthUser,
    session: Session,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let cart = CartStore::new(&session).load().await?;
    if cart.is_empty() {
        return Err(AppError::CartEmpty);
    }
    let resp = cart_service::view_cart(&state, &cart).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/checkout",
    responses(
        (status = 200, description = "Order created; stock decremented; cart cleared", body = ApiResponse<OrderWithItems>),
        (status = 303, description = "Redirects to login when unauthenticated, or to the cart view when the cart is empty"),
        (status = 400, description = "Insufficient stock or an item no longer available"),
    ),
    security(("bearer_auth" = [])),
    tag = "Checkout"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    session: Session,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let store = CartStore::new(&session);
    let cart = store.load().await?;
    let resp = order_service::checkout(&state, &user, &cart).await?;
    // The transaction committed; this is the only path that empties
    // the cart.
    store.clear().await?;
    Ok(Json(resp))
}
