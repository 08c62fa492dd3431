use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    cart::Cart,
    dto::cart::{CartLineView, CartView},
    entity::products::{Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    services::catalog_service::product_from_entity,
    state::AppState,
};

/// Join the cart against current products and recompute the total.
/// Totals are never cached: a price change between add-to-cart and
/// here is reflected immediately. A product that has vanished since
/// being added surfaces as `NotFound`.
pub async fn view_cart(state: &AppState, cart: &Cart) -> AppResult<ApiResponse<CartView>> {
    let models = Products::find()
        .filter(ProdCol::Id.is_in(cart.product_ids()))
        .all(&state.orm)
        .await?;

    let mut lines = Vec::with_capacity(cart.len());
    let mut total = Decimal::ZERO;
    for (product_id, quantity) in cart.iter() {
        let model = models
            .iter()
            .find(|m| m.id == product_id)
            .cloned()
            .ok_or(AppError::NotFound)?;
        let product = product_from_entity(model);
        let line_total = product.price * Decimal::from(quantity);
        total += line_total;
        lines.push(CartLineView {
            product,
            quantity,
            line_total,
        });
    }

    Ok(ApiResponse::success(
        "Cart",
        CartView { lines, total },
        Some(Meta::empty()),
    ))
}

/// Accumulate `quantity` of a product into the cart. The product is
/// not required to exist yet; existence is resolved when the cart is
/// rendered or checked out.
pub async fn add_to_cart(
    state: &AppState,
    cart: &mut Cart,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    cart.add(product_id, quantity);

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "cart_add",
        Some("cart"),
        Some(serde_json::json!({ "product_id": product_id, "quantity": quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

/// Drop a product from the cart; a no-op when it was never there.
pub async fn remove_from_cart(state: &AppState, cart: &mut Cart, product_id: Uuid) -> AppResult<()> {
    cart.remove(product_id);

    if let Err(err) = log_audit(
        &state.pool,
        None,
        "cart_remove",
        Some("cart"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}
