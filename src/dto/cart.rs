use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

impl Default for AddToCartRequest {
    fn default() -> Self {
        Self {
            quantity: default_quantity(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineView {
    pub product: Product,
    pub quantity: i32,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: Decimal,
}
