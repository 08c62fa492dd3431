//! Session-backed shopping cart.
//!
//! The cart itself is a plain value object; the only component that
//! touches the session is [`CartStore`], a thin capability wrapper
//! around the tower-sessions [`Session`]. Everything else receives a
//! [`Cart`] by value and stays oblivious to where it is stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppResult;

const CART_KEY: &str = "cart";

/// Mapping from product id to quantity, held in per-visitor session
/// state for the session's lifetime. Product existence is not checked
/// when entries are added; it is resolved when the cart is rendered or
/// checked out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<Uuid, i32>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn quantity(&self, product_id: Uuid) -> i32 {
        self.lines.get(&product_id).copied().unwrap_or(0)
    }

    /// Add `quantity` of a product; quantities accumulate when the
    /// entry already exists, saturating at `i32::MAX` so repeated adds
    /// cannot wrap negative. Callers validate that `quantity` is
    /// positive before reaching this point.
    pub fn add(&mut self, product_id: Uuid, quantity: i32) {
        let line = self.lines.entry(product_id).or_insert(0);
        *line = line.saturating_add(quantity);
    }

    /// Remove an entry; a no-op when the product is not in the cart.
    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.remove(&product_id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Uuid, i32)> + '_ {
        self.lines.iter().map(|(id, qty)| (*id, *qty))
    }

    pub fn product_ids(&self) -> Vec<Uuid> {
        self.lines.keys().copied().collect()
    }
}

/// Session access for the cart; the single place the session key is
/// read or written.
pub struct CartStore<'a> {
    session: &'a Session,
}

impl<'a> CartStore<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Current cart, defaulting to empty when the session has none.
    pub async fn load(&self) -> AppResult<Cart> {
        Ok(self
            .session
            .get::<Cart>(CART_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn save(&self, cart: &Cart) -> AppResult<()> {
        self.session.insert(CART_KEY, cart).await?;
        Ok(())
    }

    pub async fn clear(&self) -> AppResult<()> {
        self.session.remove::<Cart>(CART_KEY).await?;
        Ok(())
    }
}
