//! Session layer configuration.
//!
//! The cart is the only request-spanning state; it lives in a
//! Postgres-backed tower-sessions store keyed by a browser-held
//! cookie.

use tower_sessions::{Expiry, SessionManagerLayer, cookie::SameSite, cookie::time::Duration};
use tower_sessions_sqlx_store::PostgresStore;

use crate::db::DbPool;

pub const SESSION_COOKIE_NAME: &str = "storefront_session";

/// Sessions expire after two weeks of inactivity.
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

pub fn session_store(pool: &DbPool) -> PostgresStore {
    PostgresStore::new(pool.clone())
}

pub fn session_layer(store: PostgresStore) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
