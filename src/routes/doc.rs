use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartLineView, CartView},
        catalog::{CatalogPage, CategoryList, EffectiveFilters},
        orders::{OrderList, OrderWithItems},
        profile::UpdateProfileRequest,
    },
    models::{Category, Order, OrderItem, Product, User, UserProfile},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, catalog, checkout, health, orders, params, profile},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        catalog::list_products,
        catalog::get_product,
        catalog::list_categories,
        cart::view_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        checkout::review,
        checkout::place_order,
        orders::list_orders,
        orders::get_order,
        profile::get_profile,
        profile::update_profile,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::create_category,
        admin::delete_category,
        admin::list_all_orders,
        admin::list_low_stock
    ),
    components(
        schemas(
            User,
            UserProfile,
            Category,
            Product,
            Order,
            OrderItem,
            AddToCartRequest,
            CartLineView,
            CartView,
            CatalogPage,
            CategoryList,
            EffectiveFilters,
            OrderList,
            OrderWithItems,
            UpdateProfileRequest,
            admin::CreateProductRequest,
            admin::UpdateProductRequest,
            admin::CreateCategoryRequest,
            admin::LowStockQuery,
            admin::ProductListReport,
            params::Pagination,
            params::RawCatalogQuery,
            params::ProductSort,
            Meta,
            ApiResponse<Product>,
            ApiResponse<CatalogPage>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Catalog browsing"),
        (name = "Cart", description = "Session cart"),
        (name = "Checkout", description = "Checkout and order creation"),
        (name = "Orders", description = "Order history"),
        (name = "Profile", description = "Account profile"),
        (name = "Admin", description = "Back-office maintenance and reporting"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
