use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalog pages are a fixed nine products.
pub const CATALOG_PAGE_SIZE: i64 = 9;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl ProductSort {
    /// Allow-listed sort keys; anything else keeps default ordering.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "price_asc" => Some(Self::PriceAsc),
            "price_desc" => Some(Self::PriceDesc),
            "name_asc" => Some(Self::NameAsc),
            "name_desc" => Some(Self::NameDesc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }
}

/// Catalog query parameters exactly as they arrive, all untrusted
/// strings. Deserialization can never fail; everything is validated in
/// [`RawCatalogQuery::parse`].
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RawCatalogQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// The typed form of the catalog query. Malformed input cannot be
/// represented here: bad values are dropped during parsing, never
/// reported to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogFilters {
    pub q: Option<String>,
    pub category: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<ProductSort>,
    pub page: i64,
}

impl RawCatalogQuery {
    pub fn parse(self) -> CatalogFilters {
        let q = self
            .q
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let category = self
            .category
            .as_deref()
            .and_then(|s| Uuid::parse_str(s.trim()).ok());
        let min_price = parse_price(self.min_price.as_deref());
        let max_price = parse_price(self.max_price.as_deref());
        let sort = self.sort.as_deref().and_then(ProductSort::parse);
        // Non-numeric or sub-1 page numbers fall back to the first
        // page; clamping to the last page happens once the total is
        // known.
        let page = self
            .page
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        CatalogFilters {
            q,
            category,
            min_price,
            max_price,
            sort,
            page,
        }
    }
}

/// Negative prices are dropped along with unparseable ones.
fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    raw.and_then(|s| Decimal::from_str(s.trim()).ok())
        .filter(|d| !d.is_sign_negative())
}
