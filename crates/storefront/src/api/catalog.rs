//! Product catalog client.
//!
//! Listings are cached for 5 minutes keyed by the full query, so paging back
//! and forth through a listing does not hit the backend again.

use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use zentro_core::{CartSnapshot, CategoryId, ProductSummary};

use super::conversions::convert_product;
use super::types::{Pagination, ProductsResponse};
use super::{ApiClient, RemoteError};

const PRODUCTS_PATH: &str = "api/products";

/// Page size the backend uses when none is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 8;

/// Largest page size the backend will serve.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Upper bound on pages walked when pricing a cached cart.
const MAX_JOIN_PAGES: u32 = 10;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProductSort {
    /// Most recently added first.
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    const fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Newest => None,
            Self::PriceAsc => Some("price_asc"),
            Self::PriceDesc => Some("price_desc"),
        }
    }
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            other => Err(format!(
                "unknown sort '{other}' (expected newest, price_asc, or price_desc)"
            )),
        }
    }
}

/// A product listing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    /// 1-indexed page number.
    pub page: u32,
    /// Page size, clamped to [`MAX_PAGE_SIZE`].
    pub limit: u32,
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    pub sort: ProductSort,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            category: None,
            search: None,
            sort: ProductSort::Newest,
        }
    }
}

impl ProductQuery {
    /// The same query for another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Clamp out-of-range values the way the backend would.
    fn normalized(&self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
            category: self.category,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            sort: self.sort,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<ProductSummary>,
    pub pagination: Pagination,
}

/// Client for `/api/products` with an in-memory listing cache.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    cache: Cache<ProductQuery, ProductPage>,
}

impl CatalogClient {
    /// Create a catalog client sharing `api`'s connection pool.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { api, cache }
    }

    /// Fetch one page of products.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, RemoteError> {
        let query = query.normalized();

        if let Some(page) = self.cache.get(&query).await {
            debug!("Product listing cache hit");
            return Ok(page);
        }

        let mut url = self.api.endpoint(PRODUCTS_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("limit", &query.limit.to_string());
            if let Some(category) = query.category {
                pairs.append_pair("category", &category.to_string());
            }
            if let Some(search) = &query.search {
                pairs.append_pair("search", search);
            }
            if let Some(sort) = query.sort.as_param() {
                pairs.append_pair("sort", sort);
            }
        }

        let response: ProductsResponse = self.api.get(url).await?;
        if !response.success {
            return Err(RemoteError::Rejected(response.message.unwrap_or_default()));
        }

        let page = ProductPage {
            products: response.products.into_iter().map(convert_product).collect(),
            pagination: response.pagination,
        };
        debug!(count = page.products.len(), "Fetched product listing");
        self.cache.insert(query, page.clone()).await;
        Ok(page)
    }

    /// Price a snapshot whose lines have no product data, typically one
    /// restored from the local cache.
    ///
    /// Walks the full listing until every line is priced or the listing ends.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if a listing request fails. Products joined
    /// before the failure stay joined.
    #[instrument(skip(self, snapshot))]
    pub async fn join_into(&self, snapshot: &mut CartSnapshot) -> Result<(), RemoteError> {
        let query = ProductQuery {
            limit: MAX_PAGE_SIZE,
            ..ProductQuery::default()
        };

        for page_number in 1..=MAX_JOIN_PAGES {
            let wanted = snapshot.unpriced_products();
            if wanted.is_empty() {
                return Ok(());
            }

            let page = self.list_products(&query.with_page(page_number)).await?;
            snapshot.join_products(
                page.products
                    .into_iter()
                    .filter(|p| wanted.contains(&p.id)),
            );

            if !page.pagination.has_next {
                break;
            }
        }

        let missing = snapshot.unpriced_products();
        if !missing.is_empty() {
            debug!(missing = missing.len(), "Some cart products are not in the listing");
        }
        Ok(())
    }

    /// Drop every cached listing.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_normalization() {
        let query = ProductQuery {
            page: 0,
            limit: 500,
            category: None,
            search: Some("   ".to_string()),
            sort: ProductSort::PriceAsc,
        }
        .normalized();

        assert_eq!(query.page, 1);
        assert_eq!(query.limit, MAX_PAGE_SIZE);
        assert_eq!(query.search, None);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("price_desc".parse::<ProductSort>(), Ok(ProductSort::PriceDesc));
        assert_eq!("newest".parse::<ProductSort>(), Ok(ProductSort::Newest));
        assert!("cheapest".parse::<ProductSort>().is_err());
        assert_eq!(ProductSort::Newest.as_param(), None);
    }

    #[test]
    fn test_with_page_keeps_filters() {
        let query = ProductQuery {
            search: Some("kurta".to_string()),
            ..ProductQuery::default()
        };
        let next = query.with_page(3);
        assert_eq!(next.page, 3);
        assert_eq!(next.search.as_deref(), Some("kurta"));
        assert_eq!(next.limit, DEFAULT_PAGE_SIZE);
    }
}
