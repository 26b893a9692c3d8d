//! Read-side port for product listings.
//!
//! Implementations return fully mapped [`Product`] entities with images and
//! seller/category display fields attached. Backend failures surface as
//! [`crate::domain::Error::Validation`]; missing rows as `NotFound`.

use async_trait::async_trait;
use pagination::Page;
use uuid::Uuid;

use super::SortDirection;
use crate::domain::{DomainResult, Error, Product, ProductCondition};

/// Page of search results with total and keyset cursor.
pub type ProductSearchResult = Page<Product>;

/// Default page size for product listings.
pub const DEFAULT_PRODUCT_PAGE_SIZE: u32 = 20;

/// Sortable product attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSortField {
    #[default]
    CreatedAt,
    Price,
    Popularity,
    /// No ranking signal exists yet; sorts as the `created_at` fallback.
    Relevance,
}

impl ProductSortField {
    /// Backing column, or `None` when only the fallback ordering applies.
    pub fn column(self) -> Option<&'static str> {
        match self {
            Self::CreatedAt => Some("created_at"),
            Self::Price => Some("price"),
            Self::Popularity => Some("favorite_count"),
            Self::Relevance => None,
        }
    }
}

/// Requested ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductSort {
    pub by: ProductSortField,
    pub direction: SortDirection,
}

impl ProductSort {
    /// Newest first.
    pub const NEWEST: Self = Self {
        by: ProductSortField::CreatedAt,
        direction: SortDirection::Desc,
    };

    /// Return `true` when keyset cursors are valid for this ordering.
    pub fn supports_cursor(self) -> bool {
        matches!(self.by, ProductSortField::CreatedAt)
    }
}

/// Product search criteria.
///
/// `category_id` takes precedence over `category_ids` when both are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductSearchParams {
    pub query: Option<String>,
    pub category_ids: Vec<Uuid>,
    pub category_id: Option<Uuid>,
    /// Accepted for callers; the search still matches the exact category.
    pub include_descendants: bool,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub conditions: Vec<ProductCondition>,
    pub sizes: Vec<String>,
    pub brands: Vec<String>,
    pub location: Option<String>,
    pub seller_id: Option<Uuid>,
    pub country_code: Option<String>,
    pub sort: Option<ProductSort>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Opaque token from a previous page's `next_cursor`.
    pub cursor: Option<String>,
}

/// Criteria for [`ProductRepository::count`].
///
/// `is_active` defaults to `true` and `is_sold` to `false`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductSearchFilters {
    pub category_ids: Vec<Uuid>,
    pub category_id: Option<Uuid>,
    pub include_descendants: bool,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub conditions: Vec<ProductCondition>,
    pub sizes: Vec<String>,
    pub brands: Vec<String>,
    pub location: Option<String>,
    pub seller_id: Option<Uuid>,
    pub country_code: Option<String>,
    pub is_active: Option<bool>,
    pub is_sold: Option<bool>,
}

/// Options for seller and category listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort: Option<ProductSort>,
    /// Include unpublished listings (seller dashboards).
    pub include_inactive: bool,
}

/// Port for reading product listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetch one active product by id.
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Product>;

    /// Fetch an active product by slug, confirming it belongs to
    /// `seller_username`.
    async fn get_by_slug_and_seller(
        &self,
        slug: &str,
        seller_username: &str,
    ) -> DomainResult<Product>;

    /// Search listed products with offset or cursor pagination.
    async fn search(&self, params: &ProductSearchParams) -> DomainResult<ProductSearchResult>;

    /// Most recent listed products.
    async fn get_promoted(&self, limit: u32) -> DomainResult<Vec<Product>>;

    /// Products owned by `seller_id`.
    async fn get_by_seller(
        &self,
        seller_id: Uuid,
        options: &ProductListOptions,
    ) -> DomainResult<Vec<Product>>;

    /// Products filed under `category_id`.
    async fn get_by_category_tree(
        &self,
        category_id: Uuid,
        options: &ProductListOptions,
    ) -> DomainResult<ProductSearchResult>;

    /// Count products matching `filters`.
    async fn count(&self, filters: &ProductSearchFilters) -> DomainResult<u64>;
}

/// Fixture implementation with no products.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProductRepository;

#[async_trait]
impl ProductRepository for FixtureProductRepository {
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Product> {
        Err(Error::not_found("Product", id.to_string()))
    }

    async fn get_by_slug_and_seller(
        &self,
        slug: &str,
        seller_username: &str,
    ) -> DomainResult<Product> {
        Err(Error::not_found(
            "Product",
            format!("{slug} by {seller_username}"),
        ))
    }

    async fn search(&self, params: &ProductSearchParams) -> DomainResult<ProductSearchResult> {
        let page_size = params.limit.unwrap_or(DEFAULT_PRODUCT_PAGE_SIZE);
        Ok(Page::new(Vec::new(), 0, page_size as usize, None))
    }

    async fn get_promoted(&self, _limit: u32) -> DomainResult<Vec<Product>> {
        Ok(Vec::new())
    }

    async fn get_by_seller(
        &self,
        _seller_id: Uuid,
        _options: &ProductListOptions,
    ) -> DomainResult<Vec<Product>> {
        Ok(Vec::new())
    }

    async fn get_by_category_tree(
        &self,
        _category_id: Uuid,
        options: &ProductListOptions,
    ) -> DomainResult<ProductSearchResult> {
        let page_size = options.limit.unwrap_or(DEFAULT_PRODUCT_PAGE_SIZE);
        Ok(Page::new(Vec::new(), 0, page_size as usize, None))
    }

    async fn count(&self, _filters: &ProductSearchFilters) -> DomainResult<u64> {
        Ok(0)
    }
}
