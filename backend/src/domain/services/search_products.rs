//! Product search with input limits and listing defaults.

use std::sync::Arc;

use crate::domain::ports::{
    DEFAULT_PRODUCT_PAGE_SIZE, ProductRepository, ProductSearchParams, ProductSearchResult,
    ProductSort,
};
use crate::domain::visibility::is_listed;
use crate::domain::{DomainResult, Error};

/// Longest accepted free-text query.
pub const MAX_QUERY_LEN: usize = 255;
/// Largest accepted page size.
pub const MAX_SEARCH_LIMIT: u32 = 100;
pub const MAX_CATEGORY_FILTERS: usize = 50;
pub const MAX_CONDITION_FILTERS: usize = 10;
pub const MAX_SIZE_FILTERS: usize = 20;
pub const MAX_BRAND_FILTERS: usize = 20;

/// Validate search input, apply defaults and keep only listed results.
#[derive(Clone)]
pub struct SearchProducts<P: ?Sized> {
    products: Arc<P>,
}

impl<P: ?Sized> SearchProducts<P> {
    /// Create the service over a product repository.
    pub fn new(products: Arc<P>) -> Self {
        Self { products }
    }
}

fn validation_problems(params: &ProductSearchParams) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if params
        .query
        .as_deref()
        .is_some_and(|query| query.chars().count() > MAX_QUERY_LEN)
    {
        problems.push("Search query is too long");
    }
    if [params.min_price, params.max_price]
        .into_iter()
        .flatten()
        .any(|price| !price.is_finite())
    {
        problems.push("Price bounds must be finite numbers");
    }
    if params.min_price.is_some_and(|price| price < 0.0) {
        problems.push("Minimum price cannot be negative");
    }
    if params.max_price.is_some_and(|price| price < 0.0) {
        problems.push("Maximum price cannot be negative");
    }
    if let (Some(min), Some(max)) = (params.min_price, params.max_price) {
        if min > max {
            problems.push("Minimum price cannot be greater than maximum price");
        }
    }
    if params
        .limit
        .is_some_and(|limit| !(1..=MAX_SEARCH_LIMIT).contains(&limit))
    {
        problems.push("Limit must be between 1 and 100");
    }
    if params.category_ids.len() > MAX_CATEGORY_FILTERS {
        problems.push("Too many category filters");
    }
    if params.conditions.len() > MAX_CONDITION_FILTERS {
        problems.push("Too many condition filters");
    }
    if params.sizes.len() > MAX_SIZE_FILTERS {
        problems.push("Too many size filters");
    }
    if params.brands.len() > MAX_BRAND_FILTERS {
        problems.push("Too many brand filters");
    }
    problems
}

impl<P> SearchProducts<P>
where
    P: ProductRepository + ?Sized,
{
    /// Run a search.
    ///
    /// All input problems are reported together as one
    /// `"Validation failed: a, b"` error.
    pub async fn execute(&self, params: ProductSearchParams) -> DomainResult<ProductSearchResult> {
        let problems = validation_problems(&params);
        if !problems.is_empty() {
            return Err(Error::validation(format!(
                "Validation failed: {}",
                problems.join(", ")
            )));
        }

        let params = ProductSearchParams {
            limit: Some(params.limit.unwrap_or(DEFAULT_PRODUCT_PAGE_SIZE)),
            sort: Some(params.sort.unwrap_or(ProductSort::NEWEST)),
            ..params
        };
        let mut page = self.products.search(&params).await?;
        page.items.retain(is_listed);
        Ok(page)
    }
}
