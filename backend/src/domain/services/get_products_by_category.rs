//! Category landing page listings.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::ports::{
    CategoryRepository, DEFAULT_PRODUCT_PAGE_SIZE, ProductRepository, ProductSearchParams,
    ProductSort,
};
use crate::domain::{Category, DomainResult, Error, Product};

/// Options for [`GetProductsByCategory::execute`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryListingOptions {
    /// Defaults to `true`.
    pub include_descendants: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort: Option<ProductSort>,
    pub country: Option<String>,
}

/// Products listed under one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProducts {
    pub products: Vec<Product>,
    pub category: Category,
    pub total: u64,
}

/// List products for an active category.
#[derive(Clone)]
pub struct GetProductsByCategory<P: ?Sized, C: ?Sized> {
    products: Arc<P>,
    categories: Arc<C>,
}

impl<P: ?Sized, C: ?Sized> GetProductsByCategory<P, C> {
    /// Create the service over product and category repositories.
    pub fn new(products: Arc<P>, categories: Arc<C>) -> Self {
        Self {
            products,
            categories,
        }
    }
}

impl<P, C> GetProductsByCategory<P, C>
where
    P: ProductRepository + ?Sized,
    C: CategoryRepository + ?Sized,
{
    /// Fetch the category and its listed products.
    ///
    /// An inactive category is a `Policy` error; an unknown one is
    /// `NotFound`.
    pub async fn execute(
        &self,
        category_id: Uuid,
        options: CategoryListingOptions,
    ) -> DomainResult<CategoryProducts> {
        let category = self.categories.get_by_id(category_id).await?;
        if !category.is_active {
            return Err(Error::policy("Category is not active"));
        }

        let params = ProductSearchParams {
            category_id: Some(category_id),
            include_descendants: options.include_descendants.unwrap_or(true),
            limit: Some(options.limit.unwrap_or(DEFAULT_PRODUCT_PAGE_SIZE)),
            offset: options.offset,
            sort: Some(options.sort.unwrap_or(ProductSort::NEWEST)),
            country_code: options.country,
            ..ProductSearchParams::default()
        };
        let page = self.products.search(&params).await?;

        Ok(CategoryProducts {
            products: page.items,
            category,
            total: page.total,
        })
    }
}
