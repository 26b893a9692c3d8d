//! Homepage featured products.

use std::sync::Arc;

use crate::domain::ports::ProductRepository;
use crate::domain::visibility::is_listed;
use crate::domain::{DomainResult, Error, Product};

/// Number of featured products shown when the caller does not ask.
pub const DEFAULT_FEATURED_LIMIT: u32 = 10;
/// Largest featured product request.
pub const MAX_FEATURED_LIMIT: u32 = 50;

/// Select presentable promoted products.
#[derive(Clone)]
pub struct GetFeaturedProducts<P: ?Sized> {
    products: Arc<P>,
}

impl<P: ?Sized> GetFeaturedProducts<P> {
    /// Create the service over a product repository.
    pub fn new(products: Arc<P>) -> Self {
        Self { products }
    }
}

fn is_presentable(product: &Product) -> bool {
    is_listed(product) && product.has_images() && product.has_title()
}

impl<P> GetFeaturedProducts<P>
where
    P: ProductRepository + ?Sized,
{
    /// Fetch up to `limit` promoted products, optionally for one country.
    ///
    /// Products without images or a title are dropped even when the
    /// repository returns them, so fewer than `limit` may come back.
    pub async fn execute(&self, limit: u32, country: Option<&str>) -> DomainResult<Vec<Product>> {
        if !(1..=MAX_FEATURED_LIMIT).contains(&limit) {
            return Err(Error::validation("Limit must be between 1 and 50"));
        }

        let promoted = self.products.get_promoted(limit).await?;
        Ok(promoted
            .into_iter()
            .filter(|product| country.is_none_or(|code| product.country_code.as_deref() == Some(code)))
            .filter(is_presentable)
            .take(limit as usize)
            .collect())
    }
}
