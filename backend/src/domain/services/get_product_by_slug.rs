//! Product detail lookup by seller-scoped slug.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::ProductRepository;
use crate::domain::visibility::unlisted_reason;
use crate::domain::{DomainResult, Error, Product};

/// Longest accepted product slug.
pub const MAX_PRODUCT_SLUG_LEN: usize = 255;
/// Longest accepted seller username.
pub const MAX_SELLER_USERNAME_LEN: usize = 50;

/// Resolve `/<seller>/<slug>` product URLs.
#[derive(Clone)]
pub struct GetProductBySlug<P: ?Sized> {
    products: Arc<P>,
}

impl<P: ?Sized> GetProductBySlug<P> {
    /// Create the service over a product repository.
    pub fn new(products: Arc<P>) -> Self {
        Self { products }
    }
}

impl<P> GetProductBySlug<P>
where
    P: ProductRepository + ?Sized,
{
    /// Fetch the product and enforce that it is still listed.
    ///
    /// Returns `Policy` for an inactive or sold product, distinct from the
    /// `NotFound` raised when no such listing exists.
    pub async fn execute(&self, slug: &str, seller_username: &str) -> DomainResult<Product> {
        let slug = slug.trim();
        let seller_username = seller_username.trim();
        if slug.is_empty() {
            return Err(Error::validation("Product slug is required"));
        }
        if seller_username.is_empty() {
            return Err(Error::validation("Seller username is required"));
        }
        if slug.chars().count() > MAX_PRODUCT_SLUG_LEN {
            return Err(Error::validation("Product slug is too long"));
        }
        if seller_username.chars().count() > MAX_SELLER_USERNAME_LEN {
            return Err(Error::validation("Seller username is too long"));
        }

        let product = self
            .products
            .get_by_slug_and_seller(slug, seller_username)
            .await?;
        if let Some(reason) = unlisted_reason(&product) {
            debug!(product_id = %product.id, reason, "product lookup rejected by policy");
            return Err(Error::policy(reason));
        }
        Ok(product)
    }
}
