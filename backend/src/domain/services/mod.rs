//! Domain services.
//!
//! Each service wraps one use case behind an `execute`-style method and
//! depends on repository ports through `Arc`, so the same service runs over
//! the REST adapter in production and mocks in tests.

mod get_featured_products;
mod get_product_by_slug;
mod get_products_by_category;
mod resolve_category_segments;
mod search_products;
mod unique_slug;

#[cfg(test)]
pub(crate) mod fixtures;

pub use get_featured_products::{DEFAULT_FEATURED_LIMIT, GetFeaturedProducts, MAX_FEATURED_LIMIT};
pub use get_product_by_slug::{GetProductBySlug, MAX_PRODUCT_SLUG_LEN, MAX_SELLER_USERNAME_LEN};
pub use get_products_by_category::{
    CategoryListingOptions, CategoryProducts, GetProductsByCategory,
};
pub use resolve_category_segments::{MAX_CATEGORY_DEPTH, ResolveCategorySegments};
pub use search_products::{
    MAX_BRAND_FILTERS, MAX_CATEGORY_FILTERS, MAX_CONDITION_FILTERS, MAX_QUERY_LEN,
    MAX_SEARCH_LIMIT, MAX_SIZE_FILTERS, SearchProducts,
};
pub use unique_slug::{COLLISION_SUFFIX_LEN, MAX_SLUG_ATTEMPTS, SlugGeneration, UniqueSlugGenerator};
