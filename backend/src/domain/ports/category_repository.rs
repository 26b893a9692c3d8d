//! Read-side port for the category taxonomy.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Breadcrumb, Category, CategoryTree, DomainResult, Error};

/// Default result cap for [`CategoryRepository::search`].
pub const DEFAULT_CATEGORY_SEARCH_LIMIT: u32 = 20;

/// Port for reading categories.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Fetch a category by id, whether or not it is active.
    ///
    /// Callers enforce the active flag as policy.
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Category>;

    /// Fetch an active category by slug.
    async fn get_by_slug(&self, slug: &str) -> DomainResult<Category>;

    /// Every active category ordered by `sort_order`, then `name`.
    async fn get_all(&self) -> DomainResult<Vec<Category>>;

    /// Active categories arranged by parent.
    async fn get_tree(&self) -> DomainResult<CategoryTree>;

    /// Ancestor chain from the root down to `category_id`.
    ///
    /// An ancestor lookup failure yields a partial breadcrumb rather than an
    /// error; only a failure on `category_id` itself is returned as `Err`.
    async fn get_breadcrumb(&self, category_id: Uuid) -> DomainResult<Breadcrumb>;

    /// Active direct children of `category_id`.
    async fn get_descendants(&self, category_id: Uuid) -> DomainResult<Vec<Category>>;

    /// Active categories at `level`.
    async fn get_by_level(&self, level: i32) -> DomainResult<Vec<Category>>;

    /// Active categories whose name or description contains `query`.
    async fn search(&self, query: &str, limit: u32) -> DomainResult<Vec<Category>>;

    /// Resolve a URL path of category slugs to category ids.
    ///
    /// Only the final segment is resolved; the result holds at most one id.
    async fn resolve_segments(&self, segments: &[String]) -> DomainResult<Vec<Uuid>>;
}

/// Fixture implementation with an empty taxonomy.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCategoryRepository;

#[async_trait]
impl CategoryRepository for FixtureCategoryRepository {
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Category> {
        Err(Error::not_found("Category", id.to_string()))
    }

    async fn get_by_slug(&self, slug: &str) -> DomainResult<Category> {
        Err(Error::not_found("Category", slug))
    }

    async fn get_all(&self) -> DomainResult<Vec<Category>> {
        Ok(Vec::new())
    }

    async fn get_tree(&self) -> DomainResult<CategoryTree> {
        Ok(CategoryTree::default())
    }

    async fn get_breadcrumb(&self, category_id: Uuid) -> DomainResult<Breadcrumb> {
        Err(Error::not_found("Category", category_id.to_string()))
    }

    async fn get_descendants(&self, _category_id: Uuid) -> DomainResult<Vec<Category>> {
        Ok(Vec::new())
    }

    async fn get_by_level(&self, _level: i32) -> DomainResult<Vec<Category>> {
        Ok(Vec::new())
    }

    async fn search(&self, _query: &str, _limit: u32) -> DomainResult<Vec<Category>> {
        Ok(Vec::new())
    }

    async fn resolve_segments(&self, segments: &[String]) -> DomainResult<Vec<Uuid>> {
        match segments.last() {
            None => Ok(Vec::new()),
            Some(last) => Err(Error::validation(format!("Category not found: {last}"))),
        }
    }
}
