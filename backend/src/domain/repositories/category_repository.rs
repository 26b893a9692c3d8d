//! Category repository backed by the [`DataPort`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use super::rows::{CATEGORY_COLUMNS, RowMappingError, collect_rows, row_to_category};
use crate::domain::ports::{
    CategoryRepository, DataPort, DataPortError, Filter, Order, Table, TableQuery,
};
use crate::domain::visibility::ACTIVE_COLUMN;
use crate::domain::{
    Breadcrumb, BreadcrumbCompleteness, Category, CategoryTree, DomainResult, Error,
};

/// Upper bound on breadcrumb length; guards against cyclic parent links.
pub const MAX_BREADCRUMB_DEPTH: usize = 32;

/// [`CategoryRepository`] over any [`DataPort`] adapter.
#[derive(Clone)]
pub struct DataPortCategoryRepository {
    port: Arc<dyn DataPort>,
}

impl DataPortCategoryRepository {
    /// Create a repository that reads through `port`.
    pub fn new(port: Arc<dyn DataPort>) -> Self {
        Self { port }
    }

    async fn active_list(&self, query: TableQuery, context: &str) -> DomainResult<Vec<Category>> {
        let query = query.filter(Filter::eq(ACTIVE_COLUMN, true));
        let rows = self
            .port
            .list(&query)
            .await
            .map_err(|error| backend_failure(context, error))?;
        collect_rows(rows, row_to_category).map_err(mapping_failure)
    }
}

fn backend_failure(context: &str, error: DataPortError) -> Error {
    debug!(%error, context, "category query failed");
    Error::validation(format!("{context}: {error}"))
}

fn mapping_failure(error: RowMappingError) -> Error {
    debug!(%error, "category row could not be mapped");
    Error::validation(format!("Failed to map category row: {error}"))
}

fn map_lookup_error(error: DataPortError, identifier: String) -> Error {
    if error.is_no_rows() {
        Error::not_found("Category", identifier)
    } else {
        backend_failure("Failed to fetch category", error)
    }
}

#[async_trait]
impl CategoryRepository for DataPortCategoryRepository {
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Category> {
        let row = self
            .port
            .single(Table::Categories, id, CATEGORY_COLUMNS)
            .await
            .map_err(|error| map_lookup_error(error, id.to_string()))?;
        row_to_category(row).map_err(mapping_failure)
    }

    async fn get_by_slug(&self, slug: &str) -> DomainResult<Category> {
        let query = TableQuery::new(Table::Categories)
            .columns(CATEGORY_COLUMNS)
            .filter(Filter::eq("slug", slug))
            .filter(Filter::eq(ACTIVE_COLUMN, true));
        let row = self
            .port
            .select_one(&query)
            .await
            .map_err(|error| map_lookup_error(error, slug.to_owned()))?;
        row_to_category(row).map_err(mapping_failure)
    }

    async fn get_all(&self) -> DomainResult<Vec<Category>> {
        let query = TableQuery::new(Table::Categories)
            .columns(CATEGORY_COLUMNS)
            .order(Order::asc("sort_order"))
            .order(Order::asc("name"));
        self.active_list(query, "Failed to fetch categories").await
    }

    async fn get_tree(&self) -> DomainResult<CategoryTree> {
        Ok(CategoryTree::build(self.get_all().await?))
    }

    async fn get_breadcrumb(&self, category_id: Uuid) -> DomainResult<Breadcrumb> {
        let start = self.get_by_id(category_id).await?;
        let mut visited = HashSet::from([start.id]);
        let mut next = start.parent_id;
        let mut trail = vec![start];
        let mut completeness = BreadcrumbCompleteness::Complete;

        while let Some(parent_id) = next {
            if trail.len() >= MAX_BREADCRUMB_DEPTH || !visited.insert(parent_id) {
                warn!(%category_id, %parent_id, "category ancestry is cyclic or too deep");
                completeness = BreadcrumbCompleteness::Partial {
                    missing_ancestor: parent_id,
                    reason: Error::validation("Category hierarchy is cyclic or too deep"),
                };
                break;
            }
            match self.get_by_id(parent_id).await {
                Ok(parent) => {
                    next = parent.parent_id;
                    trail.push(parent);
                }
                Err(reason) => {
                    warn!(%category_id, %parent_id, %reason, "breadcrumb stopped at missing ancestor");
                    completeness = BreadcrumbCompleteness::Partial {
                        missing_ancestor: parent_id,
                        reason,
                    };
                    break;
                }
            }
        }

        trail.reverse();
        Ok(Breadcrumb {
            trail,
            completeness,
        })
    }

    async fn get_descendants(&self, category_id: Uuid) -> DomainResult<Vec<Category>> {
        let query = TableQuery::new(Table::Categories)
            .columns(CATEGORY_COLUMNS)
            .filter(Filter::eq("parent_id", category_id))
            .order(Order::asc("sort_order"));
        self.active_list(query, "Failed to fetch descendants").await
    }

    async fn get_by_level(&self, level: i32) -> DomainResult<Vec<Category>> {
        let query = TableQuery::new(Table::Categories)
            .columns(CATEGORY_COLUMNS)
            .filter(Filter::eq("level", level))
            .order(Order::asc("sort_order"));
        self.active_list(query, "Failed to fetch categories by level")
            .await
    }

    async fn search(&self, query: &str, limit: u32) -> DomainResult<Vec<Category>> {
        let needle = query.trim();
        let request = TableQuery::new(Table::Categories)
            .columns(CATEGORY_COLUMNS)
            .filter(Filter::or([
                Filter::contains("name", needle),
                Filter::contains("description", needle),
            ]))
            .order(Order::asc("name"))
            .limit(limit);
        self.active_list(request, "Category search failed").await
    }

    async fn resolve_segments(&self, segments: &[String]) -> DomainResult<Vec<Uuid>> {
        let Some(last) = segments.last() else {
            return Ok(Vec::new());
        };
        if segments.len() > 1 {
            debug!(depth = segments.len(), "parent segments are not checked against the hierarchy");
        }

        match self.get_by_slug(last).await {
            Ok(category) => return Ok(vec![category.id]),
            Err(error) if error.is_not_found() => {}
            Err(error) => return Err(error),
        }

        let matches = self.search(last, 1).await?;
        matches
            .first()
            .map(|category| vec![category.id])
            .ok_or_else(|| Error::validation(format!("Category not found: {last}")))
    }
}

#[cfg(test)]
mod tests;
