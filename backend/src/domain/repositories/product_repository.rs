//! Product repository backed by the [`DataPort`].
//!
//! Search supports offset and keyset pagination. A keyset cursor encodes the
//! last row's `created_at` (epoch microseconds) and id; the next page selects
//! rows strictly after that pair in `(created_at, id)` order, so equal
//! timestamps never duplicate or skip rows.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Cursor, Page};
use tracing::{debug, warn};
use uuid::Uuid;

use super::rows::{PRODUCT_COLUMNS, RowMappingError, collect_rows, row_to_product, seller_username};
use crate::domain::ports::{
    DEFAULT_PRODUCT_PAGE_SIZE, DataPort, DataPortError, Filter, Order, ProductListOptions,
    ProductRepository, ProductSearchFilters, ProductSearchParams, ProductSearchResult,
    ProductSort, SortDirection, Table, TableQuery,
};
use crate::domain::visibility::{ACTIVE_COLUMN, SOLD_COLUMN, listed_filters};
use crate::domain::{DomainResult, Error, Product, ProductCondition};

const CREATED_AT: &str = "created_at";
const ID: &str = "id";

/// [`ProductRepository`] over any [`DataPort`] adapter.
#[derive(Clone)]
pub struct DataPortProductRepository {
    port: Arc<dyn DataPort>,
}

impl DataPortProductRepository {
    /// Create a repository that reads through `port`.
    pub fn new(port: Arc<dyn DataPort>) -> Self {
        Self { port }
    }
}

/// Attribute criteria shared by search and count.
struct Criteria<'a> {
    category_id: Option<Uuid>,
    category_ids: &'a [Uuid],
    include_descendants: bool,
    min_price: Option<f64>,
    max_price: Option<f64>,
    conditions: &'a [ProductCondition],
    sizes: &'a [String],
    brands: &'a [String],
    location: Option<&'a str>,
    seller_id: Option<Uuid>,
    country_code: Option<&'a str>,
}

impl<'a> From<&'a ProductSearchParams> for Criteria<'a> {
    fn from(params: &'a ProductSearchParams) -> Self {
        Self {
            category_id: params.category_id,
            category_ids: &params.category_ids,
            include_descendants: params.include_descendants,
            min_price: params.min_price,
            max_price: params.max_price,
            conditions: &params.conditions,
            sizes: &params.sizes,
            brands: &params.brands,
            location: params.location.as_deref(),
            seller_id: params.seller_id,
            country_code: params.country_code.as_deref(),
        }
    }
}

impl<'a> From<&'a ProductSearchFilters> for Criteria<'a> {
    fn from(filters: &'a ProductSearchFilters) -> Self {
        Self {
            category_id: filters.category_id,
            category_ids: &filters.category_ids,
            include_descendants: filters.include_descendants,
            min_price: filters.min_price,
            max_price: filters.max_price,
            conditions: &filters.conditions,
            sizes: &filters.sizes,
            brands: &filters.brands,
            location: filters.location.as_deref(),
            seller_id: filters.seller_id,
            country_code: filters.country_code.as_deref(),
        }
    }
}

impl Criteria<'_> {
    fn into_filters(self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(category_id) = self.category_id {
            if self.include_descendants {
                debug!(%category_id, "descendant expansion not applied; matching exact category");
            }
            filters.push(Filter::eq("category_id", category_id));
        } else if !self.category_ids.is_empty() {
            filters.push(Filter::is_in("category_id", self.category_ids.iter().copied()));
        }
        if let Some(min_price) = self.min_price {
            filters.push(Filter::gte("price", min_price));
        }
        if let Some(max_price) = self.max_price {
            filters.push(Filter::lte("price", max_price));
        }
        if !self.conditions.is_empty() {
            filters.push(Filter::is_in(
                "condition",
                self.conditions.iter().map(|condition| condition.as_str()),
            ));
        }
        if !self.sizes.is_empty() {
            filters.push(Filter::is_in("size", self.sizes.iter().map(String::as_str)));
        }
        if !self.brands.is_empty() {
            filters.push(Filter::is_in("brand", self.brands.iter().map(String::as_str)));
        }
        if let Some(location) = self.location.filter(|text| !text.trim().is_empty()) {
            filters.push(Filter::contains("location", location.trim()));
        }
        if let Some(seller_id) = self.seller_id {
            filters.push(Filter::eq("seller_id", seller_id));
        }
        if let Some(country_code) = self.country_code {
            filters.push(Filter::eq("country_code", country_code));
        }
        filters
    }
}

fn text_query_filter(query: Option<&str>) -> Option<Filter> {
    let needle = query.map(str::trim).filter(|text| !text.is_empty())?;
    Some(Filter::or(
        ["title", "description", "brand"]
            .into_iter()
            .map(|column| Filter::contains(column, needle)),
    ))
}

/// Primary ordering plus the `created_at, id` tie-breakers, without repeats.
fn sort_orders(sort: ProductSort) -> Vec<Order> {
    let mut orders: Vec<Order> = Vec::with_capacity(3);
    let mut push = |order: Order| {
        if !orders.iter().any(|existing| existing.column == order.column) {
            orders.push(order);
        }
    };
    if let Some(column) = sort.by.column() {
        push(Order {
            column: column.to_owned(),
            direction: sort.direction,
        });
    }
    let fallback = if sort.supports_cursor() {
        sort.direction
    } else {
        SortDirection::Desc
    };
    push(Order {
        column: CREATED_AT.to_owned(),
        direction: fallback,
    });
    push(Order {
        column: ID.to_owned(),
        direction: fallback,
    });
    orders
}

/// Position strictly after the cursor row in `(created_at, id)` order.
fn keyset_filter(token: &str, direction: SortDirection) -> Option<Filter> {
    let cursor = match Cursor::decode(token) {
        Ok(cursor) => cursor,
        Err(error) => {
            warn!(%error, "ignoring undecodable search cursor");
            return None;
        }
    };
    let Some(created_at) = DateTime::<Utc>::from_timestamp_micros(cursor.sort_key) else {
        warn!(sort_key = cursor.sort_key, "ignoring cursor with out-of-range timestamp");
        return None;
    };
    let id = match Uuid::parse_str(&cursor.id) {
        Ok(id) => id,
        Err(error) => {
            warn!(%error, "ignoring cursor with malformed id");
            return None;
        }
    };
    let (past_key, past_id) = match direction {
        SortDirection::Desc => (Filter::lt(CREATED_AT, created_at), Filter::lt(ID, id)),
        SortDirection::Asc => (Filter::gt(CREATED_AT, created_at), Filter::gt(ID, id)),
    };
    Some(Filter::or([
        past_key,
        Filter::and([Filter::eq(CREATED_AT, created_at), past_id]),
    ]))
}

fn cursor_after(product: &Product) -> String {
    Cursor::new(product.created_at.timestamp_micros(), product.id.to_string()).encode()
}

fn backend_failure(context: &str, error: DataPortError) -> Error {
    debug!(%error, context, "product query failed");
    Error::validation(format!("{context}: {error}"))
}

fn mapping_failure(error: RowMappingError) -> Error {
    debug!(%error, "product row could not be mapped");
    Error::validation(format!("Failed to map product row: {error}"))
}

fn map_single_error(error: DataPortError, identifier: String) -> Error {
    if error.is_no_rows() {
        Error::not_found("Product", identifier)
    } else {
        backend_failure("Failed to fetch product", error)
    }
}

#[async_trait]
impl ProductRepository for DataPortProductRepository {
    async fn get_by_id(&self, id: Uuid) -> DomainResult<Product> {
        let query = TableQuery::new(Table::Products)
            .columns(PRODUCT_COLUMNS)
            .filter(Filter::eq(ID, id))
            .filter(Filter::eq(ACTIVE_COLUMN, true));
        let row = self
            .port
            .select_one(&query)
            .await
            .map_err(|error| map_single_error(error, id.to_string()))?;
        row_to_product(row).map_err(mapping_failure)
    }

    async fn get_by_slug_and_seller(
        &self,
        slug: &str,
        username: &str,
    ) -> DomainResult<Product> {
        let identifier = || format!("{slug} by {username}");
        let query = TableQuery::new(Table::Products)
            .columns(PRODUCT_COLUMNS)
            .filter(Filter::eq("slug", slug))
            .filter(Filter::eq(ACTIVE_COLUMN, true));
        let rows = self
            .port
            .list(&query)
            .await
            .map_err(|error| map_single_error(error, identifier()))?;

        let row = rows
            .into_iter()
            .find(|row| seller_username(row) == Some(username))
            .ok_or_else(|| Error::not_found("Product", identifier()))?;
        row_to_product(row).map_err(mapping_failure)
    }

    async fn search(&self, params: &ProductSearchParams) -> DomainResult<ProductSearchResult> {
        let limit = params.limit.unwrap_or(DEFAULT_PRODUCT_PAGE_SIZE);
        let sort = params.sort.unwrap_or(ProductSort::NEWEST);

        let mut query = TableQuery::new(Table::Products)
            .columns(PRODUCT_COLUMNS)
            .filters(listed_filters())
            .filters(text_query_filter(params.query.as_deref()))
            .filters(Criteria::from(params).into_filters())
            .limit(limit)
            .with_count();
        for order in sort_orders(sort) {
            query = query.order(order);
        }

        let mut offset = params.offset.unwrap_or(0);
        if let Some(token) = params.cursor.as_deref() {
            if sort.supports_cursor() {
                if let Some(filter) = keyset_filter(token, sort.direction) {
                    query = query.filter(filter);
                    offset = 0;
                }
            } else {
                debug!(sort = ?sort.by, "cursor ignored for non-temporal sort");
            }
        }
        let query = query.offset(offset);

        let selection = self
            .port
            .select(&query)
            .await
            .map_err(|error| backend_failure("Search failed", error))?;
        let products = collect_rows(selection.rows, row_to_product).map_err(mapping_failure)?;
        let total = selection.count.unwrap_or(products.len() as u64);
        let next_cursor = products
            .last()
            .filter(|_| sort.supports_cursor())
            .map(cursor_after);

        Ok(Page::new(products, total, limit as usize, next_cursor))
    }

    async fn get_promoted(&self, limit: u32) -> DomainResult<Vec<Product>> {
        let query = TableQuery::new(Table::Products)
            .columns(PRODUCT_COLUMNS)
            .filters(listed_filters())
            .order(Order::desc(CREATED_AT))
            .limit(limit);
        let rows = self
            .port
            .list(&query)
            .await
            .map_err(|error| backend_failure("Failed to fetch promoted products", error))?;
        collect_rows(rows, row_to_product).map_err(mapping_failure)
    }

    async fn get_by_seller(
        &self,
        seller_id: Uuid,
        options: &ProductListOptions,
    ) -> DomainResult<Vec<Product>> {
        let mut query = TableQuery::new(Table::Products)
            .columns(PRODUCT_COLUMNS)
            .filter(Filter::eq("seller_id", seller_id));
        if !options.include_inactive {
            query = query.filter(Filter::eq(ACTIVE_COLUMN, true));
        }
        for order in sort_orders(options.sort.unwrap_or(ProductSort::NEWEST)) {
            query = query.order(order);
        }
        if let Some(limit) = options.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = options.offset {
            query = query.offset(offset);
        }

        let rows = self
            .port
            .list(&query)
            .await
            .map_err(|error| backend_failure("Failed to fetch seller products", error))?;
        collect_rows(rows, row_to_product).map_err(mapping_failure)
    }

    async fn get_by_category_tree(
        &self,
        category_id: Uuid,
        options: &ProductListOptions,
    ) -> DomainResult<ProductSearchResult> {
        let params = ProductSearchParams {
            category_id: Some(category_id),
            include_descendants: true,
            limit: options.limit,
            offset: options.offset,
            sort: options.sort,
            ..ProductSearchParams::default()
        };
        self.search(&params).await
    }

    async fn count(&self, filters: &ProductSearchFilters) -> DomainResult<u64> {
        let mut predicates = vec![
            Filter::eq(ACTIVE_COLUMN, filters.is_active.unwrap_or(true)),
            Filter::eq(SOLD_COLUMN, filters.is_sold.unwrap_or(false)),
        ];
        predicates.extend(Criteria::from(filters).into_filters());
        self.port
            .count(Table::Products, &predicates)
            .await
            .map_err(|error| backend_failure("Count failed", error))
    }
}

#[cfg(test)]
mod tests;
