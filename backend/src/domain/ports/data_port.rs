//! Narrow port over the hosted relational database.
//!
//! Repositories describe reads as a [`TableQuery`] built from a small filter
//! algebra; adapters translate it into backend requests. Rows travel as JSON
//! objects so that joined projections (images, category, seller profile) keep
//! their nested shape.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::define_port_error;

/// One result row, keyed by column or embedded relation name.
pub type Row = serde_json::Map<String, Value>;

define_port_error! {
    /// Errors raised by [`DataPort`] adapters.
    pub enum DataPortError {
        /// A single-row read matched nothing.
        NoRows => "query returned no rows",
        /// The backend rejected the request.
        Backend { code: String, message: String } =>
            "data backend error {code}: {message}",
        /// The backend could not be reached.
        Connection { message: String } =>
            "data backend connection failed: {message}",
        /// The response could not be decoded.
        Decode { message: String } =>
            "data backend response could not be decoded: {message}",
    }
}

/// Tables this layer reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Categories,
    ProductImages,
    Profiles,
}

impl Table {
    /// Table name in the public schema.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::ProductImages => "product_images",
            Self::Profiles => "profiles",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar compared by a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FilterValue {
    /// Textual form used in query strings.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Uuid(value) => value.to_string(),
            Self::Timestamp(value) => value.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Comparison used by [`Filter::Range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl RangeOp {
    /// Operator keyword understood by the REST backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
        }
    }
}

/// Row predicate.
///
/// The filters attached to a [`TableQuery`] are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq {
        column: String,
        value: FilterValue,
    },
    Neq {
        column: String,
        value: FilterValue,
    },
    In {
        column: String,
        values: Vec<FilterValue>,
    },
    Range {
        column: String,
        op: RangeOp,
        value: FilterValue,
    },
    /// Case-insensitive substring match.
    ILike {
        column: String,
        needle: String,
    },
    Or(Vec<Filter>),
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::Eq {
            column: column.to_owned(),
            value: value.into(),
        }
    }

    pub fn neq(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::Neq {
            column: column.to_owned(),
            value: value.into(),
        }
    }

    pub fn is_in<V, I>(column: &str, values: I) -> Self
    where
        V: Into<FilterValue>,
        I: IntoIterator<Item = V>,
    {
        Self::In {
            column: column.to_owned(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(column: &str, op: RangeOp, value: impl Into<FilterValue>) -> Self {
        Self::Range {
            column: column.to_owned(),
            op,
            value: value.into(),
        }
    }

    pub fn lt(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::range(column, RangeOp::Lt, value)
    }

    pub fn lte(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::range(column, RangeOp::Lte, value)
    }

    pub fn gt(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::range(column, RangeOp::Gt, value)
    }

    pub fn gte(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::range(column, RangeOp::Gte, value)
    }

    pub fn contains(column: &str, needle: impl Into<String>) -> Self {
        Self::ILike {
            column: column.to_owned(),
            needle: needle.into(),
        }
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }
}

/// Sort direction for an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Keyword understood by the REST backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One ordering directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: SortDirection,
}

impl Order {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_owned(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_owned(),
            direction: SortDirection::Desc,
        }
    }
}

/// Read request against one table.
///
/// # Examples
/// ```
/// use marketplace::domain::ports::{Filter, Order, Table, TableQuery};
///
/// let query = TableQuery::new(Table::Categories)
///     .filter(Filter::eq("is_active", true))
///     .order(Order::asc("sort_order"))
///     .limit(20);
/// assert_eq!(query.limit, Some(20));
/// assert_eq!(query.columns, "*");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub table: Table,
    /// Select expression, including embedded relations.
    pub columns: String,
    pub filters: Vec<Filter>,
    pub orders: Vec<Order>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Request an exact total alongside the rows.
    pub count: bool,
}

impl TableQuery {
    /// Select every column of `table`.
    pub fn new(table: Table) -> Self {
        Self {
            table,
            columns: "*".to_owned(),
            filters: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            count: false,
        }
    }

    #[must_use]
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_owned();
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }
}

/// Rows plus the optional exact total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub rows: Vec<Row>,
    /// Present when the query asked for a count.
    pub count: Option<u64>,
}

/// Port over the hosted database's table and RPC surface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataPort: Send + Sync {
    /// Run `query`, returning matching rows and, if requested, the total.
    async fn select(&self, query: &TableQuery) -> Result<Selection, DataPortError>;

    /// Run `query` expecting exactly one row.
    ///
    /// Returns [`DataPortError::NoRows`] when nothing matches.
    async fn select_one(&self, query: &TableQuery) -> Result<Row, DataPortError>;

    /// Fetch one row by primary key.
    async fn single(&self, table: Table, id: Uuid, columns: &str) -> Result<Row, DataPortError>;

    /// Run `query` and return the ordered rows.
    async fn list(&self, query: &TableQuery) -> Result<Vec<Row>, DataPortError>;

    /// Count rows of `table` matching every filter.
    async fn count(&self, table: Table, filters: &[Filter]) -> Result<u64, DataPortError>;

    /// Call a stored procedure with named parameters.
    async fn rpc(&self, name: &str, params: Value) -> Result<Value, DataPortError>;
}

/// Fixture implementation for tests that never reach the database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDataPort;

#[async_trait]
impl DataPort for FixtureDataPort {
    async fn select(&self, query: &TableQuery) -> Result<Selection, DataPortError> {
        Ok(Selection {
            rows: Vec::new(),
            count: query.count.then_some(0),
        })
    }

    async fn select_one(&self, _query: &TableQuery) -> Result<Row, DataPortError> {
        Err(DataPortError::no_rows())
    }

    async fn single(&self, _table: Table, _id: Uuid, _columns: &str) -> Result<Row, DataPortError> {
        Err(DataPortError::no_rows())
    }

    async fn list(&self, _query: &TableQuery) -> Result<Vec<Row>, DataPortError> {
        Ok(Vec::new())
    }

    async fn count(&self, _table: Table, _filters: &[Filter]) -> Result<u64, DataPortError> {
        Ok(0)
    }

    async fn rpc(&self, _name: &str, _params: Value) -> Result<Value, DataPortError> {
        Ok(Value::Null)
    }
}
