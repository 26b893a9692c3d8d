//! In-process [`DataPort`] adapter.
//!
//! Rows are stored already joined, in the shape the REST backend returns for
//! the repository select expressions, so the select expression of a query is
//! ignored. Filters, ordering, paging and counts follow Postgres semantics
//! closely enough for integration tests and local runs: comparisons against
//! NULL never match and NULL sorts after every other value.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{
    DataPort, DataPortError, Filter, FilterValue, Order, RangeOp, Row, Selection, SortDirection,
    Table, TableQuery,
};

type RpcHandler = Arc<dyn Fn(Value) -> Result<Value, DataPortError> + Send + Sync>;

#[derive(Default)]
struct State {
    tables: HashMap<Table, Vec<Row>>,
    failures: HashMap<Table, DataPortError>,
    procedures: HashMap<String, RpcHandler>,
}

/// [`DataPort`] over rows held in memory.
///
/// # Examples
/// ```
/// use marketplace::outbound::memory::InMemoryDataPort;
/// use marketplace::domain::ports::Table;
/// use serde_json::json;
///
/// let port = InMemoryDataPort::new();
/// port.insert(Table::Categories, json!({"id": "4a7c1c1e-0d0b-4bb2-9d53-3f7a0b0f3c11"}))
///     .expect("object row");
/// assert_eq!(port.len(Table::Categories), 1);
/// ```
#[derive(Default)]
pub struct InMemoryDataPort {
    state: Mutex<State>,
}

impl InMemoryDataPort {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, DataPortError> {
        self.state
            .lock()
            .map_err(|_| DataPortError::connection("in-memory store lock poisoned"))
    }

    /// Append one row. `row` must be a JSON object.
    pub fn insert(&self, table: Table, row: Value) -> Result<(), DataPortError> {
        let Value::Object(row) = row else {
            return Err(DataPortError::decode(format!(
                "{table} rows must be JSON objects"
            )));
        };
        self.state()?.tables.entry(table).or_default().push(row);
        Ok(())
    }

    /// Append every row in `rows`.
    pub fn extend(
        &self,
        table: Table,
        rows: impl IntoIterator<Item = Value>,
    ) -> Result<(), DataPortError> {
        rows.into_iter().try_for_each(|row| self.insert(table, row))
    }

    /// Number of rows stored for `table`.
    pub fn len(&self, table: Table) -> usize {
        self.state()
            .map(|state| state.tables.get(&table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Make every read of `table` fail with `error` until cleared.
    pub fn fail_table(&self, table: Table, error: DataPortError) -> Result<(), DataPortError> {
        self.state()?.failures.insert(table, error);
        Ok(())
    }

    pub fn clear_failures(&self) -> Result<(), DataPortError> {
        self.state()?.failures.clear();
        Ok(())
    }

    /// Register a stored procedure for [`DataPort::rpc`].
    pub fn register_rpc<F>(&self, name: &str, handler: F) -> Result<(), DataPortError>
    where
        F: Fn(Value) -> Result<Value, DataPortError> + Send + Sync + 'static,
    {
        self.state()?
            .procedures
            .insert(name.to_owned(), Arc::new(handler));
        Ok(())
    }

    fn matching(&self, table: Table, filters: &[Filter]) -> Result<Vec<Row>, DataPortError> {
        let state = self.state()?;
        if let Some(error) = state.failures.get(&table) {
            return Err(error.clone());
        }
        Ok(state
            .tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|filter| matches_filter(row, filter)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn matches_filter(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => compare_column(row, column, value) == Some(Ordering::Equal),
        Filter::Neq { column, value } => {
            compare_column(row, column, value).is_some_and(Ordering::is_ne)
        }
        Filter::In { column, values } => values
            .iter()
            .any(|value| compare_column(row, column, value) == Some(Ordering::Equal)),
        Filter::Range { column, op, value } => {
            compare_column(row, column, value).is_some_and(|ordering| match op {
                RangeOp::Lt => ordering.is_lt(),
                RangeOp::Lte => ordering.is_le(),
                RangeOp::Gt => ordering.is_gt(),
                RangeOp::Gte => ordering.is_ge(),
            })
        }
        Filter::ILike { column, needle } => row
            .get(column)
            .and_then(Value::as_str)
            .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
        Filter::Or(filters) => filters.iter().any(|inner| matches_filter(row, inner)),
        Filter::And(filters) => filters.iter().all(|inner| matches_filter(row, inner)),
    }
}

/// Compare a stored cell with a filter operand, `None` for NULL or a type
/// mismatch.
fn compare_column(row: &Row, column: &str, expected: &FilterValue) -> Option<Ordering> {
    let cell = row.get(column)?;
    match expected {
        FilterValue::Text(text) => cell.as_str().map(|value| value.cmp(text.as_str())),
        FilterValue::Integer(number) => cell.as_f64()?.partial_cmp(&(*number as f64)),
        FilterValue::Number(number) => cell.as_f64()?.partial_cmp(number),
        FilterValue::Bool(flag) => cell.as_bool().map(|value| value.cmp(flag)),
        FilterValue::Uuid(id) => cell
            .as_str()
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(|value| value.cmp(id)),
        FilterValue::Timestamp(at) => cell
            .as_str()
            .and_then(parse_timestamp)
            .map(|value| value.cmp(at)),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Total order over cells with NULL (or absent) last.
fn compare_cells(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.filter(|value| !value.is_null());
    let right = right.filter(|value| !value.is_null());
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => compare_values(left, right),
    }
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left
            .as_f64()
            .zip(right.as_f64())
            .and_then(|(left, right)| left.partial_cmp(&right))
            .unwrap_or(Ordering::Equal),
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        (Value::String(left), Value::String(right)) => {
            match (parse_timestamp(left), parse_timestamp(right)) {
                (Some(left), Some(right)) => left.cmp(&right),
                _ => left.cmp(right),
            }
        }
        _ => Ordering::Equal,
    }
}

fn sort_rows(rows: &mut [Row], orders: &[Order]) {
    rows.sort_by(|left, right| {
        orders
            .iter()
            .map(|order| {
                let ordering = compare_cells(left.get(&order.column), right.get(&order.column));
                match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

fn page(rows: Vec<Row>, query: &TableQuery) -> Vec<Row> {
    let offset = query.offset.unwrap_or(0) as usize;
    let limit = query.limit.map_or(usize::MAX, |limit| limit as usize);
    rows.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl DataPort for InMemoryDataPort {
    async fn select(&self, query: &TableQuery) -> Result<Selection, DataPortError> {
        let mut rows = self.matching(query.table, &query.filters)?;
        let total = rows.len() as u64;
        sort_rows(&mut rows, &query.orders);
        Ok(Selection {
            rows: page(rows, query),
            count: query.count.then_some(total),
        })
    }

    async fn select_one(&self, query: &TableQuery) -> Result<Row, DataPortError> {
        let mut rows = self.list(query).await?.into_iter();
        match (rows.next(), rows.next()) {
            (Some(row), None) => Ok(row),
            (None, _) => Err(DataPortError::no_rows()),
            (Some(_), Some(_)) => Err(DataPortError::backend(
                "PGRST116",
                "JSON object requested, multiple rows returned",
            )),
        }
    }

    async fn single(&self, table: Table, id: Uuid, columns: &str) -> Result<Row, DataPortError> {
        let query = TableQuery::new(table)
            .columns(columns)
            .filter(Filter::eq("id", id));
        self.select_one(&query).await
    }

    async fn list(&self, query: &TableQuery) -> Result<Vec<Row>, DataPortError> {
        Ok(self.select(query).await?.rows)
    }

    async fn count(&self, table: Table, filters: &[Filter]) -> Result<u64, DataPortError> {
        Ok(self.matching(table, filters)?.len() as u64)
    }

    async fn rpc(&self, name: &str, params: Value) -> Result<Value, DataPortError> {
        let handler = self.state()?.procedures.get(name).cloned();
        match handler {
            Some(handler) => handler(params),
            None => Err(DataPortError::backend(
                "PGRST202",
                format!("Could not find the function public.{name}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Filter, ordering and paging semantics of the in-memory adapter.

    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    const FIRST: &str = "00000000-0000-4000-8000-000000000001";
    const SECOND: &str = "00000000-0000-4000-8000-000000000002";
    const THIRD: &str = "00000000-0000-4000-8000-000000000003";

    #[fixture]
    fn port() -> InMemoryDataPort {
        let port = InMemoryDataPort::new();
        port.extend(
            Table::Products,
            [
                json!({"id": FIRST, "title": "Denim Jacket", "price": 40.0, "brand": null,
                       "is_active": true, "created_at": "2024-05-01T10:00:00Z"}),
                json!({"id": SECOND, "title": "Silk scarf", "price": 15.5, "brand": "Hermes",
                       "is_active": true, "created_at": "2024-05-01T10:00:00.000001Z"}),
                json!({"id": THIRD, "title": "Wool coat", "price": 120, "brand": "Acme",
                       "is_active": false, "created_at": "2024-04-30T09:00:00+00:00"}),
            ],
        )
        .expect("seed rows");
        port
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter()
            .filter_map(|row| row.get("id").and_then(Value::as_str))
            .collect()
    }

    #[rstest]
    #[case::eq(Filter::eq("is_active", true), vec![FIRST, SECOND])]
    #[case::neq_skips_null(Filter::neq("brand", "Acme"), vec![SECOND])]
    #[case::range(Filter::gte("price", 40_i64), vec![FIRST, THIRD])]
    #[case::ilike(Filter::contains("title", "JACKET"), vec![FIRST])]
    #[case::in_list(Filter::is_in("brand", ["Acme", "Hermes"]), vec![SECOND, THIRD])]
    #[case::or(
        Filter::or([Filter::lt("price", 20.0), Filter::eq("brand", "Acme")]),
        vec![SECOND, THIRD]
    )]
    #[tokio::test]
    async fn evaluates_filters(
        port: InMemoryDataPort,
        #[case] filter: Filter,
        #[case] expected: Vec<&str>,
    ) {
        let rows = port
            .list(&TableQuery::new(Table::Products).filter(filter))
            .await
            .expect("list");

        assert_eq!(ids(&rows), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn compares_timestamps_and_uuids_by_value(port: InMemoryDataPort) {
        let at = parse_timestamp("2024-05-01T10:00:00Z").expect("timestamp");
        let first = Uuid::parse_str(FIRST).expect("uuid");
        let query = TableQuery::new(Table::Products).filter(Filter::or([
            Filter::gt("created_at", at),
            Filter::and([Filter::eq("created_at", at), Filter::gt("id", first)]),
        ]));

        let rows = port.list(&query).await.expect("list");

        assert_eq!(ids(&rows), vec![SECOND]);
    }

    #[rstest]
    #[tokio::test]
    async fn orders_with_nulls_last_and_pages(port: InMemoryDataPort) {
        let query = TableQuery::new(Table::Products)
            .order(Order::asc("brand"))
            .limit(2)
            .offset(1)
            .with_count();

        let selection = port.select(&query).await.expect("select");

        assert_eq!(ids(&selection.rows), vec![SECOND, FIRST]);
        assert_eq!(selection.count, Some(3));
    }

    #[rstest]
    #[tokio::test]
    async fn descending_timestamps_respect_fractions(port: InMemoryDataPort) {
        let query = TableQuery::new(Table::Products)
            .order(Order::desc("created_at"))
            .order(Order::desc("id"));

        let rows = port.list(&query).await.expect("list");

        assert_eq!(ids(&rows), vec![SECOND, FIRST, THIRD]);
    }

    #[rstest]
    #[tokio::test]
    async fn single_reads_report_missing_rows(port: InMemoryDataPort) {
        let error = port
            .single(Table::Products, Uuid::new_v4(), "*")
            .await
            .expect_err("unknown id");
        assert!(error.is_no_rows());

        let found = port
            .single(Table::Products, Uuid::parse_str(THIRD).expect("uuid"), "*")
            .await
            .expect("known id");
        assert_eq!(found.get("title"), Some(&json!("Wool coat")));
    }

    #[rstest]
    #[tokio::test]
    async fn injected_failures_surface_until_cleared(port: InMemoryDataPort) {
        port.fail_table(Table::Products, DataPortError::connection("refused"))
            .expect("inject");
        let error = port
            .count(Table::Products, &[])
            .await
            .expect_err("failing table");
        assert!(error.is_connection());

        port.clear_failures().expect("clear");
        assert_eq!(port.count(Table::Products, &[]).await, Ok(3));
    }

    #[tokio::test]
    async fn dispatches_registered_procedures() {
        let port = InMemoryDataPort::new();
        port.register_rpc("increment_view_count", |params| {
            Ok(json!({ "product": params["product_id"] }))
        })
        .expect("register");

        let result = port
            .rpc("increment_view_count", json!({ "product_id": FIRST }))
            .await
            .expect("rpc");
        assert_eq!(result, json!({ "product": FIRST }));

        let missing = port.rpc("unknown", Value::Null).await.expect_err("unknown");
        assert!(missing.is_backend());
    }

    #[test]
    fn rejects_non_object_rows() {
        let port = InMemoryDataPort::new();
        let error = port
            .insert(Table::Profiles, json!(["not", "an", "object"]))
            .expect_err("array row");
        assert!(error.is_decode());
        assert_eq!(port.len(Table::Profiles), 0);
    }
}
