//! Rendering of [`TableQuery`] values into PostgREST query parameters.

use crate::domain::ports::{Filter, FilterValue, Order, TableQuery};

/// Characters that must be quoted inside `or=(..)`, `and=(..)` and `in.(..)`.
const RESERVED: &[char] = &[',', '.', ':', '(', ')', '"', '\\', ' '];

fn quote(raw: &str) -> String {
    if raw.is_empty() || raw.contains(RESERVED) {
        let escaped = raw.replace('\\', r"\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        raw.to_owned()
    }
}

/// `*needle*` with PostgREST wildcards. `*` in the needle is dropped and the
/// LIKE metacharacters `\`, `%` and `_` are escaped so they match literally.
fn ilike_pattern(needle: &str) -> String {
    let literal = needle
        .replace('*', "")
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_");
    format!("*{literal}*")
}

fn in_list(values: &[FilterValue]) -> String {
    let items: Vec<String> = values.iter().map(|value| quote(&value.render())).collect();
    format!("({})", items.join(","))
}

/// Operator and operand for a column predicate, e.g. `eq.denim`.
///
/// Inside logical trees the operand is quoted when it carries reserved
/// characters; at the top level the whole value is already URL-encoded as
/// one parameter so it is left alone.
fn operation(filter: &Filter, nested: bool) -> Option<(String, String)> {
    let operand = |value: String| if nested { quote(&value) } else { value };
    match filter {
        Filter::Eq { column, value } => {
            Some((column.clone(), format!("eq.{}", operand(value.render()))))
        }
        Filter::Neq { column, value } => {
            Some((column.clone(), format!("neq.{}", operand(value.render()))))
        }
        Filter::In { column, values } => Some((column.clone(), format!("in.{}", in_list(values)))),
        Filter::Range { column, op, value } => Some((
            column.clone(),
            format!("{}.{}", op.as_str(), operand(value.render())),
        )),
        Filter::ILike { column, needle } => Some((
            column.clone(),
            format!("ilike.{}", operand(ilike_pattern(needle))),
        )),
        Filter::Or(_) | Filter::And(_) => None,
    }
}

/// Render a filter as an element of a logical tree, e.g. `price.lt.20` or
/// `and(created_at.eq."..",id.lt.7)`.
fn tree_element(filter: &Filter) -> String {
    match filter {
        Filter::Or(inner) => format!("or({})", tree_items(inner)),
        Filter::And(inner) => format!("and({})", tree_items(inner)),
        other => operation(other, true)
            .map(|(column, op)| format!("{column}.{op}"))
            .unwrap_or_default(),
    }
}

fn tree_items(filters: &[Filter]) -> String {
    filters.iter().map(tree_element).collect::<Vec<_>>().join(",")
}

/// Render one top-level filter as a `(key, value)` query parameter.
pub(crate) fn filter_param(filter: &Filter) -> (String, String) {
    match filter {
        Filter::Or(inner) => ("or".to_owned(), format!("({})", tree_items(inner))),
        Filter::And(inner) => ("and".to_owned(), format!("({})", tree_items(inner))),
        other => operation(other, false).unwrap_or_default(),
    }
}

fn order_param(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|order| format!("{}.{}", order.column, order.direction.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Every query parameter for a read of `query`.
pub(crate) fn query_params(query: &TableQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_owned(), query.columns.clone())];
    params.extend(query.filters.iter().map(filter_param));
    if !query.orders.is_empty() {
        params.push(("order".to_owned(), order_param(&query.orders)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_owned(), limit.to_string()));
    }
    if let Some(offset) = query.offset {
        params.push(("offset".to_owned(), offset.to_string()));
    }
    params
}

/// Parse the total out of a `Content-Range` header such as `0-19/57` or
/// `*/0`.
pub(crate) fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.trim().split_once('/')?;
    total.parse().ok()
}
