//! Unit coverage for category lookups, breadcrumbs and segment resolution.

use std::collections::HashMap;

use serde_json::{Value, json};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockDataPort, Row};

fn category_row(id: Uuid, slug: &str, parent_id: Option<Uuid>) -> Row {
    let value = json!({
        "id": id,
        "name": slug,
        "description": null,
        "slug": slug,
        "parent_id": parent_id,
        "level": if parent_id.is_some() { 2 } else { 1 },
        "sort_order": 0,
        "is_active": true,
        "image_url": null,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!("json! object literal"),
    }
}

/// Port whose `single` serves rows from `rows` and reports `NoRows`
/// otherwise.
fn port_with_rows(rows: HashMap<Uuid, Row>) -> MockDataPort {
    let mut port = MockDataPort::new();
    port.expect_single().returning(move |_, id, _| {
        rows.get(&id).cloned().ok_or_else(DataPortError::no_rows)
    });
    port
}

fn repository(port: MockDataPort) -> DataPortCategoryRepository {
    DataPortCategoryRepository::new(Arc::new(port))
}

#[tokio::test]
async fn breadcrumb_runs_from_root_to_target() {
    let root = Uuid::new_v4();
    let middle = Uuid::new_v4();
    let leaf = Uuid::new_v4();
    let port = port_with_rows(HashMap::from([
        (root, category_row(root, "women", None)),
        (middle, category_row(middle, "clothing", Some(root))),
        (leaf, category_row(leaf, "dresses", Some(middle))),
    ]));

    let breadcrumb = repository(port)
        .get_breadcrumb(leaf)
        .await
        .expect("breadcrumb");

    assert!(breadcrumb.is_complete());
    assert_eq!(breadcrumb.ids(), vec![root, middle, leaf]);
}

#[tokio::test]
async fn missing_ancestor_yields_partial_breadcrumb() {
    let missing = Uuid::new_v4();
    let leaf = Uuid::new_v4();
    let port = port_with_rows(HashMap::from([(
        leaf,
        category_row(leaf, "dresses", Some(missing)),
    )]));

    let breadcrumb = repository(port)
        .get_breadcrumb(leaf)
        .await
        .expect("partial breadcrumb");

    assert_eq!(breadcrumb.ids(), vec![leaf]);
    match breadcrumb.completeness {
        BreadcrumbCompleteness::Partial {
            missing_ancestor,
            reason,
        } => {
            assert_eq!(missing_ancestor, missing);
            assert!(reason.is_not_found());
        }
        BreadcrumbCompleteness::Complete => panic!("breadcrumb should be partial"),
    }
}

#[tokio::test]
async fn cyclic_ancestry_stops_instead_of_looping() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let port = port_with_rows(HashMap::from([
        (first, category_row(first, "loop-a", Some(second))),
        (second, category_row(second, "loop-b", Some(first))),
    ]));

    let breadcrumb = repository(port)
        .get_breadcrumb(first)
        .await
        .expect("partial breadcrumb");

    assert!(!breadcrumb.is_complete());
    assert_eq!(breadcrumb.trail.len(), 2);
}

#[tokio::test]
async fn unknown_target_is_not_found() {
    let port = port_with_rows(HashMap::new());
    let id = Uuid::new_v4();

    let error = repository(port)
        .get_breadcrumb(id)
        .await
        .expect_err("unknown category");

    assert_eq!(error, Error::not_found("Category", id.to_string()));
}

#[tokio::test]
async fn backend_error_on_lookup_is_validation() {
    let mut port = MockDataPort::new();
    port.expect_single()
        .returning(|_, _, _| Err(DataPortError::connection("connection refused")));

    let error = repository(port)
        .get_by_id(Uuid::new_v4())
        .await
        .expect_err("backend down");

    assert_eq!(error.code(), ErrorCode::Validation);
}

#[tokio::test]
async fn get_all_orders_by_sort_order_then_name() {
    let mut port = MockDataPort::new();
    port.expect_list()
        .withf(|query| {
            query.orders == vec![Order::asc("sort_order"), Order::asc("name")]
                && query.filters == vec![Filter::eq("is_active", true)]
        })
        .returning(|_| Ok(Vec::new()));

    let categories = repository(port).get_all().await.expect("list");

    assert!(categories.is_empty());
}

#[tokio::test]
async fn resolves_last_segment_by_slug() {
    let dresses = Uuid::new_v4();
    let mut port = MockDataPort::new();
    port.expect_select_one()
        .withf(|query| query.filters.contains(&Filter::eq("slug", "dresses")))
        .returning(move |_| Ok(category_row(dresses, "dresses", None)));

    let ids = repository(port)
        .resolve_segments(&["women".to_owned(), "dresses".to_owned()])
        .await
        .expect("resolved");

    assert_eq!(ids, vec![dresses]);
}

#[tokio::test]
async fn falls_back_to_search_when_slug_misses() {
    let found = Uuid::new_v4();
    let mut port = MockDataPort::new();
    port.expect_select_one()
        .returning(|_| Err(DataPortError::no_rows()));
    port.expect_list()
        .withf(|query| query.limit == Some(1))
        .returning(move |_| Ok(vec![category_row(found, "evening-dresses", None)]));

    let ids = repository(port)
        .resolve_segments(&["dresses".to_owned()])
        .await
        .expect("resolved by search");

    assert_eq!(ids, vec![found]);
}

#[tokio::test]
async fn unresolvable_segment_is_validation_error() {
    let mut port = MockDataPort::new();
    port.expect_select_one()
        .returning(|_| Err(DataPortError::no_rows()));
    port.expect_list().returning(|_| Ok(Vec::new()));

    let error = repository(port)
        .resolve_segments(&["unicorns".to_owned()])
        .await
        .expect_err("nothing matches");

    assert_eq!(error, Error::validation("Category not found: unicorns"));
}

#[tokio::test]
async fn empty_segments_resolve_to_nothing() {
    let ids = repository(MockDataPort::new())
        .resolve_segments(&[])
        .await
        .expect("empty path");
    assert!(ids.is_empty());
}
