//! Unit coverage for query construction and error mapping.

use std::sync::{Arc, Mutex};

use chrono::TimeZone;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{FilterValue, MockDataPort, Row, Selection};

fn product_row(id: Uuid, created_at: DateTime<Utc>, seller: &str) -> Row {
    let value = json!({
        "id": id,
        "title": "Linen shirt",
        "description": "Barely worn",
        "price": 30.0,
        "condition": "like_new",
        "slug": "linen-shirt",
        "seller_id": Uuid::new_v4(),
        "category_id": null,
        "is_active": true,
        "is_sold": false,
        "view_count": 1,
        "favorite_count": 0,
        "created_at": created_at.to_rfc3339(),
        "updated_at": created_at.to_rfc3339(),
        "product_images": [],
        "categories": null,
        "profiles": { "username": seller, "rating": null }
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!("json! object literal"),
    }
}

fn captured_select(rows: Vec<Row>, count: u64) -> (MockDataPort, Arc<Mutex<Vec<TableQuery>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut port = MockDataPort::new();
    port.expect_select().times(1).returning(move |query| {
        sink.lock().expect("capture lock").push(query.clone());
        Ok(Selection {
            rows: rows.clone(),
            count: Some(count),
        })
    });
    (port, seen)
}

fn repository(port: MockDataPort) -> DataPortProductRepository {
    DataPortProductRepository::new(Arc::new(port))
}

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_710_000_000 + seconds, 0)
        .single()
        .expect("valid timestamp")
}

#[tokio::test]
async fn search_always_restricts_to_listed_products() {
    let (port, seen) = captured_select(Vec::new(), 0);
    let params = ProductSearchParams {
        query: Some("  denim ".to_owned()),
        min_price: Some(10.0),
        max_price: Some(50.0),
        ..ProductSearchParams::default()
    };

    repository(port).search(&params).await.expect("search succeeds");

    let queries = seen.lock().expect("capture lock");
    let query = &queries[0];
    assert!(query.count, "search must request an exact total");
    assert_eq!(query.limit, Some(DEFAULT_PRODUCT_PAGE_SIZE));
    assert_eq!(query.offset, Some(0));
    for filter in listed_filters() {
        assert!(query.filters.contains(&filter));
    }
    assert!(query.filters.contains(&Filter::or([
        Filter::contains("title", "denim"),
        Filter::contains("description", "denim"),
        Filter::contains("brand", "denim"),
    ])));
    assert!(query.filters.contains(&Filter::gte("price", 10.0)));
    assert!(query.filters.contains(&Filter::lte("price", 50.0)));
    assert_eq!(
        query.orders,
        vec![Order::desc("created_at"), Order::desc("id")]
    );
}

#[tokio::test]
async fn single_category_takes_precedence_over_list() {
    let (port, seen) = captured_select(Vec::new(), 0);
    let wanted = Uuid::new_v4();
    let params = ProductSearchParams {
        category_id: Some(wanted),
        category_ids: vec![Uuid::new_v4(), Uuid::new_v4()],
        ..ProductSearchParams::default()
    };

    repository(port).search(&params).await.expect("search succeeds");

    let queries = seen.lock().expect("capture lock");
    let category_filters: Vec<_> = queries[0]
        .filters
        .iter()
        .filter(|filter| {
            matches!(filter,
                Filter::Eq { column, .. } | Filter::In { column, .. } if column == "category_id")
        })
        .collect();
    assert_eq!(category_filters, vec![&Filter::eq("category_id", wanted)]);
}

#[tokio::test]
async fn cursor_adds_keyset_filter_and_resets_offset() {
    let (port, seen) = captured_select(Vec::new(), 0);
    let last_id = Uuid::new_v4();
    let last_created = at(0);
    let token = Cursor::new(last_created.timestamp_micros(), last_id.to_string()).encode();
    let params = ProductSearchParams {
        cursor: Some(token),
        offset: Some(40),
        ..ProductSearchParams::default()
    };

    repository(port).search(&params).await.expect("search succeeds");

    let queries = seen.lock().expect("capture lock");
    let query = &queries[0];
    assert_eq!(query.offset, Some(0));
    let expected = Filter::or([
        Filter::lt("created_at", last_created),
        Filter::and([
            Filter::eq("created_at", last_created),
            Filter::lt("id", last_id),
        ]),
    ]);
    assert!(query.filters.contains(&expected));
}

#[rstest]
#[case::not_base64("%%%")]
#[case::no_separator("MTIz")]
#[case::not_a_uuid("MTIzOmFiYw==")]
fn malformed_cursor_is_ignored(#[case] token: &str) {
    assert!(keyset_filter(token, SortDirection::Desc).is_none());
}

#[tokio::test]
async fn invalid_cursor_keeps_offset_pagination() {
    let (port, seen) = captured_select(Vec::new(), 0);
    let params = ProductSearchParams {
        cursor: Some("not a cursor".to_owned()),
        offset: Some(40),
        ..ProductSearchParams::default()
    };

    repository(port).search(&params).await.expect("search succeeds");

    let queries = seen.lock().expect("capture lock");
    assert_eq!(queries[0].offset, Some(40));
}

#[tokio::test]
async fn cursor_is_ignored_for_price_sort() {
    let (port, seen) = captured_select(Vec::new(), 0);
    let token = Cursor::new(at(0).timestamp_micros(), Uuid::new_v4().to_string()).encode();
    let params = ProductSearchParams {
        cursor: Some(token),
        offset: Some(20),
        sort: Some(ProductSort {
            by: crate::domain::ports::ProductSortField::Price,
            direction: SortDirection::Asc,
        }),
        ..ProductSearchParams::default()
    };

    repository(port).search(&params).await.expect("search succeeds");

    let queries = seen.lock().expect("capture lock");
    assert_eq!(queries[0].offset, Some(20));
    assert_eq!(
        queries[0].orders,
        vec![Order::asc("price"), Order::desc("created_at"), Order::desc("id")]
    );
}

#[tokio::test]
async fn full_page_reports_more_and_points_cursor_at_last_row() {
    let rows: Vec<Row> = (0..2)
        .map(|offset| product_row(Uuid::new_v4(), at(-offset), "ana"))
        .collect();
    let last = rows[1].clone();
    let (port, _) = captured_select(rows, 7);
    let params = ProductSearchParams {
        limit: Some(2),
        ..ProductSearchParams::default()
    };

    let page = repository(port).search(&params).await.expect("search succeeds");

    assert_eq!(page.total, 7);
    assert!(page.has_more);
    let cursor = Cursor::decode(page.next_cursor.as_deref().expect("cursor present"))
        .expect("cursor decodes");
    assert_eq!(Some(cursor.id.as_str()), last.get("id").and_then(Value::as_str));
    assert_eq!(cursor.sort_key, at(-1).timestamp_micros());
}

#[tokio::test]
async fn short_page_has_no_cursor() {
    let rows = vec![product_row(Uuid::new_v4(), at(0), "ana")];
    let (port, _) = captured_select(rows, 1);

    let page = repository(port)
        .search(&ProductSearchParams::default())
        .await
        .expect("search succeeds");

    assert!(!page.has_more);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn backend_failure_becomes_validation_error() {
    let mut port = MockDataPort::new();
    port.expect_select()
        .returning(|_| Err(DataPortError::backend("42703", "column does not exist")));

    let error = repository(port)
        .search(&ProductSearchParams::default())
        .await
        .expect_err("search fails");

    assert_eq!(error.code(), ErrorCode::Validation);
    assert!(error.to_string().starts_with("Search failed:"));
}

#[tokio::test]
async fn missing_row_becomes_not_found() {
    let mut port = MockDataPort::new();
    port.expect_select_one()
        .returning(|_| Err(DataPortError::no_rows()));
    let id = Uuid::new_v4();

    let error = repository(port).get_by_id(id).await.expect_err("no row");

    assert_eq!(error, Error::not_found("Product", id.to_string()));
}

#[tokio::test]
async fn slug_lookup_requires_matching_seller() {
    let mut port = MockDataPort::new();
    port.expect_list()
        .returning(|_| Ok(vec![product_row(Uuid::new_v4(), at(0), "bob")]));

    let error = repository(port)
        .get_by_slug_and_seller("linen-shirt", "ana")
        .await
        .expect_err("seller mismatch");

    assert_eq!(error, Error::not_found("Product", "linen-shirt by ana"));
}

#[tokio::test]
async fn slug_lookup_picks_row_of_requested_seller() {
    let wanted = Uuid::new_v4();
    let mut port = MockDataPort::new();
    port.expect_list().returning(move |_| {
        Ok(vec![
            product_row(Uuid::new_v4(), at(0), "bob"),
            product_row(wanted, at(0), "ana"),
        ])
    });

    let product = repository(port)
        .get_by_slug_and_seller("linen-shirt", "ana")
        .await
        .expect("seller match");

    assert_eq!(product.id, wanted);
}

#[tokio::test]
async fn count_defaults_to_listed_products() {
    let mut port = MockDataPort::new();
    port.expect_count()
        .withf(|table, filters| {
            *table == Table::Products
                && filters.first() == Some(&Filter::eq("is_active", true))
                && filters.get(1) == Some(&Filter::eq("is_sold", false))
                && filters.contains(&Filter::eq("country_code", "GB"))
        })
        .returning(|_, _| Ok(12));
    let filters = ProductSearchFilters {
        country_code: Some("GB".to_owned()),
        ..ProductSearchFilters::default()
    };

    let total = repository(port).count(&filters).await.expect("count");

    assert_eq!(total, 12);
}

#[rstest]
fn orders_deduplicate_the_created_at_fallback() {
    let orders = sort_orders(ProductSort {
        by: crate::domain::ports::ProductSortField::CreatedAt,
        direction: SortDirection::Asc,
    });
    assert_eq!(orders, vec![Order::asc("created_at"), Order::asc("id")]);

    let popularity = sort_orders(ProductSort {
        by: crate::domain::ports::ProductSortField::Popularity,
        direction: SortDirection::Desc,
    });
    assert_eq!(popularity[0], Order::desc("favorite_count"));
}

#[rstest]
fn filter_values_keep_their_types() {
    let filter = Filter::eq("is_active", true);
    assert!(matches!(
        filter,
        Filter::Eq {
            value: FilterValue::Bool(true),
            ..
        }
    ));
}
