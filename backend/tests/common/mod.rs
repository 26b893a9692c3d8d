//! Row builders for integration tests over the in-memory data port.
//!
//! Rows are written in the joined shape the REST backend returns for the
//! repository select expressions: images, category name and seller profile
//! are embedded objects.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::Arc;

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use marketplace::domain::ports::{DataPort, Table};
use marketplace::outbound::memory::InMemoryDataPort;
use serde_json::{Value, json};
use uuid::Uuid;

/// Fixed reference instant so orderings are deterministic.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Product row with sensible listed defaults.
#[derive(Debug, Clone)]
pub struct ProductSeed {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub condition: &'static str,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub country_code: Option<String>,
    pub slug: Option<String>,
    pub seller: &'static str,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub is_sold: bool,
    pub favorite_count: i64,
    pub created_at: DateTime<Utc>,
    pub images: usize,
}

impl ProductSeed {
    pub fn new(title: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            price: 25.0,
            condition: "good",
            brand: None,
            size: Some("M".to_owned()),
            country_code: Some("GB".to_owned()),
            slug: None,
            seller: "ana",
            category_id: None,
            is_active: true,
            is_sold: false,
            favorite_count: 0,
            created_at,
            images: 1,
        }
    }

    pub fn row(&self) -> Value {
        let images: Vec<Value> = (0..self.images)
            .map(|position| {
                json!({
                    "id": Uuid::new_v4(),
                    "product_id": self.id,
                    "image_url": format!("https://cdn.test/{}/{position}.jpg", self.id),
                    "alt_text": null,
                    "sort_order": position,
                    "created_at": timestamp(self.created_at),
                })
            })
            .collect();
        json!({
            "id": self.id,
            "title": self.title,
            "description": format!("{} in great shape", self.title),
            "price": self.price,
            "condition": self.condition,
            "size": self.size,
            "brand": self.brand,
            "color": null,
            "material": null,
            "location": "London",
            "country_code": self.country_code,
            "region": null,
            "slug": self.slug,
            "seller_id": Uuid::new_v4(),
            "category_id": self.category_id,
            "is_active": self.is_active,
            "is_sold": self.is_sold,
            "view_count": 0,
            "favorite_count": self.favorite_count,
            "created_at": timestamp(self.created_at),
            "updated_at": timestamp(self.created_at + Duration::minutes(1)),
            "product_images": images,
            "categories": null,
            "profiles": { "username": self.seller, "rating": 4.5 },
        })
    }
}

/// Category row.
pub fn category_row(
    id: Uuid,
    slug: &str,
    parent_id: Option<Uuid>,
    level: i32,
    sort_order: i32,
) -> Value {
    json!({
        "id": id,
        "name": slug.replace('-', " "),
        "description": null,
        "slug": slug,
        "parent_id": parent_id,
        "level": level,
        "sort_order": sort_order,
        "is_active": true,
        "image_url": null,
        "created_at": timestamp(epoch()),
        "updated_at": timestamp(epoch()),
    })
}

/// Seed `products` into a fresh port.
pub fn port_with_products(products: &[ProductSeed]) -> Arc<InMemoryDataPort> {
    let port = Arc::new(InMemoryDataPort::new());
    port.extend(Table::Products, products.iter().map(ProductSeed::row))
        .expect("seed products");
    port
}

/// Erase the concrete adapter type for repository constructors.
pub fn as_port(port: &Arc<InMemoryDataPort>) -> Arc<dyn DataPort> {
    Arc::clone(port) as Arc<dyn DataPort>
}
