//! Row shapes returned by the data backend and their conversion into domain
//! entities.
//!
//! Nullable counters default to zero and joined relations are optional, so a
//! product without images or a seller profile still maps.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::money::DEFAULT_CURRENCY;
use crate::domain::ports::Row;
use crate::domain::{Category, Money, Product, ProductCondition, ProductImage, Slug};

/// Select expression embedding images, category name and seller profile.
pub(crate) const PRODUCT_COLUMNS: &str = "*,\
product_images!product_id(id,product_id,image_url,alt_text,sort_order,created_at),\
categories!category_id(name),\
profiles!seller_id(username,rating)";

/// Select expression for category reads.
pub(crate) const CATEGORY_COLUMNS: &str = "*";

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct RowMappingError(String);

#[derive(Debug, Deserialize)]
struct ProductRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    price: f64,
    condition: String,
    size: Option<String>,
    brand: Option<String>,
    color: Option<String>,
    material: Option<String>,
    location: Option<String>,
    country_code: Option<String>,
    region: Option<String>,
    slug: Option<String>,
    seller_id: Uuid,
    category_id: Option<Uuid>,
    is_active: Option<bool>,
    is_sold: Option<bool>,
    view_count: Option<i64>,
    favorite_count: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    product_images: Option<Vec<ImageRow>>,
    #[serde(default)]
    categories: Option<CategoryNameRow>,
    #[serde(default)]
    profiles: Option<ProfileRow>,
}

#[derive(Debug, Deserialize)]
struct ImageRow {
    id: Uuid,
    product_id: Uuid,
    image_url: String,
    alt_text: Option<String>,
    sort_order: Option<i32>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CategoryNameRow {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    username: Option<String>,
    rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    slug: String,
    parent_id: Option<Uuid>,
    level: Option<i32>,
    sort_order: Option<i32>,
    is_active: Option<bool>,
    image_url: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

fn decode<T: DeserializeOwned>(row: Row) -> Result<T, RowMappingError> {
    serde_json::from_value(Value::Object(row)).map_err(|err| RowMappingError(err.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Convert a joined product row into a [`Product`].
pub(crate) fn row_to_product(row: Row) -> Result<Product, RowMappingError> {
    let row: ProductRow = decode(row)?;
    let price = Money::new(row.price, DEFAULT_CURRENCY)
        .map_err(|err| RowMappingError(format!("price: {err}")))?;
    let condition: ProductCondition = row
        .condition
        .parse()
        .map_err(|err| RowMappingError(format!("condition: {err}")))?;
    let slug = non_blank(row.slug)
        .map(Slug::new)
        .transpose()
        .map_err(|err| RowMappingError(format!("slug: {err}")))?;

    let mut images: Vec<ProductImage> = row
        .product_images
        .unwrap_or_default()
        .into_iter()
        .map(|image| ProductImage {
            id: image.id,
            product_id: image.product_id,
            image_url: image.image_url,
            alt_text: image.alt_text,
            sort_order: image.sort_order.unwrap_or(0),
            created_at: image.created_at,
        })
        .collect();
    images.sort_by_key(|image| image.sort_order);

    let (seller_username, seller_rating) = row
        .profiles
        .map_or((None, None), |profile| (profile.username, profile.rating));

    Ok(Product {
        id: row.id,
        title: row.title,
        description: row.description,
        price,
        condition,
        size: row.size,
        brand: row.brand,
        color: row.color,
        material: row.material,
        location: row.location,
        country_code: row.country_code,
        region: row.region,
        slug,
        seller_id: row.seller_id,
        category_id: row.category_id,
        is_active: row.is_active.unwrap_or(false),
        is_sold: row.is_sold.unwrap_or(false),
        view_count: row.view_count.unwrap_or(0),
        favorite_count: row.favorite_count.unwrap_or(0),
        created_at: row.created_at,
        updated_at: row.updated_at,
        images,
        seller_username: non_blank(seller_username),
        seller_rating,
        category_name: row.categories.and_then(|category| non_blank(category.name)),
    })
}

/// Read the embedded seller username without mapping the whole row.
pub(crate) fn seller_username(row: &Row) -> Option<&str> {
    row.get("profiles")?.get("username")?.as_str()
}

/// Convert a category row into a [`Category`].
pub(crate) fn row_to_category(row: Row) -> Result<Category, RowMappingError> {
    let row: CategoryRow = decode(row)?;
    let slug = Slug::new(&row.slug).map_err(|err| RowMappingError(format!("slug: {err}")))?;
    let now = Utc::now();
    Ok(Category {
        id: row.id,
        name: row.name,
        description: non_blank(row.description),
        slug,
        parent_id: row.parent_id,
        level: row.level.filter(|level| *level > 0).unwrap_or(1),
        sort_order: row.sort_order.unwrap_or(0),
        is_active: row.is_active.unwrap_or(false),
        image_url: non_blank(row.image_url),
        created_at: row.created_at.unwrap_or(now),
        updated_at: row.updated_at.unwrap_or(now),
    })
}

/// Apply `convert` to each row, failing on the first bad row.
pub(crate) fn collect_rows<T>(
    rows: Vec<Row>,
    convert: fn(Row) -> Result<T, RowMappingError>,
) -> Result<Vec<T>, RowMappingError> {
    rows.into_iter().map(convert).collect()
}
