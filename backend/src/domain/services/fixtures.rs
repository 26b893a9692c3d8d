//! Entity builders shared by service tests.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::{Category, Money, Product, ProductCondition, ProductImage, Slug};

/// Listed product with one image.
pub(crate) fn listed_product(title: &str) -> Product {
    let id = Uuid::new_v4();
    let now = Utc::now();
    Product {
        id,
        title: title.to_owned(),
        description: None,
        price: Money::usd(25.0).expect("valid price"),
        condition: ProductCondition::Good,
        size: Some("M".to_owned()),
        brand: None,
        color: None,
        material: None,
        location: None,
        country_code: Some("GB".to_owned()),
        region: None,
        slug: Slug::new("listed-product").ok(),
        seller_id: Uuid::new_v4(),
        category_id: None,
        is_active: true,
        is_sold: false,
        view_count: 0,
        favorite_count: 0,
        created_at: now - Duration::minutes(5),
        updated_at: now,
        images: vec![ProductImage {
            id: Uuid::new_v4(),
            product_id: id,
            image_url: "https://cdn.test/front.jpg".to_owned(),
            alt_text: None,
            sort_order: 0,
            created_at: now,
        }],
        seller_username: Some("ana".to_owned()),
        seller_rating: None,
        category_name: None,
    }
}

/// Active root category.
pub(crate) fn active_category(slug: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: slug.to_owned(),
        description: None,
        slug: Slug::new(slug).expect("valid slug"),
        parent_id: None,
        level: 1,
        sort_order: 0,
        is_active: true,
        image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
