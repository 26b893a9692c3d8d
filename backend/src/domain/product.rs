//! Product listing entities.
//!
//! Products are read-only projections assembled from the `products` row and
//! its joined images, category name and seller profile fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Money, Slug};

/// Physical condition declared by the seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    BrandNewWithTags,
    NewWithoutTags,
    LikeNew,
    Good,
    Worn,
    Fair,
}

impl ProductCondition {
    /// Every condition in display order.
    pub const ALL: [Self; 6] = [
        Self::BrandNewWithTags,
        Self::NewWithoutTags,
        Self::LikeNew,
        Self::Good,
        Self::Worn,
        Self::Fair,
    ];

    /// Stored snake_case value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BrandNewWithTags => "brand_new_with_tags",
            Self::NewWithoutTags => "new_without_tags",
            Self::LikeNew => "like_new",
            Self::Good => "good",
            Self::Worn => "worn",
            Self::Fair => "fair",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::BrandNewWithTags => "Brand new with tags",
            Self::NewWithoutTags => "New without tags",
            Self::LikeNew => "Like new",
            Self::Good => "Good",
            Self::Worn => "Worn",
            Self::Fair => "Fair",
        }
    }
}

impl fmt::Display for ProductCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a condition string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product condition: {0}")]
pub struct ParseConditionError(pub String);

impl FromStr for ProductCondition {
    type Err = ParseConditionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|condition| condition.as_str() == value)
            .ok_or_else(|| ParseConditionError(value.to_owned()))
    }
}

/// Listing photo owned by exactly one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Marketplace listing.
///
/// `images` are ordered by `sort_order` ascending. Seller and category
/// display fields are denormalised from joined rows and may be absent.
///
/// A listing is only shown to buyers when it is active and unsold; see
/// [`crate::domain::visibility::is_listed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: Money,
    pub condition: ProductCondition,
    pub size: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub location: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    /// `None` for legacy rows that predate slug backfill.
    pub slug: Option<Slug>,
    pub seller_id: Uuid,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub is_sold: bool,
    pub view_count: i64,
    pub favorite_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub images: Vec<ProductImage>,
    pub seller_username: Option<String>,
    pub seller_rating: Option<f64>,
    pub category_name: Option<String>,
}

impl Product {
    /// Return `true` when the listing has at least one photo.
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Return `true` when the title contains non-whitespace text.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}
