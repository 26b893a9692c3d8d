//! Domain primitives, ports and use cases for the marketplace catalogue.
//!
//! Purpose: model products and categories as validated values, describe the
//! database boundary as a port, and expose read-side services that enforce
//! listing visibility and input limits.
//!
//! Public surface:
//! - Error / ErrorCode / DomainResult: closed failure taxonomy.
//! - Slug, Money: validated value objects.
//! - Product, Category, CategoryTree, Breadcrumb: entities and aggregates.
//! - ports: DataPort plus the repository traits.
//! - repositories: DataPort-backed repository implementations.
//! - services: use cases consumed by inbound adapters and the CLI.

pub mod category;
pub mod error;
pub mod money;
pub mod ports;
pub mod product;
pub mod repositories;
pub mod services;
pub mod slug;
pub mod visibility;

pub use self::category::{
    Breadcrumb, BreadcrumbCompleteness, Category, CategoryNode, CategoryTree,
};
pub use self::error::{DomainResult, Error, ErrorCode, ErrorPayload};
pub use self::money::{Money, MoneyValidationError};
pub use self::product::{ParseConditionError, Product, ProductCondition, ProductImage};
pub use self::slug::{
    RESERVED_SLUGS, Slug, SlugValidationError, is_reserved_slug, slugify,
};
