//! Buyer-facing listing visibility.
//!
//! A product is listed when it is active and not sold. Repositories push the
//! rule into queries with [`listed_filters`]; services re-check fetched
//! entities with [`is_listed`]. Both derive from the same column constants.

use super::Product;
use super::ports::Filter;

/// Column flagging a listing as published.
pub const ACTIVE_COLUMN: &str = "is_active";
/// Column flagging a listing as sold.
pub const SOLD_COLUMN: &str = "is_sold";

/// Query filters selecting only listed products.
pub fn listed_filters() -> [Filter; 2] {
    [
        Filter::eq(ACTIVE_COLUMN, true),
        Filter::eq(SOLD_COLUMN, false),
    ]
}

/// Return `true` when `product` may be shown to buyers.
pub fn is_listed(product: &Product) -> bool {
    product.is_active && !product.is_sold
}

/// Policy message for a product that is not listed, if any.
pub fn unlisted_reason(product: &Product) -> Option<&'static str> {
    if !product.is_active {
        Some("Product is not active")
    } else if product.is_sold {
        Some("Product has been sold")
    } else {
        None
    }
}
