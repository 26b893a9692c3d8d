//! Repository implementations over the [`DataPort`](crate::domain::ports::DataPort).
//!
//! Repositories build port queries from domain criteria and map rows into
//! entities. `DataPortError::NoRows` becomes [`crate::domain::Error::NotFound`];
//! every other port failure becomes `Validation` with a short context prefix.

mod category_repository;
mod product_repository;
mod rows;

pub use category_repository::{DataPortCategoryRepository, MAX_BREADCRUMB_DEPTH};
pub use product_repository::DataPortProductRepository;
