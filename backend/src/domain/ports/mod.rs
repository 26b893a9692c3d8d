//! Domain ports for the hexagonal boundary.
//!
//! [`DataPort`] is the driven edge towards the hosted database. The
//! repository ports are what domain services consume.

mod macros;
pub(crate) use macros::define_port_error;

mod category_repository;
mod data_port;
mod product_repository;

#[cfg(test)]
pub use category_repository::MockCategoryRepository;
pub use category_repository::{
    CategoryRepository, DEFAULT_CATEGORY_SEARCH_LIMIT, FixtureCategoryRepository,
};
#[cfg(test)]
pub use data_port::MockDataPort;
pub use data_port::{
    DataPort, DataPortError, Filter, FilterValue, FixtureDataPort, Order, RangeOp, Row, Selection,
    SortDirection, Table, TableQuery,
};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{
    DEFAULT_PRODUCT_PAGE_SIZE, FixtureProductRepository, ProductListOptions, ProductRepository,
    ProductSearchFilters, ProductSearchParams, ProductSearchResult, ProductSort, ProductSortField,
};
