//! Opaque cursor and page envelope primitives for listing endpoints.
//!
//! Listing endpoints hand clients an opaque continuation token rather than a
//! raw offset so that pages stay stable while rows are inserted concurrently.
//! A [`Cursor`] captures the keyset position of the last row on a page: an
//! integral sort key (for example a timestamp in epoch microseconds) and the
//! row identifier used to break ties between equal sort keys.
//!
//! Clients must treat the encoded token as opaque and only echo back values
//! previously returned in [`Page::next_cursor`].
//!
//! # Examples
//!
//! ```
//! use pagination::{Cursor, Page};
//!
//! let cursor = Cursor::new(1_704_067_200_000_000, "2f0c1d3e-0000-4000-8000-000000000001");
//! let token = cursor.encode();
//! assert_eq!(Cursor::decode(&token).expect("token round-trips"), cursor);
//!
//! let page = Page::new(vec![1, 2, 3], 10, 3, Some(token));
//! assert!(page.has_more);
//! ```

mod cursor;
mod page;

pub use cursor::{Cursor, CursorError};
pub use page::Page;
