//! Page envelope returned by listing endpoints.

use serde::{Deserialize, Serialize};
use url::Url;

const CURSOR_PARAM: &str = "cursor";

/// One page of results plus continuation metadata.
///
/// `has_more` is a heuristic supplied by the producer; listing endpoints in
/// this workspace report `true` whenever the page came back full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in delivery order.
    pub items: Vec<T>,
    /// Total number of matching rows reported by the backing store.
    pub total: u64,
    /// Whether another page is expected after this one.
    pub has_more: bool,
    /// Opaque token for the next page, when one is expected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page, deriving `has_more` from whether `items` filled
    /// `page_size`.
    ///
    /// The cursor is dropped when the page is not full so callers never
    /// advertise a continuation for a short page.
    pub fn new(items: Vec<T>, total: u64, page_size: usize, next_cursor: Option<String>) -> Self {
        let has_more = page_size > 0 && items.len() == page_size;
        Self {
            items,
            total,
            has_more,
            next_cursor: next_cursor.filter(|_| has_more),
        }
    }

    /// Build the link to the next page by appending the cursor to `base`.
    ///
    /// Any existing `cursor` query parameter on `base` is replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::Page;
    /// use url::Url;
    ///
    /// let page = Page::new(vec!["a"], 2, 1, Some("MTox".to_owned()));
    /// let base = Url::parse("https://shop.test/search?q=denim").expect("valid url");
    /// let link = page.next_link(&base).expect("page is full");
    /// assert_eq!(link.as_str(), "https://shop.test/search?q=denim&cursor=MTox");
    /// ```
    #[must_use]
    pub fn next_link(&self, base: &Url) -> Option<Url> {
        let token = self.next_cursor.as_deref()?;
        let mut link = base.clone();
        let retained: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(key, _)| key != CURSOR_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        {
            let mut pairs = link.query_pairs_mut();
            pairs.clear();
            for (key, value) in &retained {
                pairs.append_pair(key, value);
            }
            pairs.append_pair(CURSOR_PARAM, token);
        }
        Some(link)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page envelopes.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::full_page(3, 3, true)]
    #[case::short_page(2, 3, false)]
    #[case::empty_page(0, 3, false)]
    fn has_more_tracks_full_pages(
        #[case] delivered: usize,
        #[case] page_size: usize,
        #[case] expected: bool,
    ) {
        let items = vec![0_u8; delivered];
        let page = Page::new(items, 10, page_size, Some("token".to_owned()));
        assert_eq!(page.has_more, expected);
        assert_eq!(page.next_cursor.is_some(), expected);
    }

    #[rstest]
    fn next_link_replaces_existing_cursor() {
        let page = Page::new(vec![1], 5, 1, Some("next".to_owned()));
        let base = Url::parse("https://shop.test/c/women?cursor=old&sort=price").expect("url");
        let link = page.next_link(&base).expect("link");
        assert_eq!(link.as_str(), "https://shop.test/c/women?sort=price&cursor=next");
    }

    #[rstest]
    fn short_page_has_no_link() {
        let page = Page::new(vec![1], 1, 5, Some("next".to_owned()));
        let base = Url::parse("https://shop.test/search").expect("url");
        assert!(page.next_link(&base).is_none());
    }

    #[rstest]
    fn serialises_camel_case_envelope() {
        let page = Page::new(vec!["a"], 4, 1, Some("abc".to_owned()));
        let value = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(
            value,
            serde_json::json!({
                "items": ["a"],
                "total": 4,
                "hasMore": true,
                "nextCursor": "abc"
            })
        );
    }
}
