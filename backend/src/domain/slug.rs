//! URL slug value object and slug generation helpers.
//!
//! Slugs are lower-case identifiers made of ASCII letters and digits joined by
//! single hyphens, for example `vintage-levis-501`.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum accepted slug length in characters.
pub const MAX_SLUG_LEN: usize = 255;
/// Default maximum length of a slug derived from free text.
pub const DEFAULT_GENERATED_SLUG_LEN: usize = 60;
const MIN_GENERATED_SLUG_LEN: usize = 3;
const RANDOM_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Route words and ambiguous short words that products may not claim.
pub const RESERVED_SLUGS: &[&str] = &[
    "api", "auth", "category", "search", "signup", "login", "logout", "profile", "wishlist",
    "checkout", "terms", "privacy", "sitemap.xml", "robots.txt", "admin", "dashboard", "sell",
    "favorites", "onboarding", "welcome", "settings", "upgrade", "orders", "order-management",
    "subscriptions", "webhooks", "payments", "uploads", "images", "notifications", "about",
    "contact", "help", "support", "faq", "legal", "cookies", "accessibility", "security",
    "status", "health", "www", "mail", "ftp", "test", "staging", "dev", "development",
    "production", "prod", "demo", "sandbox", "a", "an", "the", "and", "or", "but", "in", "on",
    "at", "to", "for", "of", "with", "by", "new", "old", "hot", "top", "best", "popular",
    "trending", "featured", "latest",
];

/// Validation errors raised by [`Slug::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugValidationError {
    #[error("Slug cannot be empty")]
    Empty,
    #[error("Slug cannot exceed {MAX_SLUG_LEN} characters")]
    TooLong,
    #[error("Slug cannot start or end with a hyphen")]
    EdgeHyphen,
    #[error("Slug must contain only lowercase letters, numbers, and hyphens")]
    InvalidCharacters,
}

/// Immutable, validated URL slug.
///
/// Input is lower-cased before validation, so `Slug::new("ABC")` equals
/// `Slug::new("abc")`.
///
/// # Examples
/// ```
/// use marketplace::domain::Slug;
///
/// let slug = Slug::new("Summer-Dress-2024").expect("valid slug");
/// assert_eq!(slug.as_str(), "summer-dress-2024");
/// assert!(Slug::new("-leading").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Lower-case and validate `value`.
    pub fn new(value: impl AsRef<str>) -> Result<Self, SlugValidationError> {
        let lowered = value.as_ref().to_lowercase();
        validate(&lowered)?;
        Ok(Self(lowered))
    }

    /// Borrow the slug text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

fn validate(value: &str) -> Result<(), SlugValidationError> {
    if value.trim().is_empty() {
        return Err(SlugValidationError::Empty);
    }
    if value.chars().count() > MAX_SLUG_LEN {
        return Err(SlugValidationError::TooLong);
    }
    if value.starts_with('-') || value.ends_with('-') {
        return Err(SlugValidationError::EdgeHyphen);
    }
    if !is_valid_slug(value) {
        return Err(SlugValidationError::InvalidCharacters);
    }
    Ok(())
}

/// Return `true` when `value` matches `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        })
}

/// Return `true` when `slug` is reserved, ignoring case.
///
/// `additional` extends the built-in [`RESERVED_SLUGS`] list.
pub fn is_reserved_slug(slug: &str, additional: &[String]) -> bool {
    let lowered = slug.to_lowercase();
    RESERVED_SLUGS.contains(&lowered.as_str())
        || additional.iter().any(|word| word.to_lowercase() == lowered)
}

/// Derive a slug from free text such as a product title.
///
/// Characters other than ASCII letters, digits, whitespace, `_` and `-` are
/// dropped; whitespace and underscore runs become one hyphen. Results shorter
/// than three characters fall back to `item-<random>`.
///
/// # Examples
/// ```
/// use marketplace::domain::slugify;
///
/// assert_eq!(slugify("  Hello!  @#$ World? ", 60), "hello-world");
/// assert_eq!(slugify("Product 123 ABC", 60), "product-123-abc");
/// assert!(slugify("Hi", 60).starts_with("item-"));
/// ```
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_hyphen = true;
        }
    }

    let truncated: String = slug.chars().take(max_len).collect();
    let trimmed = truncated.trim_end_matches('-');
    if trimmed.chars().count() < MIN_GENERATED_SLUG_LEN {
        return format!("item-{}", random_token(6));
    }
    trimmed.to_owned()
}

/// Random lower-case base36 token used for collision suffixes.
pub(crate) fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let index = rng.gen_range(0..RANDOM_ALPHABET.len());
            RANDOM_ALPHABET
                .get(index)
                .map_or('0', |byte| char::from(*byte))
        })
        .collect()
}
