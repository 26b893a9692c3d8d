//! Collision-free product slugs.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{DataPort, Filter, Table};
use crate::domain::slug::{DEFAULT_GENERATED_SLUG_LEN, random_token};
use crate::domain::{DomainResult, Error, Slug, is_reserved_slug, slugify};

/// Availability checks made before giving up on the title.
pub const MAX_SLUG_ATTEMPTS: u32 = 10;
/// Length of the random suffix appended on collision.
pub const COLLISION_SUFFIX_LEN: usize = 6;
const FALLBACK_TOKEN_LEN: usize = 12;

/// Outcome of [`UniqueSlugGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugGeneration {
    pub slug: Slug,
    /// The slug carries a random suffix rather than the bare title.
    pub has_collision_suffix: bool,
    /// Candidates tried, counting the one returned.
    pub attempts: u32,
}

/// Derive a product slug from a title that no other product uses.
#[derive(Clone)]
pub struct UniqueSlugGenerator<D: ?Sized> {
    port: Arc<D>,
    max_len: usize,
    reserved: Vec<String>,
}

impl<D: ?Sized> UniqueSlugGenerator<D> {
    /// Create a generator checking availability through `port`.
    pub fn new(port: Arc<D>) -> Self {
        Self {
            port,
            max_len: DEFAULT_GENERATED_SLUG_LEN,
            reserved: Vec::new(),
        }
    }

    /// Treat `words` as reserved in addition to the built-in list.
    #[must_use]
    pub fn with_reserved(mut self, words: impl IntoIterator<Item = String>) -> Self {
        self.reserved.extend(words);
        self
    }

    /// Hold `slug` back from later [`Self::generate`] calls, for example one
    /// already handed out but not yet stored.
    pub fn reserve(&mut self, slug: &str) {
        self.reserved.push(slug.to_owned());
    }

    /// Cap the base slug at `max_len` characters.
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    fn suffixed(&self, base: &str) -> String {
        let keep = self.max_len.saturating_sub(COLLISION_SUFFIX_LEN + 1);
        let prefix: String = base.chars().take(keep).collect();
        let prefix = prefix.trim_end_matches('-');
        let suffix = random_token(COLLISION_SUFFIX_LEN);
        if prefix.is_empty() {
            return format!("item-{suffix}");
        }
        format!("{prefix}-{suffix}")
    }
}

fn finish(candidate: String, has_collision_suffix: bool, attempts: u32) -> DomainResult<SlugGeneration> {
    let slug = Slug::new(&candidate)
        .map_err(|error| Error::validation(format!("Generated slug is invalid: {error}")))?;
    Ok(SlugGeneration {
        slug,
        has_collision_suffix,
        attempts,
    })
}

impl<D> UniqueSlugGenerator<D>
where
    D: DataPort + ?Sized,
{
    async fn is_taken(&self, candidate: &str, exclude: Option<Uuid>) -> DomainResult<bool> {
        let mut filters = vec![Filter::eq("slug", candidate)];
        filters.extend(exclude.map(|id| Filter::neq("id", id)));
        let matches = self
            .port
            .count(Table::Products, &filters)
            .await
            .map_err(|error| {
                debug!(%error, slug = candidate, "slug availability check failed");
                Error::validation(format!("Slug availability check failed: {error}"))
            })?;
        Ok(matches > 0)
    }

    /// Generate a slug for `title`.
    ///
    /// `exclude_product_id` lets a product keep its own slug when its title
    /// is edited. After [`MAX_SLUG_ATTEMPTS`] collisions the result falls
    /// back to `product-<random>` without a further check.
    pub async fn generate(
        &self,
        title: &str,
        exclude_product_id: Option<Uuid>,
    ) -> DomainResult<SlugGeneration> {
        let base = slugify(title, self.max_len);
        let mut candidate = base.clone();
        let mut attempts = 0;

        if is_reserved_slug(&candidate, &self.reserved) {
            candidate = self.suffixed(&base);
            attempts = 1;
        }

        while attempts < MAX_SLUG_ATTEMPTS {
            let held = is_reserved_slug(&candidate, &self.reserved);
            if !held && !self.is_taken(&candidate, exclude_product_id).await? {
                return finish(candidate, attempts > 0, attempts + 1);
            }
            attempts += 1;
            candidate = self.suffixed(&base);
        }

        debug!(base = %base, "slug candidates exhausted, using fallback");
        finish(
            format!("product-{}", random_token(FALLBACK_TOKEN_LEN)),
            true,
            MAX_SLUG_ATTEMPTS + 1,
        )
    }
}
