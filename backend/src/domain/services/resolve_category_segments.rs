//! Category URL path resolution.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::ports::CategoryRepository;
use crate::domain::slug::{MAX_SLUG_LEN, is_valid_slug};
use crate::domain::{DomainResult, Error};

/// Deepest category path accepted in a URL.
pub const MAX_CATEGORY_DEPTH: usize = 5;

/// Turn `/women/clothing/dresses` style segments into category ids.
#[derive(Clone)]
pub struct ResolveCategorySegments<C: ?Sized> {
    categories: Arc<C>,
}

impl<C: ?Sized> ResolveCategorySegments<C> {
    /// Create the service over a category repository.
    pub fn new(categories: Arc<C>) -> Self {
        Self { categories }
    }
}

/// Trim and lower-case each segment, collecting every malformed one.
fn clean_segments(segments: &[String]) -> DomainResult<Vec<String>> {
    let mut problems = Vec::new();
    let mut cleaned = Vec::with_capacity(segments.len());
    for (position, segment) in segments.iter().enumerate() {
        let normalised = segment.trim().to_lowercase();
        if normalised.is_empty() {
            problems.push(format!("Segment {} cannot be empty", position + 1));
        } else if !is_valid_slug(&normalised) {
            problems.push(format!("Segment \"{segment}\" contains invalid characters"));
        } else if normalised.chars().count() > MAX_SLUG_LEN {
            problems.push(format!("Segment \"{segment}\" is too long"));
        } else {
            cleaned.push(normalised);
        }
    }

    if !problems.is_empty() {
        return Err(Error::validation(format!(
            "Invalid segments: {}",
            problems.join(", ")
        )));
    }
    if cleaned.len() > MAX_CATEGORY_DEPTH {
        return Err(Error::validation(format!(
            "Category path too deep (maximum {MAX_CATEGORY_DEPTH} levels)"
        )));
    }
    Ok(cleaned)
}

impl<C> ResolveCategorySegments<C>
where
    C: CategoryRepository + ?Sized,
{
    /// Validate `segments` and resolve them to at most one category id.
    ///
    /// An empty path resolves to an empty list without touching the
    /// repository.
    pub async fn execute(&self, segments: &[String]) -> DomainResult<Vec<Uuid>> {
        let cleaned = clean_segments(segments)?;
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }
        self.categories.resolve_segments(&cleaned).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockCategoryRepository;
    use rstest::rstest;

    fn segments(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    fn untouched_repo() -> MockCategoryRepository {
        let mut repo = MockCategoryRepository::new();
        repo.expect_resolve_segments().times(0);
        repo
    }

    #[tokio::test]
    async fn rejects_paths_deeper_than_five() {
        let service = ResolveCategorySegments::new(Arc::new(untouched_repo()));

        let error = service
            .execute(&segments(&["a", "b", "c", "d", "e", "f"]))
            .await
            .expect_err("too deep");

        assert_eq!(
            error,
            Error::validation("Category path too deep (maximum 5 levels)")
        );
    }

    #[rstest]
    #[case(&["Invalid_Segment!"], "Invalid segments: Segment \"Invalid_Segment!\" contains invalid characters")]
    #[case(&["women", " "], "Invalid segments: Segment 2 cannot be empty")]
    #[case(&["-dash", ""], "Invalid segments: Segment \"-dash\" contains invalid characters, Segment 2 cannot be empty")]
    #[tokio::test]
    async fn reports_every_malformed_segment(#[case] input: &[&str], #[case] message: &str) {
        let service = ResolveCategorySegments::new(Arc::new(untouched_repo()));

        let error = service
            .execute(&segments(input))
            .await
            .expect_err("malformed");

        assert_eq!(error, Error::validation(message));
    }

    #[tokio::test]
    async fn overlong_segment_is_rejected() {
        let service = ResolveCategorySegments::new(Arc::new(untouched_repo()));
        let long = "a".repeat(MAX_SLUG_LEN + 1);

        let error = service
            .execute(&[long.clone()])
            .await
            .expect_err("too long");

        assert_eq!(
            error,
            Error::validation(format!("Invalid segments: Segment \"{long}\" is too long"))
        );
    }

    #[tokio::test]
    async fn empty_path_resolves_to_nothing() {
        let service = ResolveCategorySegments::new(Arc::new(untouched_repo()));
        assert_eq!(service.execute(&[]).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn normalises_before_resolving() {
        let id = Uuid::new_v4();
        let mut repo = MockCategoryRepository::new();
        repo.expect_resolve_segments()
            .withf(|cleaned| cleaned == ["women".to_owned(), "dresses".to_owned()])
            .times(1)
            .returning(move |_| Ok(vec![id]));
        let service = ResolveCategorySegments::new(Arc::new(repo));

        let resolved = service
            .execute(&segments(&[" Women ", "DRESSES"]))
            .await
            .expect("resolves");

        assert_eq!(resolved, vec![id]);
    }
}
