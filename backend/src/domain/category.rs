//! Category taxonomy entities.
//!
//! Categories form a self-referential tree through `parent_id`. The backing
//! store is trusted to keep the tree acyclic; nothing here defends against
//! cycles beyond the breadcrumb depth guard in the repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{Error, Slug};

/// Product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub slug: Slug,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub sort_order: i32,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Return `true` when the category has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Category with its children materialised, for serialisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// Parent/child view over a flat category list.
///
/// Nodes live in one vector and refer to each other by index. Building is a
/// two-pass process: index every id, then attach each node to its parent's
/// child list (or to the roots). A node whose `parent_id` is unknown is left
/// unattached, which also hides its own descendants.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use marketplace::domain::{Category, CategoryTree, Slug};
/// use uuid::Uuid;
///
/// let category = |name: &str, parent_id| Category {
///     id: Uuid::new_v4(),
///     name: name.to_owned(),
///     description: None,
///     slug: Slug::new(name).expect("valid slug"),
///     parent_id,
///     level: 1,
///     sort_order: 0,
///     is_active: true,
///     image_url: None,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
/// let women = category("women", None);
/// let dresses = category("dresses", Some(women.id));
/// let tree = CategoryTree::build(vec![women.clone(), dresses.clone()]);
///
/// assert_eq!(tree.roots().count(), 1);
/// assert_eq!(tree.children_of(women.id).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: Vec<Category>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    index: HashMap<Uuid, usize>,
}

impl CategoryTree {
    /// Build the tree, preserving input order among siblings.
    pub fn build(categories: Vec<Category>) -> Self {
        let index: HashMap<Uuid, usize> = categories
            .iter()
            .enumerate()
            .map(|(position, category)| (category.id, position))
            .collect();

        let mut children = vec![Vec::new(); categories.len()];
        let mut roots = Vec::new();
        for (position, category) in categories.iter().enumerate() {
            match category.parent_id {
                None => roots.push(position),
                Some(parent_id) => match index.get(&parent_id) {
                    Some(&parent) => {
                        if let Some(siblings) = children.get_mut(parent) {
                            siblings.push(position);
                        }
                    }
                    None => debug!(
                        category_id = %category.id,
                        %parent_id,
                        "dropping category with unknown parent from tree"
                    ),
                },
            }
        }

        Self {
            nodes: categories,
            children,
            roots,
            index,
        }
    }

    /// Top-level categories.
    pub fn roots(&self) -> impl Iterator<Item = &Category> + '_ {
        self.roots.iter().filter_map(|&position| self.nodes.get(position))
    }

    /// Direct children of `id`; empty when `id` is unknown or a leaf.
    pub fn children_of(&self, id: Uuid) -> Vec<&Category> {
        self.index
            .get(&id)
            .and_then(|&position| self.children.get(position))
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&child| self.nodes.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up any category passed to [`CategoryTree::build`].
    pub fn get(&self, id: Uuid) -> Option<&Category> {
        self.index
            .get(&id)
            .and_then(|&position| self.nodes.get(position))
    }

    /// Categories reachable from a root, in depth-first pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> + '_ {
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let position = stack.pop()?;
            if let Some(children) = self.children.get(position) {
                stack.extend(children.iter().rev().copied());
            }
            self.nodes.get(position)
        })
    }

    /// Number of categories reachable from a root.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Return `true` when no category is reachable.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Materialise nested nodes for serialisation.
    pub fn to_nested(&self) -> Vec<CategoryNode> {
        self.roots
            .iter()
            .filter_map(|&position| self.node_at(position))
            .collect()
    }

    fn node_at(&self, position: usize) -> Option<CategoryNode> {
        let category = self.nodes.get(position)?.clone();
        let children = self
            .children
            .get(position)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&child| self.node_at(child))
                    .collect()
            })
            .unwrap_or_default();
        Some(CategoryNode { category, children })
    }
}

/// Whether a breadcrumb reached a root category.
#[derive(Debug, Clone, PartialEq)]
pub enum BreadcrumbCompleteness {
    /// Every ancestor up to a root was resolved.
    Complete,
    /// The walk stopped early; `trail` starts below `missing_ancestor`.
    Partial {
        missing_ancestor: Uuid,
        reason: Error,
    },
}

/// Ancestor chain from the root down to a category, inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Breadcrumb {
    pub trail: Vec<Category>,
    pub completeness: BreadcrumbCompleteness,
}

impl Breadcrumb {
    /// Return `true` when the trail starts at a root.
    pub fn is_complete(&self) -> bool {
        matches!(self.completeness, BreadcrumbCompleteness::Complete)
    }

    /// Category ids along the trail.
    pub fn ids(&self) -> Vec<Uuid> {
        self.trail.iter().map(|category| category.id).collect()
    }
}
