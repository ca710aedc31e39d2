//! Materialized result sets with membership tests

use oxrdf::{NamedNode, Quad, Subject, Term};
use std::collections::HashSet;

/// Set of quads returned by `QuadStore::get_dataset`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    quads: HashSet<Quad>,
}

impl Dataset {
    /// Create empty dataset
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a quad; returns false if already present
    pub fn insert(&mut self, quad: Quad) -> bool {
        self.quads.insert(quad)
    }

    /// Membership test
    #[inline]
    #[must_use]
    pub fn contains(&self, quad: &Quad) -> bool {
        self.quads.contains(quad)
    }

    /// Number of quads
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Whether the dataset holds no quads
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Iterate quads (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// Distinct subjects
    #[must_use]
    pub fn subjects(&self) -> HashSet<&Subject> {
        self.quads.iter().map(|q| &q.subject).collect()
    }

    /// Objects of every quad with the given subject and predicate
    pub fn objects_for<'a>(
        &'a self,
        subject: &'a Subject,
        predicate: &'a NamedNode,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.quads
            .iter()
            .filter(move |q| q.subject == *subject && q.predicate == *predicate)
            .map(|q| &q.object)
    }

    /// Consume into a vector
    #[must_use]
    pub fn into_vec(self) -> Vec<Quad> {
        self.quads.into_iter().collect()
    }
}

impl FromIterator<Quad> for Dataset {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        Self {
            quads: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataset {
    type Item = Quad;
    type IntoIter = std::collections::hash_set::IntoIter<Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.into_iter()
    }
}
