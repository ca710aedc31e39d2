//! Shape descriptors
//!
//! A [`ShapeDescriptor`] is a read-only projection of one shape declaration:
//! everything a generic CRUD screen needs to list, label and mint instances
//! of the shape's target type.

use crate::naming::{pluralize, slugify};
use sdm_store::oxrdf::NamedNode;

/// CRUD metadata derived from one shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeDescriptor {
    /// IRI of the declaring shape
    pub shape_id: NamedNode,
    /// IRI of the instances this shape governs
    pub target_type: NamedNode,
    /// Display label
    pub label: String,
    /// Pluralised label
    pub plural_label: String,
    /// Human-readable description
    pub description: String,
    /// Label of the "create" action
    pub create_action_label: String,
    /// Label of the "save" action
    pub save_action_label: String,
    /// URL-safe form of the label
    pub slug: String,
    /// IRI prefix new instances are minted under
    pub values_namespace: String,
}

impl ShapeDescriptor {
    /// Build a descriptor, deriving plural, action labels and slug
    #[must_use]
    pub fn new(
        shape_id: NamedNode,
        target_type: NamedNode,
        label: impl Into<String>,
        description: impl Into<String>,
        values_namespace: impl Into<String>,
    ) -> Self {
        let label = label.into();
        Self {
            shape_id,
            target_type,
            plural_label: pluralize(&label),
            create_action_label: format!("Create {label}"),
            save_action_label: format!("Save {label}"),
            slug: slugify(&label),
            description: description.into(),
            values_namespace: values_namespace.into(),
            label,
        }
    }
}

/// Label-sorted collection of descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorSet {
    descriptors: Vec<ShapeDescriptor>,
}

impl DescriptorSet {
    /// Create set, sorting by label case-insensitively
    #[must_use]
    pub fn new(mut descriptors: Vec<ShapeDescriptor>) -> Self {
        descriptors.sort_by(|a, b| {
            a.label
                .to_lowercase()
                .cmp(&b.label.to_lowercase())
                .then_with(|| a.shape_id.as_str().cmp(b.shape_id.as_str()))
        });
        Self { descriptors }
    }

    /// Descriptor whose slug matches
    #[must_use]
    pub fn by_slug(&self, slug: &str) -> Option<&ShapeDescriptor> {
        self.descriptors.iter().find(|d| d.slug == slug)
    }

    /// Descriptor governing a type
    #[must_use]
    pub fn by_target_type(&self, target_type: &NamedNode) -> Option<&ShapeDescriptor> {
        self.descriptors.iter().find(|d| d.target_type == *target_type)
    }

    /// Iterate in label order
    pub fn iter(&self) -> std::slice::Iter<'_, ShapeDescriptor> {
        self.descriptors.iter()
    }

    /// Descriptors as a slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[ShapeDescriptor] {
        &self.descriptors
    }

    /// Number of descriptors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<'a> IntoIterator for &'a DescriptorSet {
    type Item = &'a ShapeDescriptor;
    type IntoIter = std::slice::Iter<'a, ShapeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(label: &str) -> ShapeDescriptor {
        ShapeDescriptor::new(
            NamedNode::new_unchecked(format!("https://x/shapes/{label}")),
            NamedNode::new_unchecked(format!("https://x/types/{label}")),
            label,
            "desc",
            "https://x/values/",
        )
    }

    #[test]
    fn derived_fields() {
        let d = descriptor("Product Category");
        assert_eq!(d.plural_label, "Product Categories");
        assert_eq!(d.create_action_label, "Create Product Category");
        assert_eq!(d.save_action_label, "Save Product Category");
        assert_eq!(d.slug, "product-category");
    }

    #[test]
    fn set_sorts_case_insensitively_and_looks_up() {
        let set = DescriptorSet::new(vec![descriptor("beta"), descriptor("Alpha"), descriptor("Gamma")]);
        let labels: Vec<_> = set.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "beta", "Gamma"]);

        assert!(set.by_slug("gamma").is_some());
        let target = NamedNode::new_unchecked("https://x/types/beta");
        assert_eq!(set.by_target_type(&target).map(|d| d.label.as_str()), Some("beta"));
    }
}
