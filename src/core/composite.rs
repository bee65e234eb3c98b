//! NF-005: Composite module — collects fragments into one document.

use super::types::{AggregatedDocument, ResourceRepresentation};

/// Ordered collection of resource fragments treated as one module.
///
/// No name uniqueness is enforced here; callers establish it.
#[derive(Debug, Clone, Default)]
pub struct CompositeModule {
    children: Vec<ResourceRepresentation>,
    exports: usize,
}

impl CompositeModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment.
    pub fn add(&mut self, repr: ResourceRepresentation) {
        self.children.push(repr);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of `export()` calls since creation or the last `reset()`.
    pub fn export_count(&self) -> usize {
        self.exports
    }

    /// Drop all fragments and the export counter.
    pub fn reset(&mut self) {
        self.children.clear();
        self.exports = 0;
    }

    /// Flatten every fragment's `"resource"` list into one document.
    ///
    /// Export does not consume the children: repeating it yields the same
    /// document. Fragments without a `"resource"` list contribute nothing.
    pub fn export(&mut self) -> AggregatedDocument {
        if self.exports > 0 {
            log::warn!(
                "composite re-exported ({} previous export(s)) without reset",
                self.exports
            );
        }
        self.exports += 1;
        self.aggregate()
    }

    /// Flattened view of the current children. Does not count as an export.
    pub fn aggregate(&self) -> AggregatedDocument {
        let mut doc = AggregatedDocument::default();
        for child in &self.children {
            match child.fragments() {
                Some(list) => doc.resource.extend(list.iter().cloned()),
                None => log::debug!("skipping fragment without a resource list"),
            }
        }
        doc
    }
}
