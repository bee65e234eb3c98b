//! NF-004: Resource prototypes — deep-copy-and-mutate cloning.
//!
//! A prototype owns its representation. Cloning copies the whole tree and
//! hands the copy to the new prototype, so no substructure is ever shared
//! between a clone and its source.

use super::error::{Error, Result};
use super::types::ResourceRepresentation;
use serde_json::Value;

/// An in-place transformation applied to a freshly cloned representation.
pub trait Mutation {
    fn apply(&self, repr: &mut ResourceRepresentation) -> Result<()>;
}

impl<F> Mutation for F
where
    F: Fn(&mut ResourceRepresentation) -> Result<()>,
{
    fn apply(&self, repr: &mut ResourceRepresentation) -> Result<()> {
        self(repr)
    }
}

/// Per-clone transformation used by fleets: suffix the name with the index
/// and record the index as a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneMutation {
    pub index: usize,
}

impl Mutation for CloneMutation {
    fn apply(&self, repr: &mut ResourceRepresentation) -> Result<()> {
        rename_and_tag(repr, self.index)
    }
}

/// Rename the single resource to `<name>_<index>` and set `triggers.index`.
pub fn rename_and_tag(repr: &mut ResourceRepresentation, index: usize) -> Result<()> {
    let block = repr.block_mut()?;
    let original = match (block.len(), block.keys().next()) {
        (1, Some(name)) => name.clone(),
        (n, _) => {
            return Err(Error::StructuralMismatch(format!(
                "resource block must hold exactly one resource, found {}",
                n
            )))
        }
    };
    let renamed = format!("{}_{}", original, index);
    if let Some(attrs) = block.remove(&original) {
        block.insert(renamed, attrs);
    }
    repr.triggers_mut()?
        .insert("index".to_string(), Value::from(index));
    Ok(())
}

/// A representation that can be cloned into independent variants.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePrototype {
    data: ResourceRepresentation,
}

impl ResourcePrototype {
    pub fn new(data: ResourceRepresentation) -> Self {
        Self { data }
    }

    /// Read access to the wrapped representation.
    pub fn data(&self) -> &ResourceRepresentation {
        &self.data
    }

    pub fn into_data(self) -> ResourceRepresentation {
        self.data
    }

    /// Deep-copy this prototype, applying `mutation` to the copy if given.
    ///
    /// The source is never touched. A mutation that cannot navigate the
    /// copy's shape fails with [`Error::StructuralMismatch`].
    pub fn clone_with(&self, mutation: Option<&dyn Mutation>) -> Result<ResourcePrototype> {
        let mut copy = self.data.clone();
        if let Some(m) = mutation {
            m.apply(&mut copy)?;
        }
        Ok(ResourcePrototype::new(copy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::factory::NullResourceFactory;
    use serde_json::json;

    fn base() -> ResourcePrototype {
        ResourcePrototype::new(NullResourceFactory::new().create("placeholder", None).unwrap())
    }

    #[test]
    fn test_nf004_clone_without_mutation_is_equal() {
        let proto = base();
        let copy = proto.clone_with(None).unwrap();
        assert_eq!(copy.data(), proto.data());
    }

    #[test]
    fn test_nf004_clone_mutation_renames_and_tags() {
        let proto = base();
        let copy = proto.clone_with(Some(&CloneMutation { index: 7 })).unwrap();
        assert_eq!(copy.data().name().unwrap(), "placeholder_7");
        assert_eq!(copy.data().triggers().unwrap()["index"], json!(7));
    }

    #[test]
    fn test_nf004_source_untouched_by_clone_mutation() {
        let proto = base();
        let before = proto.data().clone();
        let _ = proto.clone_with(Some(&CloneMutation { index: 1 })).unwrap();
        assert_eq!(proto.data(), &before);
        assert_eq!(proto.data().name().unwrap(), "placeholder");
        assert!(proto.data().triggers().unwrap().is_empty());
    }

    #[test]
    fn test_nf004_mutating_clone_later_does_not_leak() {
        let proto = base();
        let copy = proto.clone_with(None).unwrap();
        let mut data = copy.into_data();
        data.triggers_mut().unwrap().insert("x".into(), json!(true));
        assert!(proto.data().triggers().unwrap().is_empty());
    }

    #[test]
    fn test_nf004_closure_mutation() {
        let proto = base();
        let add_owner = |r: &mut ResourceRepresentation| -> Result<()> {
            r.triggers_mut()?.insert("owner".into(), json!("ops"));
            Ok(())
        };
        let copy = proto.clone_with(Some(&add_owner)).unwrap();
        assert_eq!(copy.data().triggers().unwrap()["owner"], json!("ops"));
        assert_eq!(copy.data().name().unwrap(), "placeholder");
    }

    #[test]
    fn test_nf004_chained_clones_accumulate_suffixes() {
        let proto = base();
        let first = proto.clone_with(Some(&CloneMutation { index: 0 })).unwrap();
        let second = first.clone_with(Some(&CloneMutation { index: 3 })).unwrap();
        assert_eq!(second.data().name().unwrap(), "placeholder_0_3");
        assert_eq!(first.data().name().unwrap(), "placeholder_0");
    }

    #[test]
    fn test_nf004_mismatch_on_bad_shape() {
        let proto = ResourcePrototype::new(ResourceRepresentation::from_value(json!({"resource": {}})));
        let err = proto
            .clone_with(Some(&CloneMutation { index: 0 }))
            .unwrap_err();
        assert!(matches!(err, Error::StructuralMismatch(_)));
    }

    #[test]
    fn test_nf004_rename_and_tag_pure() {
        let mut repr = NullResourceFactory::new().create("db", None).unwrap();
        rename_and_tag(&mut repr, 2).unwrap();
        assert_eq!(
            repr.as_value(),
            &json!({"resource": [{"null_resource": [{"db_2": [{"triggers": {"index": 2}}]}]}]})
        );
    }
}
