//! NF-003: `null_resource` factory.
//!
//! Produces single-resource fragments in Terraform JSON block form. The
//! default factory is deterministic; [`NullResourceFactory::stamped`] adds a
//! random `factory_uuid` and a UTC `timestamp` trigger unless the caller
//! already supplied them.

use super::error::{Error, Result};
use super::types::{ResourceRepresentation, Triggers, NULL_RESOURCE};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// Trigger key holding the per-creation UUID.
pub const UUID_TRIGGER: &str = "factory_uuid";

/// Trigger key holding the creation timestamp.
pub const TIMESTAMP_TRIGGER: &str = "timestamp";

/// Factory for `null_resource` fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResourceFactory {
    stamp_triggers: bool,
}

impl NullResourceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory that stamps every resource with a UUID and timestamp.
    pub fn stamped() -> Self {
        Self {
            stamp_triggers: true,
        }
    }

    pub fn stamps_triggers(&self) -> bool {
        self.stamp_triggers
    }

    /// Create one `null_resource` named `name`.
    ///
    /// `triggers` defaults to an empty map.
    pub fn create(&self, name: &str, triggers: Option<Triggers>) -> Result<ResourceRepresentation> {
        validate_name(name)?;
        let mut triggers = triggers.unwrap_or_default();
        if self.stamp_triggers {
            triggers
                .entry(UUID_TRIGGER)
                .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
            triggers.entry(TIMESTAMP_TRIGGER).or_insert_with(|| {
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
            });
        }
        log::trace!("factory: created {}.{}", NULL_RESOURCE, name);
        Ok(ResourceRepresentation::single(NULL_RESOURCE, name, triggers))
    }
}

/// Check that `name` can be used as a Terraform resource name.
///
/// Terraform identifiers start with a letter or underscore and continue with
/// letters, digits, underscores, or dashes. Letters are Unicode letters.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let mut chars = name.chars();
    let first = chars.next().ok_or_else(|| invalid("must not be empty"))?;
    if !(first.is_alphabetic() || first == '_') {
        return Err(invalid("must start with a letter or underscore"));
    }
    if let Some(bad) = chars.find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '-')) {
        return Err(invalid(&format!("contains invalid character '{}'", bad)));
    }
    Ok(())
}
