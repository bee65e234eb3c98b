//! NF-001: Data model — resource fragments, aggregated documents, generation config.
//!
//! Resource fragments follow the Terraform JSON array-wrapped block form:
//!
//! ```json
//! {"resource": [{"null_resource": [{"<name>": [{"triggers": {}}]}]}]}
//! ```

use super::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Top-level key of every fragment and of the aggregated document.
pub const RESOURCE_KEY: &str = "resource";

/// Type tag of the no-op resource used for every generated block.
pub const NULL_RESOURCE: &str = "null_resource";

/// Attribute map that every generated resource carries.
pub const TRIGGERS_KEY: &str = "triggers";

/// Trigger values keyed by trigger name (insertion-ordered).
pub type Triggers = Map<String, Value>;

// ============================================================================
// Resource representation
// ============================================================================

/// One resource fragment in Terraform JSON shape.
///
/// The wrapped tree is owned outright, so `clone()` is a full structural
/// deep copy with no shared substructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRepresentation(Value);

impl ResourceRepresentation {
    /// Build a single-resource fragment of the given type.
    pub(crate) fn single(resource_type: &str, name: &str, triggers: Triggers) -> Self {
        let mut attrs = Map::new();
        attrs.insert(TRIGGERS_KEY.to_string(), Value::Object(triggers));

        let mut block = Map::new();
        block.insert(name.to_string(), Value::Array(vec![Value::Object(attrs)]));

        let mut fragment = Map::new();
        fragment.insert(
            resource_type.to_string(),
            Value::Array(vec![Value::Object(block)]),
        );

        let mut root = Map::new();
        root.insert(
            RESOURCE_KEY.to_string(),
            Value::Array(vec![Value::Object(fragment)]),
        );
        Self(Value::Object(root))
    }

    /// Wrap an arbitrary JSON tree. Shape is not checked here; navigation
    /// methods report [`Error::StructuralMismatch`] lazily.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Entries of the fragment's `"resource"` list, if present.
    pub(crate) fn fragments(&self) -> Option<&Vec<Value>> {
        self.0.get(RESOURCE_KEY).and_then(Value::as_array)
    }

    /// The resource-type tag of the single wrapped resource.
    pub fn resource_type(&self) -> Result<String> {
        let fragment = first_object(&self.0, RESOURCE_KEY)?;
        single_key(fragment, "resource fragment").map(str::to_string)
    }

    /// The `{name: [attrs]}` block of the single wrapped resource.
    pub fn block(&self) -> Result<&Map<String, Value>> {
        let fragment = first_object(&self.0, RESOURCE_KEY)?;
        let tag = single_key(fragment, "resource fragment")?;
        first_object_in(fragment, tag)
    }

    /// Mutable access to the `{name: [attrs]}` block.
    pub fn block_mut(&mut self) -> Result<&mut Map<String, Value>> {
        let fragment = first_object_mut(&mut self.0, RESOURCE_KEY)?;
        let tag = single_key(fragment, "resource fragment")?.to_string();
        first_object_mut_in(fragment, &tag)
    }

    /// The name of the single wrapped resource.
    pub fn name(&self) -> Result<String> {
        single_key(self.block()?, "resource block").map(str::to_string)
    }

    /// Trigger map of the single wrapped resource.
    pub fn triggers(&self) -> Result<&Triggers> {
        let block = self.block()?;
        let name = single_key(block, "resource block")?;
        let attrs = first_object_in(block, name)?;
        attrs
            .get(TRIGGERS_KEY)
            .and_then(Value::as_object)
            .ok_or_else(|| Error::mismatch(format!("resource '{}' has no triggers map", name)))
    }

    /// Mutable trigger map of the single wrapped resource.
    pub fn triggers_mut(&mut self) -> Result<&mut Triggers> {
        let block = self.block_mut()?;
        let name = single_key(block, "resource block")?.to_string();
        let attrs = first_object_mut_in(block, &name)?;
        attrs
            .get_mut(TRIGGERS_KEY)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| Error::mismatch(format!("resource '{}' has no triggers map", name)))
    }
}

fn single_key<'a>(map: &'a Map<String, Value>, what: &str) -> Result<&'a str> {
    let mut keys = map.keys();
    match (keys.next(), keys.next()) {
        (Some(k), None) => Ok(k.as_str()),
        _ => Err(Error::mismatch(format!(
            "{} must have exactly one key, found {}",
            what,
            map.len()
        ))),
    }
}

fn first_object<'a>(value: &'a Value, key: &str) -> Result<&'a Map<String, Value>> {
    let map = value
        .as_object()
        .ok_or_else(|| Error::mismatch("representation is not an object"))?;
    first_object_in(map, key)
}

fn first_object_mut<'a>(value: &'a mut Value, key: &str) -> Result<&'a mut Map<String, Value>> {
    let map = value
        .as_object_mut()
        .ok_or_else(|| Error::mismatch("representation is not an object"))?;
    first_object_mut_in(map, key)
}

fn first_object_in<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Map<String, Value>> {
    map.get(key)
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(Value::as_object)
        .ok_or_else(|| Error::mismatch(format!("'{}' is not a list holding an object", key)))
}

fn first_object_mut_in<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Result<&'a mut Map<String, Value>> {
    map.get_mut(key)
        .and_then(Value::as_array_mut)
        .and_then(|list| list.first_mut())
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Error::mismatch(format!("'{}' is not a list holding an object", key)))
}

// ============================================================================
// Aggregated document
// ============================================================================

/// The export-ready document: `{"resource": [fragment, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedDocument {
    /// Fragments in insertion order
    pub resource: Vec<Value>,
}

impl AggregatedDocument {
    pub fn len(&self) -> usize {
        self.resource.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resource.is_empty()
    }

    /// Resource names in document order. Malformed fragments are skipped.
    pub fn resource_names(&self) -> Vec<String> {
        self.resource
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|fragment| fragment.values().next())
            .filter_map(Value::as_array)
            .filter_map(|list| list.first())
            .filter_map(Value::as_object)
            .filter_map(|block| block.keys().next().cloned())
            .collect()
    }

    /// Serialize with four-space indentation and a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| Error::mismatch(format!("non-UTF-8 output: {}", e)))
    }
}

// ============================================================================
// Generation config (nullforge.yaml)
// ============================================================================

/// Root generation config — what to build and where to write it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Environment name seeded into the shared store
    #[serde(default = "default_env_name")]
    pub env_name: String,

    /// Destination of the Terraform JSON document
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Add `factory_uuid` / `timestamp` triggers to factory output
    #[serde(default)]
    pub stamp_triggers: bool,

    /// Free-form settings copied into the shared store
    #[serde(default)]
    pub settings: IndexMap<String, Value>,

    /// Cloned fleet of identical resources
    #[serde(default)]
    pub fleet: FleetSpec,

    /// Individually declared resources, appended after the fleet
    #[serde(default)]
    pub custom_resources: Vec<CustomResource>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            env_name: default_env_name(),
            output: default_output(),
            stamp_triggers: false,
            settings: IndexMap::new(),
            fleet: FleetSpec::default(),
            custom_resources: Vec::new(),
        }
    }
}

/// Fleet section of the generation config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSpec {
    /// Name the clones are derived from
    #[serde(default = "default_base_name")]
    pub base_name: String,

    /// Number of clones
    #[serde(default = "default_fleet_count")]
    pub count: usize,
}

impl Default for FleetSpec {
    fn default() -> Self {
        Self {
            base_name: default_base_name(),
            count: default_fleet_count(),
        }
    }
}

/// A single declared resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomResource {
    pub name: String,

    #[serde(default)]
    pub triggers: Triggers,
}

fn default_env_name() -> String {
    "default".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("terraform").join("main.tf.json")
}

pub(crate) fn default_base_name() -> String {
    "placeholder".to_string()
}

fn default_fleet_count() -> usize {
    5
}

// ============================================================================
// Export result
// ============================================================================

/// Outcome of writing a document to disk.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub resources: usize,
    /// `blake3:<hex>` digest of the written bytes
    pub hash: String,
}

// ============================================================================
// Tests
// ============================================================================
