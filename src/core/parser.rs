//! NF-009: Config parsing and document validation.
//!
//! Parses `nullforge.yaml` and checks structural constraints:
//! - Environment name must not be empty
//! - Fleet base name and custom resource names must be valid identifiers
//! - Generated names must not collide
//!
//! Also checks that an existing `.tf.json` has the array-wrapped block shape
//! and unique resource names.

use super::error::{Error, Result};
use super::factory::validate_name;
use super::types::{GenerateConfig, RESOURCE_KEY, TRIGGERS_KEY};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse a `nullforge.yaml` file from disk.
pub fn parse_config_file(path: &Path) -> Result<GenerateConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::fs(path, e))?;
    parse_config(&content)
}

/// Parse a `nullforge.yaml` from a string.
pub fn parse_config(yaml: &str) -> Result<GenerateConfig> {
    serde_yaml_ng::from_str(yaml).map_err(|e| Error::Config(format!("YAML parse error: {}", e)))
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &GenerateConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.env_name.trim().is_empty() {
        errors.push(ValidationError::new("env_name must not be empty"));
    }

    let fleet = &config.fleet;
    if fleet.count > 0 {
        if let Err(e) = validate_name(&fleet.base_name) {
            errors.push(ValidationError::new(format!("fleet: {}", e)));
        }
    }

    let mut names = HashSet::new();
    for custom in &config.custom_resources {
        if let Err(e) = validate_name(&custom.name) {
            errors.push(ValidationError::new(format!("custom_resources: {}", e)));
        }
        let in_fleet = fleet_index(&fleet.base_name, &custom.name).is_some_and(|i| i < fleet.count);
        if in_fleet || !names.insert(custom.name.as_str()) {
            errors.push(ValidationError::new(format!(
                "resource name '{}' is generated more than once",
                custom.name
            )));
        }
    }

    errors
}

/// Index `i` if `name` is exactly the fleet name `<base>_<i>`.
fn fleet_index(base: &str, name: &str) -> Option<usize> {
    let digits = name.strip_prefix(base)?.strip_prefix('_')?;
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));
    if canonical {
        digits.parse().ok()
    } else {
        None
    }
}

/// Check the structural shape of a Terraform JSON document.
pub fn validate_document(doc: &Value) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let Some(root) = doc.as_object() else {
        errors.push(ValidationError::new("document must be a JSON object"));
        return errors;
    };
    if root.len() != 1 || !root.contains_key(RESOURCE_KEY) {
        errors.push(ValidationError::new(format!(
            "document must have exactly one top-level key \"{}\"",
            RESOURCE_KEY
        )));
    }
    let Some(fragments) = root.get(RESOURCE_KEY).and_then(Value::as_array) else {
        errors.push(ValidationError::new(format!("\"{}\" must be a list", RESOURCE_KEY)));
        return errors;
    };

    let mut seen = HashSet::new();
    for (i, fragment) in fragments.iter().enumerate() {
        match fragment_name(fragment) {
            Ok((tag, name)) => {
                if !seen.insert((tag.to_string(), name.to_string())) {
                    errors.push(ValidationError::new(format!(
                        "fragment {}: duplicate resource {}.{}",
                        i, tag, name
                    )));
                }
            }
            Err(msg) => errors.push(ValidationError::new(format!("fragment {}: {}", i, msg))),
        }
    }

    errors
}

/// Load and validate a document file; error if any check fails.
pub fn validate_document_file(path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::fs(path, e))?;
    let doc: Value = serde_json::from_str(&content)?;
    let errors = validate_document(&doc);
    if !errors.is_empty() {
        return Err(Error::Validation(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }
    Ok(doc[RESOURCE_KEY].as_array().map_or(0, Vec::len))
}

fn fragment_name(fragment: &Value) -> std::result::Result<(&str, &str), String> {
    let map = fragment.as_object().ok_or("must be an object")?;
    let (tag, blocks) = one_entry(map, "resource type")?;
    let block = singleton_object(blocks, tag)?;
    let (name, attrs_list) = one_entry(block, "resource name")?;
    let attrs = singleton_object(attrs_list, name)?;
    if !attrs.get(TRIGGERS_KEY).is_some_and(Value::is_object) {
        return Err(format!("resource '{}' has no \"{}\" map", name, TRIGGERS_KEY));
    }
    Ok((tag, name))
}

fn one_entry<'a>(
    map: &'a serde_json::Map<String, Value>,
    what: &str,
) -> std::result::Result<(&'a str, &'a Value), String> {
    let mut iter = map.iter();
    match (iter.next(), iter.next()) {
        (Some((k, v)), None) => Ok((k.as_str(), v)),
        _ => Err(format!("expected exactly one {}, found {}", what, map.len())),
    }
}

fn singleton_object<'a>(
    value: &'a Value,
    key: &str,
) -> std::result::Result<&'a serde_json::Map<String, Value>, String> {
    match value.as_array().map(Vec::as_slice) {
        Some([only]) => only
            .as_object()
            .ok_or_else(|| format!("'{}' must wrap an object", key)),
        _ => Err(format!("'{}' must be a one-element list", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nf009_parse_valid() {
        let yaml = r#"
env_name: desarrollo-local
settings:
  proyecto: patrones_iac_locales
fleet:
  count: 15
custom_resources:
  - name: finalizador
    triggers:
      nota: "done"
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.env_name, "desarrollo-local");
        let errors = validate_config(&config);
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_nf009_parse_invalid_yaml() {
        let result = parse_config("not: [valid: yaml: {{");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_nf009_empty_env() {
        let config = parse_config("env_name: \"  \"").unwrap();
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("env_name")));
    }

    #[test]
    fn test_nf009_bad_base_name() {
        let config = parse_config("fleet: {base_name: '1bad', count: 2}").unwrap();
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.starts_with("fleet:")));
    }

    #[test]
    fn test_nf009_bad_base_name_ignored_for_empty_fleet() {
        let config = parse_config("fleet: {base_name: '1bad', count: 0}").unwrap();
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_nf009_collision_with_fleet() {
        let yaml = r#"
fleet: {count: 3}
custom_resources:
  - name: placeholder_1
"#;
        let config = parse_config(yaml).unwrap();
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("more than once")));
    }

    #[test]
    fn test_nf009_huge_fleet_validates_without_enumerating() {
        let yaml = r#"
fleet: {count: 18446744073709551615}
custom_resources:
  - name: placeholder_18446744073709551614
  - name: placeholder_x
"#;
        let errors = validate_config(&parse_config(yaml).unwrap());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("placeholder_18446744073709551614"));
    }

    #[test]
    fn test_nf009_fleet_index_boundaries() {
        assert_eq!(fleet_index("placeholder", "placeholder_0"), Some(0));
        assert_eq!(fleet_index("placeholder", "placeholder_12"), Some(12));
        assert_eq!(fleet_index("placeholder", "placeholder_012"), None);
        assert_eq!(fleet_index("placeholder", "placeholder_"), None);
        assert_eq!(fleet_index("placeholder", "placeholder1"), None);
        assert_eq!(fleet_index("placeholder", "other_1"), None);
    }

    #[test]
    fn test_nf009_name_past_fleet_end_allowed() {
        let yaml = r#"
fleet: {count: 3}
custom_resources:
  - name: placeholder_3
"#;
        assert!(validate_config(&parse_config(yaml).unwrap()).is_empty());
    }

    #[test]
    fn test_nf009_duplicate_custom() {
        let yaml = r#"
fleet: {count: 0}
custom_resources:
  - name: a
  - name: a
"#;
        let errors = validate_config(&parse_config(yaml).unwrap());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_nf009_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nullforge.yaml");
        std::fs::write(&path, "env_name: file-test\n").unwrap();
        let config = parse_config_file(&path).unwrap();
        assert_eq!(config.env_name, "file-test");
    }

    #[test]
    fn test_nf009_validate_document_ok() {
        let doc = json!({"resource": [
            {"null_resource": [{"a": [{"triggers": {"index": 0}}]}]},
            {"null_resource": [{"b": [{"triggers": {}}]}]}
        ]});
        assert!(validate_document(&doc).is_empty());
    }

    #[test]
    fn test_nf009_validate_document_empty() {
        assert!(validate_document(&json!({"resource": []})).is_empty());
    }

    #[test]
    fn test_nf009_validate_document_bare_object_block() {
        let doc = json!({"resource": [{"null_resource": {"a": {"triggers": {}}}}]});
        let errors = validate_document(&doc);
        assert!(errors[0].message.contains("one-element list"));
    }

    #[test]
    fn test_nf009_validate_document_duplicate() {
        let doc = json!({"resource": [
            {"null_resource": [{"a": [{"triggers": {}}]}]},
            {"null_resource": [{"a": [{"triggers": {}}]}]}
        ]});
        let errors = validate_document(&doc);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("duplicate resource null_resource.a"));
    }

    #[test]
    fn test_nf009_validate_document_missing_triggers() {
        let doc = json!({"resource": [{"null_resource": [{"a": [{}]}]}]});
        let errors = validate_document(&doc);
        assert!(errors[0].message.contains("triggers"));
    }

    #[test]
    fn test_nf009_validate_document_extra_top_level() {
        let doc = json!({"resource": [], "provider": {}});
        let errors = validate_document(&doc);
        assert!(errors[0].message.contains("exactly one top-level key"));
    }

    #[test]
    fn test_nf009_validate_document_not_object() {
        let errors = validate_document(&json!([]));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_nf009_validate_document_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.tf.json");
        std::fs::write(&good, r#"{"resource": [{"null_resource": [{"a": [{"triggers": {}}]}]}]}"#)
            .unwrap();
        assert_eq!(validate_document_file(&good).unwrap(), 1);

        let bad = dir.path().join("bad.tf.json");
        std::fs::write(&bad, r#"{"resource": {}}"#).unwrap();
        assert!(matches!(
            validate_document_file(&bad),
            Err(Error::Validation(_))
        ));
    }
}
