//! Attribute schemas and configuration validation

use serde::Serialize;
use serde_json::{Map, Value};

use super::diagnostics::Diagnostics;

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    Bool,
    Int32,
    StringSet,
    StringMap,
}

impl AttributeKind {
    fn describe(&self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Bool => "bool",
            AttributeKind::Int32 => "number (int32)",
            AttributeKind::StringSet => "set of string",
            AttributeKind::StringMap => "map of string",
        }
    }

    /// Whether a non-null JSON value fits this kind; null elements are allowed in collections
    fn accepts(&self, value: &Value) -> bool {
        match self {
            AttributeKind::String => value.is_string(),
            AttributeKind::Bool => value.is_boolean(),
            AttributeKind::Int32 => value
                .as_i64()
                .map(|n| i32::try_from(n).is_ok())
                .unwrap_or(false),
            AttributeKind::StringSet => value
                .as_array()
                .map(|items| items.iter().all(|v| v.is_string() || v.is_null()))
                .unwrap_or(false),
            AttributeKind::StringMap => value
                .as_object()
                .map(|entries| entries.values().all(|v| v.is_string() || v.is_null()))
                .unwrap_or(false),
        }
    }
}

/// Who supplies an attribute's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeMode {
    Required,
    Optional,
    Computed,
}

/// One attribute of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub mode: AttributeMode,
    pub sensitive: bool,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<&'static [&'static str]>,
}

impl Attribute {
    fn new(name: &'static str, kind: AttributeKind, mode: AttributeMode) -> Self {
        Self {
            name,
            kind,
            mode,
            sensitive: false,
            description: "",
            one_of: None,
        }
    }

    pub fn required(name: &'static str, kind: AttributeKind) -> Self {
        Self::new(name, kind, AttributeMode::Required)
    }

    pub fn optional(name: &'static str, kind: AttributeKind) -> Self {
        Self::new(name, kind, AttributeMode::Optional)
    }

    pub fn computed(name: &'static str, kind: AttributeKind) -> Self {
        Self::new(name, kind, AttributeMode::Computed)
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Restrict a string attribute to a fixed set of values
    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.one_of = Some(values);
        self
    }
}

/// Schema of an ephemeral resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            attributes: Vec::new(),
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Check a configuration object against this schema
    ///
    /// A `null` configuration is treated as an empty object. Computed attributes may be
    /// present but must be null.
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let empty = Map::new();
        let object = match config {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                diags.add_error(
                    "Invalid Configuration",
                    format!("expected an object, got {}", json_type(other)),
                );
                return diags;
            }
        };

        for name in object.keys() {
            if self.get(name).is_none() {
                diags.add_error(
                    "Unsupported argument",
                    format!("An argument named {:?} is not expected here.", name),
                );
            }
        }

        for attribute in &self.attributes {
            let value = object.get(attribute.name).unwrap_or(&Value::Null);
            if value.is_null() {
                if attribute.mode == AttributeMode::Required {
                    diags.add_error(
                        "Missing Configuration for Required Attribute",
                        format!(
                            "Must set a configuration value for the {} attribute as the provider has marked it as required.",
                            attribute.name
                        ),
                    );
                }
                continue;
            }

            if attribute.mode == AttributeMode::Computed {
                diags.add_error(
                    "Invalid Configuration for Read-Only Attribute",
                    format!(
                        "Cannot set value for the {} attribute as the provider has marked it as read-only.",
                        attribute.name
                    ),
                );
                continue;
            }

            if !attribute.kind.accepts(value) {
                diags.add_error(
                    "Invalid Attribute Type",
                    format!(
                        "Attribute {} must be a {}, got {}",
                        attribute.name,
                        attribute.kind.describe(),
                        json_type(value)
                    ),
                );
                continue;
            }

            if let (Some(allowed), Some(s)) = (attribute.one_of, value.as_str()) {
                if !allowed.contains(&s) {
                    let quoted: Vec<String> = allowed.iter().map(|v| format!("{:?}", v)).collect();
                    diags.add_error(
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {} value must be one of: [{}], got: {:?}",
                            attribute.name,
                            quoted.join(" "),
                            s
                        ),
                    );
                }
            }
        }

        diags
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CLOUDS: &[&str] = &["AzurePublic", "AzureChina"];

    fn schema() -> Schema {
        Schema::new("test").attributes([
            Attribute::required("scopes", AttributeKind::StringSet),
            Attribute::optional("cloud", AttributeKind::String).one_of(CLOUDS),
            Attribute::optional("headers", AttributeKind::StringMap),
            Attribute::computed("access_token", AttributeKind::String).sensitive(),
        ])
    }

    #[test]
    fn test_valid_config() {
        let diags = schema().validate(&json!({
            "scopes": ["https://management.azure.com/.default"],
            "cloud": "AzureChina",
            "headers": {"a": "b", "skipped": null},
            "access_token": null
        }));
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn test_missing_required() {
        let diags = schema().validate(&json!({"scopes": null}));
        assert!(diags.has_error());
        let first = diags.iter().next().unwrap();
        assert_eq!(first.summary, "Missing Configuration for Required Attribute");
        assert!(first.detail.contains("scopes"));
    }

    #[test]
    fn test_null_config_is_empty_object() {
        let diags = schema().validate(&Value::Null);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_one_of() {
        let diags = schema().validate(&json!({"scopes": [], "cloud": "Mars"}));
        let first = diags.iter().next().unwrap();
        assert_eq!(first.summary, "Invalid Attribute Value Match");
        assert_eq!(
            first.detail,
            r#"Attribute cloud value must be one of: ["AzurePublic" "AzureChina"], got: "Mars""#
        );
    }

    #[test]
    fn test_wrong_type_and_unknown_and_computed() {
        let diags = schema().validate(&json!({
            "scopes": "not-a-set",
            "nope": true,
            "access_token": "set-by-user"
        }));
        let summaries: Vec<_> = diags.iter().map(|d| d.summary.clone()).collect();
        assert!(summaries.contains(&"Unsupported argument".to_string()));
        assert!(summaries.contains(&"Invalid Attribute Type".to_string()));
        assert!(summaries.contains(&"Invalid Configuration for Read-Only Attribute".to_string()));
    }

    #[test]
    fn test_int32_range() {
        assert!(AttributeKind::Int32.accepts(&json!(200)));
        assert!(!AttributeKind::Int32.accepts(&json!(i64::MAX)));
        assert!(!AttributeKind::Int32.accepts(&json!(1.5)));
    }
}
