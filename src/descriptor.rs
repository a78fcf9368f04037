//! Element template descriptors
//!
//! This module provides the deserialized form of an element template
//! document. Only the fields the validation pipeline inspects are typed;
//! the full raw document is carried alongside so structural validation
//! sees exactly what the author wrote.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::registry::VERSIONLESS;

/// Errors that can occur when reading template documents
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Document is not valid JSON or a template is missing required fields
    #[error("failed to read template JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Document root is neither an object nor an array
    #[error("template document must be a JSON object or an array of objects")]
    UnexpectedShape,
}

/// The element type a template binds the configured node to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementType {
    /// Fully qualified type name, for example `bpmn:ServiceTask`
    pub value: String,
}

/// A single element template, as supplied by the template author
#[derive(Debug, Clone)]
pub struct TemplateDescriptor {
    /// Identifier of the template family
    pub id: String,
    /// Declared template version; `None` means the versionless slot
    pub version: Option<String>,
    /// Schema dialect URI, carrying the schema package and version token
    pub schema: Option<String>,
    /// Human-readable template name
    pub name: Option<String>,
    /// Element type the template turns applied nodes into
    pub element_type: Option<ElementType>,
    /// Element types the template declares itself compatible with
    pub applies_to: Option<Vec<String>>,
    raw: Value,
}

/// Typed view over the descriptor fields the pipeline inspects
#[derive(Deserialize)]
struct Header {
    id: String,
    #[serde(default, deserialize_with = "version_as_string")]
    version: Option<String>,
    #[serde(rename = "$schema")]
    schema: Option<String>,
    name: Option<String>,
    #[serde(rename = "elementType")]
    element_type: Option<ElementType>,
    #[serde(rename = "appliesTo")]
    applies_to: Option<Vec<String>>,
}

/// Template versions appear as JSON numbers or strings in the wild;
/// registry keys are strings, so numbers are normalized here.
fn version_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "version must be a string or number, got {}",
            other
        ))),
    }
}

impl TemplateDescriptor {
    /// Build a descriptor from an already parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, DescriptorError> {
        let header = Header::deserialize(&value)?;
        Ok(Self {
            id: header.id,
            version: header.version,
            schema: header.schema,
            name: header.name,
            element_type: header.element_type,
            applies_to: header.applies_to,
            raw: value,
        })
    }

    /// Build a descriptor from JSON text holding a single template object
    pub fn from_json(source: &str) -> Result<Self, DescriptorError> {
        Self::from_value(serde_json::from_str(source)?)
    }

    /// The version the registry files this template under
    ///
    /// Templates without an explicit version share the `"_"` slot.
    pub fn effective_version(&self) -> &str {
        self.version.as_deref().unwrap_or(VERSIONLESS)
    }

    /// The raw document, as handed to structural validation
    pub fn as_json(&self) -> &Value {
        &self.raw
    }

    /// Name to use when reporting errors against this template
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }
}

/// Read one or many templates from a JSON document
///
/// Template files hold either a single template object or an array of
/// them; both shapes are accepted here.
pub fn parse_templates(source: &str) -> Result<Vec<TemplateDescriptor>, DescriptorError> {
    let value: Value = serde_json::from_str(source)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(TemplateDescriptor::from_value)
            .collect(),
        Value::Object(_) => Ok(vec![TemplateDescriptor::from_value(value)?]),
        _ => Err(DescriptorError::UnexpectedShape),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_json_minimal() {
        let descriptor = TemplateDescriptor::from_json(
            r#"{ "id": "my-template", "name": "My Template", "properties": [] }"#,
        )
        .expect("Should parse");

        assert_eq!(descriptor.id, "my-template");
        assert_eq!(descriptor.name.as_deref(), Some("My Template"));
        assert_eq!(descriptor.version, None);
        assert_eq!(descriptor.effective_version(), "_");
    }

    #[test]
    fn test_version_number_is_normalized() {
        let descriptor =
            TemplateDescriptor::from_json(r#"{ "id": "t", "version": 2 }"#).expect("Should parse");
        assert_eq!(descriptor.version.as_deref(), Some("2"));
        assert_eq!(descriptor.effective_version(), "2");
    }

    #[test]
    fn test_version_string_is_kept() {
        let descriptor = TemplateDescriptor::from_json(r#"{ "id": "t", "version": "0.1.0" }"#)
            .expect("Should parse");
        assert_eq!(descriptor.version.as_deref(), Some("0.1.0"));
    }

    #[test]
    fn test_version_of_unexpected_type_is_rejected() {
        let result = TemplateDescriptor::from_json(r#"{ "id": "t", "version": [1] }"#);
        assert!(matches!(result, Err(DescriptorError::Json(_))));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result = TemplateDescriptor::from_json(r#"{ "name": "No Id" }"#);
        assert!(matches!(result, Err(DescriptorError::Json(_))));
    }

    #[test]
    fn test_element_type_and_applies_to() {
        let descriptor = TemplateDescriptor::from_json(
            r#"{
                "id": "t",
                "elementType": { "value": "bpmn:ServiceTask" },
                "appliesTo": ["bpmn:Task"]
            }"#,
        )
        .expect("Should parse");

        assert_eq!(
            descriptor.element_type,
            Some(ElementType {
                value: "bpmn:ServiceTask".to_string()
            })
        );
        assert_eq!(
            descriptor.applies_to.as_deref(),
            Some(&["bpmn:Task".to_string()][..])
        );
    }

    #[test]
    fn test_raw_document_keeps_unknown_fields() {
        let descriptor = TemplateDescriptor::from_json(
            r#"{ "id": "t", "properties": [{ "binding": { "type": "property", "name": "x" } }] }"#,
        )
        .expect("Should parse");
        assert!(descriptor.as_json().get("properties").is_some());
    }

    #[test]
    fn test_parse_templates_single_object() {
        let templates = parse_templates(r#"{ "id": "only" }"#).expect("Should parse");
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id, "only");
    }

    #[test]
    fn test_parse_templates_array() {
        let templates =
            parse_templates(r#"[{ "id": "a" }, { "id": "b", "version": 1 }]"#).expect("Should parse");
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].id, "a");
        assert_eq!(templates[1].effective_version(), "1");
    }

    #[test]
    fn test_parse_templates_scalar_root_is_rejected() {
        let result = parse_templates(r#""just a string""#);
        assert!(matches!(result, Err(DescriptorError::UnexpectedShape)));
    }
}
