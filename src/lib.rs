//! Validation for Camunda 8 element templates
//!
//! Element templates are JSON documents that configure BPMN elements
//! with predefined properties. Before a template is offered to users
//! it passes a pipeline of checks: `$schema` presence and recognition,
//! schema version compatibility, id and version uniqueness,
//! element-type applicability and structural JSON schema compliance.
//!
//! # Example
//!
//! ```rust
//! use element_templates::{TemplateDescriptor, TemplateRegistry, Validator};
//!
//! let template = TemplateDescriptor::from_json(r#"{
//!     "$schema": "https://unpkg.com/@camunda/zeebe-element-templates-json-schema@0.9.1/resources/schema.json",
//!     "id": "io.example.mail-task",
//!     "name": "Mail Task",
//!     "properties": []
//! }"#).unwrap();
//!
//! let validator = Validator::new();
//! let registry = TemplateRegistry::new();
//!
//! assert!(validator.validate(&template, &registry).is_ok());
//! ```

pub mod bpmn;
pub mod descriptor;
pub mod registry;
pub mod schema;
pub mod svg;
pub mod validator;
pub mod version;

pub use bpmn::{can_morph, BpmnHierarchy, TypeOracle};
pub use descriptor::{parse_templates, DescriptorError, ElementType, TemplateDescriptor};
pub use registry::{TemplateRegistry, VERSIONLESS};
pub use schema::{SchemaError, TemplateSchema};
pub use validator::{TemplateError, ValidationError, Validator};

/// Validate a template and, if it passes, add it to the registry
///
/// The uniqueness check reads the registry, so check and insert belong
/// together; callers registering templates concurrently must serialize
/// calls to this function.
///
/// # Example
///
/// ```rust
/// use element_templates::{register_template, TemplateDescriptor, TemplateRegistry, Validator};
///
/// let template = TemplateDescriptor::from_json(r#"{
///     "$schema": "https://unpkg.com/@camunda/zeebe-element-templates-json-schema@0.9.1/resources/schema.json",
///     "id": "io.example.rest-connector",
///     "name": "REST Connector",
///     "appliesTo": ["bpmn:Task"],
///     "elementType": { "value": "bpmn:ServiceTask" },
///     "properties": []
/// }"#).unwrap();
///
/// let validator = Validator::new();
/// let mut registry = TemplateRegistry::new();
///
/// register_template(&validator, &mut registry, template).unwrap();
/// assert!(registry.contains("io.example.rest-connector", "_"));
/// ```
pub fn register_template(
    validator: &Validator,
    registry: &mut TemplateRegistry,
    template: TemplateDescriptor,
) -> Result<(), ValidationError> {
    validator.validate(&template, registry)?;
    registry.insert(template);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_template(id: &str) -> TemplateDescriptor {
        let json = format!(
            r#"{{
                "$schema": "https://unpkg.com/@camunda/zeebe-element-templates-json-schema@0.9.1/resources/schema.json",
                "id": "{}",
                "name": "Template {}",
                "properties": []
            }}"#,
            id, id
        );
        TemplateDescriptor::from_json(&json).expect("Should parse")
    }

    #[test]
    fn test_register_accepts_valid_template() {
        let validator = Validator::new();
        let mut registry = TemplateRegistry::new();

        register_template(&validator, &mut registry, valid_template("t1"))
            .expect("Should register");

        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("t1", VERSIONLESS).is_some());
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let validator = Validator::new();
        let mut registry = TemplateRegistry::new();

        register_template(&validator, &mut registry, valid_template("t1"))
            .expect("Should register");
        let err = register_template(&validator, &mut registry, valid_template("t1"))
            .expect_err("Should reject the duplicate");

        assert!(err.to_string().contains("template id <t1> already used"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rejected_template_is_not_inserted() {
        let validator = Validator::new();
        let mut registry = TemplateRegistry::new();

        let template =
            TemplateDescriptor::from_json(r#"{ "id": "t1" }"#).expect("Should parse");
        register_template(&validator, &mut registry, template)
            .expect_err("Should reject without $schema");

        assert!(registry.is_empty());
    }

    #[test]
    fn test_validator_reports_supported_schema() {
        let validator = Validator::new();
        assert_eq!(
            validator.schema_package(),
            "@camunda/zeebe-element-templates-json-schema"
        );
        assert_eq!(validator.schema_version(), "0.9.1");
    }
}
