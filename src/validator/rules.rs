//! Stock validation rules for cloud element templates

use crate::bpmn::can_morph;
use crate::descriptor::TemplateDescriptor;
use crate::registry::VERSIONLESS;
use crate::schema::filtered_errors;
use crate::version::{schema_version_token, SchemaVersion};

use super::{RuleContext, TemplateError, ValidationRule};

/// The stock rule set, in pipeline order
pub fn default_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(SchemaPresence),
        Box::new(SchemaRecognition),
        Box::new(SchemaCompatibility),
        Box::new(Uniqueness),
        Box::new(TypeCompatibility),
        Box::new(SchemaCompliance),
    ]
}

/// Requires the `$schema` attribute to be present and non-empty
pub struct SchemaPresence;

impl ValidationRule for SchemaPresence {
    fn name(&self) -> &'static str {
        "schema-presence"
    }

    fn check(&self, template: &TemplateDescriptor, _ctx: &RuleContext<'_>) -> Vec<TemplateError> {
        match template.schema.as_deref() {
            Some(schema) if !schema.is_empty() => Vec::new(),
            _ => vec![TemplateError::MissingSchema],
        }
    }
}

/// Requires `$schema` to reference the supported schema package
pub struct SchemaRecognition;

impl ValidationRule for SchemaRecognition {
    fn name(&self) -> &'static str {
        "schema-recognition"
    }

    fn check(&self, template: &TemplateDescriptor, ctx: &RuleContext<'_>) -> Vec<TemplateError> {
        let schema = match template.schema.as_deref() {
            Some(schema) => schema,
            None => return Vec::new(),
        };

        if schema.contains(ctx.schema.package()) {
            Vec::new()
        } else {
            vec![TemplateError::UnsupportedSchema {
                schema: schema.to_string(),
            }]
        }
    }
}

/// Rejects templates declaring a schema version newer than the
/// supported one; templates whose `$schema` carries no version token
/// pass unchecked
pub struct SchemaCompatibility;

impl ValidationRule for SchemaCompatibility {
    fn name(&self) -> &'static str {
        "schema-compatibility"
    }

    fn check(&self, template: &TemplateDescriptor, ctx: &RuleContext<'_>) -> Vec<TemplateError> {
        let token = match template.schema.as_deref().and_then(schema_version_token) {
            Some(token) => token,
            None => return Vec::new(),
        };
        let declared: SchemaVersion = match token.parse() {
            Ok(version) => version,
            Err(_) => return Vec::new(),
        };
        // no comparable supported version, nothing to gate against
        let supported: SchemaVersion = match ctx.schema.version().parse() {
            Ok(version) => version,
            Err(_) => return Vec::new(),
        };

        if supported < declared {
            vec![TemplateError::UnsupportedSchemaVersion {
                declared: token.to_string(),
                supported: ctx.schema.version().to_string(),
            }]
        } else {
            Vec::new()
        }
    }
}

/// Rejects templates whose id and effective version slot is taken
pub struct Uniqueness;

impl ValidationRule for Uniqueness {
    fn name(&self) -> &'static str {
        "uniqueness"
    }

    fn check(&self, template: &TemplateDescriptor, ctx: &RuleContext<'_>) -> Vec<TemplateError> {
        let version = template.effective_version();
        if !ctx.registry.contains(&template.id, version) {
            return Vec::new();
        }

        // the message follows the occupied slot, so an explicit "_"
        // reports like a versionless template
        if version == VERSIONLESS {
            vec![TemplateError::DuplicateId {
                id: template.id.clone(),
            }]
        } else {
            vec![TemplateError::DuplicateIdVersion {
                id: template.id.clone(),
                version: version.to_string(),
            }]
        }
    }
}

/// Checks element-type applicability and morphability
///
/// Runs only when the template carries both `elementType` and
/// `appliesTo`. The element type must be an instance of at least one
/// `appliesTo` entry, and every entry must morph into the element type.
pub struct TypeCompatibility;

impl ValidationRule for TypeCompatibility {
    fn name(&self) -> &'static str {
        "type-compatibility"
    }

    fn check(&self, template: &TemplateDescriptor, ctx: &RuleContext<'_>) -> Vec<TemplateError> {
        let (element_type, applies_to) = match (&template.element_type, &template.applies_to) {
            (Some(element_type), Some(applies_to)) => (element_type, applies_to),
            _ => return Vec::new(),
        };
        let target = element_type.value.as_str();

        let applicable = applies_to
            .iter()
            .any(|source| ctx.oracle.is_instance_of(target, source));
        if !applicable {
            return vec![TemplateError::TypeNotApplicable {
                element_type: target.to_string(),
            }];
        }

        for source in applies_to {
            if !can_morph(ctx.oracle, source, target) {
                return vec![TemplateError::CannotMorph {
                    source_type: source.clone(),
                    target_type: target.to_string(),
                }];
            }
        }

        Vec::new()
    }
}

/// Delegates to structural schema validation, surfacing every filtered
/// violation instead of stopping at the first
pub struct SchemaCompliance;

impl ValidationRule for SchemaCompliance {
    fn name(&self) -> &'static str {
        "schema-compliance"
    }

    fn check(&self, template: &TemplateDescriptor, ctx: &RuleContext<'_>) -> Vec<TemplateError> {
        let result = ctx.schema.validate(template.as_json());
        if result.valid {
            return Vec::new();
        }

        let filtered = filtered_errors(&result.errors);
        if filtered.is_empty() {
            // every violation was combinator noise; the rejection still stands
            return vec![TemplateError::Structural {
                message: "invalid template".to_string(),
            }];
        }

        filtered
            .into_iter()
            .map(|e| TemplateError::Structural {
                message: e.to_string(),
            })
            .collect()
    }
}
