//! Template validation pipeline
//!
//! A [`Validator`] runs an ordered list of [`ValidationRule`]s against
//! one template at a time. The first rule that reports errors stops the
//! pipeline and its findings become the returned [`ValidationError`];
//! every finding is also emitted on the log stream, tagged with the
//! offending template. The stock rule set covers schema identity,
//! version compatibility, registry uniqueness, element-type
//! applicability and structural schema validation, in that order.

mod rules;

pub use rules::{
    default_rules, SchemaCompatibility, SchemaCompliance, SchemaPresence, SchemaRecognition,
    TypeCompatibility, Uniqueness,
};

use thiserror::Error;

use crate::bpmn::{BpmnHierarchy, TypeOracle};
use crate::descriptor::TemplateDescriptor;
use crate::registry::TemplateRegistry;
use crate::schema::TemplateSchema;

/// A single problem found in a template
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Template has no `$schema` attribute
    #[error("missing $schema attribute")]
    MissingSchema,

    /// `$schema` does not reference the supported schema package
    #[error("unsupported $schema attribute <{schema}>")]
    UnsupportedSchema { schema: String },

    /// Template declares a schema version newer than the supported one
    #[error("unsupported element template schema version <{declared}>; supported up to version <{supported}>")]
    UnsupportedSchemaVersion { declared: String, supported: String },

    /// Template id already registered in the versionless slot
    #[error("template id <{id}> already used")]
    DuplicateId { id: String },

    /// Template id and version already registered
    #[error("template id <{id}> and version <{version}> already used")]
    DuplicateIdVersion { id: String, version: String },

    /// No `appliesTo` entry covers the declared element type
    #[error("template does not apply to requested element type <{element_type}>")]
    TypeNotApplicable { element_type: String },

    /// An `appliesTo` entry cannot morph into the declared element type
    #[error("can not morph <{source_type}> into <{target_type}>")]
    CannotMorph {
        source_type: String,
        target_type: String,
    },

    /// A violation reported by structural schema validation
    #[error("{message}")]
    Structural { message: String },
}

/// Rejection of one template, carrying every error the failing rule found
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("template(id: <{id}>, name: <{name}>): {}", format_errors(.errors))]
pub struct ValidationError {
    /// Id of the offending template
    pub id: String,
    /// Name of the offending template
    pub name: String,
    /// Errors reported by the rule that rejected the template
    pub errors: Vec<TemplateError>,
}

impl ValidationError {
    fn new(template: &TemplateDescriptor, errors: Vec<TemplateError>) -> Self {
        Self {
            id: template.id.clone(),
            name: template.display_name().to_string(),
            errors,
        }
    }
}

fn format_errors(errors: &[TemplateError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collaborators a rule may consult while checking a template
pub struct RuleContext<'a> {
    /// Already accepted templates
    pub registry: &'a TemplateRegistry,
    /// Subtype oracle for applicability and morph checks
    pub oracle: &'a dyn TypeOracle,
    /// Structural schema the template must satisfy
    pub schema: &'a TemplateSchema,
}

/// One check in the validation pipeline
///
/// Rules inspect the template and context and report zero or more
/// errors; they never mutate either. An empty result means the rule
/// passed and the pipeline moves on.
pub trait ValidationRule {
    /// Stable rule name, used in log output
    fn name(&self) -> &'static str;

    /// Check one template
    fn check(&self, template: &TemplateDescriptor, ctx: &RuleContext<'_>) -> Vec<TemplateError>;
}

/// Validator for element templates
pub struct Validator {
    schema: TemplateSchema,
    oracle: Box<dyn TypeOracle>,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a validator with the bundled schema, the BPMN hierarchy
    /// and the stock rule set
    pub fn new() -> Self {
        Self {
            schema: TemplateSchema::bundled(),
            oracle: Box::new(BpmnHierarchy::new()),
            rules: default_rules(),
        }
    }

    /// Replace the structural schema
    pub fn with_schema(mut self, schema: TemplateSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Replace the type-hierarchy oracle
    pub fn with_oracle<O>(mut self, oracle: O) -> Self
    where
        O: TypeOracle + 'static,
    {
        self.oracle = Box::new(oracle);
        self
    }

    /// Replace the rule list, keeping the given order
    pub fn with_rules(mut self, rules: Vec<Box<dyn ValidationRule>>) -> Self {
        self.rules = rules;
        self
    }

    /// The supported schema package identifier
    pub fn schema_package(&self) -> &str {
        self.schema.package()
    }

    /// The newest supported schema version
    pub fn schema_version(&self) -> &str {
        self.schema.version()
    }

    /// Validate one template against the registry
    ///
    /// Rules run in order and the first failing rule rejects the
    /// template; its errors are logged one by one and returned together.
    /// The registry is only read; accepted templates are inserted by the
    /// caller, see [`crate::register_template`].
    pub fn validate(
        &self,
        template: &TemplateDescriptor,
        registry: &TemplateRegistry,
    ) -> Result<(), ValidationError> {
        let ctx = RuleContext {
            registry,
            oracle: self.oracle.as_ref(),
            schema: &self.schema,
        };

        for rule in &self.rules {
            let errors = rule.check(template, &ctx);
            if !errors.is_empty() {
                for error in &errors {
                    tracing::warn!(
                        rule = rule.name(),
                        template_id = %template.id,
                        template_name = template.display_name(),
                        "{}",
                        error
                    );
                }
                return Err(ValidationError::new(template, errors));
            }
        }

        Ok(())
    }
}
