//! Structural validation of template documents
//!
//! This module wraps a compiled JSON schema describing the cloud element
//! template format. The crate ships a bundled schema document; embedders
//! can compile an alternate one from a file or value. Error filtering
//! separates actionable leaf errors from combinator noise.

use std::fmt;
use std::path::Path;

use jsonschema::{validator_for, Validator as JsonValidator};
use serde_json::Value;
use thiserror::Error;

/// Package that publishes the supported template schema
pub const SCHEMA_PACKAGE: &str = "@camunda/zeebe-element-templates-json-schema";

/// Newest schema version this crate understands
pub const SCHEMA_VERSION: &str = "0.9.1";

const BUNDLED_SCHEMA: &str = include_str!("../schemas/element-templates.schema.json");

/// Errors that can occur when loading or compiling a schema document
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Failed to read the schema file
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Schema file is not valid JSON
    #[error("schema document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema document is valid JSON but not a usable JSON schema
    #[error("schema document does not compile: {message}")]
    Compile { message: String },
}

/// A single violation reported by the schema engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralError {
    /// JSON Pointer to the violating spot in the template document
    pub instance_path: String,
    /// JSON Pointer to the schema rule that fired
    pub schema_path: String,
    /// Human-readable description
    pub message: String,
}

impl StructuralError {
    /// JSON-schema keyword that produced this error
    pub fn keyword(&self) -> &str {
        self.schema_path.rsplit('/').next().unwrap_or("")
    }
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Outcome of checking one template document against the schema
#[derive(Debug, Clone)]
pub struct StructuralResult {
    /// Whether the document satisfied the schema
    pub valid: bool,
    /// Every violation the engine reported, unfiltered
    pub errors: Vec<StructuralError>,
}

/// Compiled template schema plus its package and version identity
pub struct TemplateSchema {
    validator: JsonValidator,
    package: String,
    version: String,
}

impl fmt::Debug for TemplateSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSchema")
            .field("package", &self.package)
            .field("version", &self.version)
            .finish()
    }
}

impl TemplateSchema {
    /// The schema document bundled with the crate
    pub fn bundled() -> Self {
        let document: Value =
            serde_json::from_str(BUNDLED_SCHEMA).expect("bundled schema is valid JSON");
        let validator = validator_for(&document).expect("bundled schema compiles");
        Self {
            validator,
            package: SCHEMA_PACKAGE.to_string(),
            version: SCHEMA_VERSION.to_string(),
        }
    }

    /// Compile a schema from an already parsed document
    pub fn from_value(
        document: &Value,
        package: &str,
        version: &str,
    ) -> Result<Self, SchemaError> {
        let validator = validator_for(document).map_err(|e| SchemaError::Compile {
            message: e.to_string(),
        })?;
        Ok(Self {
            validator,
            package: package.to_string(),
            version: version.to_string(),
        })
    }

    /// Load and compile a schema document from a file
    pub fn from_file(path: &Path, package: &str, version: &str) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        let document: Value = serde_json::from_str(&content)?;
        Self::from_value(&document, package, version)
    }

    /// Package identifier a template's `$schema` must reference
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Newest schema version accepted by this schema
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Check a raw template document, collecting every violation
    pub fn validate(&self, document: &Value) -> StructuralResult {
        let errors: Vec<StructuralError> = self
            .validator
            .iter_errors(document)
            .map(|e| StructuralError {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        StructuralResult {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Keywords whose errors restate a combinator failure instead of naming
/// the offending field
const NOISE_KEYWORDS: [&str; 7] = ["anyOf", "oneOf", "allOf", "not", "if", "then", "else"];

/// Drop combinator noise, keeping the leaf errors a template author can
/// act on
pub fn filtered_errors(errors: &[StructuralError]) -> Vec<&StructuralError> {
    errors
        .iter()
        .filter(|e| !NOISE_KEYWORDS.contains(&e.keyword()))
        .collect()
}
