//! Schema version tokens and their ordering
//!
//! Template `$schema` URIs embed a version such as `0.9.1`. Comparison
//! is plain integer precedence over major, minor and patch; segments
//! missing from the token count as zero. The `semver` crate is not used
//! here because it rejects partial versions like `1.2`, which are valid
//! tokens in this format.

use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Errors produced when reading a version token
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    /// Empty input
    #[error("empty version string")]
    Empty,

    /// More than major.minor.patch
    #[error("version has more than three segments: {input}")]
    TooManySegments { input: String },

    /// Segment is not an unsigned integer
    #[error("invalid version segment {segment:?} in {input:?}")]
    InvalidSegment { segment: String, input: String },
}

/// A schema format revision, ordered by major.minor.patch precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SchemaVersion {
    major: u64,
    minor: u64,
    patch: u64,
}

impl SchemaVersion {
    /// Build a version from its three segments
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(VersionError::Empty);
        }
        let mut segments = [0u64; 3];
        let mut count = 0;
        for segment in input.split('.') {
            if count == segments.len() {
                return Err(VersionError::TooManySegments {
                    input: input.to_string(),
                });
            }
            segments[count] = match segment.parse::<u64>() {
                Ok(value) => value,
                // a digit run too long for u64 still names a version
                // newer than any supported one
                Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow) => u64::MAX,
                Err(_) => {
                    return Err(VersionError::InvalidSegment {
                        segment: segment.to_string(),
                        input: input.to_string(),
                    })
                }
            };
            count += 1;
        }
        Ok(Self {
            major: segments[0],
            minor: segments[1],
            patch: segments[2],
        })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

static VERSION_TOKEN: OnceLock<Regex> = OnceLock::new();

/// Extract the version token embedded in a `$schema` URI
///
/// Returns the first `major.minor[.patch]` run of digits, for example
/// `0.9.1` out of
/// `https://unpkg.com/@camunda/zeebe-element-templates-json-schema@0.9.1/resources/schema.json`.
/// A lone integer does not count as a version token.
pub fn schema_version_token(schema_uri: &str) -> Option<&str> {
    let pattern = VERSION_TOKEN
        .get_or_init(|| Regex::new(r"\d+\.\d+(\.\d+)?").expect("version token pattern compiles"));
    pattern.find(schema_uri).map(|m| m.as_str())
}
