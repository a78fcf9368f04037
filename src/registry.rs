//! Registry of accepted element templates
//!
//! Templates are filed by id, then by version string. Templates without
//! an explicit version share the [`VERSIONLESS`] slot.

use std::collections::HashMap;

use crate::descriptor::TemplateDescriptor;

/// Version slot used for templates registered without an explicit version
pub const VERSIONLESS: &str = "_";

/// Storage for templates that already passed validation
///
/// The registry itself is plain storage: it does not reject duplicate
/// slots, the validator does. Callers that validate and insert from
/// multiple threads must serialize the check-then-insert sequence
/// themselves; the registry gives no atomicity across the two calls.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, HashMap<String, TemplateDescriptor>>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a template by id and version slot
    pub fn lookup(&self, id: &str, version: &str) -> Option<&TemplateDescriptor> {
        self.templates.get(id).and_then(|v| v.get(version))
    }

    /// Check whether a template occupies the given id and version slot
    pub fn contains(&self, id: &str, version: &str) -> bool {
        self.lookup(id, version).is_some()
    }

    /// File a template under its id and effective version
    ///
    /// Returns the previously stored template when the slot was already
    /// taken. Validated-then-inserted flows never hit that case; see
    /// [`crate::register_template`].
    pub fn insert(&mut self, template: TemplateDescriptor) -> Option<TemplateDescriptor> {
        let id = template.id.clone();
        let version = template.effective_version().to_string();
        self.templates
            .entry(id)
            .or_default()
            .insert(version, template)
    }

    /// All ids present in the registry
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|s| s.as_str())
    }

    /// All version slots registered for an id
    pub fn versions(&self, id: &str) -> impl Iterator<Item = &str> {
        self.templates
            .get(id)
            .into_iter()
            .flat_map(|v| v.keys())
            .map(|s| s.as_str())
    }

    /// Total number of stored templates across all ids and versions
    pub fn len(&self) -> usize {
        self.templates.values().map(|v| v.len()).sum()
    }

    /// Check whether the registry holds no templates
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str, version: Option<&str>) -> TemplateDescriptor {
        let version = match version {
            Some(v) => format!(r#", "version": "{}""#, v),
            None => String::new(),
        };
        TemplateDescriptor::from_json(&format!(r#"{{ "id": "{}"{} }}"#, id, version))
            .expect("Should parse")
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = TemplateRegistry::new();
        registry.insert(template("t1", Some("1")));

        assert!(registry.contains("t1", "1"));
        assert!(!registry.contains("t1", "2"));
        assert!(!registry.contains("t2", "1"));
        assert_eq!(registry.lookup("t1", "1").map(|t| t.id.as_str()), Some("t1"));
    }

    #[test]
    fn test_versionless_slot() {
        let mut registry = TemplateRegistry::new();
        registry.insert(template("t1", None));

        assert!(registry.contains("t1", VERSIONLESS));
        assert!(!registry.contains("t1", "1"));
    }

    #[test]
    fn test_insert_returns_displaced_template() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.insert(template("t1", Some("1"))).is_none());
        let displaced = registry.insert(template("t1", Some("1")));
        assert_eq!(displaced.map(|t| t.id), Some("t1".to_string()));
    }

    #[test]
    fn test_same_id_different_versions_coexist() {
        let mut registry = TemplateRegistry::new();
        registry.insert(template("t1", None));
        registry.insert(template("t1", Some("1")));
        registry.insert(template("t1", Some("2")));

        assert_eq!(registry.len(), 3);
        let mut versions: Vec<&str> = registry.versions("t1").collect();
        versions.sort_unstable();
        assert_eq!(versions, vec!["1", "2", VERSIONLESS]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = TemplateRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.ids().count(), 0);
        assert_eq!(registry.versions("absent").count(), 0);
    }
}
