//! Per-field memo of failing outcomes.
//!
//! Each field owns a namespace mapping an exact value to the `{rule, message}`
//! it failed with. There is no eviction: a namespace lives until its field's
//! rules are reinstalled or the field is unregistered.

use std::collections::HashMap;

use dashmap::DashMap;

use crate::status::FieldError;

/// Failing outcomes keyed by field, then by value.
#[derive(Debug, Default)]
pub struct StatusCache {
    namespaces: DashMap<String, HashMap<String, FieldError>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached outcome for exactly `value`, if any.
    pub fn lookup(&self, field: &str, value: &str) -> Option<FieldError> {
        self.namespaces.get(field)?.get(value).cloned()
    }

    pub fn store(&self, field: &str, value: &str, error: FieldError) {
        self.namespaces
            .entry(field.to_string())
            .or_default()
            .insert(value.to_string(), error);
    }

    /// Reset the field's namespace to empty.
    pub fn clear(&self, field: &str) {
        self.namespaces.insert(field.to_string(), HashMap::new());
    }

    /// Drop the field's namespace entirely.
    pub fn remove(&self, field: &str) {
        self.namespaces.remove(field);
    }

    /// Number of cached values for a field.
    pub fn len(&self, field: &str) -> usize {
        self.namespaces.get(field).map(|ns| ns.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_value_only() {
        let cache = StatusCache::new();
        cache.store("zip", "12", FieldError::new("minLength", "too short"));

        assert_eq!(cache.lookup("zip", "12"), Some(FieldError::new("minLength", "too short")));
        assert_eq!(cache.lookup("zip", "123"), None);
        assert_eq!(cache.lookup("name", "12"), None);
    }

    #[test]
    fn test_clear_resets_namespace() {
        let cache = StatusCache::new();
        cache.store("zip", "1", FieldError::new("minLength", ""));
        cache.store("zip", "2", FieldError::new("minLength", ""));
        cache.store("name", "", FieldError::new("required", ""));
        assert_eq!(cache.len("zip"), 2);

        cache.clear("zip");
        assert_eq!(cache.len("zip"), 0);
        assert_eq!(cache.lookup("zip", "1"), None);
        assert_eq!(cache.len("name"), 1);
    }

    #[test]
    fn test_remove_drops_namespace() {
        let cache = StatusCache::new();
        cache.store("zip", "1", FieldError::new("minLength", ""));
        cache.remove("zip");
        assert_eq!(cache.lookup("zip", "1"), None);
        assert_eq!(cache.len("zip"), 0);
    }
}
