//! Named input sanitizers applied before a value is stored.

use std::collections::HashMap;
use std::sync::Arc;

/// Name of the built-in digits-only sanitizer.
pub const NUMBERS: &str = "numbers";

type SanitizeFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Strip every character that is not an ASCII digit.
pub fn numbers(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Registry of named `string -> string` filters.
///
/// Always contains [`NUMBERS`]. Registering a sanitizer under an existing
/// name replaces it.
#[derive(Clone)]
pub struct Sanitizers {
    entries: HashMap<String, SanitizeFn>,
}

impl Default for Sanitizers {
    fn default() -> Self {
        let mut sanitizers = Self {
            entries: HashMap::new(),
        };
        sanitizers.insert(NUMBERS, numbers);
        sanitizers
    }
}

impl Sanitizers {
    pub fn insert<F>(&mut self, name: impl Into<String>, sanitizer: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(sanitizer));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Apply the sanitizer called `name`. Unknown names pass the value through.
    pub fn apply(&self, name: &str, value: String) -> String {
        match self.entries.get(name) {
            Some(sanitize) => sanitize(&value),
            None => {
                log::trace!("[sanitize] unknown sanitizer '{}', value unchanged", name);
                value
            }
        }
    }
}

impl std::fmt::Debug for Sanitizers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Sanitizers").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_strips_non_digits() {
        assert_eq!(numbers("ab12cd3"), "123");
        assert_eq!(numbers("+64 (21) 555-0199"), "64215550199");
        assert_eq!(numbers("abc"), "");
    }

    #[test]
    fn test_numbers_ignores_non_ascii_digits() {
        assert_eq!(numbers("١٢3"), "3");
    }

    #[test]
    fn test_unknown_name_is_noop() {
        let sanitizers = Sanitizers::default();
        assert_eq!(sanitizers.apply("letters", "ab12".to_string()), "ab12");
    }

    #[test]
    fn test_custom_sanitizer() {
        let mut sanitizers = Sanitizers::default();
        sanitizers.insert("upper", |v: &str| v.to_uppercase());
        assert!(sanitizers.contains("upper"));
        assert_eq!(sanitizers.apply("upper", "nz".to_string()), "NZ");
        assert_eq!(sanitizers.apply(NUMBERS, "a1".to_string()), "1");
    }
}
