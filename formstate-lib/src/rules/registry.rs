//! Custom rule validators.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use super::{CheckResult, Rule};

/// A validator supplied by the application for a rule name.
///
/// Registered validators take precedence over built-in rules of the same
/// name, so registering `"required"` replaces the built-in check.
///
/// # Example
///
/// ```ignore
/// struct Email;
///
/// #[async_trait]
/// impl RuleValidator for Email {
///     async fn validate(&self, value: &str, rule: &Rule) -> CheckResult {
///         Ok((!value.contains('@')).then(|| rule.message()))
///     }
/// }
/// ```
#[async_trait]
pub trait RuleValidator: Send + Sync {
    /// Check `value` against `rule`. `Ok(None)` passes, `Ok(Some(message))`
    /// fails with `message`.
    async fn validate(&self, value: &str, rule: &Rule) -> CheckResult;
}

struct FnValidator<F>(F);

#[async_trait]
impl<F, Fut> RuleValidator for FnValidator<F>
where
    F: Fn(String, Rule) -> Fut + Send + Sync,
    Fut: Future<Output = CheckResult> + Send,
{
    async fn validate(&self, value: &str, rule: &Rule) -> CheckResult {
        (self.0)(value.to_string(), rule.clone()).await
    }
}

/// Wrap an async closure as a [`RuleValidator`].
pub fn validator_fn<F, Fut>(f: F) -> Arc<dyn RuleValidator>
where
    F: Fn(String, Rule) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CheckResult> + Send + 'static,
{
    Arc::new(FnValidator(f))
}

/// Custom validators by rule name.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn RuleValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rule: impl Into<String>, validator: Arc<dyn RuleValidator>) {
        self.validators.insert(rule.into(), validator);
    }

    pub fn get(&self, rule: &str) -> Option<Arc<dyn RuleValidator>> {
        self.validators.get(rule).cloned()
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.validators.contains_key(rule)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry").field("rules", &names).finish()
    }
}
