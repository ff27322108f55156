//! The form engine.
//!
//! `FormEngine` owns the field registry, the per-field rules, sanitizer
//! bindings, validation statuses and error cache, and the observable
//! [`FormState`]. It is a cheap-to-clone handle: clones share the same form.
//!
//! Change and blur notifications spawn their validation on the current tokio
//! runtime and return immediately; the returned handle may be awaited or
//! dropped.
//!
//! # Example
//!
//! ```ignore
//! let engine = FormEngine::new(FormConfig::default().with_validate_on([Trigger::Change, Trigger::Submit]));
//! engine.register("zip", Some(Rules::new().min_length(4, "Too short")), Some("numbers"))?;
//!
//! engine.handle_change("zip", "ab12");
//! assert_eq!(engine.value("zip").as_deref(), Some("12"));
//!
//! if let Some(result) = engine.submit().await {
//!     println!("valid: {}", result.is_valid);
//! }
//! ```

mod binding;
mod submit;

pub use binding::FieldBinding;
pub use submit::SubmitResult;

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, trace};
use tokio::task::JoinHandle;

use crate::cache::StatusCache;
use crate::config::{FormConfig, Trigger};
use crate::constraint::InputValidity;
use crate::error::FormError;
use crate::event::FieldInput;
use crate::pipeline::Pipeline;
use crate::rules::Rules;
use crate::state::{FormState, FormStore};
use crate::status::{FieldError, ValidationStatus};
use crate::task::spawn_guarded;

/// Arguments to [`FormEngine::validate_field`].
#[derive(Clone)]
pub struct ValidationRequest {
    pub field: String,
    pub value: String,
    pub trigger: Trigger,
    /// Rules to run. `None` uses the field's registered rules.
    pub rules: Option<Arc<Rules>>,
    /// Input to report constraint-validation failures on.
    pub target: Option<Arc<dyn InputValidity>>,
}

impl ValidationRequest {
    pub fn new(field: impl Into<String>, value: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            trigger,
            rules: None,
            target: None,
        }
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = Some(Arc::new(rules));
        self
    }

    pub fn with_target(mut self, target: Arc<dyn InputValidity>) -> Self {
        self.target = Some(target);
        self
    }
}

impl std::fmt::Debug for ValidationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationRequest")
            .field("field", &self.field)
            .field("value", &self.value)
            .field("trigger", &self.trigger)
            .field("rules", &self.rules)
            .field("target", &self.target.is_some())
            .finish()
    }
}

struct EngineInner {
    config: FormConfig,
    store: FormStore,
    rules: DashMap<String, Arc<Rules>>,
    sanitizers: DashMap<String, String>,
    statuses: DashMap<String, ValidationStatus>,
    /// Bumped whenever a field's in-flight outcome must no longer apply.
    generations: DashMap<String, u64>,
    cache: StatusCache,
}

/// Form-state and validation engine.
#[derive(Clone)]
pub struct FormEngine {
    inner: Arc<EngineInner>,
}

impl FormEngine {
    pub fn new(config: FormConfig) -> Self {
        let store = FormStore::new(config.default_values.clone());
        Self {
            inner: Arc::new(EngineInner {
                config,
                store,
                rules: DashMap::new(),
                sanitizers: DashMap::new(),
                statuses: DashMap::new(),
                generations: DashMap::new(),
                cache: StatusCache::new(),
            }),
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Register a field.
    ///
    /// Registering an already registered field does not duplicate it. When
    /// `rules` are given they replace the field's rules and reset its status
    /// and cache namespace. Fails if a rule names a custom validator the form
    /// does not know.
    pub fn register(&self, field: &str, rules: Option<Rules>, sanitizer: Option<&str>) -> Result<(), FormError> {
        if let Some(rule) = rules.as_ref().and_then(|r| r.unresolved(&self.inner.config.validators)) {
            return Err(FormError::unknown_rule(field, rule.name()));
        }

        if self.inner.store.add_registered(field) {
            debug!("[form] registered field '{}'", field);
        }

        if let Some(rules) = rules {
            self.inner.rules.insert(field.to_string(), Arc::new(rules));
            self.inner.statuses.insert(field.to_string(), ValidationStatus::default());
            self.inner.cache.clear(field);
            self.abandon_in_flight(field);
        }

        if let Some(sanitizer) = sanitizer {
            self.inner.sanitizers.insert(field.to_string(), sanitizer.to_string());
        }

        Ok(())
    }

    /// Remove a field from the registry, dropping its rules, sanitizer
    /// binding, status, cache namespace and error. Its value is kept.
    pub fn unregister(&self, field: &str) {
        self.inner.store.remove_registered(field);
        self.inner.rules.remove(field);
        self.inner.sanitizers.remove(field);
        self.inner.statuses.remove(field);
        self.inner.cache.remove(field);
        self.abandon_in_flight(field);
        self.inner.store.remove_error(field);
        debug!("[form] unregistered field '{}'", field);
    }

    fn abandon_in_flight(&self, field: &str) {
        self.advance(field);
        if self.inner.store.is_validating(field) {
            self.inner.store.set_validating(field, false);
        }
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// Handle a change notification: sanitize and store the value, clear the
    /// field's error, then validate if `change` is in the trigger set.
    pub fn handle_change(&self, field: &str, input: impl Into<FieldInput>) -> Option<JoinHandle<Option<bool>>> {
        let input = input.into();
        let raw = input.value();
        let sanitizer = self.inner.sanitizers.get(field).map(|s| s.clone());
        let value = match sanitizer {
            Some(name) => self.inner.config.sanitizers.apply(&name, raw),
            None => raw,
        };
        trace!("[form] change '{}' = {:?}", field, value);

        self.inner.store.set_value(field, value.clone());
        if let Some(constraint) = &self.inner.config.constraint_validation {
            constraint.clear(input.validity());
        }
        self.inner.store.remove_error(field);

        self.spawn_validation(field, value, Trigger::Change, &input)
    }

    /// Handle a blur notification: validate if `blur` is in the trigger set.
    pub fn handle_blur(&self, field: &str, input: impl Into<FieldInput>) -> Option<JoinHandle<Option<bool>>> {
        let input = input.into();
        let value = input.value();
        trace!("[form] blur '{}'", field);

        self.spawn_validation(field, value, Trigger::Blur, &input)
    }

    fn spawn_validation(
        &self,
        field: &str,
        value: String,
        trigger: Trigger,
        input: &FieldInput,
    ) -> Option<JoinHandle<Option<bool>>> {
        let rules = self.rules(field)?;
        if !self.inner.config.triggers_on(trigger) {
            return None;
        }

        let request = ValidationRequest {
            field: field.to_string(),
            value,
            trigger,
            rules: Some(rules),
            target: input.validity().cloned(),
        };
        let engine = self.clone();
        Some(spawn_guarded("validate", async move {
            engine.validate_field(request).await
        }))
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Validate one field and return whether it is valid.
    ///
    /// Updates the field's `validating` flag, stored status and error, and
    /// caches failures when error caching is enabled. A value equal to the
    /// one last validated is not re-evaluated. An outcome that was overtaken
    /// by a newer validation of the same field, including one answered from
    /// the stored status or the cache, is returned but not applied.
    pub async fn validate_field(&self, request: ValidationRequest) -> bool {
        let ValidationRequest {
            field,
            value,
            trigger,
            rules,
            target,
        } = request;
        let inner = &self.inner;

        let previous = inner
            .statuses
            .get(&field)
            .map(|status| status.clone())
            .unwrap_or_default();

        if previous.is_for(&value) {
            trace!("[form] '{}' unchanged since last validation", field);
            self.abandon_in_flight(&field);
            match previous.error() {
                Some(error) => inner.store.set_error(&field, error),
                None => inner.store.remove_error(&field),
            }
            return previous.valid;
        }

        if inner.config.cache_errors
            && let Some(cached) = inner.cache.lookup(&field, &value)
        {
            trace!("[form] '{}' cache hit for rule '{}'", field, cached.rule);
            self.abandon_in_flight(&field);
            self.report_invalid(target.as_ref(), &cached.message);
            inner.store.set_error(&field, cached);
            return false;
        }

        let rules = rules.or_else(|| self.rules(&field)).unwrap_or_default();
        let generation = self.advance(&field);
        inner.store.set_validating(&field, true);

        let pipeline = Pipeline::build(&rules, &inner.config.validators);
        let status = pipeline.run(previous.restarted(), &value, trigger).await;

        if !self.is_current(&field, generation) {
            debug!(
                "[form] discarding stale {} validation of '{}' (generation {})",
                trigger, field, generation
            );
            return status.valid;
        }

        inner.store.set_validating(&field, false);
        inner.statuses.insert(field.clone(), status.clone());

        match status.error() {
            Some(error) => {
                self.report_invalid(target.as_ref(), &error.message);
                if inner.config.cache_errors {
                    inner.cache.store(&field, &value, error.clone());
                }
                inner.store.set_error(&field, error);
                false
            }
            None => {
                inner.store.remove_error(&field);
                true
            }
        }
    }

    fn report_invalid(&self, target: Option<&Arc<dyn InputValidity>>, message: &str) {
        if let Some(constraint) = &self.inner.config.constraint_validation {
            constraint.report(target, message);
        }
    }

    fn advance(&self, field: &str) -> u64 {
        let mut generation = self.inner.generations.entry(field.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    fn is_current(&self, field: &str, generation: u64) -> bool {
        self.inner
            .generations
            .get(field)
            .is_some_and(|current| *current == generation)
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    /// Merge values into the form state.
    pub fn set_values<I, K, V>(&self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values: HashMap<String, String> = values.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.inner.store.set_values(values);
    }

    /// Merge errors into the form state.
    pub fn set_errors<I, K>(&self, errors: I)
    where
        I: IntoIterator<Item = (K, FieldError)>,
        K: Into<String>,
    {
        let errors: HashMap<String, FieldError> = errors.into_iter().map(|(k, e)| (k.into(), e)).collect();
        self.inner.store.set_errors(errors);
    }

    /// A copy of the full observable state.
    pub fn state(&self) -> FormState {
        self.inner.store.snapshot()
    }

    pub fn values(&self) -> HashMap<String, String> {
        self.inner.store.values()
    }

    pub fn value(&self, field: &str) -> Option<String> {
        self.inner.store.value(field)
    }

    pub fn errors(&self) -> HashMap<String, FieldError> {
        self.inner.store.errors()
    }

    pub fn error(&self, field: &str) -> Option<FieldError> {
        self.inner.store.error(field)
    }

    pub fn is_validating(&self, field: &str) -> bool {
        self.inner.store.is_validating(field)
    }

    pub fn is_submitting(&self) -> bool {
        self.inner.store.is_submitting()
    }

    pub fn registered_fields(&self) -> Vec<String> {
        self.inner.store.registered_fields()
    }

    /// The field's rules, if any are installed.
    pub fn rules(&self, field: &str) -> Option<Arc<Rules>> {
        self.inner.rules.get(field).map(|rules| Arc::clone(&rules))
    }

    /// The outcome of the field's last applied pipeline run.
    pub fn status(&self, field: &str) -> Option<ValidationStatus> {
        self.inner.statuses.get(field).map(|status| status.clone())
    }

    /// Number of cached failing values for a field.
    pub fn cached_len(&self, field: &str) -> usize {
        self.inner.cache.len(field)
    }
}

impl Default for FormEngine {
    fn default() -> Self {
        Self::new(FormConfig::default())
    }
}

impl std::fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormEngine")
            .field("config", &self.inner.config)
            .field("state", &self.inner.store.snapshot())
            .finish_non_exhaustive()
    }
}
