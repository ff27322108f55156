//! Observable form state.
//!
//! `FormState` is the view-facing data: values, errors, per-field
//! validating flags and the submitting flag. The store keeps it behind a
//! lock and publishes per-field snapshots to subscribers through `watch`
//! channels whenever something they can see changes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::watch;

use crate::status::FieldError;

/// Observable state of a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    /// Current value per field.
    pub values: HashMap<String, String>,
    /// Present only for fields whose last completed validation failed.
    pub errors: HashMap<String, FieldError>,
    /// Whether a validation is in flight, per field.
    pub validating: HashMap<String, bool>,
    pub is_submitting: bool,
    /// Registered fields in registration order.
    pub registered_fields: Vec<String>,
}

impl FormState {
    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn error(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn is_validating(&self, field: &str) -> bool {
        self.validating.get(field).copied().unwrap_or(false)
    }

    pub fn is_registered(&self, field: &str) -> bool {
        self.registered_fields.iter().any(|f| f == field)
    }

    /// The slice of state a single field binding observes.
    pub fn field(&self, field: &str) -> FieldSnapshot {
        FieldSnapshot {
            value: self.values.get(field).cloned(),
            error: self.errors.get(field).cloned(),
            validating: self.is_validating(field),
        }
    }
}

/// What a field binder sees of its field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSnapshot {
    pub value: Option<String>,
    pub error: Option<FieldError>,
    pub validating: bool,
}

#[derive(Debug)]
pub(crate) struct FormStore {
    state: RwLock<FormState>,
    watchers: DashMap<String, watch::Sender<FieldSnapshot>>,
    submitting: watch::Sender<bool>,
    /// Submits currently in flight.
    submits: AtomicUsize,
}

impl FormStore {
    pub(crate) fn new(values: HashMap<String, String>) -> Self {
        Self {
            state: RwLock::new(FormState {
                values,
                ..Default::default()
            }),
            watchers: DashMap::new(),
            submitting: watch::channel(false).0,
            submits: AtomicUsize::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, FormState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, FormState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply `f` to one field's state and publish the result.
    fn update_field<F>(&self, field: &str, f: F)
    where
        F: FnOnce(&mut FormState),
    {
        f(&mut self.write());
        self.notify(field);
    }

    fn notify(&self, field: &str) {
        let Some(sender) = self.watchers.get(field) else {
            return;
        };
        let snapshot = self.read().field(field);
        sender.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    pub(crate) fn snapshot(&self) -> FormState {
        self.read().clone()
    }

    pub(crate) fn values(&self) -> HashMap<String, String> {
        self.read().values.clone()
    }

    pub(crate) fn value(&self, field: &str) -> Option<String> {
        self.read().values.get(field).cloned()
    }

    pub(crate) fn errors(&self) -> HashMap<String, FieldError> {
        self.read().errors.clone()
    }

    pub(crate) fn error(&self, field: &str) -> Option<FieldError> {
        self.read().errors.get(field).cloned()
    }

    pub(crate) fn is_submitting(&self) -> bool {
        self.read().is_submitting
    }

    pub(crate) fn is_validating(&self, field: &str) -> bool {
        self.read().is_validating(field)
    }

    pub(crate) fn registered_fields(&self) -> Vec<String> {
        self.read().registered_fields.clone()
    }

    /// Add `field` to the registry. Returns `false` if it was already there.
    pub(crate) fn add_registered(&self, field: &str) -> bool {
        let mut state = self.write();
        if state.is_registered(field) {
            return false;
        }
        state.registered_fields.push(field.to_string());
        true
    }

    pub(crate) fn remove_registered(&self, field: &str) {
        self.write().registered_fields.retain(|f| f != field);
    }

    pub(crate) fn set_value(&self, field: &str, value: String) {
        self.update_field(field, |state| {
            state.values.insert(field.to_string(), value);
        });
    }

    pub(crate) fn set_values(&self, values: HashMap<String, String>) {
        let fields: Vec<String> = values.keys().cloned().collect();
        self.write().values.extend(values);
        for field in &fields {
            self.notify(field);
        }
    }

    pub(crate) fn set_error(&self, field: &str, error: FieldError) {
        self.update_field(field, |state| {
            state.errors.insert(field.to_string(), error);
        });
    }

    pub(crate) fn set_errors(&self, errors: HashMap<String, FieldError>) {
        let fields: Vec<String> = errors.keys().cloned().collect();
        self.write().errors.extend(errors);
        for field in &fields {
            self.notify(field);
        }
    }

    pub(crate) fn remove_error(&self, field: &str) {
        self.update_field(field, |state| {
            state.errors.remove(field);
        });
    }

    pub(crate) fn set_validating(&self, field: &str, validating: bool) {
        self.update_field(field, |state| {
            state.validating.insert(field.to_string(), validating);
        });
    }

    /// Mark one more submit as in flight.
    pub(crate) fn begin_submit(&self) {
        let mut state = self.write();
        self.submits.fetch_add(1, Ordering::SeqCst);
        state.is_submitting = true;
        self.publish_submitting(true);
    }

    /// Mark a submit as finished. The flag drops once none are in flight.
    pub(crate) fn end_submit(&self) {
        let mut state = self.write();
        let previous = self
            .submits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or_else(|n| n);
        let submitting = previous > 1;
        state.is_submitting = submitting;
        self.publish_submitting(submitting);
    }

    fn publish_submitting(&self, submitting: bool) {
        self.submitting.send_if_modified(|current| {
            let modified = *current != submitting;
            *current = submitting;
            modified
        });
    }

    pub(crate) fn subscribe(&self, field: &str) -> watch::Receiver<FieldSnapshot> {
        let snapshot = self.read().field(field);
        self.watchers
            .entry(field.to_string())
            .or_insert_with(|| watch::channel(snapshot).0)
            .subscribe()
    }

    pub(crate) fn subscribe_submitting(&self) -> watch::Receiver<bool> {
        self.submitting.subscribe()
    }
}
