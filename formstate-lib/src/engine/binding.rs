//! Field binding for view layers.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::FormEngine;
use crate::error::FormError;
use crate::event::FieldInput;
use crate::rules::Rules;
use crate::state::FieldSnapshot;

/// A view's connection to one field.
///
/// Created by [`FormEngine::bind`]. It exposes the change and blur sinks the
/// view calls, and a subscription to the field's value, error and
/// validating flag. Dropping the binding unregisters the field, so two
/// bindings should not share a field name.
pub struct FieldBinding {
    engine: FormEngine,
    name: String,
    updates: watch::Receiver<FieldSnapshot>,
}

impl FieldBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Forward a change notification to the engine.
    pub fn on_change(&self, input: impl Into<FieldInput>) -> Option<JoinHandle<Option<bool>>> {
        self.engine.handle_change(&self.name, input)
    }

    /// Forward a blur notification to the engine.
    pub fn on_blur(&self, input: impl Into<FieldInput>) -> Option<JoinHandle<Option<bool>>> {
        self.engine.handle_blur(&self.name, input)
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> FieldSnapshot {
        self.updates.borrow().clone()
    }

    /// Wait for the next change to the field's snapshot.
    pub async fn changed(&mut self) -> Option<FieldSnapshot> {
        self.updates.changed().await.ok()?;
        Some(self.updates.borrow_and_update().clone())
    }

    /// Another receiver for the same field.
    pub fn updates(&self) -> watch::Receiver<FieldSnapshot> {
        self.updates.clone()
    }
}

impl Drop for FieldBinding {
    fn drop(&mut self) {
        self.engine.unregister(&self.name);
    }
}

impl std::fmt::Debug for FieldBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("snapshot", &*self.updates.borrow())
            .finish()
    }
}

impl FormEngine {
    /// Register a field and return a binding to it.
    pub fn bind(&self, field: &str, rules: Option<Rules>, sanitizer: Option<&str>) -> Result<FieldBinding, FormError> {
        self.register(field, rules, sanitizer)?;
        Ok(FieldBinding {
            engine: self.clone(),
            name: field.to_string(),
            updates: self.subscribe(field),
        })
    }

    /// Subscribe to a field's value, error and validating flag.
    pub fn subscribe(&self, field: &str) -> watch::Receiver<FieldSnapshot> {
        self.inner.store.subscribe(field)
    }

    /// Subscribe to the form's submitting flag.
    pub fn subscribe_submitting(&self) -> watch::Receiver<bool> {
        self.inner.store.subscribe_submitting()
    }
}
