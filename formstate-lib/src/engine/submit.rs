//! Full-form validation on submit.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, trace};
use serde::Serialize;
use tokio::task::JoinHandle;

use super::{FormEngine, ValidationRequest};
use crate::config::Trigger;
use crate::event::SubmitEvent;
use crate::task::spawn_guarded;

/// Outcome of a submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitResult {
    /// Logical AND of every registered field's validity.
    pub is_valid: bool,
    /// Values as they were when the submit started.
    pub values: HashMap<String, String>,
}

impl FormEngine {
    /// Validate every registered field concurrently.
    ///
    /// Values are snapshotted when this is called, not when the returned
    /// future is first polled. Resolves to `None` without validating when
    /// `submit` is not in the trigger set.
    pub fn submit(&self) -> impl Future<Output = Option<SubmitResult>> + Send + 'static {
        let validation = if self.inner.config.triggers_on(Trigger::Submit) {
            Some(self.run_form_validation())
        } else {
            trace!("[submit] submit not in trigger set");
            None
        };

        async move {
            match validation {
                Some(validation) => Some(validation.await),
                None => None,
            }
        }
    }

    /// Build a submit handler.
    ///
    /// The handler suppresses the event's default action and, when `submit`
    /// is in the trigger set, spawns full-form validation and passes the
    /// result to `callback`. It returns the spawned task's handle, or `None`
    /// if nothing was spawned.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let on_submit = engine.handle_submit(|result| {
    ///     if result.is_valid {
    ///         save(result.values);
    ///     }
    /// });
    ///
    /// let mut event = SubmitEvent::new();
    /// on_submit(Some(&mut event));
    /// ```
    pub fn handle_submit<F>(
        &self,
        callback: F,
    ) -> impl Fn(Option<&mut SubmitEvent>) -> Option<JoinHandle<Option<()>>> + Send + Sync + 'static
    where
        F: Fn(SubmitResult) + Send + Sync + 'static,
    {
        let engine = self.clone();
        let callback = Arc::new(callback);

        move |event: Option<&mut SubmitEvent>| {
            if let Some(event) = event {
                event.prevent_default();
            }
            if !engine.inner.config.triggers_on(Trigger::Submit) {
                return None;
            }

            let validation = engine.run_form_validation();
            let callback = Arc::clone(&callback);
            Some(spawn_guarded("submit", async move {
                callback(validation.await);
            }))
        }
    }

    fn run_form_validation(&self) -> impl Future<Output = SubmitResult> + Send + 'static {
        self.inner.store.begin_submit();

        let values = self.inner.store.values();
        let fields = self.inner.store.registered_fields();
        let engine = self.clone();
        debug!("[submit] validating {} fields", fields.len());

        async move {
            let engine = &engine;
            let validations = fields.into_iter().map(|field| {
                let rules = engine.rules(&field);
                let value = values.get(&field).cloned().unwrap_or_default();
                async move {
                    if rules.is_none() && engine.is_validating(&field) {
                        return true;
                    }
                    let request = ValidationRequest {
                        rules,
                        ..ValidationRequest::new(field, value, Trigger::Submit)
                    };
                    engine.validate_field(request).await
                }
            });
            let results = join_all(validations).await;

            engine.inner.store.end_submit();

            let is_valid = results.iter().all(|valid| *valid);
            debug!("[submit] done, valid: {}", is_valid);

            SubmitResult { is_valid, values }
        }
    }
}
