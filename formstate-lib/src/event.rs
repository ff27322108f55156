//! Input notifications and value extraction.

use std::sync::Arc;

use crate::constraint::InputValidity;

/// The input element that produced a change or blur notification.
#[derive(Clone, Default)]
pub struct EventTarget {
    /// Input type, e.g. `"text"` or `"checkbox"`.
    pub kind: String,
    /// Current text value.
    pub value: String,
    /// Checked state (checkbox inputs only).
    pub checked: bool,
    /// Custom validity sink, when the host supports constraint validation.
    pub validity: Option<Arc<dyn InputValidity>>,
}

impl EventTarget {
    /// A text-like input holding `value`.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// A checkbox input.
    pub fn checkbox(checked: bool) -> Self {
        Self {
            kind: "checkbox".to_string(),
            checked,
            ..Default::default()
        }
    }

    /// Attach a custom validity sink.
    pub fn with_validity(mut self, validity: Arc<dyn InputValidity>) -> Self {
        self.validity = Some(validity);
        self
    }

    fn is_checkbox(&self) -> bool {
        self.kind == "checkbox"
    }
}

impl std::fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTarget")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("checked", &self.checked)
            .field("validity", &self.validity.is_some())
            .finish()
    }
}

/// Second argument of change and blur notifications: either a structured
/// event or an already-extracted value.
#[derive(Debug, Clone)]
pub enum FieldInput {
    Event(EventTarget),
    Value(String),
}

impl FieldInput {
    /// Normalize into the primitive field value.
    ///
    /// Checkbox targets yield `"true"` when checked and `""` otherwise.
    pub fn value(&self) -> String {
        match self {
            Self::Event(target) if target.is_checkbox() => {
                if target.checked {
                    "true".to_string()
                } else {
                    String::new()
                }
            }
            Self::Event(target) => target.value.clone(),
            Self::Value(value) => value.clone(),
        }
    }

    /// The target's validity sink, if the input carries one.
    pub fn validity(&self) -> Option<&Arc<dyn InputValidity>> {
        match self {
            Self::Event(target) => target.validity.as_ref(),
            Self::Value(_) => None,
        }
    }
}

impl From<EventTarget> for FieldInput {
    fn from(target: EventTarget) -> Self {
        Self::Event(target)
    }
}

impl From<String> for FieldInput {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

/// A form submission notification.
#[derive(Debug, Clone, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the host's native submission.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_passes_through() {
        assert_eq!(FieldInput::from("abc").value(), "abc");
        assert_eq!(FieldInput::from(String::new()).value(), "");
    }

    #[test]
    fn test_text_target_yields_value() {
        let input = FieldInput::from(EventTarget::text("hello"));
        assert_eq!(input.value(), "hello");
    }

    #[test]
    fn test_checkbox_target_yields_checked() {
        assert_eq!(FieldInput::from(EventTarget::checkbox(true)).value(), "true");
        assert_eq!(FieldInput::from(EventTarget::checkbox(false)).value(), "");
    }

    #[test]
    fn test_checkbox_ignores_value() {
        let target = EventTarget {
            value: "on".to_string(),
            ..EventTarget::checkbox(false)
        };
        assert_eq!(FieldInput::from(target).value(), "");
    }

    #[test]
    fn test_prevent_default() {
        let mut event = SubmitEvent::new();
        assert!(!event.is_default_prevented());
        event.prevent_default();
        assert!(event.is_default_prevented());
    }
}
