//! Per-form state: field values, inline errors, the submit control and the
//! live challenge.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::captcha::{Challenge, ChallengeView};
use crate::config::FormConfig;
use crate::submitter::Payload;
use rampart_common::{FieldKind, Stage};

/// One input on a form
#[derive(Debug, Clone, Serialize)]
pub struct FieldState {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    /// Inline error shown next to the field
    pub error: Option<String>,
}

impl FieldState {
    pub fn new(name: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            required,
            value: String::new(),
            error: None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.kind.is_hidden()
    }

    /// Hidden fields are skipped by keyboard navigation
    pub fn tab_index(&self) -> i32 {
        if self.is_hidden() { -1 } else { 0 }
    }
}

/// What the submit control currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    Ready,
    /// A submission is in flight
    Processing,
    /// Window is full
    Throttled,
}

/// The form's submit button
#[derive(Debug, Clone, Serialize)]
pub struct SubmitControl {
    pub mode: ControlMode,
    pub label: String,
    #[serde(skip)]
    original_label: String,
}

impl SubmitControl {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            mode: ControlMode::Ready,
            original_label: label.clone(),
            label,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mode == ControlMode::Ready
    }

    pub fn start_processing(&mut self, label: &str) {
        self.mode = ControlMode::Processing;
        self.label = label.to_string();
    }

    /// Back to the original label after a dispatch resolves
    pub fn finish_processing(&mut self) {
        if self.mode == ControlMode::Processing {
            self.restore();
        }
    }

    /// Disable for a full window. An in-flight control is left alone; the
    /// limit is checked again on its next submit.
    pub fn throttle(&mut self, label: &str) {
        if self.mode == ControlMode::Processing {
            return;
        }
        self.mode = ControlMode::Throttled;
        self.label = label.to_string();
    }

    pub fn lift_throttle(&mut self) {
        if self.mode == ControlMode::Throttled {
            self.restore();
        }
    }

    fn restore(&mut self) {
        self.mode = ControlMode::Ready;
        self.label = self.original_label.clone();
    }
}

/// A form as the page sees it
pub struct FormSession {
    pub id: String,
    pub fields: Vec<FieldState>,
    pub control: SubmitControl,
    pub challenge: Challenge,
    pub stage: Stage,
}

impl FormSession {
    pub fn new(config: &FormConfig, default_label: &str, challenge: Challenge) -> Self {
        let fields = config
            .fields
            .iter()
            .map(|f| FieldState::new(f.name.clone(), f.kind, f.required))
            .collect();

        Self {
            id: config.id.clone(),
            fields,
            control: SubmitControl::new(config.submit_label.as_deref().unwrap_or(default_label)),
            challenge,
            stage: Stage::Idle,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldState> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Copy submitted values onto known fields; unknown names are ignored
    pub fn apply_values(&mut self, values: &HashMap<String, String>) {
        for (name, value) in values {
            match self.field_mut(name) {
                Some(field) => {
                    if field.value != *value {
                        field.error = None;
                    }
                    field.value = value.clone();
                }
                None => {
                    tracing::debug!(form_id = %self.id, field = %name, "Ignoring unknown field");
                }
            }
        }
    }

    /// Visible field values, keyed by name
    pub fn payload(&self) -> Payload {
        self.fields
            .iter()
            .filter(|f| !f.is_hidden())
            .map(|f| (f.name.clone(), f.value.trim().to_string()))
            .collect::<BTreeMap<_, _>>()
    }

    /// Clear every value and inline error
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
            field.error = None;
        }
    }

    pub fn view(&self) -> FormView {
        FormView {
            id: self.id.clone(),
            stage: self.stage,
            fields: self
                .fields
                .iter()
                .map(|f| FieldView {
                    name: f.name.clone(),
                    kind: f.kind,
                    required: f.required,
                    value: f.value.clone(),
                    error: f.error.clone(),
                    hidden: f.is_hidden(),
                    tab_index: f.tab_index(),
                    autocomplete: !f.is_hidden(),
                })
                .collect(),
            challenge: self.challenge.view(),
            submit_enabled: self.control.is_enabled(),
            submit: self.control.clone(),
        }
    }
}

/// Serializable snapshot of a form
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub id: String,
    pub stage: Stage,
    pub fields: Vec<FieldView>,
    pub challenge: ChallengeView,
    pub submit_enabled: bool,
    pub submit: SubmitControl,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    pub error: Option<String>,
    pub hidden: bool,
    pub tab_index: i32,
    pub autocomplete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;
    use rampart_common::Operator;

    fn session() -> FormSession {
        let config = FormConfig {
            id: "contact".into(),
            submit_label: Some("Send".into()),
            fields: vec![
                FieldConfig {
                    name: "email".into(),
                    kind: FieldKind::Email,
                    required: true,
                },
                FieldConfig {
                    name: "website".into(),
                    kind: FieldKind::Honeypot,
                    required: false,
                },
            ],
        };
        let challenge = Challenge::from_parts("c".into(), 1, 2, Operator::Add);
        FormSession::new(&config, "Submit", challenge)
    }

    #[test]
    fn test_payload_excludes_hidden_fields() {
        let mut form = session();
        let values = HashMap::from([
            ("email".to_string(), " a@b.c ".to_string()),
            ("website".to_string(), "spam".to_string()),
            ("bogus".to_string(), "x".to_string()),
        ]);
        form.apply_values(&values);

        let payload = form.payload();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("email").map(String::as_str), Some("a@b.c"));
        assert_eq!(form.field("website").map(|f| f.value.as_str()), Some("spam"));
    }

    #[test]
    fn test_changed_value_clears_error() {
        let mut form = session();
        form.field_mut("email").unwrap().error = Some("bad".into());

        form.apply_values(&HashMap::from([("email".to_string(), String::new())]));
        assert!(form.field("email").unwrap().error.is_some());

        form.apply_values(&HashMap::from([("email".to_string(), "x".to_string())]));
        assert!(form.field("email").unwrap().error.is_none());
    }

    #[test]
    fn test_control_transitions() {
        let mut control = SubmitControl::new("Send");
        control.start_processing("Sending...");
        assert!(!control.is_enabled());
        assert_eq!(control.label, "Sending...");

        control.finish_processing();
        assert!(control.is_enabled());
        assert_eq!(control.label, "Send");

        control.throttle("Too many attempts");
        assert!(!control.is_enabled());
        control.lift_throttle();
        assert!(control.is_enabled());
        assert_eq!(control.label, "Send");
    }

    #[test]
    fn test_throttle_never_releases_in_flight_control() {
        let mut control = SubmitControl::new("Send");
        control.start_processing("Sending...");

        control.throttle("Too many attempts");
        assert_eq!(control.mode, ControlMode::Processing);

        control.lift_throttle();
        assert_eq!(control.mode, ControlMode::Processing);
        assert_eq!(control.label, "Sending...");
    }

    #[test]
    fn test_view_hides_honeypot_and_answer() {
        let form = session();
        let view = form.view();
        let honeypot = view.fields.iter().find(|f| f.name == "website").unwrap();
        assert!(honeypot.hidden);
        assert_eq!(honeypot.tab_index, -1);
        assert!(!honeypot.autocomplete);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["challenge"]["question"], "1 + 2 = ?");
        assert!(json["challenge"].get("answer").is_none());
        assert_eq!(json["submit"]["mode"], "ready");
    }
}
