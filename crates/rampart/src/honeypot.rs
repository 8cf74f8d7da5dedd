//! Honeypot spam filter.
//!
//! Every form carries one hidden, non-tabbable field. People never see it;
//! form-filling bots usually do. A non-empty value marks the submission as
//! automated and it is dropped without telling the sender.

use rampart_common::FieldKind;

use crate::pipeline::{FieldState, FormSession};

pub struct Honeypot {
    field: String,
}

impl Honeypot {
    pub fn new(field: impl Into<String>) -> Self {
        Self { field: field.into() }
    }

    pub fn field_name(&self) -> &str {
        &self.field
    }

    /// Make sure `form` has the hidden field. Returns true if one was added.
    ///
    /// A configured field that already uses the honeypot name is turned
    /// into the hidden field.
    pub fn ensure(&self, form: &mut FormSession) -> bool {
        let form_id = form.id.clone();
        if let Some(existing) = form.field_mut(&self.field) {
            if existing.kind != FieldKind::Honeypot {
                tracing::warn!(
                    form_id = %form_id,
                    field = %self.field,
                    "Configured field shadows the honeypot, hiding it"
                );
                existing.kind = FieldKind::Honeypot;
                existing.required = false;
            }
            return false;
        }

        form.fields
            .push(FieldState::new(self.field.clone(), FieldKind::Honeypot, false));
        true
    }

    /// Returns true if the hidden field carries any value
    pub fn is_tripped(&self, form: &FormSession) -> bool {
        form.field(&self.field)
            .map(|f| !f.value.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captcha::Challenge;
    use crate::config::{FieldConfig, FormConfig};
    use rampart_common::Operator;
    use std::collections::HashMap;

    fn form(fields: Vec<FieldConfig>) -> FormSession {
        let config = FormConfig {
            id: "signup-form".into(),
            submit_label: None,
            fields,
        };
        FormSession::new(
            &config,
            "Submit",
            Challenge::from_parts("c".into(), 1, 1, Operator::Add),
        )
    }

    #[test]
    fn test_ensure_adds_exactly_once() {
        let honeypot = Honeypot::new("website");
        let mut form = form(vec![]);

        assert!(honeypot.ensure(&mut form));
        assert!(!honeypot.ensure(&mut form));
        assert_eq!(form.fields.len(), 1);
        assert!(form.fields[0].is_hidden());
    }

    #[test]
    fn test_ensure_hides_shadowing_field() {
        let honeypot = Honeypot::new("website");
        let mut form = form(vec![FieldConfig {
            name: "website".into(),
            kind: FieldKind::Text,
            required: true,
        }]);

        assert!(!honeypot.ensure(&mut form));
        let field = form.field("website").unwrap();
        assert_eq!(field.kind, FieldKind::Honeypot);
        assert!(!field.required);
    }

    #[test]
    fn test_any_value_trips() {
        let honeypot = Honeypot::new("website");
        let mut form = form(vec![]);
        honeypot.ensure(&mut form);
        assert!(!honeypot.is_tripped(&form));

        form.apply_values(&HashMap::from([("website".to_string(), " ".to_string())]));
        assert!(honeypot.is_tripped(&form));
    }
}
