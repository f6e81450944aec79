use shared::{
    phone,
    protocol::{classes, selectors},
};
use tracing::debug;

use crate::{
    events::{Bindings, EventOutcome, EventType, Route},
    host::{ElementId, Host},
    settings::Settings,
};

/// Native constraint validation on flagged forms, plus phone sanitizing.
pub struct FormValidation {
    invalid_phone: String,
}

impl FormValidation {
    pub(crate) fn attach(host: &mut dyn Host, bindings: &mut Bindings, settings: &Settings) -> Self {
        let forms = host.query_all(selectors::NEEDS_VALIDATION);
        for form in &forms {
            bindings.on_element(*form, EventType::Submit, Route::ValidatedSubmit);
        }

        let phone_inputs = host.query_all(selectors::PHONE_INPUT);
        for input in &phone_inputs {
            bindings.on_element(*input, EventType::Input, Route::PhoneInput);
        }

        debug!(
            forms = forms.len(),
            phone_inputs = phone_inputs.len(),
            "form validation attached"
        );
        Self {
            invalid_phone: settings.messages.invalid_phone.clone(),
        }
    }

    pub fn form_submitted(&self, host: &mut dyn Host, form: ElementId) -> EventOutcome {
        let valid = host.check_validity(form);
        host.add_class(form, classes::WAS_VALIDATED);
        if valid {
            EventOutcome::proceed()
        } else {
            debug!("blocking submission of invalid form");
            EventOutcome {
                default_prevented: true,
                propagation_stopped: true,
            }
        }
    }

    pub fn phone_input(&self, host: &mut dyn Host, input: ElementId) -> EventOutcome {
        let raw = host.value(input);
        let sanitized = phone::sanitize(&raw);
        if sanitized != raw {
            host.set_value(input, &sanitized);
        }

        if phone::needs_validity_message(&sanitized) {
            host.set_custom_validity(input, &self.invalid_phone);
        } else {
            host.set_custom_validity(input, "");
        }
        EventOutcome::proceed()
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
