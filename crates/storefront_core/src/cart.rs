//! Cart page and product page buttons that post back to the server.

use shared::{
    domain::{ProductId, Quantity},
    error::StorefrontError,
    protocol::{attributes, selectors, AddToCartRequest, FormSubmission},
};
use tracing::{debug, info};

use crate::{
    events::{Bindings, EventOutcome, EventType, Route},
    host::{ElementId, Host},
    settings::Settings,
};

pub struct CartControls {
    remove_message: String,
    adding_label: String,
    add_to_cart_action: String,
}

impl CartControls {
    pub(crate) fn attach(host: &mut dyn Host, bindings: &mut Bindings, settings: &Settings) -> Self {
        let quantity_inputs = host.query_all(selectors::CART_QUANTITY_INPUT);
        for input in &quantity_inputs {
            bindings.on_element(*input, EventType::Change, Route::CartQuantityChanged);
        }

        let remove_buttons = host.query_all(selectors::REMOVE_FROM_CART);
        for button in &remove_buttons {
            bindings.on_element(*button, EventType::Click, Route::RemoveFromCart);
        }

        let add_buttons = host.query_all(selectors::ADD_TO_CART_BUTTON);
        for button in &add_buttons {
            bindings.on_element(*button, EventType::Click, Route::AddToCart);
        }

        debug!(
            quantity_inputs = quantity_inputs.len(),
            remove_buttons = remove_buttons.len(),
            add_buttons = add_buttons.len(),
            "cart controls attached"
        );

        Self {
            remove_message: settings.messages.remove_from_cart.clone(),
            adding_label: settings.messages.adding_to_cart.clone(),
            add_to_cart_action: settings.add_to_cart_action.clone(),
        }
    }

    pub fn quantity_changed(
        &self,
        host: &mut dyn Host,
        input: ElementId,
    ) -> Result<EventOutcome, StorefrontError> {
        if let Some(form) = host.closest(input, selectors::FORM) {
            info!(value = %host.value(input), "submitting cart quantity update");
            host.submit(form)?;
        }
        Ok(EventOutcome::proceed())
    }

    pub fn remove_clicked(&self, host: &mut dyn Host) -> EventOutcome {
        if host.confirm(&self.remove_message) {
            EventOutcome::proceed()
        } else {
            debug!("cart removal declined");
            EventOutcome::prevent_default()
        }
    }

    pub fn add_to_cart_clicked(
        &self,
        host: &mut dyn Host,
        button: ElementId,
    ) -> Result<EventOutcome, StorefrontError> {
        let Some(product_id) = host
            .attribute(button, attributes::DATA_PRODUCT_ID)
            .and_then(|raw| raw.parse::<ProductId>().ok())
        else {
            debug!("add-to-cart button without a product id");
            return Ok(EventOutcome::proceed());
        };
        let quantity = host
            .attribute(button, attributes::DATA_QUANTITY)
            .map(|raw| Quantity::read_or_min(&raw))
            .unwrap_or_default();

        host.set_inner_html(button, &self.adding_label);
        host.set_disabled(button, true);

        let request = AddToCartRequest {
            product_id,
            quantity,
        };
        info!(product_id = %product_id, quantity = %quantity, "adding product to cart");
        submit_hidden_form(host, &request.to_submission(&self.add_to_cart_action))?;
        Ok(EventOutcome::prevent_default())
    }
}

/// Builds a detached form of hidden inputs, appends it to the body and
/// submits it.
pub fn submit_hidden_form(
    host: &mut dyn Host,
    submission: &FormSubmission,
) -> Result<ElementId, StorefrontError> {
    let form = host.create_element("form")?;
    host.set_attribute(form, attributes::METHOD, submission.method.as_str());
    host.set_attribute(form, attributes::ACTION, &submission.action);

    for (name, value) in &submission.fields {
        let input = host.create_element("input")?;
        host.set_attribute(input, attributes::TYPE, "hidden");
        host.set_attribute(input, attributes::NAME, name);
        host.set_value(input, value);
        host.append_child(form, input)?;
    }

    let body = host.body();
    host.append_child(body, form)?;
    host.submit(form)?;
    Ok(form)
}

#[cfg(test)]
#[path = "tests/cart_tests.rs"]
mod tests;
