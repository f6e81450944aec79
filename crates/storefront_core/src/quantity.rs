use shared::{
    domain::{parse_int_prefix, Quantity},
    protocol::{attributes, selectors},
};
use tracing::debug;

use crate::{
    events::{Bindings, EventOutcome, EventType, Route},
    host::{ElementId, Host},
};

/// Product page `-`/`+` stepper around the quantity field.
pub struct QuantityStepper {
    input: ElementId,
}

impl QuantityStepper {
    pub(crate) fn attach(host: &mut dyn Host, bindings: &mut Bindings) -> Option<Self> {
        let input = host.query(selectors::QUANTITY_INPUT)?;
        let decrease = host.query(selectors::QUANTITY_DECREASE)?;
        let increase = host.query(selectors::QUANTITY_INCREASE)?;

        bindings.on_element(decrease, EventType::Click, Route::QuantityDecrease);
        bindings.on_element(increase, EventType::Click, Route::QuantityIncrease);
        bindings.on_element(input, EventType::Change, Route::QuantityEdited);
        debug!("quantity stepper attached");

        Some(Self { input })
    }

    pub fn current(&self, host: &dyn Host) -> Quantity {
        Quantity::read_or_min(&host.value(self.input))
    }

    pub fn decrease(&self, host: &mut dyn Host) -> EventOutcome {
        let raw = host.value(self.input);
        if parse_int_prefix(&raw).is_some_and(|current| current > 1) {
            let next = Quantity::read_or_min(&raw).decrease();
            host.set_value(self.input, &next.to_string());
            self.sync_add_to_cart(host);
        }
        EventOutcome::proceed()
    }

    pub fn increase(&self, host: &mut dyn Host) -> EventOutcome {
        let next = self.current(host).increase();
        host.set_value(self.input, &next.to_string());
        self.sync_add_to_cart(host);
        EventOutcome::proceed()
    }

    pub fn edited(&self, host: &mut dyn Host) -> EventOutcome {
        let raw = host.value(self.input);
        let clamped = Quantity::read_or_min(&raw);
        if raw != clamped.to_string() {
            host.set_value(self.input, &clamped.to_string());
        }
        self.sync_add_to_cart(host);
        EventOutcome::proceed()
    }

    fn sync_add_to_cart(&self, host: &mut dyn Host) {
        if let Some(button) = host.query(selectors::ADD_TO_CART_BUTTON) {
            let value = host.value(self.input);
            host.set_attribute(button, attributes::DATA_QUANTITY, &value);
        }
    }
}

#[cfg(test)]
#[path = "tests/quantity_tests.rs"]
mod tests;
