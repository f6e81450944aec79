//! Drives a booted [`Storefront`] over a [`MemoryPage`] the way a browser
//! would: events bubble from the target to the window, and default actions
//! (form submission, link navigation) run unless a handler prevented them.

use std::time::Duration;

use shared::{
    error::StorefrontError,
    protocol::{attributes, selectors},
};
use tracing::debug;
use url::Url;

use crate::{
    events::{EventOutcome, EventType, ListenerTarget},
    host::{Browser, Document, ElementId},
    memory::MemoryPage,
    settings::Settings,
    storefront::Storefront,
};

const CLICK_DEFAULT_TARGET: &str = r#"a[href], button, input[type="submit"]"#;

pub struct Simulator {
    page: MemoryPage,
    storefront: Storefront,
}

impl Simulator {
    pub fn boot(mut page: MemoryPage, settings: &Settings) -> Result<Self, StorefrontError> {
        let storefront = Storefront::boot(&mut page, settings)?;
        Ok(Self { page, storefront })
    }

    pub fn page(&self) -> &MemoryPage {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut MemoryPage {
        &mut self.page
    }

    pub fn storefront(&self) -> &Storefront {
        &self.storefront
    }

    fn dispatch(&mut self, target: ElementId, event: EventType) -> EventOutcome {
        let mut outcome = EventOutcome::proceed();
        let mut current = Some(target);
        while let Some(element) = current {
            outcome = outcome.merge(self.storefront.dispatch(
                &mut self.page,
                ListenerTarget::Element(element),
                event,
            ));
            if outcome.propagation_stopped {
                return outcome;
            }
            current = self.page.parent(element);
        }
        outcome.merge(
            self.storefront
                .dispatch(&mut self.page, ListenerTarget::Window, event),
        )
    }

    pub fn click(&mut self, target: ElementId) -> Result<EventOutcome, StorefrontError> {
        let outcome = self.dispatch(target, EventType::Click);
        if outcome.default_prevented {
            return Ok(outcome);
        }

        let Some(activated) = self.page.closest(target, CLICK_DEFAULT_TARGET) else {
            return Ok(outcome);
        };
        if self.page.tag(activated) == Some("a") {
            self.follow_link(activated)?;
        } else if is_submit_control(&self.page, activated) {
            if let Some(form) = self.page.closest(activated, selectors::FORM) {
                self.submit(form)?;
            }
        }
        Ok(outcome)
    }

    fn follow_link(&mut self, anchor: ElementId) -> Result<(), StorefrontError> {
        let href = self.page.attribute(anchor, attributes::HREF).unwrap_or_default();
        if href.starts_with('#') {
            return Ok(());
        }
        let base = self.page.href();
        let target = Url::parse(&base)
            .and_then(|base| base.join(&href))
            .map_err(|source| StorefrontError::InvalidUrl { url: href, source })?;
        debug!(url = %target, "following link");
        self.page.push_url(target.as_str())
    }

    /// Replaces the control's value and fires `input`.
    pub fn type_text(&mut self, input: ElementId, text: &str) -> EventOutcome {
        self.page.set_value(input, text);
        self.dispatch(input, EventType::Input)
    }

    /// Replaces the control's value and fires `change`.
    pub fn change(&mut self, control: ElementId, value: &str) -> EventOutcome {
        self.page.set_value(control, value);
        self.dispatch(control, EventType::Change)
    }

    pub fn submit(&mut self, form: ElementId) -> Result<EventOutcome, StorefrontError> {
        let outcome = self.dispatch(form, EventType::Submit);
        if !outcome.default_prevented {
            self.page.submit(form)?;
        }
        Ok(outcome)
    }

    pub fn scroll_to(&mut self, offset: f64) -> EventOutcome {
        self.page.set_scroll_y(offset);
        self.storefront
            .dispatch(&mut self.page, ListenerTarget::Window, EventType::Scroll)
    }

    /// Moves the virtual clock forward, firing every timer that comes due in
    /// order. Returns how many fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.page.now() + by;
        let mut fired = 0;
        while let Some((timer, task)) = self.page.next_due_timer(until) {
            self.storefront.on_timer(&mut self.page, timer, task);
            fired += 1;
        }
        self.page.advance_clock_to(until);
        fired
    }

    /// Scrolls `element` into the viewport. Only observed elements are
    /// reported to the behaviors.
    pub fn reveal(&mut self, element: ElementId) -> bool {
        if !self.page.is_observed(element) {
            return false;
        }
        self.storefront.on_intersecting(&mut self.page, element);
        true
    }

    pub fn answer_confirm(&mut self, accept: bool) {
        self.page.queue_confirm(accept);
    }

    pub fn finish_file_reads(&mut self) -> usize {
        let reads = self.page.complete_file_reads();
        for (input, data_url) in &reads {
            self.storefront.on_file_loaded(&mut self.page, *input, data_url);
        }
        reads.len()
    }

    pub fn teardown(&mut self) {
        self.storefront.teardown(&mut self.page);
    }

    pub fn into_page(self) -> MemoryPage {
        self.page
    }
}

fn is_submit_control(page: &MemoryPage, element: ElementId) -> bool {
    let kind = page.attribute(element, attributes::TYPE);
    match page.tag(element) {
        Some("button") => matches!(kind.as_deref(), None | Some("submit")),
        Some("input") => kind.as_deref() == Some("submit"),
        _ => false,
    }
}

#[cfg(test)]
#[path = "tests/simulator_tests.rs"]
mod tests;
