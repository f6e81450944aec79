use shared::{
    error::StorefrontError,
    protocol::{attributes, classes, selectors},
};
use tracing::debug;

use crate::{
    events::{Bindings, EventOutcome, EventType, ListenerTarget, Route},
    host::{ElementId, Host},
    settings::Settings,
};

const BACK_TO_TOP_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("bottom", "20px"),
    ("right", "20px"),
    ("width", "50px"),
    ("height", "50px"),
    ("border-radius", "50%"),
    ("display", "none"),
    ("z-index", "1000"),
    ("border", "none"),
    ("box-shadow", "0 4px 12px rgba(0,0,0,0.15)"),
];

/// In-page `#fragment` links scroll smoothly instead of jumping.
pub struct SmoothScroll;

impl SmoothScroll {
    pub(crate) fn attach(host: &mut dyn Host, bindings: &mut Bindings) -> Self {
        let anchors = host.query_all(selectors::HASH_ANCHOR);
        for anchor in &anchors {
            bindings.on_element(*anchor, EventType::Click, Route::HashAnchor);
        }
        debug!(anchors = anchors.len(), "smooth scroll attached");
        Self
    }

    /// The fragment is used as a selector. A bare `#` or an unknown id scrolls
    /// nowhere, but the jump is still suppressed.
    pub fn anchor_clicked(&self, host: &mut dyn Host, anchor: ElementId) -> EventOutcome {
        let fragment = host.attribute(anchor, attributes::HREF).unwrap_or_default();
        match host.query(&fragment) {
            Some(target) => host.scroll_into_view(target),
            None => debug!(fragment = %fragment, "anchor target not found"),
        }
        EventOutcome::prevent_default()
    }
}

/// Floating button that appears once the page is scrolled down. It starts
/// hidden and is only re-evaluated on scroll events.
pub struct BackToTop {
    button: ElementId,
    threshold_px: f64,
    visible: bool,
}

impl BackToTop {
    pub(crate) fn attach(
        host: &mut dyn Host,
        bindings: &mut Bindings,
        settings: &Settings,
    ) -> Result<Self, StorefrontError> {
        let button = host.create_element("button")?;
        host.set_inner_html(button, &settings.messages.back_to_top_icon);
        host.set_attribute(button, attributes::CLASS, classes::BACK_TO_TOP);
        for (property, value) in BACK_TO_TOP_STYLE {
            host.set_style(button, property, value);
        }
        let body = host.body();
        host.append_child(body, button)?;

        bindings.on(ListenerTarget::Window, EventType::Scroll, Route::BackToTopScroll);
        bindings.on_element(button, EventType::Click, Route::BackToTopClick);

        Ok(Self {
            button,
            threshold_px: settings.back_to_top_threshold_px,
            visible: false,
        })
    }

    pub fn button(&self) -> ElementId {
        self.button
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn scrolled(&mut self, host: &mut dyn Host) -> EventOutcome {
        let visible = host.page_y_offset() > self.threshold_px;
        if visible != self.visible {
            debug!(visible, "back-to-top visibility changed");
        }
        self.visible = visible;
        host.set_style(self.button, "display", if visible { "block" } else { "none" });
        EventOutcome::proceed()
    }

    pub fn clicked(&self, host: &mut dyn Host) -> EventOutcome {
        host.scroll_to_top();
        EventOutcome::proceed()
    }
}

#[cfg(test)]
#[path = "tests/scroll_tests.rs"]
mod tests;
