//! Listener registration and event outcomes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::host::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Click,
    Change,
    Input,
    Submit,
    Scroll,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Change => "change",
            EventType::Input => "input",
            EventType::Submit => "submit",
            EventType::Scroll => "scroll",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerTarget {
    Window,
    Element(ElementId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Listener {
    pub target: ListenerTarget,
    pub event: EventType,
}

/// What the host must do to the native event after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventOutcome {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl EventOutcome {
    pub fn proceed() -> Self {
        Self::default()
    }

    pub fn prevent_default() -> Self {
        Self {
            default_prevented: true,
            propagation_stopped: false,
        }
    }

    pub fn merge(self, other: EventOutcome) -> Self {
        Self {
            default_prevented: self.default_prevented || other.default_prevented,
            propagation_stopped: self.propagation_stopped || other.propagation_stopped,
        }
    }
}

/// Which behavior handles a routed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    CartQuantityChanged,
    RemoveFromCart,
    AddToCart,
    QuantityDecrease,
    QuantityIncrease,
    QuantityEdited,
    Thumbnail,
    ValidatedSubmit,
    PhoneInput,
    AdminDelete,
    ImageSelected,
    StatusChanged,
    SearchInput,
    HashAnchor,
    BackToTopClick,
    BackToTopScroll,
}

/// Routing table filled by the initializers.
#[derive(Debug, Default)]
pub struct Bindings {
    routes: HashMap<Listener, Vec<Route>>,
    order: Vec<Listener>,
}

impl Bindings {
    pub(crate) fn on(&mut self, target: ListenerTarget, event: EventType, route: Route) {
        let listener = Listener { target, event };
        let routes = self.routes.entry(listener).or_default();
        if routes.is_empty() {
            self.order.push(listener);
        }
        routes.push(route);
    }

    pub(crate) fn on_element(&mut self, element: ElementId, event: EventType, route: Route) {
        self.on(ListenerTarget::Element(element), event, route);
    }

    pub(crate) fn routes(&self, listener: &Listener) -> &[Route] {
        self.routes
            .get(listener)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Distinct listeners in registration order; the host installs one native
    /// listener per entry.
    pub fn listeners(&self) -> &[Listener] {
        &self.order
    }

    pub fn is_bound(&self, target: ListenerTarget, event: EventType) -> bool {
        self.routes.contains_key(&Listener { target, event })
    }

    pub(crate) fn clear(&mut self) {
        self.routes.clear();
        self.order.clear();
    }
}
