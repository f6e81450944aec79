//! Owns the booted storefront and the native listeners that feed it.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use shared::error::StorefrontError;
use storefront_core::{
    ElementId, EventOutcome, EventType, ListenerTarget, Settings, Storefront, TimerId, TimerTask,
};
use tracing::{info, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Element, Event, EventTarget, Window};

use crate::host::{js_error, WebHost};

struct NativeListener {
    target: EventTarget,
    event: EventType,
    callback: Closure<dyn FnMut(Event)>,
}

pub struct Runtime {
    host: WebHost,
    storefront: Option<Storefront>,
    listeners: Vec<NativeListener>,
}

impl Runtime {
    pub fn boot(window: Window, settings: &Settings) -> Result<Rc<RefCell<Self>>, StorefrontError> {
        let host = WebHost::new(window)?;
        let runtime = Rc::new(RefCell::new(Self {
            host,
            storefront: None,
            listeners: Vec::new(),
        }));

        {
            let mut rt = runtime.borrow_mut();
            rt.host.bind_runtime(Rc::downgrade(&runtime));
            let storefront = Storefront::boot(&mut rt.host, settings)?;
            let installed = rt.install_listeners(Rc::downgrade(&runtime), &storefront);
            rt.storefront = Some(storefront);
            if let Err(err) = installed {
                // Boot already started timers and the observer.
                rt.teardown();
                return Err(err);
            }
        }
        Ok(runtime)
    }

    /// Runs `f` against the live runtime. Callbacks that arrive while the
    /// runtime is already borrowed, or after it was dropped, are discarded.
    pub(crate) fn with(runtime: &Weak<RefCell<Self>>, f: impl FnOnce(&mut Self)) {
        let Some(runtime) = runtime.upgrade() else {
            return;
        };
        match runtime.try_borrow_mut() {
            Ok(mut rt) => f(&mut rt),
            Err(_) => warn!("storefront busy; callback dropped"),
        };
    }

    fn install_listeners(
        &mut self,
        runtime: Weak<RefCell<Self>>,
        storefront: &Storefront,
    ) -> Result<(), StorefrontError> {
        for listener in storefront.listeners() {
            let target: EventTarget = match listener.target {
                ListenerTarget::Window => self.host.window().clone().into(),
                ListenerTarget::Element(id) => match self.host.element(id) {
                    Some(element) => element.into(),
                    None => continue,
                },
            };

            let weak = runtime.clone();
            let (route_target, event) = (listener.target, listener.event);
            let callback: Closure<dyn FnMut(Event)> = Closure::new(move |native: Event| {
                Runtime::with(&weak, |rt| {
                    let outcome = rt.dispatch(route_target, event);
                    if outcome.default_prevented {
                        native.prevent_default();
                    }
                    if outcome.propagation_stopped {
                        native.stop_propagation();
                    }
                });
            });
            target
                .add_event_listener_with_callback(
                    event.as_str(),
                    callback.as_ref().unchecked_ref(),
                )
                .map_err(|err| js_error("add_event_listener", err))?;

            self.listeners.push(NativeListener {
                target,
                event,
                callback,
            });
        }
        Ok(())
    }

    fn dispatch(&mut self, target: ListenerTarget, event: EventType) -> EventOutcome {
        let Self {
            host, storefront, ..
        } = self;
        storefront
            .as_mut()
            .map(|storefront| storefront.dispatch(host, target, event))
            .unwrap_or_default()
    }

    pub(crate) fn timer_fired(&mut self, timer: TimerId, task: TimerTask) {
        self.host.timeout_fired(timer);
        if let Some(storefront) = self.storefront.as_mut() {
            storefront.on_timer(&mut self.host, timer, task);
        }
    }

    pub(crate) fn element_intersecting(&mut self, element: &Element) {
        let id = self.host.id_of(element);
        if let Some(storefront) = self.storefront.as_mut() {
            storefront.on_intersecting(&mut self.host, id);
        }
    }

    pub(crate) fn file_loaded(&mut self, input: ElementId, data_url: &str) {
        if let Some(storefront) = self.storefront.as_mut() {
            storefront.on_file_loaded(&mut self.host, input, data_url);
        }
    }

    pub fn teardown(&mut self) {
        if let Some(mut storefront) = self.storefront.take() {
            storefront.teardown(&mut self.host);
        }
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event.as_str(),
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        self.host.shutdown();
        info!("native listeners removed");
    }
}
