//! `storefront_core` host traits implemented over the live DOM.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Weak,
    time::Duration,
};

use shared::error::StorefrontError;
use storefront_core::{Browser, Document, ElementId, Scheduler, TimerId, TimerTask};
use tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    Element, FileReader, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions, Window,
};

use crate::runtime::Runtime;

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

pub(crate) fn js_error(operation: &'static str, err: JsValue) -> StorefrontError {
    let message = err
        .as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"));
    StorefrontError::host(operation, message)
}

fn millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

/// Issues [`ElementId`] handles for DOM elements. Handles stay valid for
/// the lifetime of the page.
pub struct WebHost {
    window: Window,
    document: web_sys::Document,
    elements: RefCell<Vec<Element>>,
    runtime: Weak<RefCell<Runtime>>,
    next_timer: Cell<u32>,
    timeouts: HashMap<TimerId, i32>,
    intervals: HashMap<TimerId, (i32, Closure<dyn FnMut()>)>,
    observer: Option<(IntersectionObserver, ObserverCallback)>,
}

impl WebHost {
    pub fn new(window: Window) -> Result<Self, StorefrontError> {
        let document = window
            .document()
            .ok_or_else(|| StorefrontError::host("document", "window has no document"))?;
        let body: Element = match document.body() {
            Some(body) => body.into(),
            None => document
                .document_element()
                .ok_or_else(|| StorefrontError::host("body", "document has no root element"))?,
        };

        Ok(Self {
            window,
            document,
            elements: RefCell::new(vec![body]),
            runtime: Weak::new(),
            next_timer: Cell::new(1),
            timeouts: HashMap::new(),
            intervals: HashMap::new(),
            observer: None,
        })
    }

    /// Timer, observer and file-read callbacks report back through this.
    pub(crate) fn bind_runtime(&mut self, runtime: Weak<RefCell<Runtime>>) {
        self.runtime = runtime;
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn id_of(&self, element: &Element) -> ElementId {
        let mut elements = self.elements.borrow_mut();
        if let Some(index) = elements.iter().position(|known| known == element) {
            return ElementId(index as u32);
        }
        elements.push(element.clone());
        ElementId((elements.len() - 1) as u32)
    }

    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.elements.borrow().get(id.0 as usize).cloned()
    }

    fn html(&self, id: ElementId) -> Option<HtmlElement> {
        self.element(id)?.dyn_into::<HtmlElement>().ok()
    }

    fn issue_timer(&self) -> TimerId {
        let id = TimerId(self.next_timer.get());
        self.next_timer.set(id.0 + 1);
        id
    }

    /// Called by the runtime before a timeout's task runs.
    pub(crate) fn timeout_fired(&mut self, id: TimerId) {
        self.timeouts.remove(&id);
    }

    fn observer(&mut self) -> Option<&IntersectionObserver> {
        if self.observer.is_none() {
            let runtime = self.runtime.clone();
            let callback: ObserverCallback =
                Closure::new(move |entries: js_sys::Array, _: IntersectionObserver| {
                    let targets: Vec<Element> = entries
                        .iter()
                        .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                        .filter(IntersectionObserverEntry::is_intersecting)
                        .map(|entry| entry.target())
                        .collect();
                    Runtime::with(&runtime, |rt| {
                        for target in &targets {
                            rt.element_intersecting(target);
                        }
                    });
                });
            match IntersectionObserver::new(callback.as_ref().unchecked_ref()) {
                Ok(observer) => self.observer = Some((observer, callback)),
                Err(err) => {
                    warn!(error = %js_error("observe", err), "intersection observer unavailable");
                    return None;
                }
            }
        }
        self.observer.as_ref().map(|(observer, _)| observer)
    }

    /// `window.bootstrap.Tooltip`, when the Bootstrap bundle is loaded.
    fn tooltip_constructor(&self) -> Option<js_sys::Function> {
        let bootstrap = js_sys::Reflect::get(self.window.as_ref(), &JsValue::from_str("bootstrap"))
            .ok()
            .filter(JsValue::is_object)?;
        js_sys::Reflect::get(&bootstrap, &JsValue::from_str("Tooltip"))
            .ok()?
            .dyn_into::<js_sys::Function>()
            .ok()
    }

    /// Cancels every timer and disconnects the observer.
    pub(crate) fn shutdown(&mut self) {
        for (_, handle) in self.timeouts.drain() {
            self.window.clear_timeout_with_handle(handle);
        }
        for (_, (handle, _)) in self.intervals.drain() {
            self.window.clear_interval_with_handle(handle);
        }
        if let Some((observer, _)) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl Document for WebHost {
    fn body(&self) -> ElementId {
        ElementId(0)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            debug!(selector, "selector rejected by the browser");
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|index| nodes.get(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.id_of(&element))
            .collect()
    }

    fn closest(&self, element: ElementId, selector: &str) -> Option<ElementId> {
        let found = self.element(element)?.closest(selector).ok()??;
        Some(self.id_of(&found))
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        let parent = self.element(element)?.parent_element()?;
        Some(self.id_of(&parent))
    }

    fn create_element(&mut self, tag: &str) -> Result<ElementId, StorefrontError> {
        let element = self
            .document
            .create_element(tag)
            .map_err(|err| js_error("create_element", err))?;
        Ok(self.id_of(&element))
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), StorefrontError> {
        let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) else {
            return Err(StorefrontError::host("append_child", "unknown element"));
        };
        parent
            .append_child(&child)
            .map_err(|err| js_error("append_child", err))?;
        Ok(())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.element(element)?.get_attribute(name)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(element) = self.element(element) {
            if let Err(err) = element.set_attribute(name, value) {
                debug!(name, error = %js_error("set_attribute", err), "attribute rejected");
            }
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if let Some(element) = self.element(element) {
            let _ = element.remove_attribute(name);
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.element(element)
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if let Some(element) = self.element(element) {
            let _ = element.class_list().add_1(class);
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(element) = self.element(element) {
            let _ = element.class_list().remove_1(class);
        }
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(element) = self.html(element) {
            let _ = element.style().set_property(property, value);
        }
    }

    fn set_inner_html(&mut self, element: ElementId, html: &str) {
        if let Some(element) = self.element(element) {
            element.set_inner_html(html);
        }
    }

    fn value(&self, element: ElementId) -> String {
        let Some(element) = self.element(element) else {
            return String::new();
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            element.get_attribute("value").unwrap_or_default()
        }
    }

    fn set_value(&mut self, element: ElementId, value: &str) {
        let Some(element) = self.element(element) else {
            return;
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else {
            let _ = element.set_attribute("value", value);
        }
    }

    fn set_disabled(&mut self, element: ElementId, disabled: bool) {
        if let Some(element) = self.element(element) {
            let _ = element.toggle_attribute_with_force("disabled", disabled);
        }
    }

    fn submit(&mut self, form: ElementId) -> Result<(), StorefrontError> {
        let form = self
            .element(form)
            .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
            .ok_or(StorefrontError::WrongElementKind { expected: "form" })?;
        form.submit().map_err(|err| js_error("submit", err))
    }

    fn check_validity(&self, form: ElementId) -> bool {
        self.element(form)
            .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
            .map_or(true, |form| form.check_validity())
    }

    fn set_custom_validity(&mut self, control: ElementId, message: &str) {
        let Some(element) = self.element(control) else {
            return;
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_custom_validity(message);
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.set_custom_validity(message);
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.set_custom_validity(message);
        }
    }

    fn scroll_into_view(&mut self, element: ElementId) {
        if let Some(element) = self.element(element) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            element.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }
}

impl Browser for WebHost {
    fn href(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn pathname(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn push_url(&mut self, url: &str) -> Result<(), StorefrontError> {
        let history = self
            .window
            .history()
            .map_err(|err| js_error("history", err))?;
        history
            .push_state_with_url(&JsValue::NULL, "", Some(url))
            .map_err(|err| js_error("push_state", err))
    }

    fn page_y_offset(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn scroll_to_top(&mut self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn supports_intersection_observer(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false)
    }

    fn observe(&mut self, element: ElementId) {
        let Some(element) = self.element(element) else {
            return;
        };
        if let Some(observer) = self.observer() {
            observer.observe(&element);
        }
    }

    fn unobserve(&mut self, element: ElementId) {
        let Some(element) = self.element(element) else {
            return;
        };
        if let Some((observer, _)) = &self.observer {
            observer.unobserve(&element);
        }
    }

    fn read_file_as_data_url(&mut self, input: ElementId) -> bool {
        let Some(file) = self
            .element(input)
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
            .and_then(|input| input.files())
            .and_then(|files| files.get(0))
        else {
            return false;
        };
        let reader = match FileReader::new() {
            Ok(reader) => reader,
            Err(err) => {
                warn!(error = %js_error("file_reader", err), "cannot read selected file");
                return false;
            }
        };

        let runtime = self.runtime.clone();
        let done = reader.clone();
        let onload = Closure::once_into_js(move || {
            let Some(data_url) = done.result().ok().and_then(|result| result.as_string()) else {
                return;
            };
            Runtime::with(&runtime, |rt| rt.file_loaded(input, &data_url));
        });
        reader.set_onload(Some(onload.unchecked_ref()));
        if let Err(err) = reader.read_as_data_url(&file) {
            warn!(error = %js_error("read_as_data_url", err), "cannot read selected file");
            return false;
        }
        true
    }

    fn init_tooltip(&mut self, element: ElementId) -> bool {
        let (Some(element), Some(constructor)) = (self.element(element), self.tooltip_constructor())
        else {
            return false;
        };
        let args = js_sys::Array::of1(element.as_ref());
        match js_sys::Reflect::construct(&constructor, &args) {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %js_error("tooltip", err), "tooltip not created");
                false
            }
        }
    }
}

impl Scheduler for WebHost {
    fn set_timeout(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        let id = self.issue_timer();
        let runtime = self.runtime.clone();
        // One-shot closures free themselves when invoked; a cleared timeout
        // leaks its closure.
        let callback = Closure::once_into_js(move || {
            Runtime::with(&runtime, |rt| rt.timer_fired(id, task));
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                millis(delay),
            ) {
            Ok(handle) => {
                self.timeouts.insert(id, handle);
            }
            Err(err) => warn!(error = %js_error("set_timeout", err), "timer not scheduled"),
        }
        id
    }

    fn set_interval(&mut self, period: Duration, task: TimerTask) -> TimerId {
        let id = self.issue_timer();
        let runtime = self.runtime.clone();
        let callback: Closure<dyn FnMut()> = Closure::new(move || {
            Runtime::with(&runtime, |rt| rt.timer_fired(id, task));
        });
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                millis(period),
            ) {
            Ok(handle) => {
                self.intervals.insert(id, (handle, callback));
            }
            Err(err) => warn!(error = %js_error("set_interval", err), "timer not scheduled"),
        }
        id
    }

    fn clear_timer(&mut self, id: TimerId) {
        if let Some(handle) = self.timeouts.remove(&id) {
            self.window.clear_timeout_with_handle(handle);
        }
        if let Some((handle, _callback)) = self.intervals.remove(&id) {
            self.window.clear_interval_with_handle(handle);
        }
    }
}
