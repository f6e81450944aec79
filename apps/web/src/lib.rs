//! Browser entry point: boots the storefront behaviors once the document is
//! parsed.
//!
//! Pages may override [`Settings`] with an inline JSON block:
//!
//! ```html
//! <script type="application/json" id="storefront-settings">
//!   {"search_debounce_ms": 400}
//! </script>
//! ```

use std::{cell::RefCell, rc::Rc};

use storefront_core::Settings;
use tracing::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::AddEventListenerOptions;

mod console;
mod host;
mod runtime;

use runtime::Runtime;

const SETTINGS_ELEMENT_ID: &str = "storefront-settings";

thread_local! {
    static RUNTIME: RefCell<Option<Rc<RefCell<Runtime>>>> = const { RefCell::new(None) };
}

fn page_settings(document: &web_sys::Document) -> Settings {
    let Some(raw) = document
        .get_element_by_id(SETTINGS_ELEMENT_ID)
        .and_then(|element| element.text_content())
    else {
        return Settings::default();
    };
    match Settings::from_json_str(&raw) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(error = %err, "ignoring page settings");
            Settings::default()
        }
    }
}

fn boot() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let settings = window
        .document()
        .map(|document| page_settings(&document))
        .unwrap_or_default();

    match Runtime::boot(window, &settings) {
        Ok(runtime) => RUNTIME.with(|slot| *slot.borrow_mut() = Some(runtime)),
        Err(err) => error!(error = %err, "storefront failed to start"),
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console::init_tracing();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(boot);
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        document.add_event_listener_with_callback_and_add_event_listener_options(
            "DOMContentLoaded",
            on_ready.unchecked_ref(),
            &options,
        )?;
    } else {
        boot();
    }
    Ok(())
}

/// Detaches every behavior: timers, observers and native listeners.
#[wasm_bindgen]
pub fn teardown() {
    if let Some(runtime) = RUNTIME.with(|slot| slot.borrow_mut().take()) {
        runtime.borrow_mut().teardown();
    }
}
