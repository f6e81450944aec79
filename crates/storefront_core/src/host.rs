//! Seams between the behaviors and whatever renders the page.
//!
//! Behaviors never touch a DOM directly. They receive a `&mut dyn Host` and
//! address elements through opaque [`ElementId`] handles issued by that host.
//! The browser build implements these traits over `web-sys`; tests and the
//! simulator use [`crate::memory::MemoryPage`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shared::error::StorefrontError;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u32);

/// Work a timer carries back into the behaviors when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", content = "element", rename_all = "snake_case")]
pub enum TimerTask {
    RestoreImageOpacity(ElementId),
    RunSearch,
    RefreshDashboard,
    RestoreCardOpacity(ElementId),
}

pub trait Document {
    fn body(&self) -> ElementId;
    /// Matches in document order. An unparseable selector matches nothing.
    fn query_all(&self, selector: &str) -> Vec<ElementId>;
    fn query(&self, selector: &str) -> Option<ElementId> {
        self.query_all(selector).into_iter().next()
    }
    fn closest(&self, element: ElementId, selector: &str) -> Option<ElementId>;
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    fn create_element(&mut self, tag: &str) -> Result<ElementId, StorefrontError>;
    fn append_child(&mut self, parent: ElementId, child: ElementId)
        -> Result<(), StorefrontError>;

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);
    fn remove_attribute(&mut self, element: ElementId, name: &str);

    fn has_class(&self, element: ElementId, class: &str) -> bool;
    fn add_class(&mut self, element: ElementId, class: &str);
    fn remove_class(&mut self, element: ElementId, class: &str);

    fn set_style(&mut self, element: ElementId, property: &str, value: &str);
    fn set_inner_html(&mut self, element: ElementId, html: &str);

    /// Live value of a form control.
    fn value(&self, element: ElementId) -> String;
    fn set_value(&mut self, element: ElementId, value: &str);
    fn set_disabled(&mut self, element: ElementId, disabled: bool);

    fn submit(&mut self, form: ElementId) -> Result<(), StorefrontError>;
    fn check_validity(&self, form: ElementId) -> bool;
    fn set_custom_validity(&mut self, control: ElementId, message: &str);

    fn scroll_into_view(&mut self, element: ElementId);
}

pub trait Browser {
    fn href(&self) -> String;

    fn pathname(&self) -> String {
        Url::parse(&self.href())
            .map(|url| url.path().to_string())
            .unwrap_or_default()
    }

    /// Replaces the address bar entry without navigating.
    fn push_url(&mut self, url: &str) -> Result<(), StorefrontError>;

    fn page_y_offset(&self) -> f64;
    fn scroll_to_top(&mut self);

    /// Blocking yes/no dialog.
    fn confirm(&mut self, message: &str) -> bool;

    fn supports_intersection_observer(&self) -> bool;
    fn observe(&mut self, element: ElementId);
    fn unobserve(&mut self, element: ElementId);

    /// Starts reading the first selected file of `input` as a data URL.
    /// Returns `false` when no file is selected. Completion is delivered to
    /// [`crate::Storefront::on_file_loaded`].
    fn read_file_as_data_url(&mut self, input: ElementId) -> bool;

    /// Attaches the page's tooltip widget to `element`. `false` when the
    /// widget script is not loaded.
    fn init_tooltip(&mut self, element: ElementId) -> bool;
}

pub trait Scheduler {
    fn set_timeout(&mut self, delay: Duration, task: TimerTask) -> TimerId;
    fn set_interval(&mut self, period: Duration, task: TimerTask) -> TimerId;
    fn clear_timer(&mut self, id: TimerId);
}

pub trait Host: Document + Browser + Scheduler {}

impl<T: Document + Browser + Scheduler + ?Sized> Host for T {}
