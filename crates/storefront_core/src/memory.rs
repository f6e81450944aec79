//! In-memory page: a small element tree plus the window facilities the
//! behaviors use (dialogs, history, scrolling, observers, timers, file reads).
//! Every side effect is recorded so callers can inspect what happened.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    time::Duration,
};

use serde::Serialize;
use shared::{
    error::StorefrontError,
    protocol::{attributes, FormMethod, FormSubmission},
};
use tracing::debug;
use url::Url;

use crate::host::{Browser, Document, ElementId, Scheduler, TimerId, TimerTask};

pub mod fixture;
pub mod selector;

use fixture::{ElementFixture, PageFixture, SelectedFile};
use selector::{SelectorList, Subject};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    value: Option<String>,
    inner_html: String,
    custom_validity: String,
    files: Vec<SelectedFile>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Subject for Node {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }

    fn live_value(&self) -> String {
        self.value
            .clone()
            .or_else(|| self.attributes.get(attributes::VALUE).cloned())
            .unwrap_or_default()
    }

    fn is_disabled(&self) -> bool {
        self.attributes.contains_key("disabled")
    }
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTimer {
    due: Duration,
    period: Option<Duration>,
    task: TimerTask,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementSnapshot {
    pub id: ElementId,
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub inner_html: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub custom_validity: String,
}

#[derive(Debug, Clone)]
pub struct MemoryPage {
    nodes: Vec<Node>,
    href: String,
    history: Vec<String>,
    scroll_y: f64,
    intersection_observer: bool,
    observed: BTreeSet<ElementId>,
    confirm_answers: VecDeque<bool>,
    dialogs: Vec<String>,
    submissions: Vec<FormSubmission>,
    scrolled_into_view: Vec<ElementId>,
    pending_reads: Vec<ElementId>,
    tooltip_widget: bool,
    tooltips: Vec<ElementId>,
    now: Duration,
    next_timer: u32,
    timers: BTreeMap<TimerId, ScheduledTimer>,
}

impl MemoryPage {
    pub fn new(href: impl Into<String>) -> Self {
        let href = href.into();
        Self {
            nodes: vec![Node::new("body")],
            history: vec![href.clone()],
            href,
            scroll_y: 0.0,
            intersection_observer: true,
            observed: BTreeSet::new(),
            confirm_answers: VecDeque::new(),
            dialogs: Vec::new(),
            submissions: Vec::new(),
            scrolled_into_view: Vec::new(),
            pending_reads: Vec::new(),
            tooltip_widget: true,
            tooltips: Vec::new(),
            now: Duration::ZERO,
            next_timer: 1,
            timers: BTreeMap::new(),
        }
    }

    pub fn from_fixture(fixture: &PageFixture) -> Result<Self, StorefrontError> {
        Url::parse(&fixture.url).map_err(|source| StorefrontError::InvalidUrl {
            url: fixture.url.clone(),
            source,
        })?;
        let mut page = Self::new(fixture.url.clone());
        page.intersection_observer = fixture.intersection_observer;
        page.tooltip_widget = fixture.tooltip_widget;
        let body = page.body();
        for element in &fixture.elements {
            page.insert_fixture(body, element)?;
        }
        Ok(page)
    }

    fn insert_fixture(
        &mut self,
        parent: ElementId,
        fixture: &ElementFixture,
    ) -> Result<ElementId, StorefrontError> {
        if fixture.tag.trim().is_empty() {
            return Err(StorefrontError::Fixture("element without a tag".into()));
        }
        let id = self.insert(parent, &fixture.tag, &[]);
        if let Some(node) = self.node_mut(id) {
            node.attributes = fixture
                .attributes
                .iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
                .collect();
            node.value = fixture.value.clone();
        }
        for file in &fixture.files {
            let file = SelectedFile::try_from(file)?;
            self.attach_file(id, file);
        }
        for child in &fixture.children {
            self.insert_fixture(id, child)?;
        }
        Ok(id)
    }

    /// Creates an element and appends it to `parent`.
    pub fn insert(&mut self, parent: ElementId, tag: &str, attrs: &[(&str, &str)]) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        let mut node = Node::new(tag);
        for (name, value) in attrs {
            node.attributes
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
        node.parent = Some(parent);
        self.nodes.push(node);
        if let Some(parent) = self.node_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    pub fn attach_file(&mut self, input: ElementId, file: SelectedFile) {
        if let Some(node) = self.node_mut(input) {
            node.files.push(file);
        }
    }

    pub fn set_intersection_observer(&mut self, supported: bool) {
        self.intersection_observer = supported;
    }

    /// Answers for upcoming confirm dialogs, in order. Unanswered dialogs
    /// are accepted.
    pub fn queue_confirm(&mut self, accept: bool) {
        self.confirm_answers.push_back(accept);
    }

    pub fn set_scroll_y(&mut self, offset: f64) {
        self.scroll_y = offset;
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn dialogs(&self) -> &[String] {
        &self.dialogs
    }

    pub fn submissions(&self) -> &[FormSubmission] {
        &self.submissions
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn scrolled_into_view(&self) -> &[ElementId] {
        &self.scrolled_into_view
    }

    /// Simulates a page without the tooltip script.
    pub fn set_tooltip_widget(&mut self, loaded: bool) {
        self.tooltip_widget = loaded;
    }

    /// Elements handed to the tooltip widget, in order.
    pub fn tooltips(&self) -> &[ElementId] {
        &self.tooltips
    }

    pub fn is_observed(&self, element: ElementId) -> bool {
        self.observed.contains(&element)
    }

    pub fn style(&self, element: ElementId, property: &str) -> Option<&str> {
        self.node(element)?.style.get(property).map(String::as_str)
    }

    pub fn inner_html(&self, element: ElementId) -> &str {
        self.node(element)
            .map(|node| node.inner_html.as_str())
            .unwrap_or_default()
    }

    pub fn custom_validity(&self, element: ElementId) -> &str {
        self.node(element)
            .map(|node| node.custom_validity.as_str())
            .unwrap_or_default()
    }

    pub fn is_disabled(&self, element: ElementId) -> bool {
        self.node(element).is_some_and(Node::is_disabled)
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.node(element)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn tag(&self, element: ElementId) -> Option<&str> {
        self.node(element).map(|node| node.tag.as_str())
    }

    pub fn snapshot(&self, element: ElementId) -> Option<ElementSnapshot> {
        let node = self.node(element)?;
        Some(ElementSnapshot {
            id: element,
            tag: node.tag.clone(),
            attributes: node.attributes.clone(),
            style: node.style.clone(),
            value: node.live_value(),
            inner_html: node.inner_html.clone(),
            custom_validity: node.custom_validity.clone(),
        })
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Pops the earliest timer due at or before `until` and moves the clock to
    /// it. Intervals are re-armed.
    pub fn next_due_timer(&mut self, until: Duration) -> Option<(TimerId, TimerTask)> {
        let (&id, &timer) = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= until)
            .min_by_key(|(id, timer)| (timer.due, **id))?;

        self.now = self.now.max(timer.due);
        match timer.period {
            Some(period) => {
                if let Some(entry) = self.timers.get_mut(&id) {
                    entry.due = timer.due + period;
                }
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some((id, timer.task))
    }

    pub fn advance_clock_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Finishes every file read started since the last call.
    pub fn complete_file_reads(&mut self) -> Vec<(ElementId, String)> {
        std::mem::take(&mut self.pending_reads)
            .into_iter()
            .filter_map(|input| {
                let file = self.node(input)?.files.first()?;
                Some((input, file.data_url()))
            })
            .collect()
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn is_ancestor(&self, ancestor: ElementId, mut element: ElementId) -> bool {
        while let Some(parent) = self.node(element).and_then(|node| node.parent) {
            if parent == ancestor {
                return true;
            }
            element = parent;
        }
        false
    }

    fn parse_selector(selector: &str) -> Option<SelectorList> {
        match SelectorList::parse(selector) {
            Ok(list) => Some(list),
            Err(err) => {
                debug!(selector, error = %err, "selector matches nothing");
                None
            }
        }
    }

    fn controls_of(&self, form: ElementId) -> impl Iterator<Item = &Node> + '_ {
        self.descendants(form)
            .into_iter()
            .filter_map(|id| self.node(id))
            .filter(|node| node.is_form_control() && !node.is_disabled())
    }
}

impl Document for MemoryPage {
    fn body(&self) -> ElementId {
        ElementId(0)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        let Some(list) = Self::parse_selector(selector) else {
            return Vec::new();
        };
        let body = self.body();
        std::iter::once(body)
            .chain(self.descendants(body))
            .filter(|id| self.node(*id).is_some_and(|node| list.matches(node)))
            .collect()
    }

    fn closest(&self, element: ElementId, selector: &str) -> Option<ElementId> {
        let list = Self::parse_selector(selector)?;
        let mut current = Some(element);
        while let Some(id) = current {
            let node = self.node(id)?;
            if list.matches(node) {
                return Some(id);
            }
            current = node.parent;
        }
        None
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.node(element)?.parent
    }

    fn create_element(&mut self, tag: &str) -> Result<ElementId, StorefrontError> {
        if tag.is_empty() || !tag.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-') {
            return Err(StorefrontError::host(
                "create_element",
                format!("invalid tag name '{tag}'"),
            ));
        }
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(Node::new(tag));
        Ok(id)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), StorefrontError> {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return Err(StorefrontError::host("append_child", "unknown element"));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(StorefrontError::host(
                "append_child",
                "the new child is an ancestor of the parent",
            ));
        }
        if let Some(old_parent) = self.node(child).and_then(|node| node.parent) {
            if let Some(node) = self.node_mut(old_parent) {
                node.children.retain(|id| *id != child);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.node(element)?.attr(name).map(str::to_string)
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.node_mut(element) {
            node.attributes
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if let Some(node) = self.node_mut(element) {
            node.attributes.remove(&name.to_ascii_lowercase());
        }
    }

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.node(element)
            .is_some_and(|node| Subject::has_class(node, class))
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        if self.has_class(element, class) {
            return;
        }
        if let Some(node) = self.node_mut(element) {
            let classes = node
                .attributes
                .entry(attributes::CLASS.to_string())
                .or_default();
            if !classes.trim().is_empty() {
                classes.push(' ');
            }
            classes.push_str(class);
        }
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        if let Some(node) = self.node_mut(element) {
            if let Some(classes) = node.attributes.get_mut(attributes::CLASS) {
                *classes = classes
                    .split_whitespace()
                    .filter(|c| *c != class)
                    .collect::<Vec<_>>()
                    .join(" ");
            }
        }
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        if let Some(node) = self.node_mut(element) {
            node.style.insert(property.to_string(), value.to_string());
        }
    }

    fn set_inner_html(&mut self, element: ElementId, html: &str) {
        if let Some(node) = self.node_mut(element) {
            node.inner_html = html.to_string();
        }
    }

    fn value(&self, element: ElementId) -> String {
        self.node(element).map(Node::live_value).unwrap_or_default()
    }

    fn set_value(&mut self, element: ElementId, value: &str) {
        if let Some(node) = self.node_mut(element) {
            node.value = Some(value.to_string());
        }
    }

    fn set_disabled(&mut self, element: ElementId, disabled: bool) {
        if disabled {
            self.set_attribute(element, "disabled", "");
        } else {
            self.remove_attribute(element, "disabled");
        }
    }

    fn submit(&mut self, form: ElementId) -> Result<(), StorefrontError> {
        let node = self
            .node(form)
            .filter(|node| node.tag == "form")
            .ok_or(StorefrontError::WrongElementKind { expected: "form" })?;

        let method = FormMethod::from_attribute(node.attr(attributes::METHOD));
        let action = node
            .attr(attributes::ACTION)
            .filter(|action| !action.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.href.clone());
        let fields = self
            .controls_of(form)
            .filter(|control| {
                !matches!(
                    control.attr(attributes::TYPE),
                    Some("submit" | "button" | "file" | "reset")
                )
            })
            .filter_map(|control| {
                let name = control.attr(attributes::NAME)?;
                (!name.is_empty()).then(|| (name.to_string(), control.live_value()))
            })
            .collect();

        self.submissions.push(FormSubmission {
            method,
            action,
            fields,
        });
        Ok(())
    }

    fn check_validity(&self, form: ElementId) -> bool {
        self.controls_of(form).all(|control| {
            control.custom_validity.is_empty()
                && !(control.attributes.contains_key("required")
                    && control.live_value().trim().is_empty())
        })
    }

    fn set_custom_validity(&mut self, control: ElementId, message: &str) {
        if let Some(node) = self.node_mut(control) {
            node.custom_validity = message.to_string();
        }
    }

    fn scroll_into_view(&mut self, element: ElementId) {
        self.scrolled_into_view.push(element);
    }
}

impl Browser for MemoryPage {
    fn href(&self) -> String {
        self.href.clone()
    }

    fn push_url(&mut self, url: &str) -> Result<(), StorefrontError> {
        Url::parse(url).map_err(|source| StorefrontError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        self.href = url.to_string();
        self.history.push(self.href.clone());
        Ok(())
    }

    fn page_y_offset(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to_top(&mut self) {
        self.scroll_y = 0.0;
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.dialogs.push(message.to_string());
        self.confirm_answers.pop_front().unwrap_or(true)
    }

    fn supports_intersection_observer(&self) -> bool {
        self.intersection_observer
    }

    fn observe(&mut self, element: ElementId) {
        self.observed.insert(element);
    }

    fn unobserve(&mut self, element: ElementId) {
        self.observed.remove(&element);
    }

    fn read_file_as_data_url(&mut self, input: ElementId) -> bool {
        let has_file = self.node(input).is_some_and(|node| !node.files.is_empty());
        if has_file {
            self.pending_reads.push(input);
        }
        has_file
    }

    fn init_tooltip(&mut self, element: ElementId) -> bool {
        if !self.tooltip_widget || self.node(element).is_none() {
            return false;
        }
        self.tooltips.push(element);
        true
    }
}

impl Scheduler for MemoryPage {
    fn set_timeout(&mut self, delay: Duration, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(
            id,
            ScheduledTimer {
                due: self.now + delay,
                period: None,
                task,
            },
        );
        id
    }

    fn set_interval(&mut self, period: Duration, task: TimerTask) -> TimerId {
        let period = period.max(MIN_INTERVAL);
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.timers.insert(
            id,
            ScheduledTimer {
                due: self.now + period,
                period: Some(period),
                task,
            },
        );
        id
    }

    fn clear_timer(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
