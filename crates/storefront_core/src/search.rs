use std::time::Duration;

use shared::{
    error::StorefrontError,
    protocol::{fields, selectors},
};
use tracing::{debug, info};
use url::Url;

use crate::{
    events::{Bindings, EventOutcome, EventType, Route},
    host::{ElementId, Host, TimerId, TimerTask},
    settings::Settings,
};

/// Debounced search-as-you-type. Owns the single pending timer.
pub struct SearchBox {
    input: ElementId,
    form: ElementId,
    debounce: Duration,
    min_chars: usize,
    pending: Option<TimerId>,
    query: Option<String>,
}

impl SearchBox {
    pub(crate) fn attach(
        host: &mut dyn Host,
        bindings: &mut Bindings,
        settings: &Settings,
    ) -> Option<Self> {
        let input = host.query(selectors::SEARCH_INPUT)?;
        let form = host.query(selectors::SEARCH_FORM)?;
        bindings.on_element(input, EventType::Input, Route::SearchInput);
        debug!("search box attached");

        Some(Self {
            input,
            form,
            debounce: settings.search_debounce(),
            min_chars: settings.search_min_chars,
            pending: None,
            query: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn input_changed(&mut self, host: &mut dyn Host) -> EventOutcome {
        if let Some(timer) = self.pending.take() {
            host.clear_timer(timer);
        }
        self.query = None;

        let query = host.value(self.input).trim().to_string();
        // Counted in UTF-16 units, as the browser reports a field's length.
        if query.encode_utf16().count() >= self.min_chars {
            self.pending = Some(host.set_timeout(self.debounce, TimerTask::RunSearch));
            self.query = Some(query);
        }
        EventOutcome::proceed()
    }

    pub fn timer_fired(&mut self, host: &mut dyn Host, timer: TimerId) -> Result<(), StorefrontError> {
        if self.pending != Some(timer) {
            debug!(timer = timer.0, "stale search timer ignored");
            return Ok(());
        }
        self.pending = None;
        let Some(query) = self.query.take() else {
            return Ok(());
        };

        let url = with_search_param(&host.href(), &query)?;
        host.push_url(&url)?;
        info!(query = %query, "running search");
        host.submit(self.form)
    }

    pub fn teardown(&mut self, host: &mut dyn Host) {
        if let Some(timer) = self.pending.take() {
            host.clear_timer(timer);
        }
        self.query = None;
    }
}

/// Sets `search` in the query string, replacing the first occurrence in
/// place and dropping duplicates; other parameters keep their order.
pub fn with_search_param(href: &str, query: &str) -> Result<String, StorefrontError> {
    let mut url = Url::parse(href).map_err(|source| StorefrontError::InvalidUrl {
        url: href.to_string(),
        source,
    })?;

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (name, value) in url.query_pairs() {
        if name == fields::SEARCH {
            if !replaced {
                pairs.push((name.into_owned(), query.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((name.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push((fields::SEARCH.to_string(), query.to_string()));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url.to_string())
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
