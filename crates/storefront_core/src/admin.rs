//! Admin pages: delete confirmations, dashboard pulse, image preview and
//! order status updates.

use std::{collections::HashMap, time::Duration};

use shared::{
    domain::OrderStatus,
    error::StorefrontError,
    protocol::{attributes, classes, selectors},
};
use tracing::{debug, info};

use crate::{
    events::{Bindings, EventOutcome, EventType, Route},
    host::{ElementId, Host, TimerId, TimerTask},
    settings::{Messages, Settings},
};

pub struct AdminPanel {
    messages: Messages,
    refresh: Option<TimerId>,
    stats_fades: Vec<TimerId>,
    stats_fade: Duration,
    stats_dim_opacity: String,
    preview_max_width_px: u32,
    revert_declined_status: bool,
    confirmed_status: HashMap<ElementId, String>,
}

impl AdminPanel {
    /// Attaches only under the admin path prefix.
    pub(crate) fn attach(
        host: &mut dyn Host,
        bindings: &mut Bindings,
        settings: &Settings,
    ) -> Option<Self> {
        let path = host.pathname();
        if !path.starts_with(&settings.admin_path_prefix) {
            return None;
        }

        let delete_buttons = host.query_all(selectors::DELETE_BUTTON);
        for button in &delete_buttons {
            bindings.on_element(*button, EventType::Click, Route::AdminDelete);
        }

        let refresh = (path == settings.admin_dashboard_path).then(|| {
            host.set_interval(settings.dashboard_refresh(), TimerTask::RefreshDashboard)
        });

        if let Some(input) = host.query(selectors::IMAGE_UPLOAD) {
            bindings.on_element(input, EventType::Change, Route::ImageSelected);
        }

        let mut confirmed_status = HashMap::new();
        for select in host.query_all(selectors::STATUS_SELECT) {
            bindings.on_element(select, EventType::Change, Route::StatusChanged);
            confirmed_status.insert(select, host.value(select));
        }

        debug!(
            path = %path,
            delete_buttons = delete_buttons.len(),
            status_selects = confirmed_status.len(),
            dashboard_refresh = refresh.is_some(),
            "admin panel attached"
        );

        Some(Self {
            messages: settings.messages.clone(),
            refresh,
            stats_fades: Vec::new(),
            stats_fade: settings.stats_fade(),
            stats_dim_opacity: settings.stats_dim_opacity.clone(),
            preview_max_width_px: settings.preview_max_width_px,
            revert_declined_status: settings.revert_declined_status,
            confirmed_status,
        })
    }

    pub fn refresh_timer(&self) -> Option<TimerId> {
        self.refresh
    }

    pub fn delete_clicked(&self, host: &mut dyn Host, button: ElementId) -> EventOutcome {
        let item_name = host.attribute(button, attributes::DATA_ITEM_NAME);
        let message = self.messages.delete_confirmation(item_name.as_deref());
        if host.confirm(&message) {
            EventOutcome::proceed()
        } else {
            debug!("delete declined");
            EventOutcome::prevent_default()
        }
    }

    /// Visual pulse over the stats cards. Nothing is refetched.
    pub fn refresh_dashboard(&mut self, host: &mut dyn Host) {
        let cards = host.query_all(selectors::STATS_CARD);
        debug!(cards = cards.len(), "dashboard refresh pulse");
        for card in cards {
            host.set_style(card, "opacity", &self.stats_dim_opacity);
            let timer = host.set_timeout(self.stats_fade, TimerTask::RestoreCardOpacity(card));
            self.stats_fades.push(timer);
        }
    }

    pub fn card_fade_elapsed(&mut self, host: &mut dyn Host, timer: TimerId, card: ElementId) {
        self.stats_fades.retain(|pending| *pending != timer);
        host.set_style(card, "opacity", "1");
    }

    pub fn image_selected(&self, host: &mut dyn Host, input: ElementId) -> EventOutcome {
        if !host.read_file_as_data_url(input) {
            debug!("image input changed without a file");
        }
        EventOutcome::proceed()
    }

    pub fn image_loaded(
        &self,
        host: &mut dyn Host,
        input: ElementId,
        data_url: &str,
    ) -> Result<(), StorefrontError> {
        if let Some(preview) = host.query(selectors::IMAGE_PREVIEW) {
            host.set_attribute(preview, attributes::SRC, data_url);
            host.set_style(preview, "display", "block");
            return Ok(());
        }

        let Some(parent) = host.parent(input) else {
            debug!("image input is detached; preview skipped");
            return Ok(());
        };
        let preview = host.create_element("img")?;
        host.set_attribute(preview, attributes::SRC, data_url);
        host.set_attribute(preview, attributes::CLASS, classes::IMAGE_PREVIEW);
        host.set_style(
            preview,
            "max-width",
            &format!("{}px", self.preview_max_width_px),
        );
        host.append_child(parent, preview)?;
        Ok(())
    }

    pub fn status_changed(
        &mut self,
        host: &mut dyn Host,
        select: ElementId,
    ) -> Result<EventOutcome, StorefrontError> {
        let Some(form) = host.closest(select, selectors::FORM) else {
            return Ok(EventOutcome::proceed());
        };
        let value = host.value(select);

        if host.confirm(&self.messages.order_status_confirm) {
            match value.parse::<OrderStatus>() {
                Ok(status) => info!(status = status.as_str(), "updating order status"),
                Err(err) => info!(value = %value, error = %err, "submitting unrecognized order status"),
            }
            host.submit(form)?;
            self.confirmed_status.insert(select, value);
            return Ok(EventOutcome::proceed());
        }

        match self.confirmed_status.get(&select) {
            Some(previous) if self.revert_declined_status => {
                debug!(previous = %previous, "status change declined; reverting select");
                host.set_value(select, previous);
            }
            _ => debug!(value = %value, "status change declined; select keeps the new value"),
        }
        Ok(EventOutcome::proceed())
    }

    pub fn teardown(&mut self, host: &mut dyn Host) {
        if let Some(refresh) = self.refresh.take() {
            host.clear_timer(refresh);
        }
        for timer in self.stats_fades.drain(..) {
            host.clear_timer(timer);
        }
    }
}

#[cfg(test)]
#[path = "tests/admin_tests.rs"]
mod tests;
