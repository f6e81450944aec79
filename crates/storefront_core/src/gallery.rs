use std::time::Duration;

use shared::protocol::{attributes, classes, selectors};
use tracing::debug;

use crate::{
    events::{Bindings, EventOutcome, EventType, Route},
    host::{ElementId, Host, TimerId, TimerTask},
    settings::Settings,
};

/// Thumbnail strip that swaps the main product image.
pub struct ImageGallery {
    thumbnails: Vec<ElementId>,
    main_image: ElementId,
    fade: Duration,
    pending_fades: Vec<TimerId>,
}

impl ImageGallery {
    pub(crate) fn attach(
        host: &mut dyn Host,
        bindings: &mut Bindings,
        settings: &Settings,
    ) -> Option<Self> {
        let thumbnails = host.query_all(selectors::PRODUCT_THUMBNAIL);
        if thumbnails.is_empty() {
            return None;
        }
        let main_image = host.query(selectors::MAIN_PRODUCT_IMAGE)?;

        for thumbnail in &thumbnails {
            bindings.on_element(*thumbnail, EventType::Click, Route::Thumbnail);
        }
        debug!(thumbnails = thumbnails.len(), "image gallery attached");

        Some(Self {
            thumbnails,
            main_image,
            fade: settings.gallery_fade(),
            pending_fades: Vec::new(),
        })
    }

    pub fn active(&self, host: &dyn Host) -> Option<ElementId> {
        self.thumbnails
            .iter()
            .copied()
            .find(|thumbnail| host.has_class(*thumbnail, classes::ACTIVE))
    }

    pub fn thumbnail_clicked(&mut self, host: &mut dyn Host, thumbnail: ElementId) -> EventOutcome {
        for other in &self.thumbnails {
            host.remove_class(*other, classes::ACTIVE);
        }
        host.add_class(thumbnail, classes::ACTIVE);

        let source = host
            .attribute(thumbnail, attributes::DATA_FULL_IMAGE)
            .filter(|src| !src.is_empty())
            .or_else(|| host.attribute(thumbnail, attributes::SRC));
        match source {
            Some(source) => host.set_attribute(self.main_image, attributes::SRC, &source),
            None => debug!("thumbnail has no image reference; main image kept"),
        }

        host.set_style(self.main_image, "opacity", "0");
        let timer = host.set_timeout(self.fade, TimerTask::RestoreImageOpacity(self.main_image));
        self.pending_fades.push(timer);

        EventOutcome::prevent_default()
    }

    pub fn fade_elapsed(&mut self, host: &mut dyn Host, timer: TimerId, image: ElementId) {
        self.pending_fades.retain(|pending| *pending != timer);
        host.set_style(image, "opacity", "1");
    }

    pub fn teardown(&mut self, host: &mut dyn Host) {
        for timer in self.pending_fades.drain(..) {
            host.clear_timer(timer);
        }
    }
}

#[cfg(test)]
#[path = "tests/gallery_tests.rs"]
mod tests;
