//! Boots every behavior against a page and routes host events to them.

use shared::error::StorefrontError;
use tracing::{debug, info, warn};

use crate::{
    admin::AdminPanel,
    cart::CartControls,
    events::{Bindings, EventOutcome, EventType, Listener, ListenerTarget, Route},
    gallery::ImageGallery,
    host::{ElementId, Host, TimerId, TimerTask},
    lazy_load::LazyImages,
    quantity::QuantityStepper,
    scroll::{BackToTop, SmoothScroll},
    search::SearchBox,
    settings::Settings,
    tooltips::init_tooltips,
    validation::FormValidation,
};

pub struct Storefront {
    bindings: Bindings,
    tooltips: usize,
    cart: CartControls,
    quantity: Option<QuantityStepper>,
    gallery: Option<ImageGallery>,
    validation: FormValidation,
    admin: Option<AdminPanel>,
    search: Option<SearchBox>,
    lazy_images: Option<LazyImages>,
    back_to_top: Option<BackToTop>,
    smooth_scroll: SmoothScroll,
}

impl Storefront {
    /// Runs once the document is parsed. Behaviors whose markup is absent are
    /// skipped; only invalid settings abort the boot.
    pub fn boot(host: &mut dyn Host, settings: &Settings) -> Result<Self, StorefrontError> {
        settings.validate()?;
        let mut bindings = Bindings::default();

        let tooltips = init_tooltips(host);
        let cart = CartControls::attach(host, &mut bindings, settings);
        let quantity = QuantityStepper::attach(host, &mut bindings);
        let gallery = ImageGallery::attach(host, &mut bindings, settings);
        let validation = FormValidation::attach(host, &mut bindings, settings);
        let admin = AdminPanel::attach(host, &mut bindings, settings);
        let search = SearchBox::attach(host, &mut bindings, settings);
        let lazy_images = LazyImages::attach(host);
        let back_to_top = match BackToTop::attach(host, &mut bindings, settings) {
            Ok(button) => Some(button),
            Err(err) => {
                warn!(error = %err, "back-to-top button could not be created");
                None
            }
        };
        let smooth_scroll = SmoothScroll::attach(host, &mut bindings);

        info!(
            path = %host.pathname(),
            listeners = bindings.listeners().len(),
            tooltips,
            quantity = quantity.is_some(),
            gallery = gallery.is_some(),
            admin = admin.is_some(),
            search = search.is_some(),
            lazy_images = lazy_images.is_some(),
            "storefront behaviors attached"
        );

        Ok(Self {
            bindings,
            tooltips,
            cart,
            quantity,
            gallery,
            validation,
            admin,
            search,
            lazy_images,
            back_to_top,
            smooth_scroll,
        })
    }

    /// Listeners the host has to install, in registration order.
    pub fn listeners(&self) -> &[Listener] {
        self.bindings.listeners()
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Tooltip toggles handed to the widget at boot.
    pub fn tooltips(&self) -> usize {
        self.tooltips
    }

    pub fn quantity(&self) -> Option<&QuantityStepper> {
        self.quantity.as_ref()
    }

    pub fn gallery(&self) -> Option<&ImageGallery> {
        self.gallery.as_ref()
    }

    pub fn admin(&self) -> Option<&AdminPanel> {
        self.admin.as_ref()
    }

    pub fn search(&self) -> Option<&SearchBox> {
        self.search.as_ref()
    }

    pub fn lazy_images(&self) -> Option<&LazyImages> {
        self.lazy_images.as_ref()
    }

    pub fn back_to_top(&self) -> Option<&BackToTop> {
        self.back_to_top.as_ref()
    }

    /// Runs every route bound to `target`/`event`. A failing handler is
    /// logged and the remaining handlers still run.
    pub fn dispatch(
        &mut self,
        host: &mut dyn Host,
        target: ListenerTarget,
        event: EventType,
    ) -> EventOutcome {
        let routes = self.bindings.routes(&Listener { target, event }).to_vec();
        let mut outcome = EventOutcome::proceed();
        for route in routes {
            match self.handle(host, route, target) {
                Ok(handled) => outcome = outcome.merge(handled),
                Err(err) => warn!(
                    event = event.as_str(),
                    route = ?route,
                    error = %err,
                    "event handler failed"
                ),
            }
        }
        outcome
    }

    fn handle(
        &mut self,
        host: &mut dyn Host,
        route: Route,
        target: ListenerTarget,
    ) -> Result<EventOutcome, StorefrontError> {
        let element = || match target {
            ListenerTarget::Element(element) => Ok(element),
            ListenerTarget::Window => Err(StorefrontError::host(
                "dispatch",
                format!("{route:?} expects an element target"),
            )),
        };

        let outcome = match route {
            Route::CartQuantityChanged => self.cart.quantity_changed(host, element()?)?,
            Route::RemoveFromCart => self.cart.remove_clicked(host),
            Route::AddToCart => self.cart.add_to_cart_clicked(host, element()?)?,
            Route::QuantityDecrease => self.with_quantity(|stepper| stepper.decrease(host)),
            Route::QuantityIncrease => self.with_quantity(|stepper| stepper.increase(host)),
            Route::QuantityEdited => self.with_quantity(|stepper| stepper.edited(host)),
            Route::Thumbnail => match self.gallery.as_mut() {
                Some(gallery) => gallery.thumbnail_clicked(host, element()?),
                None => EventOutcome::proceed(),
            },
            Route::ValidatedSubmit => self.validation.form_submitted(host, element()?),
            Route::PhoneInput => self.validation.phone_input(host, element()?),
            Route::AdminDelete => match self.admin.as_ref() {
                Some(admin) => admin.delete_clicked(host, element()?),
                None => EventOutcome::proceed(),
            },
            Route::ImageSelected => match self.admin.as_ref() {
                Some(admin) => admin.image_selected(host, element()?),
                None => EventOutcome::proceed(),
            },
            Route::StatusChanged => match self.admin.as_mut() {
                Some(admin) => admin.status_changed(host, element()?)?,
                None => EventOutcome::proceed(),
            },
            Route::SearchInput => match self.search.as_mut() {
                Some(search) => search.input_changed(host),
                None => EventOutcome::proceed(),
            },
            Route::HashAnchor => self.smooth_scroll.anchor_clicked(host, element()?),
            Route::BackToTopClick => match self.back_to_top.as_ref() {
                Some(button) => button.clicked(host),
                None => EventOutcome::proceed(),
            },
            Route::BackToTopScroll => match self.back_to_top.as_mut() {
                Some(button) => button.scrolled(host),
                None => EventOutcome::proceed(),
            },
        };
        Ok(outcome)
    }

    fn with_quantity(&self, f: impl FnOnce(&QuantityStepper) -> EventOutcome) -> EventOutcome {
        self.quantity.as_ref().map(f).unwrap_or_default()
    }

    pub fn on_timer(&mut self, host: &mut dyn Host, timer: TimerId, task: TimerTask) {
        match task {
            TimerTask::RestoreImageOpacity(image) => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.fade_elapsed(host, timer, image);
                }
            }
            TimerTask::RunSearch => {
                if let Some(search) = self.search.as_mut() {
                    if let Err(err) = search.timer_fired(host, timer) {
                        warn!(error = %err, "search could not be submitted");
                    }
                }
            }
            TimerTask::RefreshDashboard => {
                if let Some(admin) = self.admin.as_mut() {
                    admin.refresh_dashboard(host);
                }
            }
            TimerTask::RestoreCardOpacity(card) => {
                if let Some(admin) = self.admin.as_mut() {
                    admin.card_fade_elapsed(host, timer, card);
                }
            }
        }
    }

    pub fn on_intersecting(&mut self, host: &mut dyn Host, element: ElementId) {
        if let Some(images) = self.lazy_images.as_mut() {
            images.intersecting(host, element);
        }
    }

    pub fn on_file_loaded(&mut self, host: &mut dyn Host, input: ElementId, data_url: &str) {
        let Some(admin) = self.admin.as_ref() else {
            debug!("file read finished outside the admin panel");
            return;
        };
        if let Err(err) = admin.image_loaded(host, input, data_url) {
            warn!(error = %err, "image preview could not be shown");
        }
    }

    /// Cancels timers and observers and forgets every listener. The host is
    /// expected to remove its native listeners afterwards.
    pub fn teardown(&mut self, host: &mut dyn Host) {
        if let Some(gallery) = self.gallery.as_mut() {
            gallery.teardown(host);
        }
        if let Some(admin) = self.admin.as_mut() {
            admin.teardown(host);
        }
        if let Some(search) = self.search.as_mut() {
            search.teardown(host);
        }
        if let Some(images) = self.lazy_images.as_mut() {
            images.teardown(host);
        }
        self.bindings.clear();
        info!("storefront behaviors detached");
    }
}

#[cfg(test)]
#[path = "tests/storefront_tests.rs"]
mod tests;
