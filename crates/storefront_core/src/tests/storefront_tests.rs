use std::time::Duration;

use super::*;

use crate::{host::Document, memory::MemoryPage};

struct ProductPage {
    page: MemoryPage,
    input: ElementId,
    decrease: ElementId,
    increase: ElementId,
    add: ElementId,
    thumbnail: ElementId,
    main_image: ElementId,
}

fn product_page() -> ProductPage {
    let mut page = MemoryPage::new("http://shop.test/product/7");
    let body = page.body();
    let decrease = page.insert(body, "button", &[("class", "quantity-decrease")]);
    let input = page.insert(body, "input", &[("class", "quantity-input"), ("value", "1")]);
    let increase = page.insert(body, "button", &[("class", "quantity-increase")]);
    let add = page.insert(
        body,
        "button",
        &[("class", "btn add-to-cart-btn"), ("data-product-id", "7")],
    );
    let main_image = page.insert(body, "img", &[("class", "main-product-image"), ("src", "/a.jpg")]);
    let thumbnail = page.insert(
        body,
        "img",
        &[("class", "product-thumbnail"), ("data-full-image", "/b.jpg")],
    );
    ProductPage {
        page,
        input,
        decrease,
        increase,
        add,
        thumbnail,
        main_image,
    }
}

fn click(storefront: &mut Storefront, page: &mut MemoryPage, element: ElementId) -> EventOutcome {
    storefront.dispatch(page, ListenerTarget::Element(element), EventType::Click)
}

#[test]
fn boot_attaches_only_behaviors_with_markup() {
    let mut fx = product_page();
    let storefront = Storefront::boot(&mut fx.page, &Settings::default()).expect("boot");

    assert!(storefront.quantity().is_some());
    assert!(storefront.gallery().is_some());
    assert!(storefront.admin().is_none());
    assert!(storefront.search().is_none());
    assert_eq!(storefront.lazy_images().map(LazyImages::pending), Some(0));

    let button = storefront.back_to_top().expect("back to top").button();
    assert!(storefront
        .bindings()
        .is_bound(ListenerTarget::Window, EventType::Scroll));
    assert!(storefront
        .listeners()
        .contains(&Listener {
            target: ListenerTarget::Element(button),
            event: EventType::Click,
        }));
    assert!(storefront
        .bindings()
        .is_bound(ListenerTarget::Element(fx.decrease), EventType::Click));
}

#[test]
fn tooltip_toggles_are_handed_to_the_widget_at_boot() {
    let mut fx = product_page();
    let body = fx.page.body();
    let hint = fx
        .page
        .insert(body, "span", &[("data-bs-toggle", "tooltip"), ("title", "شحن مجاني")]);

    let storefront = Storefront::boot(&mut fx.page, &Settings::default()).expect("boot");
    assert_eq!(storefront.tooltips(), 1);
    assert_eq!(fx.page.tooltips(), &[hint]);
    assert!(storefront
        .listeners()
        .iter()
        .all(|listener| listener.target != ListenerTarget::Element(hint)));
}

#[test]
fn invalid_settings_abort_boot() {
    let mut fx = product_page();
    let settings = Settings {
        dashboard_refresh_secs: 0,
        ..Settings::default()
    };
    assert!(matches!(
        Storefront::boot(&mut fx.page, &settings),
        Err(StorefrontError::Settings(_))
    ));
}

#[test]
fn stepper_keeps_add_to_cart_quantity_in_sync() {
    let mut fx = product_page();
    let mut storefront = Storefront::boot(&mut fx.page, &Settings::default()).expect("boot");

    click(&mut storefront, &mut fx.page, fx.increase);
    click(&mut storefront, &mut fx.page, fx.increase);
    click(&mut storefront, &mut fx.page, fx.decrease);
    assert_eq!(fx.page.value(fx.input), "2");

    let outcome = click(&mut storefront, &mut fx.page, fx.add);
    assert!(outcome.default_prevented);
    assert!(fx.page.is_disabled(fx.add));
    let submission = fx.page.submissions().last().expect("add to cart post");
    assert_eq!(submission.action, "/add_to_cart");
    assert_eq!(submission.field("product_id"), Some("7"));
    assert_eq!(submission.field("quantity"), Some("2"));
}

#[test]
fn gallery_fade_is_restored_by_its_timer() {
    let mut fx = product_page();
    let mut storefront = Storefront::boot(&mut fx.page, &Settings::default()).expect("boot");

    assert!(click(&mut storefront, &mut fx.page, fx.thumbnail).default_prevented);
    assert_eq!(fx.page.style(fx.main_image, "opacity"), Some("0"));
    assert_eq!(fx.page.attribute(fx.main_image, "src").as_deref(), Some("/b.jpg"));

    let (timer, task) = fx
        .page
        .next_due_timer(Duration::from_millis(150))
        .expect("fade timer");
    storefront.on_timer(&mut fx.page, timer, task);
    assert_eq!(fx.page.style(fx.main_image, "opacity"), Some("1"));
}

#[test]
fn unbound_events_proceed_untouched() {
    let mut fx = product_page();
    let mut storefront = Storefront::boot(&mut fx.page, &Settings::default()).expect("boot");
    let outcome = storefront.dispatch(
        &mut fx.page,
        ListenerTarget::Element(fx.main_image),
        EventType::Click,
    );
    assert_eq!(outcome, EventOutcome::proceed());
    assert_eq!(
        storefront.dispatch(&mut fx.page, ListenerTarget::Window, EventType::Click),
        EventOutcome::proceed()
    );
}

#[test]
fn cart_quantity_change_submits_its_form() {
    let mut page = MemoryPage::new("http://shop.test/cart");
    let body = page.body();
    let form = page.insert(body, "form", &[("action", "/update_cart/3"), ("method", "post")]);
    let input = page.insert(form, "input", &[("class", "cart-quantity-input"), ("name", "quantity")]);
    let mut storefront = Storefront::boot(&mut page, &Settings::default()).expect("boot");

    page.set_value(input, "3");
    let outcome = storefront.dispatch(&mut page, ListenerTarget::Element(input), EventType::Change);
    assert_eq!(outcome, EventOutcome::proceed());
    assert_eq!(page.submissions().len(), 1);
    assert_eq!(page.submissions()[0].field("quantity"), Some("3"));
}

#[test]
fn failed_search_submission_is_swallowed() {
    let mut page = MemoryPage::new("not a url");
    let body = page.body();
    let form = page.insert(body, "form", &[("class", "search-form")]);
    let input = page.insert(form, "input", &[("class", "search-input"), ("name", "search")]);
    let mut storefront = Storefront::boot(&mut page, &Settings::default()).expect("boot");

    page.set_value(input, "sofa");
    storefront.dispatch(&mut page, ListenerTarget::Element(input), EventType::Input);
    let (timer, task) = page
        .next_due_timer(Duration::from_millis(300))
        .expect("search timer");
    storefront.on_timer(&mut page, timer, task);

    assert!(page.submissions().is_empty());
    assert_eq!(page.history().len(), 1);
    assert!(!storefront.search().expect("search").is_pending());
}

#[test]
fn teardown_forgets_listeners_and_timers() {
    let mut page = MemoryPage::new("http://shop.test/admin");
    let body = page.body();
    page.insert(body, "div", &[("class", "stats-card")]);
    page.insert(body, "img", &[("data-src", "/late.jpg")]);
    let mut storefront = Storefront::boot(&mut page, &Settings::default()).expect("boot");
    assert_eq!(page.pending_timers(), 1);

    storefront.teardown(&mut page);
    assert!(storefront.listeners().is_empty());
    assert_eq!(page.pending_timers(), 0);
    assert_eq!(storefront.lazy_images().map(LazyImages::pending), Some(0));
}
