use super::*;

use shared::protocol::FormMethod;

use crate::{
    events::{ListenerTarget, Route},
    host::{Browser, Document},
    memory::MemoryPage,
};

struct CartPage {
    page: MemoryPage,
    quantity_input: ElementId,
    loose_input: ElementId,
    remove_button: ElementId,
    add_button: ElementId,
}

fn cart_page() -> CartPage {
    let mut page = MemoryPage::new("http://shop.test/cart");
    let body = page.body();
    let form = page.insert(
        body,
        "form",
        &[("method", "post"), ("action", "/update_cart")],
    );
    page.insert(form, "input", &[("name", "product_id"), ("value", "5")]);
    let quantity_input = page.insert(
        form,
        "input",
        &[("class", "cart-quantity-input"), ("name", "quantity"), ("value", "2")],
    );
    let loose_input = page.insert(body, "input", &[("class", "cart-quantity-input")]);
    let remove_button = page.insert(
        body,
        "a",
        &[("class", "btn remove-from-cart"), ("href", "/remove_from_cart/5")],
    );
    let add_button = page.insert(
        body,
        "button",
        &[("class", "add-to-cart-btn"), ("data-product-id", "5")],
    );
    CartPage {
        page,
        quantity_input,
        loose_input,
        remove_button,
        add_button,
    }
}

#[test]
fn attach_routes_every_cart_control() {
    let mut fx = cart_page();
    let mut bindings = Bindings::default();
    CartControls::attach(&mut fx.page, &mut bindings, &Settings::default());

    assert!(bindings.is_bound(ListenerTarget::Element(fx.quantity_input), EventType::Change));
    assert!(bindings.is_bound(ListenerTarget::Element(fx.loose_input), EventType::Change));
    assert!(bindings.is_bound(ListenerTarget::Element(fx.remove_button), EventType::Click));
    assert_eq!(
        bindings.routes(&crate::events::Listener {
            target: ListenerTarget::Element(fx.add_button),
            event: EventType::Click,
        }),
        [Route::AddToCart]
    );
}

#[test]
fn quantity_change_submits_enclosing_form_only() {
    let mut fx = cart_page();
    let mut bindings = Bindings::default();
    let cart = CartControls::attach(&mut fx.page, &mut bindings, &Settings::default());

    fx.page.set_value(fx.quantity_input, "3");
    cart.quantity_changed(&mut fx.page, fx.quantity_input)
        .expect("submit");
    cart.quantity_changed(&mut fx.page, fx.loose_input)
        .expect("no form is fine");

    let submissions = fx.page.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].action, "/update_cart");
    assert_eq!(submissions[0].field("quantity"), Some("3"));
    assert_eq!(submissions[0].field("product_id"), Some("5"));
}

#[test]
fn declining_removal_prevents_navigation() {
    let mut fx = cart_page();
    let mut bindings = Bindings::default();
    let cart = CartControls::attach(&mut fx.page, &mut bindings, &Settings::default());

    fx.page.queue_confirm(false);
    assert!(cart.remove_clicked(&mut fx.page).default_prevented);
    assert!(!cart.remove_clicked(&mut fx.page).default_prevented);
    assert_eq!(
        fx.page.dialogs()[0],
        "هل أنت متأكد من حذف هذا المنتج من السلة؟"
    );
}

#[test]
fn add_to_cart_posts_hidden_form_with_quantity() {
    let mut fx = cart_page();
    let mut bindings = Bindings::default();
    let cart = CartControls::attach(&mut fx.page, &mut bindings, &Settings::default());
    fx.page.set_attribute(fx.add_button, "data-quantity", "4");

    let outcome = cart
        .add_to_cart_clicked(&mut fx.page, fx.add_button)
        .expect("add to cart");

    assert!(outcome.default_prevented);
    assert!(fx.page.is_disabled(fx.add_button));
    assert!(fx.page.inner_html(fx.add_button).contains("جارِ الإضافة"));

    let submission = fx.page.submissions().last().expect("submission");
    assert_eq!(submission.method, FormMethod::Post);
    assert_eq!(submission.action, "/add_to_cart");
    assert_eq!(submission.field("product_id"), Some("5"));
    assert_eq!(submission.field("quantity"), Some("4"));
    assert_eq!(fx.page.href(), "http://shop.test/cart");
}

#[test]
fn add_to_cart_defaults_quantity_and_ignores_missing_product() {
    let mut fx = cart_page();
    let mut bindings = Bindings::default();
    let cart = CartControls::attach(&mut fx.page, &mut bindings, &Settings::default());

    cart.add_to_cart_clicked(&mut fx.page, fx.add_button)
        .expect("add to cart");
    assert_eq!(fx.page.submissions()[0].field("quantity"), Some("1"));

    let body = fx.page.body();
    let orphan = fx.page.insert(body, "button", &[("class", "add-to-cart-btn")]);
    let outcome = cart
        .add_to_cart_clicked(&mut fx.page, orphan)
        .expect("no product is a no-op");
    assert!(!outcome.default_prevented);
    assert!(!fx.page.is_disabled(orphan));
    assert_eq!(fx.page.submissions().len(), 1);
}
