use super::*;

use crate::{host::Document, memory::MemoryPage};

fn tooltip_page() -> MemoryPage {
    let mut page = MemoryPage::new("http://shop.test/");
    let body = page.body();
    page.insert(
        body,
        "button",
        &[("data-bs-toggle", "tooltip"), ("title", "أضف إلى السلة")],
    );
    page.insert(body, "span", &[("data-bs-toggle", "popover")]);
    page.insert(body, "a", &[("data-bs-toggle", "tooltip"), ("href", "/cart")]);
    page
}

#[test]
fn every_tooltip_toggle_is_initialized() {
    let mut page = tooltip_page();
    assert_eq!(init_tooltips(&mut page), 2);

    let expected = page.query_all(r#"[data-bs-toggle="tooltip"]"#);
    assert_eq!(page.tooltips(), expected.as_slice());
}

#[test]
fn missing_widget_initializes_nothing() {
    let mut page = tooltip_page();
    page.set_tooltip_widget(false);
    assert_eq!(init_tooltips(&mut page), 0);
    assert!(page.tooltips().is_empty());
}
