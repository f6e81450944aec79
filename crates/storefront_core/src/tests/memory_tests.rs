use super::*;

use serde_json::json;

fn page_from(value: serde_json::Value) -> MemoryPage {
    let fixture: PageFixture = serde_json::from_value(value).expect("fixture");
    MemoryPage::from_fixture(&fixture).expect("page")
}

#[test]
fn fixture_builds_tree_in_document_order() {
    let page = page_from(json!({
        "url": "http://shop.test/cart",
        "elements": [
            {"tag": "form", "attributes": {"class": "cart-form", "method": "post", "action": "/update_cart"},
             "children": [
                {"tag": "input", "attributes": {"class": "cart-quantity-input", "name": "quantity"}, "value": "2"},
                {"tag": "input", "attributes": {"type": "hidden", "name": "product_id", "value": "9"}}
             ]},
            {"tag": "input", "attributes": {"class": "cart-quantity-input"}}
        ]
    }));

    let inputs = page.query_all(".cart-quantity-input");
    assert_eq!(inputs.len(), 2);
    let form = page.closest(inputs[0], "form").expect("form");
    assert_eq!(page.tag(form), Some("form"));
    assert_eq!(page.closest(inputs[1], "form"), None);
    assert_eq!(page.value(inputs[0]), "2");
    assert_eq!(page.pathname(), "/cart");
}

#[test]
fn submit_collects_named_enabled_controls() {
    let mut page = page_from(json!({
        "url": "http://shop.test/cart",
        "elements": [
            {"tag": "form", "attributes": {"method": "POST", "action": "/update_cart"}, "children": [
                {"tag": "input", "attributes": {"name": "quantity"}, "value": "4"},
                {"tag": "input", "attributes": {"name": "product_id", "value": "9"}},
                {"tag": "input", "attributes": {"name": "skip", "disabled": ""}, "value": "x"},
                {"tag": "button", "attributes": {"type": "submit", "name": "go"}}
            ]},
            {"tag": "form", "attributes": {"class": "search-form"}}
        ]
    }));

    let forms = page.query_all("form");
    page.submit(forms[0]).expect("submit");
    page.submit(forms[1]).expect("submit");

    let first = &page.submissions()[0];
    assert_eq!(first.method, FormMethod::Post);
    assert_eq!(first.action, "/update_cart");
    assert_eq!(
        first.fields,
        vec![
            ("quantity".to_string(), "4".to_string()),
            ("product_id".to_string(), "9".to_string()),
        ]
    );
    let second = &page.submissions()[1];
    assert_eq!(second.method, FormMethod::Get);
    assert_eq!(second.action, "http://shop.test/cart");

    let input = page.query("input").expect("input");
    assert!(matches!(
        page.submit(input),
        Err(StorefrontError::WrongElementKind { expected: "form" })
    ));
}

#[test]
fn validity_considers_required_and_custom_messages() {
    let mut page = MemoryPage::new("http://shop.test/checkout");
    let body = page.body();
    let form = page.insert(body, "form", &[("class", "needs-validation")]);
    let name = page.insert(form, "input", &[("name", "name"), ("required", "")]);
    let phone = page.insert(form, "input", &[("name", "phone")]);

    assert!(!page.check_validity(form));
    page.set_value(name, "Amina");
    assert!(page.check_validity(form));
    page.set_custom_validity(phone, "bad");
    assert!(!page.check_validity(form));
    page.set_custom_validity(phone, "");
    assert!(page.check_validity(form));
}

#[test]
fn classes_are_kept_in_the_class_attribute() {
    let mut page = MemoryPage::new("http://shop.test/");
    let body = page.body();
    let thumb = page.insert(body, "img", &[("class", "product-thumbnail")]);

    page.add_class(thumb, "active");
    page.add_class(thumb, "active");
    assert_eq!(
        page.attribute(thumb, "class").as_deref(),
        Some("product-thumbnail active")
    );
    page.remove_class(thumb, "product-thumbnail");
    assert_eq!(page.attribute(thumb, "class").as_deref(), Some("active"));
    assert_eq!(page.query_all(".active"), vec![thumb]);
}

#[test]
fn detached_elements_are_invisible_to_queries() {
    let mut page = MemoryPage::new("http://shop.test/");
    let button = page.create_element("button").expect("button");
    page.set_attribute(button, "class", "back-to-top");
    assert!(page.query(".back-to-top").is_none());

    let body = page.body();
    page.append_child(body, button).expect("append");
    assert_eq!(page.query(".back-to-top"), Some(button));
    assert!(page.append_child(button, body).is_err());
    assert!(page.create_element("not a tag").is_err());
}

#[test]
fn timers_fire_in_due_order_and_intervals_rearm() {
    let mut page = MemoryPage::new("http://shop.test/admin");
    let slow = page.set_timeout(Duration::from_millis(500), TimerTask::RunSearch);
    let interval = page.set_interval(Duration::from_millis(200), TimerTask::RefreshDashboard);

    let until = Duration::from_millis(600);
    let mut fired = Vec::new();
    while let Some((id, _)) = page.next_due_timer(until) {
        fired.push(id);
    }
    assert_eq!(fired, vec![interval, interval, slow, interval]);
    assert_eq!(page.now(), Duration::from_millis(600));
    assert_eq!(page.pending_timers(), 1);

    page.clear_timer(interval);
    assert_eq!(page.pending_timers(), 0);
}

#[test]
fn confirm_records_dialogs_and_defaults_to_accept() {
    let mut page = MemoryPage::new("http://shop.test/");
    page.queue_confirm(false);
    assert!(!page.confirm("first?"));
    assert!(page.confirm("second?"));
    assert_eq!(page.dialogs(), ["first?".to_string(), "second?".to_string()]);
}

#[test]
fn file_reads_produce_data_urls() {
    let mut page = page_from(json!({
        "url": "http://shop.test/admin/products/add",
        "elements": [
            {"tag": "input", "attributes": {"type": "file", "name": "image"},
             "files": [{"name": "chair.png", "text": "png"}]},
            {"tag": "input", "attributes": {"type": "file", "name": "other"}}
        ]
    }));
    let inputs = page.query_all("input");

    assert!(page.read_file_as_data_url(inputs[0]));
    assert!(!page.read_file_as_data_url(inputs[1]));
    assert_eq!(
        page.complete_file_reads(),
        vec![(inputs[0], "data:image/png;base64,cG5n".to_string())]
    );
    assert!(page.complete_file_reads().is_empty());
}

#[test]
fn invalid_fixtures_are_rejected() {
    let bad_url: PageFixture = serde_json::from_value(json!({"url": "not a url"})).expect("fixture");
    assert!(matches!(
        MemoryPage::from_fixture(&bad_url),
        Err(StorefrontError::InvalidUrl { .. })
    ));

    let bad_file: PageFixture = serde_json::from_value(json!({
        "elements": [{"tag": "input", "files": [{"name": "a.png", "contents_base64": "%%%"}]}]
    }))
    .expect("fixture");
    assert!(matches!(
        MemoryPage::from_fixture(&bad_file),
        Err(StorefrontError::Fixture(_))
    ));
}
