use super::*;

use crate::{
    host::{Browser, Document},
    memory::MemoryPage,
};

struct SearchPage {
    page: MemoryPage,
    search: SearchBox,
    input: ElementId,
}

fn search_page() -> SearchPage {
    let mut page = MemoryPage::new("http://shop.test/shop?category=3");
    let body = page.body();
    let form = page.insert(body, "form", &[("class", "search-form"), ("action", "/shop")]);
    let input = page.insert(form, "input", &[("class", "search-input"), ("name", "search")]);
    let mut bindings = Bindings::default();
    let search = SearchBox::attach(&mut page, &mut bindings, &Settings::default()).expect("search");
    SearchPage {
        page,
        search,
        input,
    }
}

fn type_and_wait(fx: &mut SearchPage, value: &str, wait: Duration) {
    fx.page.set_value(fx.input, value);
    fx.search.input_changed(&mut fx.page);
    let until = fx.page.now() + wait;
    while let Some((timer, task)) = fx.page.next_due_timer(until) {
        assert_eq!(task, TimerTask::RunSearch);
        fx.search.timer_fired(&mut fx.page, timer).expect("search");
    }
    fx.page.advance_clock_to(until);
}

#[test]
fn burst_of_keystrokes_runs_one_search_with_last_value() {
    let mut fx = search_page();
    for value in ["c", "ch", "cha", "chai", "chair"] {
        type_and_wait(&mut fx, value, Duration::from_millis(100));
    }
    assert!(fx.page.submissions().is_empty());

    type_and_wait(&mut fx, "chair ", Duration::from_millis(300));
    assert_eq!(fx.page.submissions().len(), 1);
    assert_eq!(fx.page.submissions()[0].field("search"), Some("chair "));
    assert_eq!(fx.page.href(), "http://shop.test/shop?category=3&search=chair");
    assert!(!fx.search.is_pending());
}

#[test]
fn short_query_cancels_and_never_fires() {
    let mut fx = search_page();
    type_and_wait(&mut fx, "ta", Duration::from_millis(200));
    type_and_wait(&mut fx, " t ", Duration::from_millis(1_000));

    assert!(fx.page.submissions().is_empty());
    assert_eq!(fx.page.history().len(), 1);
    assert_eq!(fx.page.pending_timers(), 0);
}

#[test]
fn query_length_counts_utf16_units() {
    let mut fx = search_page();
    type_and_wait(&mut fx, "é", Duration::from_millis(300));
    assert!(fx.page.submissions().is_empty());

    type_and_wait(&mut fx, "😀", Duration::from_millis(300));
    assert_eq!(fx.page.submissions().len(), 1);
    assert_eq!(fx.page.submissions()[0].field("search"), Some("😀"));
    assert_eq!(
        fx.page.href(),
        "http://shop.test/shop?category=3&search=%F0%9F%98%80"
    );
}

#[test]
fn stale_timer_is_ignored() {
    let mut fx = search_page();
    fx.page.set_value(fx.input, "lamp");
    fx.search.input_changed(&mut fx.page);

    fx.search
        .timer_fired(&mut fx.page, TimerId(999))
        .expect("stale timer");
    assert!(fx.page.submissions().is_empty());
    assert!(fx.search.is_pending());

    fx.search.teardown(&mut fx.page);
    assert!(!fx.search.is_pending());
    assert_eq!(fx.page.pending_timers(), 0);
}

#[test]
fn search_param_replaces_existing_value_in_place() {
    assert_eq!(
        with_search_param("http://shop.test/shop?search=old&page=2&search=dup", "new")
            .expect("url"),
        "http://shop.test/shop?search=new&page=2"
    );
    assert_eq!(
        with_search_param("http://shop.test/shop", "طاولة خشب").expect("url"),
        "http://shop.test/shop?search=%D8%B7%D8%A7%D9%88%D9%84%D8%A9+%D8%AE%D8%B4%D8%A8"
    );
    assert!(matches!(
        with_search_param("/relative", "x"),
        Err(StorefrontError::InvalidUrl { .. })
    ));
}

#[test]
fn search_needs_both_input_and_form() {
    let mut page = MemoryPage::new("http://shop.test/shop");
    let body = page.body();
    page.insert(body, "input", &[("class", "search-input")]);
    let mut bindings = Bindings::default();
    assert!(SearchBox::attach(&mut page, &mut bindings, &Settings::default()).is_none());
}
