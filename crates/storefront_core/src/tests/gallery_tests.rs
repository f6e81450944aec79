use super::*;

use crate::{host::Document, memory::MemoryPage};

struct GalleryPage {
    page: MemoryPage,
    gallery: ImageGallery,
    thumbs: Vec<ElementId>,
    main: ElementId,
}

fn gallery_page() -> GalleryPage {
    let mut page = MemoryPage::new("http://shop.test/product/5");
    let body = page.body();
    let main = page.insert(
        body,
        "img",
        &[("class", "main-product-image"), ("src", "/img/1-large.jpg")],
    );
    let thumbs = vec![
        page.insert(
            body,
            "img",
            &[
                ("class", "product-thumbnail active"),
                ("src", "/img/1-thumb.jpg"),
                ("data-full-image", "/img/1-large.jpg"),
            ],
        ),
        page.insert(
            body,
            "img",
            &[
                ("class", "product-thumbnail"),
                ("src", "/img/2-thumb.jpg"),
                ("data-full-image", "/img/2-large.jpg"),
            ],
        ),
        page.insert(
            body,
            "img",
            &[("class", "product-thumbnail"), ("src", "/img/3.jpg")],
        ),
    ];
    let mut bindings = Bindings::default();
    let gallery =
        ImageGallery::attach(&mut page, &mut bindings, &Settings::default()).expect("gallery");
    GalleryPage {
        page,
        gallery,
        thumbs,
        main,
    }
}

fn active_count(fx: &GalleryPage) -> usize {
    fx.thumbs
        .iter()
        .filter(|thumb| fx.page.has_class(**thumb, "active"))
        .count()
}

#[test]
fn click_marks_exactly_one_thumbnail_and_swaps_source() {
    let mut fx = gallery_page();

    let outcome = fx.gallery.thumbnail_clicked(&mut fx.page, fx.thumbs[1]);
    assert!(outcome.default_prevented);
    assert_eq!(active_count(&fx), 1);
    assert_eq!(fx.gallery.active(&fx.page), Some(fx.thumbs[1]));
    assert_eq!(
        fx.page.attribute(fx.main, "src").as_deref(),
        Some("/img/2-large.jpg")
    );

    fx.gallery.thumbnail_clicked(&mut fx.page, fx.thumbs[2]);
    assert_eq!(active_count(&fx), 1);
    assert_eq!(fx.page.attribute(fx.main, "src").as_deref(), Some("/img/3.jpg"));
}

#[test]
fn fade_restores_opacity_after_the_delay() {
    let mut fx = gallery_page();
    fx.gallery.thumbnail_clicked(&mut fx.page, fx.thumbs[1]);
    assert_eq!(fx.page.style(fx.main, "opacity"), Some("0"));

    assert_eq!(fx.page.next_due_timer(Duration::from_millis(149)), None);
    let (timer, task) = fx
        .page
        .next_due_timer(Duration::from_millis(150))
        .expect("fade timer");
    assert_eq!(task, TimerTask::RestoreImageOpacity(fx.main));
    fx.gallery.fade_elapsed(&mut fx.page, timer, fx.main);
    assert_eq!(fx.page.style(fx.main, "opacity"), Some("1"));
}

#[test]
fn teardown_cancels_pending_fades() {
    let mut fx = gallery_page();
    fx.gallery.thumbnail_clicked(&mut fx.page, fx.thumbs[0]);
    fx.gallery.thumbnail_clicked(&mut fx.page, fx.thumbs[1]);
    assert_eq!(fx.page.pending_timers(), 2);

    fx.gallery.teardown(&mut fx.page);
    assert_eq!(fx.page.pending_timers(), 0);
}

#[test]
fn thumbnail_without_any_reference_keeps_main_image() {
    let mut fx = gallery_page();
    let body = fx.page.body();
    let bare = fx.page.insert(body, "a", &[("class", "product-thumbnail")]);
    fx.gallery.thumbnails.push(bare);

    fx.gallery.thumbnail_clicked(&mut fx.page, bare);
    assert_eq!(
        fx.page.attribute(fx.main, "src").as_deref(),
        Some("/img/1-large.jpg")
    );
    assert_eq!(active_count(&fx), 0);
    assert!(fx.page.has_class(bare, "active"));
}

#[test]
fn gallery_requires_thumbnails_and_main_image() {
    let mut page = MemoryPage::new("http://shop.test/product/5");
    let body = page.body();
    page.insert(body, "img", &[("class", "product-thumbnail")]);
    let mut bindings = Bindings::default();
    assert!(ImageGallery::attach(&mut page, &mut bindings, &Settings::default()).is_none());
}
