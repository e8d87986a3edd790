//! End-to-end taps, double taps and link clicks through a `WebViewport`
//! over a `StaticPage`.

use panview_core::{Duration, Instant, PointF, PointerEvent, PointerKind, RectF, SizeF};
use panview_web::{
    ContentEngine, EngineSignal, PageDescription, PageElement, StaticPage, ViewportNotice,
    WebViewport, WebViewportConfig,
};

const MS_10: Duration = Duration::from_millis(10);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A 1024px-wide article with one 150px paragraph and one link.
fn article() -> StaticPage {
    StaticPage::new(PageDescription {
        size: SizeF::new(1024.0, 4000.0),
        elements: vec![
            PageElement::block(1, RectF::new(0.0, 0.0, 1024.0, 4000.0)),
            PageElement::block(2, RectF::new(40.0, 200.0, 150.0, 300.0)).with_parent(1),
            PageElement::inline(3, RectF::new(50.0, 220.0, 60.0, 16.0)).with_parent(2),
            PageElement::inline(4, RectF::new(400.0, 800.0, 200.0, 40.0))
                .with_parent(1)
                .with_link("https://example.org/story"),
        ],
    })
}

/// Viewport placed at scene (0, 20), loaded and fitted to width.
fn loaded(t0: Instant) -> WebViewport<StaticPage> {
    let mut vp = WebViewport::new(SizeF::new(800.0, 480.0), WebViewportConfig::default(), t0);
    vp.set_geometry(PointF::new(0.0, 20.0), SizeF::new(800.0, 480.0));
    vp.set_engine(article());
    vp.handle_engine_signal(&EngineSignal::LoadStarted, t0);
    vp.handle_engine_signal(&EngineSignal::LoadFinished { success: true }, t0);
    vp.drain_notices();
    vp
}

/// Scene position of a document point.
fn scene(vp: &WebViewport<StaticPage>, doc: PointF) -> PointF {
    vp.coordinate_map().to_scene(doc)
}

fn run(vp: &mut WebViewport<StaticPage>, from: Instant, to: Instant) {
    let mut now = from;
    while now < to {
        now += MS_10;
        vp.tick(now);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Double-tap zoom
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn double_tap_zooms_paragraph_to_fill_width() {
    let t0 = Instant::now();
    let mut vp = loaded(t0);
    assert!((vp.zoom_scale() - 800.0 / 1024.0).abs() < 1e-12);

    let at = scene(&vp, PointF::new(60.0, 225.0));
    vp.handle_pointer(&PointerEvent::press(at, t0), t0);
    vp.handle_pointer(&PointerEvent::release(at, t0 + ms(120)), t0 + ms(120));
    vp.handle_pointer(&PointerEvent::press(at, t0 + ms(200)), t0 + ms(200));
    vp.handle_pointer(&PointerEvent::release(at, t0 + ms(320)), t0 + ms(320));
    assert!(vp.is_zooming());

    run(&mut vp, t0 + ms(320), t0 + ms(700));
    assert!(!vp.is_zooming());
    // 150px paragraph padded to 170, floored at 300.
    assert!((vp.zoom_scale() - 800.0 / 300.0).abs() < 1e-9);
    assert!((vp.engine().unwrap().zoom_factor() - 800.0 / 300.0).abs() < 1e-9);

    // The tap stays on the same row of the screen.
    let after = scene(&vp, PointF::new(60.0, 225.0));
    assert!((after.y - at.y).abs() < 1e-6, "tap row moved: {at:?} -> {after:?}");

    // No click ever reached the page.
    assert!(vp.engine().unwrap().dispatched().is_empty());

    let notices = vp.drain_notices();
    assert!(notices.iter().any(|n| matches!(n, ViewportNotice::ZoomStarted { .. })));
    assert!(notices.iter().any(|n| matches!(n, ViewportNotice::ZoomCommitted { .. })));
}

#[test]
fn double_tap_again_returns_to_fit_width() {
    let t0 = Instant::now();
    let mut vp = loaded(t0);
    let fit = vp.zoom_scale();
    let at = scene(&vp, PointF::new(60.0, 225.0));
    vp.handle_pointer(&PointerEvent::double_click(at, t0), t0);
    run(&mut vp, t0, t0 + ms(400));
    assert!(vp.zoom_scale() > fit);

    let t1 = t0 + Duration::from_secs(2);
    let at = scene(&vp, PointF::new(60.0, 225.0));
    vp.handle_pointer(&PointerEvent::double_click(at, t1), t1);
    run(&mut vp, t1, t1 + ms(400));
    assert!((vp.zoom_scale() - fit).abs() < 1e-12);
}

#[test]
fn tiles_resume_only_after_commit_settles() {
    let t0 = Instant::now();
    let mut vp = loaded(t0);
    let at = scene(&vp, PointF::new(60.0, 225.0));
    vp.handle_pointer(&PointerEvent::double_click(at, t0), t0);
    assert!(!vp.engine().unwrap().tiles_enabled());
    run(&mut vp, t0, t0 + ms(400));
    assert!(!vp.engine().unwrap().tiles_enabled());
    run(&mut vp, t0 + ms(400), t0 + ms(900));
    assert!(vp.engine().unwrap().tiles_enabled());
}

// ═══════════════════════════════════════════════════════════════════════════
// Click timing
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn single_tap_fires_once_after_press_delay() {
    let t0 = Instant::now();
    let mut vp = loaded(t0);
    let at = scene(&vp, PointF::new(700.0, 300.0));
    vp.handle_pointer(&PointerEvent::press(at, t0), t0);
    vp.handle_pointer(&PointerEvent::release(at, t0 + ms(150)), t0 + ms(150));

    vp.tick(t0 + ms(449));
    assert!(vp.engine().unwrap().dispatched().is_empty());
    assert_eq!(vp.next_deadline(), Some(t0 + ms(450)));

    vp.tick(t0 + ms(450));
    let dispatched = vp.engine().unwrap().dispatched();
    assert_eq!(dispatched.len(), 2);
    assert_eq!(dispatched[0].kind, PointerKind::Press);
    assert_eq!(dispatched[1].kind, PointerKind::Release);
    assert!((dispatched[1].pos.x - 700.0).abs() < 1e-9);

    run(&mut vp, t0 + ms(450), t0 + ms(2000));
    assert_eq!(vp.engine().unwrap().dispatched().len(), 2);
}

#[test]
fn vertical_pan_never_clicks() {
    let t0 = Instant::now();
    let mut vp = loaded(t0);
    let mut t = t0;
    let mut y = 400.0;
    vp.handle_pointer(&PointerEvent::press(PointF::new(300.0, y), t), t);
    for _ in 0..10 {
        t += ms(30);
        y -= 15.0;
        vp.handle_pointer(&PointerEvent::moved(PointF::new(300.0, y), t), t);
    }
    t += ms(200);
    vp.handle_pointer(&PointerEvent::release(PointF::new(300.0, y), t), t);
    run(&mut vp, t, t + Duration::from_secs(3));
    assert!(vp.engine().unwrap().dispatched().is_empty());
    assert!(vp.pan_position().y < 0.0);
    assert_eq!(vp.pan_position().x, 0.0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Link confirmation
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn link_click_waits_for_confirmation() {
    let t0 = Instant::now();
    let mut vp = loaded(t0);
    vp.set_pan_position(PointF::new(0.0, -500.0));
    let at = scene(&vp, PointF::new(500.0, 820.0));
    vp.handle_pointer(&PointerEvent::press(at, t0), t0);
    vp.handle_pointer(&PointerEvent::release(at, t0 + ms(150)), t0 + ms(150));
    vp.tick(t0 + ms(450));

    let notices = vp.drain_notices();
    assert_eq!(
        notices,
        vec![ViewportNotice::LinkHighlighted {
            rect: RectF::new(400.0, 800.0, 200.0, 40.0)
        }]
    );
    assert!(vp.engine().unwrap().navigations().is_empty());

    vp.tick(t0 + ms(950));
    let nav = vp.engine().unwrap().navigations();
    assert_eq!(nav.len(), 1);
    assert_eq!(nav[0].url, "https://example.org/story");
    let notices = vp.drain_notices();
    assert!(notices.iter().any(|n| matches!(
        n,
        ViewportNotice::ClickDispatched { link: Some(url), .. } if url == "https://example.org/story"
    )));
}

#[test]
fn pan_starting_on_link_cancels_highlight() {
    let t0 = Instant::now();
    let mut vp = loaded(t0);
    vp.set_pan_position(PointF::new(0.0, -500.0));
    let at = scene(&vp, PointF::new(500.0, 820.0));
    vp.handle_pointer(&PointerEvent::press(at, t0), t0);
    vp.handle_pointer(&PointerEvent::release(at, t0 + ms(150)), t0 + ms(150));
    vp.tick(t0 + ms(450));
    assert!(vp.link_highlight().is_some());

    let t1 = t0 + ms(500);
    vp.handle_pointer(&PointerEvent::press(at, t1), t1);
    vp.handle_pointer(&PointerEvent::moved(at + PointF::new(0.0, -40.0), t1 + MS_10), t1 + MS_10);
    assert_eq!(vp.link_highlight(), None);
    run(&mut vp, t1 + MS_10, t1 + Duration::from_secs(2));
    assert!(vp.engine().unwrap().navigations().is_empty());
}

#[test]
fn page_load_before_confirmation_drops_link() {
    let t0 = Instant::now();
    let mut vp = loaded(t0);
    vp.set_pan_position(PointF::new(0.0, -500.0));
    let at = scene(&vp, PointF::new(500.0, 820.0));
    vp.handle_pointer(&PointerEvent::press(at, t0), t0);
    vp.handle_pointer(&PointerEvent::release(at, t0 + ms(150)), t0 + ms(150));
    vp.tick(t0 + ms(450));
    vp.handle_engine_signal(&EngineSignal::LoadStarted, t0 + ms(700));
    vp.tick(t0 + ms(950));
    assert!(vp.engine().unwrap().navigations().is_empty());
    assert!(vp.drain_notices().contains(&ViewportNotice::LinkDropped));
}
