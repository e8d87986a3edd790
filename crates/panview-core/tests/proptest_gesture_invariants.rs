//! Property-based invariant tests for the gesture recognizer.
//!
//! 1. A lone tap held at least `min_hold` yields exactly one confirmed click
//! 2. A tap shorter than `min_hold` yields no confirmed click
//! 3. Two quick taps yield one double click and no confirmed click
//! 4. A confirmed press is always immediately followed by its release
//! 5. After `reset()` nothing fires
//! 6. Replayed events never reach the consumer

use panview_core::{
    Duration, GestureConsumer, GestureRecognizer, Instant, PointF, PointerButton, PointerEvent,
    PointerKind,
};
use proptest::prelude::*;

// ── Recording consumer ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Notify,
    ConfirmedPress(PointF),
    Release(PointF),
    Double,
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Recorder {
    fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    fn confirmed_presses(&self) -> usize {
        self.count(|c| matches!(c, Call::ConfirmedPress(_)))
    }

    fn releases(&self) -> usize {
        self.count(|c| matches!(c, Call::Release(_)))
    }

    fn doubles(&self) -> usize {
        self.count(|c| matches!(c, Call::Double))
    }
}

impl GestureConsumer for Recorder {
    fn press_seen(&mut self, event: &PointerEvent, confirmed: bool) {
        self.calls.push(if confirmed {
            Call::ConfirmedPress(event.pos)
        } else {
            Call::Notify
        });
    }

    fn release_seen(&mut self, event: &PointerEvent) {
        self.calls.push(Call::Release(event.pos));
    }

    fn double_click_seen(&mut self, _event: &PointerEvent) {
        self.calls.push(Call::Double);
    }
}

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Step {
    gap_ms: u64,
    kind: PointerKind,
    button: PointerButton,
    x: f64,
    y: f64,
}

fn kind_strategy() -> impl Strategy<Value = PointerKind> {
    prop_oneof![
        Just(PointerKind::Press),
        Just(PointerKind::Move),
        Just(PointerKind::Release),
        Just(PointerKind::DoubleClick),
    ]
}

fn button_strategy() -> impl Strategy<Value = PointerButton> {
    prop_oneof![
        6 => Just(PointerButton::Primary),
        1 => Just(PointerButton::Secondary),
        1 => Just(PointerButton::Middle),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    (0u64..600, kind_strategy(), button_strategy(), 0.0..800.0f64, 0.0..600.0f64).prop_map(
        |(gap_ms, kind, button, x, y)| Step {
            gap_ms,
            kind,
            button,
            x,
            y,
        },
    )
}

/// Drive the recognizer the way an event loop does: fire due timers, then
/// deliver the event.
fn run(gr: &mut GestureRecognizer, rec: &mut Recorder, start: Instant, steps: &[Step]) -> Instant {
    let mut now = start;
    for step in steps {
        now += Duration::from_millis(step.gap_ms);
        gr.poll(now, rec);
        let ev = PointerEvent::new(step.kind, PointF::new(step.x, step.y), now)
            .with_button(step.button);
        gr.filter(&ev, now, rec);
    }
    now
}

fn tap(gr: &mut GestureRecognizer, rec: &mut Recorder, pos: PointF, at: Instant, hold: Duration) {
    gr.poll(at, rec);
    gr.filter(&PointerEvent::press(pos, at), at, rec);
    gr.poll(at + hold, rec);
    gr.filter(&PointerEvent::release(pos, at + hold), at + hold, rec);
}

// ═══════════════════════════════════════════════════════════════════════
// 1–3. Tap classification
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn held_tap_confirms_exactly_once(hold_ms in 100u64..2000, x in 0.0..500.0f64, y in 0.0..500.0f64) {
        let t0 = Instant::now();
        let mut gr = GestureRecognizer::default();
        let mut rec = Recorder::default();
        tap(&mut gr, &mut rec, PointF::new(x, y), t0, Duration::from_millis(hold_ms));
        let released = t0 + Duration::from_millis(hold_ms);

        prop_assert!(!gr.poll(released + Duration::from_millis(299), &mut rec));
        prop_assert!(gr.poll(released + Duration::from_millis(300), &mut rec));
        prop_assert!(!gr.poll(released + Duration::from_secs(10), &mut rec));
        prop_assert_eq!(rec.confirmed_presses(), 1);
        prop_assert_eq!(rec.releases(), 1);
        prop_assert_eq!(rec.doubles(), 0);
    }

    #[test]
    fn short_tap_never_confirms(hold_ms in 0u64..100) {
        let t0 = Instant::now();
        let mut gr = GestureRecognizer::default();
        let mut rec = Recorder::default();
        tap(&mut gr, &mut rec, PointF::new(1.0, 1.0), t0, Duration::from_millis(hold_ms));
        prop_assert!(!gr.poll(t0 + Duration::from_secs(10), &mut rec));
        prop_assert_eq!(rec.confirmed_presses(), 0);
        prop_assert_eq!(rec.releases(), 0);
    }

    #[test]
    fn quick_second_tap_is_double_click(
        hold1 in 100u64..400,
        gap in 0u64..150,
        hold2 in 0u64..150,
    ) {
        let t0 = Instant::now();
        let mut gr = GestureRecognizer::default();
        let mut rec = Recorder::default();
        tap(&mut gr, &mut rec, PointF::new(10.0, 10.0), t0, Duration::from_millis(hold1));
        let second = t0 + Duration::from_millis(hold1 + gap);
        tap(&mut gr, &mut rec, PointF::new(12.0, 11.0), second, Duration::from_millis(hold2));
        gr.poll(second + Duration::from_secs(10), &mut rec);

        prop_assert_eq!(rec.doubles(), 1);
        prop_assert_eq!(rec.confirmed_presses(), 0);
        prop_assert_eq!(rec.releases(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4–6. Arbitrary streams
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn confirmed_press_always_paired(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let t0 = Instant::now();
        let mut gr = GestureRecognizer::default();
        let mut rec = Recorder::default();
        let end = run(&mut gr, &mut rec, t0, &steps);
        gr.poll(end + Duration::from_secs(10), &mut rec);

        prop_assert_eq!(rec.confirmed_presses(), rec.releases());
        for (i, call) in rec.calls.iter().enumerate() {
            if let Call::ConfirmedPress(pos) = call {
                prop_assert_eq!(rec.calls.get(i + 1), Some(&Call::Release(*pos)));
            }
        }
    }

    #[test]
    fn reset_silences_everything(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let t0 = Instant::now();
        let mut gr = GestureRecognizer::default();
        let mut rec = Recorder::default();
        let end = run(&mut gr, &mut rec, t0, &steps);
        gr.reset();
        let before = rec.calls.len();
        prop_assert!(!gr.poll(end + Duration::from_secs(10), &mut rec));
        prop_assert_eq!(rec.calls.len(), before);
        prop_assert!(!gr.is_pending());
        prop_assert_eq!(gr.next_deadline(), None);
    }

    #[test]
    fn replays_never_reach_consumer(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let t0 = Instant::now();
        let mut gr = GestureRecognizer::default();
        let mut rec = Recorder::default();
        let mut now = t0;
        for step in &steps {
            now += Duration::from_millis(step.gap_ms);
            let ev = PointerEvent::new(step.kind, PointF::new(step.x, step.y), now)
                .with_button(step.button)
                .as_replay();
            prop_assert!(!gr.filter(&ev, now, &mut rec));
        }
        prop_assert!(rec.calls.is_empty());
        prop_assert!(!gr.is_pending());
    }
}
