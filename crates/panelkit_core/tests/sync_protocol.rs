//! End-to-end checks of the diff protocol between host and screen

use panelkit_core::{
    decode_batch, encode_batch, ElementId, ElementState, PanelState, ScreenMirror, StateUpdate,
    Style, StyleCategory, StyleFlags, SyncSession, TouchState, UpdateFlags,
};
use panelkit_paint::{Color, Rect};

fn button(x: f32) -> ElementState {
    ElementState::new(Rect::new(x, 0.0, 10.0, 10.0), Style::new(StyleCategory::Button))
}

#[test]
fn test_bounds_only_difference() {
    let bounds = [
        Rect::new(1.0, 0.0, 10.0, 10.0),
        Rect::new(0.0, 0.0, 0.0, 0.0),
        Rect::new(-5.0, 3.5, 100.0, 2.0),
    ];
    for rect in bounds {
        let prior = button(0.0);
        let mut state = prior.clone();
        state.set_bounds(Some(rect));
        assert_eq!(state.update_flags(&prior), UpdateFlags::BOUNDS);
    }

    let prior = button(0.0);
    let mut state = prior.clone();
    state.set_bounds(None);
    assert_eq!(state.update_flags(&prior), UpdateFlags::BOUNDS);
}

#[test]
fn test_identical_states_need_no_transmission() {
    let mut a = button(3.0);
    let mut b = button(3.0);
    for state in [&mut a, &mut b] {
        state.set_color(Some(Color::rgb(0.2, 0.4, 0.6)));
        state.set_style(Style::new(StyleCategory::Alert).with(StyleFlags::BLINKING));
        state.set_touch(TouchState(2));
    }
    assert!(a.update_flags(&b).is_empty());
    assert!(b.update_flags(&a).is_empty());

    let mut session = SyncSession::new(0);
    session.sync(ElementId(1), &mut a);
    b.clear_changed();
    assert!(session.sync(ElementId(1), &mut b).is_none());
}

#[test]
fn test_serialized_state_round_trips() {
    let mut state = button(4.0);
    state.set_color(Some(Color::from_hex(0x336699)));
    state.set_alpha(0.75);
    state.set_highlighted(true);
    state.set_style(Style::new(StyleCategory::Display).with(StyleFlags::MODAL));

    let json = serde_json::to_string(&state).unwrap();
    let restored: ElementState = serde_json::from_str(&json).unwrap();
    assert!(restored.update_flags(&state).is_empty());
    assert!(!restored.is_changed());
}

#[test]
fn test_alpha_scenario() {
    let panel = PanelState::default();
    let mut state = ElementState::new(Rect::new(0.0, 0.0, 10.0, 10.0), Style::new(StyleCategory::Label));
    state.clear_changed();
    let prior = state.clone();
    assert_eq!(prior.alpha(), 1.0);

    state.set_alpha(0.5);
    assert!(state.is_changed());
    assert_eq!(state.update_flags(&prior), UpdateFlags::ALPHA);
    assert_eq!(state.effective_background_alpha(&panel), 0.5);
}

#[test]
fn test_non_finite_opacity_survives_codec() {
    let mut session = SyncSession::new(0);
    let mut mirror = ScreenMirror::new();
    let mut elements: Vec<_> = (1..=4).map(|i| (ElementId(i), button(i as f32 * 20.0))).collect();
    elements[1].1.set_alpha(f32::NAN);
    elements[2].1.set_alpha(f32::INFINITY);
    elements[3].1.set_alpha(f32::NEG_INFINITY);

    let batch = session.collect_cycle(elements.iter_mut().map(|(id, s)| (*id, s)));
    let decoded = decode_batch(&encode_batch(&batch).unwrap()).unwrap();
    assert_eq!(decoded, batch);
    let outcome = mirror.apply_batch(decoded);
    assert_eq!(outcome.repaint.len(), 4);
    for (id, state) in &elements {
        assert_eq!(mirror.get(*id), Some(state));
    }
    assert_eq!(mirror.get(ElementId(1)).map(|s| s.alpha()), Some(1.0));
    assert!(mirror.get(ElementId(2)).is_some_and(|s| s.alpha().is_nan()));

    // Incremental updates carry the same encoding
    elements[0].1.set_alpha(f32::INFINITY);
    elements[2].1.set_alpha(f32::NEG_INFINITY);
    let batch = session.collect_cycle(elements.iter_mut().map(|(id, s)| (*id, s)));
    assert_eq!(batch.len(), 2);
    let outcome = mirror.apply_batch(decode_batch(&encode_batch(&batch).unwrap()).unwrap());
    assert_eq!(
        outcome.repaint,
        vec![(ElementId(1), UpdateFlags::ALPHA), (ElementId(3), UpdateFlags::ALPHA)]
    );
    assert_eq!(mirror.get(ElementId(1)).map(|s| s.alpha()), Some(f32::INFINITY));
    assert_eq!(mirror.get(ElementId(3)).map(|s| s.alpha()), Some(f32::NEG_INFINITY));
}

#[test]
fn test_opacity_boundaries_clamp_when_painting() {
    let panel = PanelState::default();
    let mut state = button(0.0);

    for (alpha, expected) in [(0.0, 0.0), (1.0, 1.0), (-0.001, 0.0), (1.001, 1.0)] {
        state.set_alpha(alpha);
        assert_eq!(state.alpha(), alpha, "setter keeps the raw value");
        assert_eq!(state.effective_background_alpha(&panel), expected);
    }
}

#[test]
fn test_host_to_screen_over_codec() {
    let mut session = SyncSession::new(0);
    let mut mirror = ScreenMirror::new();
    let mut elements = vec![(ElementId(1), button(0.0)), (ElementId(2), button(20.0))];

    let batch = session.collect_cycle(elements.iter_mut().map(|(id, s)| (*id, s)));
    assert_eq!(batch.len(), 2);
    let outcome = mirror.apply_batch(decode_batch(&encode_batch(&batch).unwrap()).unwrap());
    assert!(outcome.resync.is_empty());
    assert_eq!(mirror.len(), 2);

    elements[1].1.set_touch(TouchState::PRESSED);
    let batch = session.collect_cycle(elements.iter_mut().map(|(id, s)| (*id, s)));
    assert_eq!(batch.len(), 1);
    assert!(matches!(
        &batch.updates[0],
        StateUpdate::Incremental { id: ElementId(2), flags, .. } if *flags == UpdateFlags::TOUCH
    ));

    let outcome = mirror.apply_batch(decode_batch(&encode_batch(&batch).unwrap()).unwrap());
    assert_eq!(outcome.repaint, vec![(ElementId(2), UpdateFlags::TOUCH)]);
    assert_eq!(mirror.get(ElementId(2)), Some(&elements[1].1));

    let removed = session.forget(ElementId(1)).unwrap();
    mirror.apply(removed).unwrap();
    assert!(mirror.get(ElementId(1)).is_none());
}

#[test]
fn test_screen_reconnect_requests_resync() {
    let mut session = SyncSession::new(0);
    let mut state = button(0.0);
    session.collect_cycle([(ElementId(5), &mut state)]);

    // Screen restarted and lost its mirror
    let mut mirror = ScreenMirror::new();
    state.set_visible(false);
    let outcome = mirror.apply_batch(session.collect_cycle([(ElementId(5), &mut state)]));
    assert_eq!(outcome.resync, vec![ElementId(5)]);

    session.force_full();
    let batch = session.collect_cycle([(ElementId(5), &mut state)]);
    assert!(matches!(batch.updates[0], StateUpdate::Full { .. }));
    let outcome = mirror.apply_batch(batch);
    assert!(outcome.resync.is_empty());
    assert_eq!(mirror.get(ElementId(5)).map(|s| s.is_visible()), Some(false));
}
