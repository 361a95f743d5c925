use crate::common::TestContext;
use crate::common::builders::{PageBuilder, Part};
use crate::common::mocks::ScriptedLocator;
use shorts_controls::config::Settings;
use shorts_controls::dom::{Dom, Media, MemoryDom, NodeId};
use shorts_controls::locator::ElementKind;
use shorts_controls::player::{Binder, BinderState, Effect, OverlayInput};
use shorts_controls::watcher::WatchHandler;
use shorts_controls::watcher::{MutationBatch, WatchEvent};
use std::rc::Rc;

fn permutations<T: Copy>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let first = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, first);
            out.push(tail);
        }
    }
    out
}

#[test]
fn test_repeated_discovery_attaches_one_overlay() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    assert_eq!(ctx.script.state(), BinderState::Active);

    let batch = shorts_controls::watcher::MutationBatch::added([ctx.page.renderer]);
    for _ in 0..5 {
        ctx.script.on_mutations(&batch);
    }
    ctx.script.start();

    assert_eq!(ctx.page.overlay_count(), 1);
    assert_eq!(ctx.registry.wired_overlays(), 1);
    assert_eq!(ctx.registry.keyboard_listeners(), 1);
    assert_eq!(ctx.registry.video_listeners(), vec![ctx.page.video]);
    assert_eq!(ctx.registry.host_volume_listeners(), vec![ctx.page.slider]);
}

#[test]
fn test_any_discovery_order_ends_active() {
    let kinds = [
        ElementKind::Video,
        ElementKind::Container,
        ElementKind::MuteButton,
        ElementKind::VolumeSlider,
    ];

    for order in permutations(&kinds) {
        let dom = Rc::new(MemoryDom::new("https://www.youtube.com/shorts/abc"));
        let container = dom.element("div", None, &[]);
        let video = dom.element("video", None, &[]);
        let mute = dom.element("button", None, &[]);
        let slider = dom.element("input", None, &[]);
        dom.append(dom.body(), container);
        dom.append(container, video);
        let element = |kind: ElementKind| match kind {
            ElementKind::Video => video,
            ElementKind::Container => container,
            ElementKind::MuteButton => mute,
            _ => slider,
        };

        let locator = Rc::new(ScriptedLocator::default());
        let mut binder = Binder::new(dom.clone(), locator, Settings::default());
        binder.start();
        for kind in &order {
            binder.on_watch_event(WatchEvent::Found {
                kind: *kind,
                element: element(*kind),
            });
        }

        assert_eq!(binder.state(), BinderState::Active, "order {:?}", order);
        let effects = binder.take_effects();
        let count = |f: fn(&Effect<NodeId>) -> bool| effects.iter().filter(|e| f(e)).count();
        assert_eq!(count(|e| matches!(e, Effect::ListenKeyboard)), 1);
        assert_eq!(count(|e| matches!(e, Effect::WireOverlay(_))), 1);
        assert_eq!(count(|e| matches!(e, Effect::ListenVideo(_))), 1);
        assert_eq!(count(|e| matches!(e, Effect::ListenHostVolume(_))), 1);
        assert_eq!(dom.children_of(container).len(), 2, "order {:?}", order);
    }
}

#[test]
fn test_partial_page_activates_when_slider_arrives() {
    let ctx = TestContext::started(PageBuilder::empty().build());
    assert_eq!(ctx.script.state(), BinderState::Discovering);

    ctx.script.on_mutations(&ctx.page.insert(Part::Player));
    assert_eq!(ctx.script.state(), BinderState::Partial);
    assert_eq!(ctx.page.overlay_count(), 0);

    ctx.script.on_mutations(&ctx.page.insert(Part::Mute));
    assert_eq!(ctx.script.state(), BinderState::Partial);
    assert_eq!(ctx.page.overlay_count(), 0);

    ctx.script.on_mutations(&ctx.page.insert(Part::Slider));
    assert_eq!(ctx.script.state(), BinderState::Active);
    assert_eq!(ctx.page.overlay_count(), 1);
    assert_eq!(ctx.registry.wired_overlays(), 1);
}

#[test]
fn test_parts_arrive_in_any_order() {
    let parts = [Part::Player, Part::Mute, Part::Slider];

    for order in permutations(&parts) {
        let ctx = TestContext::started(PageBuilder::empty().build());
        for part in &order {
            ctx.script.on_mutations(&ctx.page.insert(*part));
        }
        assert_eq!(ctx.script.state(), BinderState::Active, "order {:?}", order);
        assert_eq!(ctx.page.overlay_count(), 1, "order {:?}", order);
        assert_eq!(ctx.registry.keyboard_listeners(), 1);
        assert_eq!(ctx.registry.host_volume_listeners(), vec![ctx.page.slider]);
    }
}

#[test]
fn test_rebuilt_volume_controls_keep_overlay_state() {
    let mut ctx = TestContext::started(PageBuilder::shorts().build());
    let handles = ctx.registry.handles();
    let dom = ctx.page.dom.clone();

    dom.set_input_value(&handles.scrubber, "50");
    ctx.registry.overlay_input(OverlayInput::ScrubInput);
    ctx.registry.overlay_input(OverlayInput::ScrubRelease);
    ctx.registry.overlay_input(OverlayInput::PlayClicked);
    assert_eq!(dom.attribute(&handles.play_button, "playing").as_deref(), Some("true"));

    let old_slider = ctx.page.slider;
    let batch = ctx.page.rebuild_volume_controls();
    ctx.script.on_mutations(&batch);

    let binder = ctx.script.binder();
    assert_eq!(binder.state(), BinderState::Active);
    assert_eq!(binder.session().volume_slider, Some(ctx.page.slider));
    assert_eq!(binder.session().mute_button, Some(ctx.page.mute));
    drop(binder);

    assert_eq!(dom.input_value(&handles.scrubber).as_deref(), Some("50"));
    assert_eq!(dom.attribute(&handles.play_button, "playing").as_deref(), Some("true"));
    assert_eq!(ctx.page.overlay_count(), 1);
    assert_eq!(ctx.registry.host_volume_listeners(), vec![old_slider, ctx.page.slider]);

    // Mute now forwards to the new host button.
    ctx.registry.overlay_input(OverlayInput::MuteClicked);
    assert_eq!(dom.click_count(ctx.page.mute), 1);
}

#[test]
fn test_replaced_video_is_rebound() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let dom = ctx.page.dom.clone();

    dom.remove(ctx.page.video);
    let next = dom.element("video", None, &[]);
    dom.update_media(next, |m| m.duration = 12.0);
    dom.append(ctx.page.container, next);
    ctx.script
        .on_mutations(&shorts_controls::watcher::MutationBatch::added([next]));

    let binder = ctx.script.binder();
    assert_eq!(binder.overlay().map(|o| *o.video()), Some(next));
    drop(binder);
    assert_eq!(ctx.registry.video_listeners(), vec![ctx.page.video, next]);
    assert_eq!(ctx.page.overlay_count(), 1);
}

#[test]
fn test_reset_family_unbinds_host_controls_until_children_arrive() {
    let mut ctx = TestContext::started(PageBuilder::shorts().build());
    let handles = ctx.registry.handles();
    let dom = ctx.page.dom.clone();
    let old_mute = ctx.page.mute;
    let old_slider = ctx.page.slider;

    let (batch, mute, slider) = ctx.page.reset_volume_controls();
    ctx.script.on_mutations(&batch);
    assert_eq!(ctx.script.binder().session().mute_button, None);
    assert_eq!(ctx.script.state(), BinderState::Active);

    // Nothing reaches the detached host controls.
    ctx.registry.overlay_input(OverlayInput::MuteClicked);
    assert_eq!(dom.click_count(old_mute), 0);
    dom.set_input_value(&handles.volume_slider, "80");
    ctx.registry.overlay_input(OverlayInput::VolumeInput);
    assert_eq!(dom.input_value(&old_slider).as_deref(), Some("50"));
    assert!((dom.volume(&ctx.page.video) - 0.8).abs() < 1e-9);

    dom.append(ctx.page.controls, mute);
    dom.append(ctx.page.controls, slider);
    ctx.script.on_mutations(&MutationBatch::added([mute, slider]));
    ctx.registry.overlay_input(OverlayInput::MuteClicked);
    assert_eq!(dom.click_count(mute), 1);
    assert_eq!(ctx.registry.host_volume_listeners(), vec![old_slider, slider]);
}
