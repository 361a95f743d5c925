use crate::common::TestContext;
use crate::common::builders::PageBuilder;
use shorts_controls::config::Settings;
use shorts_controls::dom::{Dom, Media};
use shorts_controls::player::{MediaEvent, OverlayInput};
use shorts_controls::player::binder::MENU_NOT_FOUND_MESSAGE;
use shorts_controls::utils::format_time;
use shorts_controls::watcher::MutationBatch;

fn with_loop_disabled(disable: bool) -> TestContext {
    let settings = Settings {
        disable_infinite_loop: disable,
        ..Settings::default()
    };
    let ctx = TestContext::with_settings(PageBuilder::shorts().build(), settings);
    ctx.script.start();
    ctx
}

#[test]
fn test_host_loop_flips_are_reverted() {
    for disable in [true, false] {
        let ctx = with_loop_disabled(disable);
        let dom = ctx.page.dom.clone();
        let video = ctx.page.video;

        dom.set_current_time(&video, 0.5);
        ctx.registry.media(video, MediaEvent::TimeUpdate);
        assert_eq!(dom.looping(&video), !disable);

        for _ in 0..3 {
            dom.set_looping(&video, disable);
            ctx.script
                .on_mutations(&MutationBatch::attribute(video, "loop"));
            assert_eq!(dom.looping(&video), !disable, "disable = {}", disable);
        }
    }
}

#[test]
fn test_loop_flag_untouched_before_playback() {
    let ctx = with_loop_disabled(true);
    let dom = ctx.page.dom.clone();
    let video = ctx.page.video;

    dom.set_looping(&video, true);
    ctx.script
        .on_mutations(&MutationBatch::attribute(video, "loop"));
    assert!(dom.looping(&video));
}

#[test]
fn test_ended_pauses_when_loop_disabled() {
    let ctx = with_loop_disabled(true);
    let dom = ctx.page.dom.clone();
    let video = ctx.page.video;

    dom.play(&video);
    ctx.registry.media(video, MediaEvent::Ended);
    assert!(dom.paused(&video));
    let play = ctx.registry.handles().play_button;
    assert_eq!(dom.attribute(&play, "playing").as_deref(), Some("false"));
}

#[test]
fn test_scrub_release_seeks_to_fraction() {
    let ctx = TestContext::started(PageBuilder::shorts().duration(48.0).build());
    let dom = ctx.page.dom.clone();
    let video = ctx.page.video;
    let scrubber = ctx.registry.handles().scrubber;

    dom.play(&video);
    dom.set_input_value(&scrubber, "37.5");
    ctx.registry.overlay_input(OverlayInput::ScrubInput);
    assert!(dom.paused(&video), "dragging pauses playback");
    assert_eq!(dom.current_time(&video), 0.0, "no seek while dragging");

    ctx.registry.overlay_input(OverlayInput::ScrubRelease);
    assert!((dom.current_time(&video) - 18.0).abs() < 1e-9);
    assert!(!dom.paused(&video), "playback resumes after the drag");
}

#[test]
fn test_scrub_to_end_shows_duration() {
    let ctx = TestContext::started(PageBuilder::shorts().duration(65.0).build());
    let dom = ctx.page.dom.clone();
    let scrubber = ctx.registry.handles().scrubber;

    dom.set_input_value(&scrubber, "100");
    ctx.registry.overlay_input(OverlayInput::ScrubInput);
    ctx.registry.overlay_input(OverlayInput::ScrubRelease);

    let time_display = dom
        .query_selector(None, &shorts_controls::dom::Selector::parse(".time-display").unwrap())
        .unwrap();
    let label = dom.text(&time_display).unwrap();
    let (current, total) = label.split_once(" / ").unwrap();
    assert_eq!(current, format_time(65.0));
    assert_eq!(total, "01:05");
}

#[test]
fn test_time_updates_move_the_scrubber() {
    let ctx = TestContext::started(PageBuilder::shorts().duration(40.0).build());
    let dom = ctx.page.dom.clone();
    let video = ctx.page.video;
    let scrubber = ctx.registry.handles().scrubber;

    dom.set_current_time(&video, 10.0);
    ctx.registry.media(video, MediaEvent::TimeUpdate);
    assert_eq!(dom.input_value(&scrubber).as_deref(), Some("25"));
}

#[test]
fn test_volume_input_writes_through_host_slider() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let dom = ctx.page.dom.clone();
    let handles = ctx.registry.handles();

    dom.set_input_value(&handles.volume_slider, "80");
    ctx.registry.overlay_input(OverlayInput::VolumeInput);

    assert_eq!(dom.input_value(&ctx.page.slider).as_deref(), Some("80"));
    assert!(dom.dispatched_inputs().contains(&ctx.page.slider));
}

#[test]
fn test_raising_volume_while_muted_unmutes_through_host() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let dom = ctx.page.dom.clone();
    let handles = ctx.registry.handles();

    dom.update_media(ctx.page.video, |m| m.muted = true);
    dom.set_input_value(&handles.volume_slider, "30");
    ctx.registry.overlay_input(OverlayInput::VolumeInput);
    assert_eq!(dom.click_count(ctx.page.mute), 1);

    dom.set_input_value(&handles.volume_slider, "0");
    ctx.registry.overlay_input(OverlayInput::VolumeInput);
    assert_eq!(dom.click_count(ctx.page.mute), 1);
}

#[test]
fn test_host_slider_changes_are_mirrored() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let dom = ctx.page.dom.clone();
    let handles = ctx.registry.handles();
    let sink = ctx.registry.host_volumes.borrow()[0].1.clone();

    dom.set_input_value(&ctx.page.slider, "20");
    sink(OverlayInput::HostVolumeChanged {
        source: ctx.page.slider,
    });
    assert_eq!(dom.input_value(&handles.volume_slider).as_deref(), Some("20"));
}

#[test]
fn test_menu_button_forwards_or_alerts() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    ctx.registry.overlay_input(OverlayInput::MenuClicked);
    assert_eq!(ctx.page.dom.alerts(), vec![MENU_NOT_FOUND_MESSAGE.to_string()]);

    let ctx = TestContext::started(PageBuilder::shorts().with_menu().build());
    ctx.registry.overlay_input(OverlayInput::MenuClicked);
    assert_eq!(ctx.page.dom.click_count(ctx.page.menu), 1);
    assert!(ctx.page.dom.alerts().is_empty());
}

#[test]
fn test_fullscreen_forwards_to_host() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let handles = ctx.registry.handles();
    assert!(ctx.page.dom.attribute(&handles.fullscreen_button, "hidden").is_none());

    ctx.registry.overlay_input(OverlayInput::FullscreenClicked);
    assert_eq!(ctx.page.dom.click_count(ctx.page.fullscreen), 1);
}

#[test]
fn test_view_count_is_shown() {
    let ctx = TestContext::started(PageBuilder::shorts().with_view_count("1.2M views").build());
    let dom = ctx.page.dom.clone();
    let label = dom
        .query_selector(None, &shorts_controls::dom::Selector::parse(".view-count").unwrap())
        .unwrap();
    assert_eq!(dom.text(&label).as_deref(), Some("1.2M views"));

    dom.set_attribute(&ctx.page.view_count, "aria-label", "1.3M views");
    ctx.script
        .on_mutations(&MutationBatch::added([ctx.page.view_count]));
    ctx.scheduler.run_frames();
    assert_eq!(dom.text(&label).as_deref(), Some("1.3M views"));
}
