use crate::common::TestContext;
use crate::common::builders::{PageBuilder, Part};
use serde_json::json;
use shorts_controls::config::{SettingKey, Settings, SettingsPatch};
use shorts_controls::constants::NAVIGATION_RECHECK_DELAY;
use shorts_controls::dom::{Dom, Media};
use shorts_controls::player::{BinderState, MediaEvent};
use shorts_controls::services::SettingsStore;
use std::time::Duration;

fn url_update(url: &str) -> serde_json::Value {
    json!({ "type": "url update", "newUrl": url })
}

#[test]
fn test_volume_is_persisted_after_the_write_completes() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let video = ctx.page.video;

    ctx.page.dom.set_volume(&video, 0.35);
    ctx.registry.media(video, MediaEvent::VolumeChange);

    // Local copy updates at once; storage only when the write runs.
    assert_eq!(ctx.script.binder().settings().saved_volume_value, Some(0.35));
    assert_eq!(ctx.spawner.pending(), 1);
    assert!(ctx.store.raw().get("savedVolumeValue").is_none());

    ctx.spawner.run_all();
    assert_eq!(ctx.store.raw().get("savedVolumeValue"), Some(&json!(0.35)));
}

#[test]
fn test_muted_volume_is_not_persisted() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let video = ctx.page.video;

    ctx.page.dom.update_media(video, |m| m.muted = true);
    ctx.registry.media(video, MediaEvent::VolumeChange);
    assert_eq!(ctx.spawner.pending(), 0);

    let icon = ctx.registry.handles().mute_button;
    assert_eq!(ctx.page.dom.attribute(&icon, "icon").as_deref(), Some("muted"));
}

#[test]
fn test_saved_volume_carries_into_next_video() {
    let settings = Settings {
        saved_volume_value: Some(0.25),
        ..Settings::default()
    };
    let ctx = TestContext::with_settings(PageBuilder::shorts().build(), settings);
    ctx.script.start();
    let video = ctx.page.video;

    ctx.registry.media(video, MediaEvent::LoadedMetadata);
    assert_eq!(ctx.page.dom.volume(&video), 0.25);
}

#[test]
fn test_external_writes_update_page_markers() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let root = ctx.page.page_root;
    let dom = ctx.page.dom.clone();
    assert_eq!(dom.attribute(&root, "shorts-ctl-enabled").as_deref(), Some("true"));
    assert_eq!(
        dom.attribute(&root, "shorts-ctl-always-visible").as_deref(),
        Some("false")
    );

    ctx.store.write_external(
        SettingsPatch::new()
            .with(SettingKey::ControlAlwaysVisible, true)
            .with(SettingKey::HideDefaultControls, true),
    );

    assert_eq!(
        dom.attribute(&root, "shorts-ctl-always-visible").as_deref(),
        Some("true")
    );
    assert_eq!(
        dom.attribute(&root, "shorts-ctl-hide-default-controls").as_deref(),
        Some("true")
    );
    assert!(ctx.script.binder().settings().control_always_visible);
}

#[test]
fn test_loop_setting_change_applies_immediately() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let dom = ctx.page.dom.clone();
    let video = ctx.page.video;

    dom.set_current_time(&video, 2.0);
    ctx.registry.media(video, MediaEvent::TimeUpdate);
    assert!(dom.looping(&video));

    ctx.store
        .write_external(SettingsPatch::new().with(SettingKey::DisableInfiniteLoop, true));
    assert!(!dom.looping(&video));
}

#[test]
fn test_hiding_view_count() {
    let ctx = TestContext::started(PageBuilder::shorts().with_view_count("5 views").build());
    let dom = ctx.page.dom.clone();
    let label = dom
        .query_selector(None, &shorts_controls::dom::Selector::parse(".view-count").unwrap())
        .unwrap();
    assert!(dom.attribute(&label, "hidden").is_none());

    ctx.store
        .write_external(SettingsPatch::new().with(SettingKey::ShowViewCount, false));
    assert!(dom.attribute(&label, "hidden").is_some());
}

#[test]
fn test_navigation_recheck_finds_missed_player() {
    let ctx = TestContext::started(PageBuilder::empty().build());
    ctx.script.on_message(url_update("https://www.youtube.com/shorts/next"));
    assert_eq!(ctx.scheduler.pending_timers(), 1);

    // Inserted without the observer noticing.
    for part in [Part::Player, Part::Mute, Part::Slider] {
        ctx.page.insert(part);
    }
    ctx.scheduler.advance(NAVIGATION_RECHECK_DELAY - Duration::from_millis(1));
    assert_eq!(ctx.script.state(), BinderState::Discovering);

    ctx.scheduler.advance(Duration::from_millis(1));
    assert_eq!(ctx.script.state(), BinderState::Active);
    assert_eq!(ctx.page.overlay_count(), 1);
}

#[test]
fn test_navigation_while_active_schedules_nothing() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    ctx.script.on_message(url_update("https://www.youtube.com/shorts/next"));
    ctx.script.on_message(json!({ "type": "other", "newUrl": "x" }));
    ctx.script.on_message(json!("not an object"));
    assert_eq!(ctx.scheduler.pending_timers(), 0);
}

#[test]
fn test_invalidated_context_goes_quiet() {
    let ctx = TestContext::started(PageBuilder::empty().build());
    ctx.script.on_message(url_update("https://www.youtube.com/shorts/next"));
    ctx.alive.set(false);

    for part in [Part::Player, Part::Mute, Part::Slider] {
        ctx.script.on_mutations(&ctx.page.insert(part));
    }
    ctx.scheduler.advance(NAVIGATION_RECHECK_DELAY);
    assert_eq!(ctx.script.state(), BinderState::Discovering);
    assert_eq!(ctx.page.overlay_count(), 0);
}

#[test]
fn test_pending_write_is_dropped_after_invalidation() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    let video = ctx.page.video;

    ctx.page.dom.set_volume(&video, 0.6);
    ctx.registry.media(video, MediaEvent::VolumeChange);
    ctx.alive.set(false);
    ctx.spawner.run_all();

    assert!(ctx.store.raw().is_empty());
}

#[tokio::test]
async fn test_store_round_trip_feeds_the_script() {
    let ctx = TestContext::started(PageBuilder::shorts().build());
    ctx.store
        .set(SettingsPatch::new().with(SettingKey::HideVideoInfo, true))
        .await
        .unwrap();

    let stored = ctx.store.get().await.unwrap();
    assert!(stored.hide_video_info);
    assert_eq!(
        ctx.page
            .dom
            .attribute(&ctx.page.page_root, "shorts-ctl-hide-info")
            .as_deref(),
        Some("true")
    );
}
