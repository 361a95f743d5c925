//! Overlay Control Widget.
//!
//! The widget builds (or adopts) one control subtree per container and
//! keeps it in step with the video and the host's native controls. It never
//! registers DOM listeners itself: it exposes [`OverlayHandles`] for the
//! platform to wire, and reacts to the resulting [`OverlayInput`]s routed
//! through the binder.

pub mod icons;
pub mod looping;
pub mod seek_bar;
pub mod view_count;
pub mod volume;

use std::rc::Rc;
use tracing::{debug, info};

use crate::config::Settings;
use crate::constants::{
    BUTTONS_CLASS, FULLSCREEN_BUTTON_CLASS, HIDDEN_ATTRIBUTE, MENU_BUTTON_CLASS,
    MUTE_BUTTON_CLASS, OVERLAY_CLASS, PLAY_BUTTON_CLASS, PLAYING_ATTRIBUTE, SCRUBBER_CLASS,
    SCRUBBER_WRAPPER_CLASS, SLIDER_CLASS, TIME_DISPLAY_CLASS, VIEW_COUNT_CLASS,
    VOLUME_CONTROL_CLASS, VOLUME_SLIDER_CLASS,
};
use crate::dom::{Dom, Media, Selector};
use crate::player::session::PlayerSession;
use crate::utils::errors::{OverlayError, Result};

pub use looping::LoopGuard;
pub use seek_bar::{DragState, SeekBar};
pub use view_count::ViewCount;
pub use volume::VolumeControl;

/// Video events the widget follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate,
    VolumeChange,
    LoadedMetadata,
    LoadedData,
    Ended,
}

impl MediaEvent {
    pub const ALL: [MediaEvent; 7] = [
        MediaEvent::Play,
        MediaEvent::Pause,
        MediaEvent::TimeUpdate,
        MediaEvent::VolumeChange,
        MediaEvent::LoadedMetadata,
        MediaEvent::LoadedData,
        MediaEvent::Ended,
    ];

    /// DOM event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::TimeUpdate => "timeupdate",
            Self::VolumeChange => "volumechange",
            Self::LoadedMetadata => "loadedmetadata",
            Self::LoadedData => "loadeddata",
            Self::Ended => "ended",
        }
    }
}

/// Every DOM event the overlay reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayInput<E> {
    PlayClicked,
    /// Scrubber `input` (drag in progress).
    ScrubInput,
    /// Scrubber `change` (drag released).
    ScrubRelease,
    VolumeInput,
    MuteClicked,
    FullscreenClicked,
    MenuClicked,
    Media { event: MediaEvent, source: E },
    /// The host slider committed a new level.
    HostVolumeChanged { source: E },
}

/// Overlay elements the platform attaches listeners to.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayHandles<E> {
    pub root: E,
    pub play_button: E,
    pub scrubber: E,
    pub volume_slider: E,
    pub mute_button: E,
    pub fullscreen_button: E,
    pub menu_button: E,
}

pub struct OverlayWidget<D: Dom> {
    dom: Rc<D>,
    container: D::Element,
    video: D::Element,
    root: D::Element,
    play_button: D::Element,
    fullscreen_button: D::Element,
    menu_button: D::Element,
    host_fullscreen: Option<D::Element>,
    seek_bar: SeekBar<D::Element>,
    volume: VolumeControl<D::Element>,
    view_count: ViewCount<D::Element>,
    looping: LoopGuard,
}

impl<D: Media> OverlayWidget<D> {
    /// Build the overlay inside the session's container, or adopt the one
    /// already there. Fails when the video or container is unknown.
    pub fn attach(dom: Rc<D>, session: &PlayerSession<D::Element>) -> Result<Self> {
        let video = session.video.clone().ok_or(OverlayError::MissingVideo)?;
        let container = session
            .container
            .clone()
            .ok_or(OverlayError::MissingContainer)?;

        let d = dom.as_ref();
        let root = match d.query_selector(Some(&container), &class_selector(OVERLAY_CLASS)?) {
            Some(existing) => {
                debug!("Adopting existing overlay in container");
                existing
            }
            None => {
                let root = d.create_element("div")?;
                d.add_class(&root, OVERLAY_CLASS);
                d.append_child(&container, &root)?;
                info!("Overlay attached");
                root
            }
        };

        let scrubber_box = ensure_part(d, &root, "div", SCRUBBER_CLASS)?;
        let wrapper = ensure_part(d, &scrubber_box, "div", SCRUBBER_WRAPPER_CLASS)?;
        let scrubber = ensure_slider(d, &wrapper)?;

        let buttons = ensure_part(d, &root, "div", BUTTONS_CLASS)?;
        let play_button = ensure_button(d, &buttons, PLAY_BUTTON_CLASS, icons::PLAY_BUTTON)?;
        let volume_box = ensure_part(d, &buttons, "div", VOLUME_CONTROL_CLASS)?;
        let mute_button = ensure_button(d, &volume_box, MUTE_BUTTON_CLASS, icons::MUTE_BUTTON)?;
        let volume_slider_box = ensure_part(d, &volume_box, "div", VOLUME_SLIDER_CLASS)?;
        let volume_slider = ensure_slider(d, &volume_slider_box)?;
        let time_display = ensure_part(d, &buttons, "div", TIME_DISPLAY_CLASS)?;
        let view_count = ensure_part(d, &buttons, "div", VIEW_COUNT_CLASS)?;
        let menu_button = ensure_button(d, &buttons, MENU_BUTTON_CLASS, icons::MENU_BUTTON)?;
        let fullscreen_button =
            ensure_button(d, &buttons, FULLSCREEN_BUTTON_CLASS, icons::FULLSCREEN_BUTTON)?;

        let mut widget = Self {
            dom,
            container,
            video,
            root,
            play_button,
            fullscreen_button,
            menu_button,
            host_fullscreen: None,
            seek_bar: SeekBar::new(scrubber, time_display),
            volume: VolumeControl::new(mute_button, volume_slider),
            view_count: ViewCount::new(view_count),
            looping: LoopGuard::new(),
        };

        widget.rebind_host_mute(session.mute_button.clone());
        widget.rebind_host_slider(session.volume_slider.clone());
        widget.rebind_fullscreen(session.fullscreen_button.clone());
        widget.sync_video(session.settings());
        widget.set_view_count_visible(session.settings().show_view_count);
        widget.refresh_view_count();

        Ok(widget)
    }

    pub fn handles(&self) -> OverlayHandles<D::Element> {
        OverlayHandles {
            root: self.root.clone(),
            play_button: self.play_button.clone(),
            scrubber: self.seek_bar.slider().clone(),
            volume_slider: self.volume.slider().clone(),
            mute_button: self.volume.mute_button().clone(),
            fullscreen_button: self.fullscreen_button.clone(),
            menu_button: self.menu_button.clone(),
        }
    }

    pub fn container(&self) -> &D::Element {
        &self.container
    }

    pub fn video(&self) -> &D::Element {
        &self.video
    }

    pub fn root(&self) -> &D::Element {
        &self.root
    }

    pub fn seek_bar(&self) -> &SeekBar<D::Element> {
        &self.seek_bar
    }

    pub fn loop_guard(&self) -> &LoopGuard {
        &self.looping
    }

    // === Rebinding ===

    /// Point the widget at a replacement video element.
    pub fn rebind_video(&mut self, video: D::Element, settings: &Settings) {
        if video == self.video {
            return;
        }
        debug!("Rebinding overlay to a new video element");
        self.video = video;
        self.seek_bar.reset();
        self.looping.reset();
        self.sync_video(settings);
    }

    pub fn rebind_host_mute(&mut self, host_mute: Option<D::Element>) {
        self.volume.rebind_host_mute(host_mute);
    }

    pub fn rebind_host_slider(&mut self, host_slider: Option<D::Element>) {
        self.volume.rebind_host_slider(self.dom.as_ref(), host_slider);
    }

    /// Reveal the fullscreen button only while a host button backs it.
    pub fn rebind_fullscreen(&mut self, host_fullscreen: Option<D::Element>) {
        let dom = self.dom.as_ref();
        if host_fullscreen.is_some() {
            dom.remove_attribute(&self.fullscreen_button, HIDDEN_ATTRIBUTE);
        } else {
            dom.set_attribute(&self.fullscreen_button, HIDDEN_ATTRIBUTE, "");
        }
        self.host_fullscreen = host_fullscreen;
    }

    // === Playback ===

    pub fn toggle_play(&self) {
        let dom = self.dom.as_ref();
        if dom.paused(&self.video) {
            dom.play(&self.video);
        } else {
            dom.pause(&self.video);
        }
        self.refresh_play_state();
    }

    pub fn refresh_play_state(&self) {
        let playing = !self.dom.paused(&self.video);
        self.dom.set_attribute(
            &self.play_button,
            PLAYING_ATTRIBUTE,
            if playing { "true" } else { "false" },
        );
    }

    pub fn on_time_update(&mut self, settings: &Settings) {
        let dom = self.dom.as_ref();
        self.seek_bar.on_time_update(dom, &self.video);
        self.looping
            .on_time_update(dom, &self.video, settings.disable_infinite_loop);
    }

    pub fn scrub_input(&mut self) {
        self.seek_bar.on_input(self.dom.as_ref(), &self.video);
    }

    pub fn scrub_release(&mut self) {
        self.seek_bar.on_release(self.dom.as_ref(), &self.video);
    }

    /// Relative seek clamped to `[0, duration]`.
    pub fn seek_by(&self, delta: f64) {
        let dom = self.dom.as_ref();
        let duration = dom.duration(&self.video);
        let target = (dom.current_time(&self.video) + delta).max(0.0);
        let target = if duration.is_finite() {
            target.min(duration)
        } else {
            target
        };
        dom.set_current_time(&self.video, target);
        self.seek_bar.sync(dom, &self.video);
    }

    pub fn seek_to_fraction(&self, fraction: f64) {
        let dom = self.dom.as_ref();
        let duration = dom.duration(&self.video);
        if !duration.is_finite() {
            debug!("Ignoring fractional seek before the duration is known");
            return;
        }
        dom.set_current_time(&self.video, duration * fraction);
        self.seek_bar.sync(dom, &self.video);
    }

    pub fn on_ended(&self, settings: &Settings) {
        self.looping
            .on_ended(self.dom.as_ref(), &self.video, settings.disable_infinite_loop);
        self.refresh_play_state();
    }

    pub fn on_loop_attribute(&self, settings: &Settings) {
        self.looping
            .on_loop_attribute(self.dom.as_ref(), &self.video, settings.disable_infinite_loop);
    }

    pub fn apply_loop_setting(&self, settings: &Settings) {
        self.looping
            .on_setting(self.dom.as_ref(), &self.video, settings.disable_infinite_loop);
    }

    /// Carry the saved level into a freshly loaded item.
    pub fn on_loaded_metadata(&self, settings: &Settings) {
        let dom = self.dom.as_ref();
        if let Some(saved) = settings.saved_volume_value
            && (dom.volume(&self.video) - saved).abs() > f64::EPSILON
        {
            debug!("Re-applying saved volume {}", saved);
            dom.set_volume(&self.video, saved);
        }
        self.seek_bar.sync(dom, &self.video);
    }

    // === Volume ===

    pub fn volume_input(&self) {
        self.volume.on_input(self.dom.as_ref(), &self.video);
    }

    pub fn host_volume_changed(&self) {
        self.volume.on_host_change(self.dom.as_ref());
    }

    pub fn mute_clicked(&self) {
        self.volume.on_mute_click(self.dom.as_ref());
    }

    pub fn step_volume(&self, delta: f64) -> f64 {
        self.volume.step(self.dom.as_ref(), &self.video, delta)
    }

    /// Refresh the icon; returns the level worth persisting, if any.
    pub fn on_volume_change(&self) -> Option<f64> {
        let dom = self.dom.as_ref();
        self.volume.update_icon(dom, &self.video);
        (!dom.muted(&self.video)).then(|| dom.volume(&self.video))
    }

    // === Fullscreen / view count ===

    pub fn fullscreen_clicked(&self) {
        match &self.host_fullscreen {
            Some(host) => self.dom.click(host),
            None => debug!("Fullscreen clicked without a host fullscreen button"),
        }
    }

    pub fn refresh_view_count(&self) -> bool {
        self.view_count.refresh(self.dom.as_ref())
    }

    pub fn set_view_count_visible(&self, visible: bool) {
        self.view_count.set_visible(self.dom.as_ref(), visible);
    }

    fn sync_video(&mut self, settings: &Settings) {
        let dom = self.dom.as_ref();
        self.refresh_play_state();
        self.seek_bar.sync(dom, &self.video);
        self.volume.update_icon(dom, &self.video);
        self.looping
            .on_time_update(dom, &self.video, settings.disable_infinite_loop);
    }
}

/// Selector for a single class name.
pub fn class_selector(class: &str) -> Result<Selector> {
    Selector::parse(&format!(".{}", class))
}

/// Overlay slider position as a percentage.
fn read_percent<D: Dom>(dom: &D, slider: &D::Element) -> Option<f64> {
    dom.input_value(slider)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
}

fn find_part<D: Dom>(dom: &D, parent: &D::Element, class: &str) -> Result<Option<D::Element>> {
    Ok(dom.query_selector(Some(parent), &class_selector(class)?))
}

fn create_part<D: Dom>(dom: &D, parent: &D::Element, tag: &str, class: &str) -> Result<D::Element> {
    let part = dom.create_element(tag)?;
    dom.add_class(&part, class);
    dom.append_child(parent, &part)?;
    Ok(part)
}

/// Find the part with `class` under `parent`, creating it when missing.
fn ensure_part<D: Dom>(dom: &D, parent: &D::Element, tag: &str, class: &str) -> Result<D::Element> {
    match find_part(dom, parent, class)? {
        Some(existing) => Ok(existing),
        None => create_part(dom, parent, tag, class),
    }
}

fn ensure_button<D: Dom>(
    dom: &D,
    parent: &D::Element,
    class: &str,
    icon: &str,
) -> Result<D::Element> {
    if let Some(existing) = find_part(dom, parent, class)? {
        return Ok(existing);
    }
    let button = create_part(dom, parent, "button", class)?;
    dom.set_inner_html(&button, icon);
    Ok(button)
}

fn ensure_slider<D: Dom>(dom: &D, parent: &D::Element) -> Result<D::Element> {
    if let Some(existing) = find_part(dom, parent, SLIDER_CLASS)? {
        return Ok(existing);
    }
    let slider = create_part(dom, parent, "input", SLIDER_CLASS)?;
    dom.set_attribute(&slider, "type", "range");
    dom.set_attribute(&slider, "min", "0");
    dom.set_attribute(&slider, "max", "100");
    dom.set_input_value(&slider, "0");
    Ok(slider)
}
