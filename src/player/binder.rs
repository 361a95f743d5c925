//! Control Surface Binder.
//!
//! Accumulates discovered host elements into the [`PlayerSession`], builds
//! the overlay once video, container, mute button and slider are all known,
//! and afterwards forwards replacement elements into the existing widget.
//!
//! The binder never touches listeners, timers or storage itself. Anything
//! that needs the platform is queued as an [`Effect`] and drained by the
//! content script with [`Binder::take_effects`].

use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::config::{SettingKey, Settings, SettingsChanges, SettingsPatch};
use crate::constants::NAVIGATION_RECHECK_DELAY;
use crate::dom::{KeyEvent, KeyOutcome, Media, is_user_typing};
use crate::locator::{ElementKind, Locate};
use crate::player::keyboard::{self, KeyContext, Shortcut};
use crate::player::overlay::{MediaEvent, OverlayHandles, OverlayInput, OverlayWidget};
use crate::player::session::PlayerSession;
use crate::services::NavigationNotice;
use crate::services::messages::is_shorts_url;
use crate::watcher::{WatchEvent, WatchHandler};

pub const MENU_NOT_FOUND_MESSAGE: &str = "Could not find the menu button for this video.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderState {
    /// Not started yet.
    Empty,
    /// Started; none of the required elements found.
    Discovering,
    /// Some required elements known, overlay not built.
    Partial,
    /// Overlay built and wired.
    Active,
}

/// Work the binder needs the platform to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<E> {
    /// Register the document key listener. Emitted at most once.
    ListenKeyboard,
    WireOverlay(OverlayHandles<E>),
    /// Listen to the video's media events.
    ListenVideo(E),
    /// Listen to `change` on the host volume slider.
    ListenHostVolume(E),
    /// Call [`Binder::recheck`] after the delay, replacing any pending one.
    ScheduleRecheck(Duration),
    /// Call [`Binder::refresh_view_count`] on the next animation frame.
    RequestViewCountFrame,
    Persist(SettingsPatch),
}

pub struct Binder<D: Media, L> {
    dom: Rc<D>,
    locator: Rc<L>,
    session: PlayerSession<D::Element>,
    state: BinderState,
    overlay: Option<OverlayWidget<D>>,
    wired_roots: Vec<D::Element>,
    view_count_pending: bool,
    effects: Vec<Effect<D::Element>>,
}

impl<D, L> Binder<D, L>
where
    D: Media,
    L: Locate<Element = D::Element>,
{
    pub fn new(dom: Rc<D>, locator: Rc<L>, settings: Settings) -> Self {
        Self {
            dom,
            locator,
            session: PlayerSession::new(settings),
            state: BinderState::Empty,
            overlay: None,
            wired_roots: Vec::new(),
            view_count_pending: false,
            effects: Vec::new(),
        }
    }

    pub fn state(&self) -> BinderState {
        self.state
    }

    pub fn session(&self) -> &PlayerSession<D::Element> {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        self.session.settings()
    }

    pub fn overlay(&self) -> Option<&OverlayWidget<D>> {
        self.overlay.as_ref()
    }

    pub fn take_effects(&mut self) -> Vec<Effect<D::Element>> {
        std::mem::take(&mut self.effects)
    }

    /// First discovery pass after injection.
    pub fn start(&mut self) {
        if self.state == BinderState::Empty {
            info!("Binder started at {}", self.dom.location());
            self.state = BinderState::Discovering;
        }
        self.discover();
    }

    /// Look up every tracked kind in the whole document.
    pub fn discover(&mut self) {
        for kind in ElementKind::TRACKED {
            if let Some(element) = self.locator.locate(kind) {
                self.adopt(kind, element);
            }
        }
        self.apply_markers();
        self.advance();
    }

    /// Fallback for navigations the mutation observer missed.
    pub fn on_navigation(&mut self, notice: &NavigationNotice) {
        if self.state == BinderState::Active {
            trace!("Navigation to {} while active", notice.new_url);
            return;
        }
        debug!(
            "Navigation to {}; re-checking in {:?}",
            notice.new_url, NAVIGATION_RECHECK_DELAY
        );
        self.effects
            .push(Effect::ScheduleRecheck(NAVIGATION_RECHECK_DELAY));
    }

    pub fn recheck(&mut self) {
        debug!("Re-checking page (state {:?})", self.state);
        self.discover();
    }

    fn adopt(&mut self, kind: ElementKind, element: D::Element) {
        let replaced = self.session.set(kind, element.clone());

        match kind {
            ElementKind::PageRoot => {
                if replaced {
                    debug!("Page root bound");
                    self.apply_markers();
                }
            }
            ElementKind::Video => {
                if let Some(overlay) = self.overlay.as_mut() {
                    if replaced {
                        overlay.rebind_video(element.clone(), self.session.config.current());
                    }
                    self.listen_video(&element);
                }
            }
            ElementKind::Container => {
                if replaced
                    && let Some(overlay) = &self.overlay
                    && overlay.container() != &element
                {
                    info!("Container replaced; building a new overlay for it");
                    self.overlay = None;
                    self.state = BinderState::Partial;
                }
            }
            ElementKind::MuteButton => {
                if replaced && let Some(overlay) = self.overlay.as_mut() {
                    debug!("Rebinding host mute button");
                    overlay.rebind_host_mute(Some(element.clone()));
                }
                if !self.locator.is_bound(kind, &element) {
                    self.locator.mark_bound(kind, &element);
                }
            }
            ElementKind::VolumeSlider => {
                if replaced && let Some(overlay) = self.overlay.as_mut() {
                    debug!("Rebinding host volume slider");
                    overlay.rebind_host_slider(Some(element.clone()));
                }
                if !self.locator.is_bound(kind, &element) {
                    self.locator.mark_bound(kind, &element);
                    self.effects.push(Effect::ListenHostVolume(element));
                }
            }
            ElementKind::FullscreenButton => {
                if replaced && let Some(overlay) = self.overlay.as_mut() {
                    debug!("Host fullscreen button available");
                    overlay.rebind_fullscreen(Some(element.clone()));
                }
                if !self.locator.is_bound(kind, &element) {
                    self.locator.mark_bound(kind, &element);
                }
            }
            _ => {}
        }
    }

    fn listen_video(&mut self, video: &D::Element) {
        if !self.locator.is_bound(ElementKind::Video, video) {
            self.locator.mark_bound(ElementKind::Video, video);
            self.effects.push(Effect::ListenVideo(video.clone()));
        }
    }

    /// Move towards `Active` as far as the session allows.
    fn advance(&mut self) {
        if self.state == BinderState::Active {
            return;
        }
        if self.session.is_complete() {
            self.activate();
        } else if self.session.has_any() {
            self.state = BinderState::Partial;
        } else if self.state != BinderState::Empty {
            self.state = BinderState::Discovering;
        }
    }

    fn activate(&mut self) {
        let widget = match OverlayWidget::attach(self.dom.clone(), &self.session) {
            Ok(widget) => widget,
            Err(e) => {
                warn!("Failed to build overlay: {}", e);
                self.state = BinderState::Partial;
                return;
            }
        };

        let handles = widget.handles();
        if !self.wired_roots.contains(&handles.root) {
            self.wired_roots.push(handles.root.clone());
            self.effects.push(Effect::WireOverlay(handles));
        }
        self.overlay = Some(widget);
        self.state = BinderState::Active;
        info!("Overlay active");

        if let Some(video) = self.session.video.clone() {
            self.listen_video(&video);
        }
        if !self.session.keyboard_bound {
            self.session.keyboard_bound = true;
            self.effects.push(Effect::ListenKeyboard);
        }
    }

    fn apply_markers(&self) {
        let Some(root) = &self.session.page_root else {
            return;
        };
        for (name, on) in self.session.settings().marker_attributes() {
            self.dom
                .set_attribute(root, name, if on { "true" } else { "false" });
        }
    }

    /// Route one overlay, video or host-control event.
    pub fn dispatch(&mut self, input: OverlayInput<D::Element>) {
        if matches!(input, OverlayInput::MenuClicked) {
            self.open_menu();
            return;
        }

        let settings = self.session.config.current();
        let Some(overlay) = self.overlay.as_mut() else {
            trace!("Dropping {:?} before the overlay exists", input);
            return;
        };

        let mut persist = None;
        match input {
            OverlayInput::PlayClicked => overlay.toggle_play(),
            OverlayInput::ScrubInput => overlay.scrub_input(),
            OverlayInput::ScrubRelease => overlay.scrub_release(),
            OverlayInput::VolumeInput => overlay.volume_input(),
            OverlayInput::MuteClicked => overlay.mute_clicked(),
            OverlayInput::FullscreenClicked => overlay.fullscreen_clicked(),
            OverlayInput::MenuClicked => {}
            OverlayInput::HostVolumeChanged { source } => {
                if self.session.volume_slider.as_ref() == Some(&source) {
                    overlay.host_volume_changed();
                }
            }
            OverlayInput::Media { event, source } => {
                if overlay.video() != &source {
                    trace!("Ignoring {:?} from a replaced video", event);
                    return;
                }
                match event {
                    MediaEvent::Play | MediaEvent::Pause => overlay.refresh_play_state(),
                    MediaEvent::TimeUpdate => overlay.on_time_update(settings),
                    MediaEvent::VolumeChange => {
                        if let Some(volume) = overlay.on_volume_change()
                            && settings.saved_volume_value != Some(volume)
                        {
                            persist = Some(SettingsPatch::saved_volume(volume));
                        }
                    }
                    MediaEvent::LoadedMetadata => {
                        overlay.on_loaded_metadata(settings);
                        overlay.refresh_view_count();
                    }
                    MediaEvent::LoadedData => {
                        overlay.refresh_view_count();
                    }
                    MediaEvent::Ended => overlay.on_ended(settings),
                }
            }
        }

        if let Some(patch) = persist {
            self.persist(patch);
        }
    }

    fn open_menu(&self) {
        match self.locator.locate(ElementKind::MenuButton) {
            Some(button) => self.dom.click(&button),
            None => {
                warn!("Menu button not found");
                self.dom.alert(MENU_NOT_FOUND_MESSAGE);
            }
        }
    }

    /// Local write: update the copy now, store later.
    fn persist(&mut self, patch: SettingsPatch) {
        self.session.config.stage(&patch);
        self.effects.push(Effect::Persist(patch));
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        let settings = self.session.settings();
        let ctx = KeyContext {
            enabled: settings.enabled,
            on_shorts_page: is_shorts_url(&self.dom.location()),
            user_typing: is_user_typing(self.dom.as_ref()),
            volume_with_arrows: settings.control_volume_with_arrows,
        };

        let Some(shortcut) = keyboard::resolve(event, &ctx) else {
            return KeyOutcome::Ignored;
        };
        let Some(overlay) = &self.overlay else {
            return KeyOutcome::Ignored;
        };

        trace!("Shortcut {:?}", shortcut);
        match shortcut {
            Shortcut::TogglePlay => overlay.toggle_play(),
            Shortcut::Seek(delta) => overlay.seek_by(delta),
            Shortcut::SeekToFraction(fraction) => overlay.seek_to_fraction(fraction),
            Shortcut::Volume(delta) => {
                overlay.step_volume(delta);
            }
        }
        KeyOutcome::Handled
    }

    /// Reconcile a storage change notification and apply what changed.
    pub fn apply_settings(&mut self, changes: &SettingsChanges) -> Vec<SettingKey> {
        let changed = self.session.config.reconcile(changes);
        if changed.is_empty() {
            return changed;
        }

        if changed.iter().any(SettingKey::affects_markers) {
            self.apply_markers();
        }

        let settings = self.session.config.current();
        if let Some(overlay) = &self.overlay {
            if changed.contains(&SettingKey::DisableInfiniteLoop) {
                overlay.apply_loop_setting(settings);
            }
            if changed.contains(&SettingKey::ShowViewCount) {
                overlay.set_view_count_visible(settings.show_view_count);
            }
        }

        if changed.contains(&SettingKey::Enabled) {
            info!("Controls {}", if settings.enabled { "enabled" } else { "disabled" });
            self.discover();
        }
        changed
    }

    /// Any document mutation; coalesces view count refreshes to one per
    /// frame.
    pub fn note_document_mutation(&mut self) {
        if self.overlay.is_none() || !self.session.settings().show_view_count {
            return;
        }
        if !self.view_count_pending {
            self.view_count_pending = true;
            self.effects.push(Effect::RequestViewCountFrame);
        }
    }

    pub fn refresh_view_count(&mut self) {
        self.view_count_pending = false;
        if let Some(overlay) = &self.overlay {
            overlay.refresh_view_count();
        }
    }
}

impl<D, L> WatchHandler<D::Element> for Binder<D, L>
where
    D: Media,
    L: Locate<Element = D::Element>,
{
    fn on_watch_event(&mut self, event: WatchEvent<D::Element>) {
        match event {
            WatchEvent::PageRootInserted(root) => {
                self.adopt(ElementKind::PageRoot, root);
                self.discover();
            }
            WatchEvent::ControlFamilyReset(_) => {
                debug!("Host volume controls reset");
                self.session.invalidate_volume_controls();
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.rebind_host_mute(None);
                    overlay.rebind_host_slider(None);
                }
                self.advance();
            }
            WatchEvent::Found { kind, element } => {
                trace!("Found {}", kind);
                self.adopt(kind, element);
                self.advance();
            }
            WatchEvent::AttributeChanged {
                kind: ElementKind::Video,
                element,
                name,
            } => match name.as_str() {
                "loop" => {
                    if let Some(overlay) = &self.overlay
                        && overlay.video() == &element
                    {
                        overlay.on_loop_attribute(self.session.config.current());
                    }
                }
                "src" => {
                    debug!("Video source changed");
                    self.discover();
                }
                _ => {}
            },
            WatchEvent::AttributeChanged { .. } => {}
        }
    }
}
