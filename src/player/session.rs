use crate::config::Settings;
use crate::locator::ElementKind;
use crate::services::SettingsBridge;

/// Host references and configuration for the item currently on screen.
///
/// References are non-owning handles into the host document. Any of them
/// may go stale when the host swaps elements; the binder replaces them as
/// discovery reports new ones.
#[derive(Debug, Clone)]
pub struct PlayerSession<E> {
    pub page_root: Option<E>,
    pub video: Option<E>,
    pub container: Option<E>,
    pub mute_button: Option<E>,
    pub volume_slider: Option<E>,
    pub fullscreen_button: Option<E>,
    pub config: SettingsBridge,
    /// Set once the document keyboard listener has been requested.
    pub keyboard_bound: bool,
}

impl<E: Clone + PartialEq> PlayerSession<E> {
    pub fn new(settings: Settings) -> Self {
        Self {
            page_root: None,
            video: None,
            container: None,
            mute_button: None,
            volume_slider: None,
            fullscreen_button: None,
            config: SettingsBridge::new(settings),
            keyboard_bound: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.config.current()
    }

    pub fn get(&self, kind: ElementKind) -> Option<&E> {
        match kind {
            ElementKind::PageRoot => self.page_root.as_ref(),
            ElementKind::Video => self.video.as_ref(),
            ElementKind::Container => self.container.as_ref(),
            ElementKind::MuteButton => self.mute_button.as_ref(),
            ElementKind::VolumeSlider => self.volume_slider.as_ref(),
            ElementKind::FullscreenButton => self.fullscreen_button.as_ref(),
            _ => None,
        }
    }

    /// Store `element` as the reference for `kind`. Returns whether it
    /// replaced a different (or missing) reference.
    pub fn set(&mut self, kind: ElementKind, element: E) -> bool {
        let slot = match kind {
            ElementKind::PageRoot => &mut self.page_root,
            ElementKind::Video => &mut self.video,
            ElementKind::Container => &mut self.container,
            ElementKind::MuteButton => &mut self.mute_button,
            ElementKind::VolumeSlider => &mut self.volume_slider,
            ElementKind::FullscreenButton => &mut self.fullscreen_button,
            _ => return false,
        };
        if slot.as_ref() == Some(&element) {
            return false;
        }
        *slot = Some(element);
        true
    }

    /// Drop the volume-control references after a host reset.
    pub fn invalidate_volume_controls(&mut self) {
        self.mute_button = None;
        self.volume_slider = None;
    }

    /// Video, container, mute button and slider are all known.
    pub fn is_complete(&self) -> bool {
        self.video.is_some()
            && self.container.is_some()
            && self.mute_button.is_some()
            && self.volume_slider.is_some()
    }

    pub fn has_any(&self) -> bool {
        self.video.is_some()
            || self.container.is_some()
            || self.mute_button.is_some()
            || self.volume_slider.is_some()
    }
}
