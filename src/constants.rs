// Names and tuning values shared between the binder, the overlay and the
// stylesheet that ships with the extension. The stylesheet reads the
// attribute names verbatim, so renaming any of them is a breaking change.

use std::time::Duration;

// === DOM markers ===

/// Class on the injected overlay root; also the idempotency marker per container.
pub const OVERLAY_CLASS: &str = "shorts-ctl-controls";
/// Attribute recording which lookup kind an element was bound as.
pub const BOUND_ATTRIBUTE: &str = "shorts-ctl-bound";

// Page-root attributes consumed by the stylesheet.
pub const ENABLED_ATTRIBUTE: &str = "shorts-ctl-enabled";
pub const ALWAYS_VISIBLE_ATTRIBUTE: &str = "shorts-ctl-always-visible";
pub const HIDE_INFO_ATTRIBUTE: &str = "shorts-ctl-hide-info";
pub const HIDE_DEFAULT_CONTROLS_ATTRIBUTE: &str = "shorts-ctl-hide-default-controls";

// Overlay part classes.
pub const SCRUBBER_CLASS: &str = "progress-bar";
pub const SCRUBBER_WRAPPER_CLASS: &str = "progress-bar-wrapper";
pub const SLIDER_CLASS: &str = "slider";
pub const BUTTONS_CLASS: &str = "control-buttons";
pub const PLAY_BUTTON_CLASS: &str = "play-button";
pub const VOLUME_CONTROL_CLASS: &str = "volume-control";
pub const MUTE_BUTTON_CLASS: &str = "mute-button";
pub const VOLUME_SLIDER_CLASS: &str = "volume-slider";
pub const TIME_DISPLAY_CLASS: &str = "time-display";
pub const VIEW_COUNT_CLASS: &str = "view-count";
pub const FULLSCREEN_BUTTON_CLASS: &str = "fullscreen-button";
pub const MENU_BUTTON_CLASS: &str = "menu-button";

// Overlay state attributes.
pub const PLAYING_ATTRIBUTE: &str = "playing";
pub const ICON_ATTRIBUTE: &str = "icon";
pub const HIDDEN_ATTRIBUTE: &str = "hidden";

// === Keyboard ===

/// Seconds moved by a left/right arrow press.
pub const SEEK_STEP_SECS: f64 = 5.0;
/// Percentage points moved by an up/down arrow press.
pub const VOLUME_STEP_PERCENT: f64 = 5.0;

// === Timing ===

/// Delay before re-checking the page after a navigation notice, in case the
/// mutation observer missed the new player.
pub const NAVIGATION_RECHECK_DELAY: Duration = Duration::from_secs(5);

// === Colors ===

pub const SCRUBBER_FILL: &str = "red";
pub const SCRUBBER_REST: &str = "rgba(255, 255, 255, 0.35)";
pub const VOLUME_FILL: &str = "white";
pub const VOLUME_REST: &str = "rgba(255, 255, 255, 0.25)";

/// Path segment identifying the Shorts page.
pub const SHORTS_PATH_SEGMENT: &str = "shorts";
