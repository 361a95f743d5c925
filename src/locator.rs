//! Element Locator: finds the host elements the overlay binds to.
//!
//! Lookups are driven by [`LOOKUP_TABLE`], an ordered list of candidates per
//! [`ElementKind`]. The host ships several markup variants at once, so the
//! first matching candidate wins and a miss is a normal outcome.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{error, trace};

use crate::constants::BOUND_ATTRIBUTE;
use crate::dom::{Dom, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// Root of the Shorts feed; preferred mutation observation root.
    ShortsContainer,
    /// Broader observation root used when the Shorts feed is not mounted yet.
    AppRoot,
    /// Player root that carries the configuration marker attributes.
    PageRoot,
    Video,
    /// Element the overlay is appended to.
    Container,
    MuteButton,
    VolumeSlider,
    FullscreenButton,
    /// Wrapper the host re-inserts whenever it rebuilds its volume controls.
    ControlFamily,
    MenuButton,
}

impl ElementKind {
    /// Kinds the binder tracks through discovery.
    pub const TRACKED: [ElementKind; 6] = [
        ElementKind::PageRoot,
        ElementKind::Video,
        ElementKind::Container,
        ElementKind::MuteButton,
        ElementKind::VolumeSlider,
        ElementKind::FullscreenButton,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortsContainer => "shorts-container",
            Self::AppRoot => "app-root",
            Self::PageRoot => "page-root",
            Self::Video => "video",
            Self::Container => "container",
            Self::MuteButton => "mute-button",
            Self::VolumeSlider => "volume-slider",
            Self::FullscreenButton => "fullscreen-button",
            Self::ControlFamily => "control-family",
            Self::MenuButton => "menu-button",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selector to try for a kind.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub selector: Selector,
    /// Class token the match must carry exactly. Substring selectors also hit
    /// sibling controls whose class names share a prefix.
    pub exact_class: Option<&'static str>,
}

const RAW_TABLE: &[(ElementKind, &str, Option<&str>)] = &[
    (ElementKind::ShortsContainer, "ytd-shorts", None),
    (ElementKind::ShortsContainer, "#shorts-container", None),
    (ElementKind::AppRoot, "ytd-page-manager", None),
    (ElementKind::AppRoot, "ytd-app", None),
    (ElementKind::AppRoot, "body", None),
    (ElementKind::PageRoot, "#shorts-player", None),
    (ElementKind::Video, "#shorts-player video", None),
    (ElementKind::Video, "ytd-reel-video-renderer[is-active] video", None),
    (ElementKind::Container, "ytd-reel-video-renderer[is-active] #player-container", None),
    (ElementKind::Container, "#shorts-player", None),
    (ElementKind::ControlFamily, "desktop-shorts-volume-controls", None),
    (
        ElementKind::ControlFamily,
        "[class*=VolumeControlsHost]",
        Some("YtdDesktopShortsVolumeControlsHost"),
    ),
    (
        ElementKind::MuteButton,
        "desktop-shorts-volume-controls button.YtdDesktopShortsVolumeControlsMuteIconButton",
        None,
    ),
    (
        ElementKind::MuteButton,
        "[class*=VolumeControlsMuteIconButton]",
        Some("YtdDesktopShortsVolumeControlsMuteIconButton"),
    ),
    (
        ElementKind::VolumeSlider,
        "desktop-shorts-volume-controls input.ytdVolumeControlsNativeSlider",
        None,
    ),
    (
        ElementKind::VolumeSlider,
        "[class*=VolumeControlsNativeSlider]",
        Some("ytdVolumeControlsNativeSlider"),
    ),
    (
        ElementKind::FullscreenButton,
        "ytd-reel-video-renderer[is-active] .fullscreen-action-menu button",
        None,
    ),
    (
        ElementKind::FullscreenButton,
        "[class*=FullscreenButton] button",
        None,
    ),
    (
        ElementKind::MenuButton,
        "ytd-reel-video-renderer[is-active] #menu-button button",
        None,
    ),
    (ElementKind::MenuButton, "ytd-shorts #menu-button button", None),
];

/// Candidates per kind, in priority order.
pub static LOOKUP_TABLE: Lazy<HashMap<ElementKind, Vec<Candidate>>> = Lazy::new(|| {
    let mut table: HashMap<ElementKind, Vec<Candidate>> = HashMap::new();
    for (kind, css, exact_class) in RAW_TABLE {
        match Selector::parse(css) {
            Ok(selector) => table.entry(*kind).or_default().push(Candidate {
                selector,
                exact_class: *exact_class,
            }),
            Err(e) => error!("Dropping lookup candidate for {}: {}", kind, e),
        }
    }
    table
});

fn candidates(kind: ElementKind) -> &'static [Candidate] {
    LOOKUP_TABLE.get(&kind).map(Vec::as_slice).unwrap_or(&[])
}

/// Capability the binder and watcher use to find host elements.
pub trait Locate {
    type Element: Clone + PartialEq + fmt::Debug;

    /// Search the whole document.
    fn locate(&self, kind: ElementKind) -> Option<Self::Element>;

    /// Search `scope` itself, then its subtree.
    fn locate_within(&self, kind: ElementKind, scope: &Self::Element) -> Option<Self::Element>;

    /// Whether `element` itself satisfies a candidate for `kind`.
    fn is_kind(&self, kind: ElementKind, element: &Self::Element) -> bool;

    /// Record that `element` has been bound as `kind`.
    fn mark_bound(&self, kind: ElementKind, element: &Self::Element);

    fn is_bound(&self, kind: ElementKind, element: &Self::Element) -> bool;
}

/// [`Locate`] over any [`Dom`] using [`LOOKUP_TABLE`].
///
/// Bound markers carry an instance tag so a re-injected content script does
/// not mistake the previous instance's markers for its own.
pub struct DomLocator<D> {
    dom: Rc<D>,
    instance: String,
}

impl<D: Dom> DomLocator<D> {
    pub fn new(dom: Rc<D>) -> Self {
        Self::with_instance(dom, "0")
    }

    pub fn with_instance(dom: Rc<D>, instance: impl Into<String>) -> Self {
        Self {
            dom,
            instance: instance.into(),
        }
    }

    fn marker(&self, kind: ElementKind) -> String {
        format!("{}:{}", kind.as_str(), self.instance)
    }

    fn accepts(&self, candidate: &Candidate, element: &D::Element) -> bool {
        match candidate.exact_class {
            Some(class) => self.dom.has_class(element, class),
            None => true,
        }
    }

    fn first_match(&self, candidate: &Candidate, scope: Option<&D::Element>) -> Option<D::Element> {
        if candidate.exact_class.is_none() {
            return self.dom.query_selector(scope, &candidate.selector);
        }
        self.dom
            .query_selector_all(scope, &candidate.selector)
            .into_iter()
            .find(|el| self.accepts(candidate, el))
    }
}

impl<D: Dom> Locate for DomLocator<D> {
    type Element = D::Element;

    fn locate(&self, kind: ElementKind) -> Option<D::Element> {
        let found = candidates(kind)
            .iter()
            .find_map(|candidate| self.first_match(candidate, None));
        if found.is_none() {
            trace!("No {} in document", kind);
        }
        found
    }

    fn locate_within(&self, kind: ElementKind, scope: &D::Element) -> Option<D::Element> {
        if self.is_kind(kind, scope) {
            return Some(scope.clone());
        }
        candidates(kind)
            .iter()
            .find_map(|candidate| self.first_match(candidate, Some(scope)))
    }

    fn is_kind(&self, kind: ElementKind, element: &D::Element) -> bool {
        candidates(kind).iter().any(|candidate| {
            self.dom.matches(element, &candidate.selector) && self.accepts(candidate, element)
        })
    }

    fn mark_bound(&self, kind: ElementKind, element: &D::Element) {
        self.dom
            .set_attribute(element, BOUND_ATTRIBUTE, &self.marker(kind));
    }

    fn is_bound(&self, kind: ElementKind, element: &D::Element) -> bool {
        self.dom.attribute(element, BOUND_ATTRIBUTE) == Some(self.marker(kind))
    }
}
