//! Capability traits over the live document.
//!
//! Everything above this module talks to the page only through [`Dom`] and
//! [`Media`], so the binder and overlay run unchanged against the browser
//! (see `platform::browser_dom`) and against the headless [`MemoryDom`].

use std::fmt::Debug;

use crate::utils::errors::Result;

pub mod memory;
pub mod selector;

pub use memory::{MemoryDom, NodeId};
pub use selector::Selector;

pub trait Dom {
    /// Non-owning handle to a host or overlay element.
    type Element: Clone + PartialEq + Debug + 'static;

    /// First element in document order matching `selector`, searching the
    /// subtree of `scope` (excluding `scope` itself) or the whole document.
    fn query_selector(&self, scope: Option<&Self::Element>, selector: &Selector)
    -> Option<Self::Element>;

    fn query_selector_all(
        &self,
        scope: Option<&Self::Element>,
        selector: &Selector,
    ) -> Vec<Self::Element>;

    fn matches(&self, element: &Self::Element, selector: &Selector) -> bool;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    fn add_class(&self, element: &Self::Element, class: &str);

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);
    fn remove_attribute(&self, element: &Self::Element, name: &str);

    fn create_element(&self, tag: &str) -> Result<Self::Element>;
    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<()>;

    fn text(&self, element: &Self::Element) -> Option<String>;
    fn set_text(&self, element: &Self::Element, text: &str);
    fn set_inner_html(&self, element: &Self::Element, html: &str);

    fn set_style(&self, element: &Self::Element, property: &str, value: &str);
    /// Resolved style value, as the browser's computed style reports it.
    fn computed_style(&self, element: &Self::Element, property: &str) -> Option<String>;

    fn input_value(&self, element: &Self::Element) -> Option<String>;
    fn set_input_value(&self, element: &Self::Element, value: &str);
    /// Fire a bubbling `input` event so host listeners pick up a value we set.
    fn dispatch_input(&self, element: &Self::Element);

    fn click(&self, element: &Self::Element);
    fn is_connected(&self, element: &Self::Element) -> bool;
    fn active_element(&self) -> Option<Self::Element>;
    /// Upper-case tag name, as `Element.tagName` reports it for HTML.
    fn tag_name(&self, element: &Self::Element) -> String;
    fn is_content_editable(&self, element: &Self::Element) -> bool;

    /// Current page URL.
    fn location(&self) -> String;
    fn alert(&self, message: &str);
}

/// Playback surface of a video element.
pub trait Media: Dom {
    fn paused(&self, video: &Self::Element) -> bool;
    fn play(&self, video: &Self::Element);
    fn pause(&self, video: &Self::Element);

    fn current_time(&self, video: &Self::Element) -> f64;
    fn set_current_time(&self, video: &Self::Element, seconds: f64);
    fn duration(&self, video: &Self::Element) -> f64;

    fn volume(&self, video: &Self::Element) -> f64;
    fn set_volume(&self, video: &Self::Element, volume: f64);
    fn muted(&self, video: &Self::Element) -> bool;

    fn looping(&self, video: &Self::Element) -> bool;
    fn set_looping(&self, video: &Self::Element, looping: bool);
}

/// Platform-neutral key press.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Ctrl, Alt or Meta: combinations left to the browser.
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// Whether a key press was consumed. `Handled` tells the platform to stop
/// the event entirely so the host's own bindings never see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

/// Whether focus sits in a text entry field.
pub fn is_user_typing<D: Dom>(dom: &D) -> bool {
    let Some(active) = dom.active_element() else {
        return false;
    };

    match dom.tag_name(&active).as_str() {
        "INPUT" => dom
            .attribute(&active, "type")
            .is_none_or(|kind| TEXT_INPUT_TYPES.contains(&kind.to_ascii_lowercase().as_str())),
        "TEXTAREA" | "SELECT" => true,
        _ => dom.is_content_editable(&active),
    }
}

/// Input types that take typed text; sliders, checkboxes and buttons do not.
const TEXT_INPUT_TYPES: &[&str] = &[
    "", "text", "search", "email", "url", "tel", "password", "number",
];
