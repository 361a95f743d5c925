use once_cell::sync::Lazy;
use tracing::{debug, error};

use crate::constants::HIDDEN_ATTRIBUTE;
use crate::dom::{Dom, Selector};

/// Where the count is read from once a strategy's selector matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Text,
    Attribute(&'static str),
}

#[derive(Debug)]
struct Strategy {
    selector: Selector,
    extraction: Extraction,
}

const RAW_STRATEGIES: &[(&str, Extraction)] = &[
    (
        "ytd-reel-video-renderer[is-active] view-count-factoid-renderer",
        Extraction::Attribute("aria-label"),
    ),
    (
        "ytd-reel-video-renderer[is-active] #factoids .ytwFactoidRendererValue",
        Extraction::Text,
    ),
    ("ytd-shorts #view-count", Extraction::Text),
    (
        "ytd-reel-video-renderer[is-active] [aria-label*=views]",
        Extraction::Attribute("aria-label"),
    ),
];

static STRATEGIES: Lazy<Vec<Strategy>> = Lazy::new(|| {
    RAW_STRATEGIES
        .iter()
        .filter_map(|(css, extraction)| match Selector::parse(css) {
            Ok(selector) => Some(Strategy {
                selector,
                extraction: *extraction,
            }),
            Err(e) => {
                error!("Dropping view count strategy: {}", e);
                None
            }
        })
        .collect()
});

/// First non-empty view count text on the page, trying each strategy in
/// order.
pub fn extract_view_count<D: Dom>(dom: &D) -> Option<String> {
    STRATEGIES.iter().find_map(|strategy| {
        let element = dom.query_selector(None, &strategy.selector)?;
        let raw = match strategy.extraction {
            Extraction::Text => dom.text(&element),
            Extraction::Attribute(name) => dom.attribute(&element, name),
        }?;
        let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    })
}

#[derive(Debug)]
pub struct ViewCount<E> {
    element: E,
}

impl<E: Clone> ViewCount<E> {
    pub fn new(element: E) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    /// Re-read the count. A miss clears the label until the next attempt.
    pub fn refresh<D: Dom<Element = E>>(&self, dom: &D) -> bool {
        match extract_view_count(dom) {
            Some(text) => {
                if dom.text(&self.element).as_deref() != Some(text.as_str()) {
                    dom.set_text(&self.element, &text);
                }
                true
            }
            None => {
                debug!("No view count found on the page");
                dom.set_text(&self.element, "");
                false
            }
        }
    }

    pub fn set_visible<D: Dom<Element = E>>(&self, dom: &D, visible: bool) {
        if visible {
            dom.remove_attribute(&self.element, HIDDEN_ATTRIBUTE);
        } else {
            dom.set_attribute(&self.element, HIDDEN_ATTRIBUTE, "");
        }
    }
}
