//! Mutation Watcher: turns observer deliveries into discovery events.
//!
//! The platform owns the actual `MutationObserver` and converts each
//! delivery into a [`MutationBatch`]. [`MutationWatcher::process`] runs the
//! locator against the added subtrees and the watched attributes and returns
//! the events in the order the binder must see them.

use std::rc::Rc;
use tracing::{debug, trace};

use crate::locator::{ElementKind, Locate};

/// Kinds reported through [`WatchEvent::Found`].
const DISCOVERED_KINDS: [ElementKind; 5] = [
    ElementKind::Video,
    ElementKind::Container,
    ElementKind::MuteButton,
    ElementKind::VolumeSlider,
    ElementKind::FullscreenButton,
];

/// Attributes whose changes are forwarded, per element kind.
const WATCHED_ATTRIBUTES: &[(ElementKind, &str)] =
    &[(ElementKind::Video, "loop"), (ElementKind::Video, "src")];

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange<E> {
    pub target: E,
    pub name: String,
}

/// One observer delivery: top-level added nodes and attribute records.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationBatch<E> {
    pub added: Vec<E>,
    pub attributes: Vec<AttributeChange<E>>,
}

impl<E> Default for MutationBatch<E> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

impl<E> MutationBatch<E> {
    pub fn added(nodes: impl IntoIterator<Item = E>) -> Self {
        Self {
            added: nodes.into_iter().collect(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(target: E, name: impl Into<String>) -> Self {
        Self {
            added: Vec::new(),
            attributes: vec![AttributeChange {
                target,
                name: name.into(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.attributes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent<E> {
    /// The player root was (re)inserted; configuration markers need
    /// re-applying.
    PageRootInserted(E),
    /// The host rebuilt its volume controls; bound mute/slider references
    /// are stale.
    ControlFamilyReset(E),
    Found {
        kind: ElementKind,
        element: E,
    },
    AttributeChanged {
        kind: ElementKind,
        element: E,
        name: String,
    },
}

pub trait WatchHandler<E> {
    fn on_watch_event(&mut self, event: WatchEvent<E>);
}

pub struct MutationWatcher<L> {
    locator: Rc<L>,
}

impl<L: Locate> MutationWatcher<L> {
    pub fn new(locator: Rc<L>) -> Self {
        Self { locator }
    }

    /// Best subtree to observe: the Shorts feed when mounted, else the
    /// broader application root.
    pub fn observation_root(&self) -> Option<L::Element> {
        let root = self
            .locator
            .locate(ElementKind::ShortsContainer)
            .or_else(|| self.locator.locate(ElementKind::AppRoot));
        debug!("Observation root: {:?}", root);
        root
    }

    /// Attribute names the platform observer must report.
    pub fn attribute_filter(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = WATCHED_ATTRIBUTES.iter().map(|(_, n)| *n).collect();
        names.dedup();
        names
    }

    pub fn process(&self, batch: &MutationBatch<L::Element>) -> Vec<WatchEvent<L::Element>> {
        let mut events = Vec::new();

        for node in &batch.added {
            if let Some(root) = self.locator.locate_within(ElementKind::PageRoot, node) {
                push_unique(&mut events, WatchEvent::PageRootInserted(root));
            }

            // Reset first so the rediscovered controls below replace the
            // stale ones instead of being cleared by it.
            if let Some(family) = self.locator.locate_within(ElementKind::ControlFamily, node) {
                push_unique(&mut events, WatchEvent::ControlFamilyReset(family));
            }

            for kind in DISCOVERED_KINDS {
                if let Some(element) = self.locator.locate_within(kind, node) {
                    push_unique(&mut events, WatchEvent::Found { kind, element });
                }
            }
        }

        for change in &batch.attributes {
            for (kind, name) in WATCHED_ATTRIBUTES {
                if change.name == *name && self.locator.is_kind(*kind, &change.target) {
                    push_unique(
                        &mut events,
                        WatchEvent::AttributeChanged {
                            kind: *kind,
                            element: change.target.clone(),
                            name: change.name.clone(),
                        },
                    );
                }
            }
        }

        if !events.is_empty() {
            trace!("Mutation batch produced {} events", events.len());
        }
        events
    }

    pub fn deliver(
        &self,
        batch: &MutationBatch<L::Element>,
        handler: &mut impl WatchHandler<L::Element>,
    ) {
        for event in self.process(batch) {
            handler.on_watch_event(event);
        }
    }
}

fn push_unique<E: PartialEq>(events: &mut Vec<WatchEvent<E>>, event: WatchEvent<E>) {
    if !events.contains(&event) {
        events.push(event);
    }
}
