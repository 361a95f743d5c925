//! Headless document used by tests and the scripted page builder.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Side effects the
//! host would observe (clicks, dispatched `input` events, alerts) are logged
//! so callers can assert on them.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use super::selector::ElementView;
use super::{Dom, Media, Selector};
use crate::utils::errors::{OverlayError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct MediaState {
    pub paused: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub muted: bool,
    pub looping: bool,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            muted: false,
            looping: false,
        }
    }
}

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    text: Option<String>,
    inner_html: Option<String>,
    style: HashMap<String, String>,
    computed_style: HashMap<String, String>,
    value: Option<String>,
    content_editable: bool,
    media: Option<MediaState>,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
    document: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    location: String,
    clicks: Vec<NodeId>,
    inputs: Vec<NodeId>,
    alerts: Vec<String>,
}

impl Tree {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        let media = (tag.eq_ignore_ascii_case("video") || tag.eq_ignore_ascii_case("audio"))
            .then(MediaState::default);
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            media,
            ..Node::default()
        });
        id
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.node(node).parent;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn media(&self, id: NodeId) -> MediaState {
        self.node(id).media.clone().unwrap_or_default()
    }

    fn media_mut(&mut self, id: NodeId) -> &mut MediaState {
        self.node_mut(id).media.get_or_insert_with(MediaState::default)
    }
}

impl ElementView<NodeId> for Tree {
    fn tag(&self, node: NodeId) -> Option<String> {
        if node == self.document {
            return None;
        }
        Some(self.node(node).tag.clone())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node).attributes.get(name).cloned()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent.filter(|p| *p != self.document)
    }
}

#[derive(Debug)]
pub struct MemoryDom {
    tree: RefCell<Tree>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new("https://www.youtube.com/")
    }
}

impl MemoryDom {
    /// Empty document with a `<body>` at the given location.
    pub fn new(location: &str) -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            document: NodeId(0),
            body: NodeId(0),
            focused: None,
            location: location.to_string(),
            clicks: Vec::new(),
            inputs: Vec::new(),
            alerts: Vec::new(),
        };
        let document = tree.push("#document");
        let body = tree.push("body");
        tree.node_mut(body).parent = Some(document);
        tree.node_mut(document).children.push(body);
        tree.document = document;
        tree.body = body;

        Self {
            tree: RefCell::new(tree),
        }
    }

    pub fn body(&self) -> NodeId {
        self.tree.borrow().body
    }

    /// Create a detached element with an optional id and class list.
    pub fn element(&self, tag: &str, id: Option<&str>, classes: &[&str]) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let node = tree.push(tag);
        if let Some(id) = id {
            tree.node_mut(node)
                .attributes
                .insert("id".to_string(), id.to_string());
        }
        if !classes.is_empty() {
            tree.node_mut(node)
                .attributes
                .insert("class".to_string(), classes.join(" "));
        }
        node
    }

    /// Append `child` under `parent`, moving it if it is already attached.
    pub fn append(&self, parent: NodeId, child: NodeId) {
        let mut tree = self.tree.borrow_mut();
        tree.detach(child);
        tree.node_mut(child).parent = Some(parent);
        tree.node_mut(parent).children.push(child);
    }

    pub fn remove(&self, node: NodeId) {
        self.tree.borrow_mut().detach(node);
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(node).parent
    }

    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.borrow().node(node).children.clone()
    }

    pub fn set_location(&self, location: &str) {
        self.tree.borrow_mut().location = location.to_string();
    }

    pub fn focus(&self, node: Option<NodeId>) {
        self.tree.borrow_mut().focused = node;
    }

    pub fn set_content_editable(&self, node: NodeId, editable: bool) {
        self.tree.borrow_mut().node_mut(node).content_editable = editable;
    }

    pub fn set_computed_style(&self, node: NodeId, property: &str, value: &str) {
        self.tree
            .borrow_mut()
            .node_mut(node)
            .computed_style
            .insert(property.to_string(), value.to_string());
    }

    pub fn inline_style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree.borrow().node(node).style.get(property).cloned()
    }

    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().node(node).inner_html.clone()
    }

    pub fn media_state(&self, node: NodeId) -> MediaState {
        self.tree.borrow().media(node)
    }

    /// Mutate playback state directly, the way the host page would.
    pub fn update_media(&self, node: NodeId, update: impl FnOnce(&mut MediaState)) {
        update(self.tree.borrow_mut().media_mut(node));
    }

    pub fn clicks(&self) -> Vec<NodeId> {
        self.tree.borrow().clicks.clone()
    }

    pub fn click_count(&self, node: NodeId) -> usize {
        self.tree.borrow().clicks.iter().filter(|c| **c == node).count()
    }

    pub fn dispatched_inputs(&self) -> Vec<NodeId> {
        self.tree.borrow().inputs.clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.tree.borrow().alerts.clone()
    }
}

impl Dom for MemoryDom {
    type Element = NodeId;

    fn query_selector(&self, scope: Option<&NodeId>, selector: &Selector) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let root = scope.copied().unwrap_or(tree.document);
        tree.descendants(root)
            .into_iter()
            .find(|node| selector.matches_with(*node, &*tree))
    }

    fn query_selector_all(&self, scope: Option<&NodeId>, selector: &Selector) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let root = scope.copied().unwrap_or(tree.document);
        tree.descendants(root)
            .into_iter()
            .filter(|node| selector.matches_with(*node, &*tree))
            .collect()
    }

    fn matches(&self, element: &NodeId, selector: &Selector) -> bool {
        let tree = self.tree.borrow();
        selector.matches_with(*element, &*tree)
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .node(*element)
            .attributes
            .get("class")
            .is_some_and(|c| c.split_whitespace().any(|token| token == class))
    }

    fn add_class(&self, element: &NodeId, class: &str) {
        if self.has_class(element, class) {
            return;
        }
        let mut tree = self.tree.borrow_mut();
        let classes = tree
            .node_mut(*element)
            .attributes
            .entry("class".to_string())
            .or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.tree.borrow().node(*element).attributes.get(name).cloned()
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        self.tree
            .borrow_mut()
            .node_mut(*element)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, element: &NodeId, name: &str) {
        self.tree
            .borrow_mut()
            .node_mut(*element)
            .attributes
            .remove(name);
    }

    fn create_element(&self, tag: &str) -> Result<NodeId> {
        if tag.is_empty() {
            return Err(OverlayError::dom("cannot create an element without a tag"));
        }
        Ok(self.tree.borrow_mut().push(tag))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<()> {
        {
            let tree = self.tree.borrow();
            if parent == child || tree.is_ancestor(*child, *parent) {
                return Err(OverlayError::dom("cannot append a node inside itself"));
            }
        }
        self.append(*parent, *child);
        Ok(())
    }

    fn text(&self, element: &NodeId) -> Option<String> {
        let tree = self.tree.borrow();
        let mut text = tree.node(*element).text.clone().unwrap_or_default();
        for child in tree.descendants(*element) {
            if let Some(t) = &tree.node(child).text {
                text.push_str(t);
            }
        }
        Some(text)
    }

    fn set_text(&self, element: &NodeId, text: &str) {
        self.tree.borrow_mut().node_mut(*element).text = Some(text.to_string());
    }

    fn set_inner_html(&self, element: &NodeId, html: &str) {
        self.tree.borrow_mut().node_mut(*element).inner_html = Some(html.to_string());
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        self.tree
            .borrow_mut()
            .node_mut(*element)
            .style
            .insert(property.to_string(), value.to_string());
    }

    fn computed_style(&self, element: &NodeId, property: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let node = tree.node(*element);
        node.computed_style
            .get(property)
            .or_else(|| node.style.get(property))
            .cloned()
    }

    fn input_value(&self, element: &NodeId) -> Option<String> {
        self.tree.borrow().node(*element).value.clone()
    }

    fn set_input_value(&self, element: &NodeId, value: &str) {
        self.tree.borrow_mut().node_mut(*element).value = Some(value.to_string());
    }

    fn dispatch_input(&self, element: &NodeId) {
        self.tree.borrow_mut().inputs.push(*element);
    }

    fn click(&self, element: &NodeId) {
        self.tree.borrow_mut().clicks.push(*element);
    }

    fn is_connected(&self, element: &NodeId) -> bool {
        let tree = self.tree.borrow();
        *element == tree.document || tree.is_ancestor(tree.document, *element)
    }

    fn active_element(&self) -> Option<NodeId> {
        self.tree.borrow().focused
    }

    fn tag_name(&self, element: &NodeId) -> String {
        self.tree.borrow().node(*element).tag.to_ascii_uppercase()
    }

    fn is_content_editable(&self, element: &NodeId) -> bool {
        self.tree.borrow().node(*element).content_editable
    }

    fn location(&self) -> String {
        self.tree.borrow().location.clone()
    }

    fn alert(&self, message: &str) {
        self.tree.borrow_mut().alerts.push(message.to_string());
    }
}

impl Media for MemoryDom {
    fn paused(&self, video: &NodeId) -> bool {
        self.tree.borrow().media(*video).paused
    }

    fn play(&self, video: &NodeId) {
        self.tree.borrow_mut().media_mut(*video).paused = false;
    }

    fn pause(&self, video: &NodeId) {
        self.tree.borrow_mut().media_mut(*video).paused = true;
    }

    fn current_time(&self, video: &NodeId) -> f64 {
        self.tree.borrow().media(*video).current_time
    }

    fn set_current_time(&self, video: &NodeId, seconds: f64) {
        self.tree.borrow_mut().media_mut(*video).current_time = seconds;
    }

    fn duration(&self, video: &NodeId) -> f64 {
        self.tree.borrow().media(*video).duration
    }

    fn volume(&self, video: &NodeId) -> f64 {
        self.tree.borrow().media(*video).volume
    }

    fn set_volume(&self, video: &NodeId, volume: f64) {
        self.tree.borrow_mut().media_mut(*video).volume = volume.clamp(0.0, 1.0);
    }

    fn muted(&self, video: &NodeId) -> bool {
        self.tree.borrow().media(*video).muted
    }

    fn looping(&self, video: &NodeId) -> bool {
        self.tree.borrow().media(*video).looping
    }

    fn set_looping(&self, video: &NodeId, looping: bool) {
        self.tree.borrow_mut().media_mut(*video).looping = looping;
    }
}
