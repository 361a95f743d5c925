use futures::future::LocalBoxFuture;
use shorts_controls::app::{InputSink, KeySink, ListenerRegistry, Spawner};
use shorts_controls::dom::{KeyEvent, KeyOutcome, NodeId};
use shorts_controls::locator::{ElementKind, Locate};
use shorts_controls::player::{MediaEvent, OverlayHandles, OverlayInput};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Registry that keeps every sink so tests can fire events through the same
/// path the browser listeners would.
#[derive(Default)]
pub struct RecordingRegistry {
    pub keyboard: RefCell<Vec<KeySink>>,
    pub overlays: RefCell<Vec<(OverlayHandles<NodeId>, InputSink<NodeId>)>>,
    pub videos: RefCell<Vec<(NodeId, InputSink<NodeId>)>>,
    pub host_volumes: RefCell<Vec<(NodeId, InputSink<NodeId>)>>,
}

impl RecordingRegistry {
    pub fn keyboard_listeners(&self) -> usize {
        self.keyboard.borrow().len()
    }

    pub fn wired_overlays(&self) -> usize {
        self.overlays.borrow().len()
    }

    pub fn video_listeners(&self) -> Vec<NodeId> {
        self.videos.borrow().iter().map(|(v, _)| *v).collect()
    }

    pub fn host_volume_listeners(&self) -> Vec<NodeId> {
        self.host_volumes.borrow().iter().map(|(s, _)| *s).collect()
    }

    pub fn handles(&self) -> OverlayHandles<NodeId> {
        self.overlays.borrow().last().expect("overlay wired").0.clone()
    }

    /// Deliver a key press to the registered listener.
    pub fn press(&self, event: KeyEvent) -> KeyOutcome {
        let sink = self.keyboard.borrow().first().cloned().expect("keyboard listener");
        sink(&event)
    }

    /// Fire an overlay input as the wired overlay listeners would.
    pub fn overlay_input(&self, input: OverlayInput<NodeId>) {
        let sink = self.overlays.borrow().last().expect("overlay wired").1.clone();
        sink(input);
    }

    /// Fire a media event from `video` through its own listener.
    pub fn media(&self, video: NodeId, event: MediaEvent) {
        let sink = self
            .videos
            .borrow()
            .iter()
            .find(|(v, _)| *v == video)
            .map(|(_, sink)| sink.clone())
            .expect("video listener");
        sink(OverlayInput::Media {
            event,
            source: video,
        });
    }
}

impl ListenerRegistry<NodeId> for RecordingRegistry {
    fn listen_keyboard(&self, sink: KeySink) {
        self.keyboard.borrow_mut().push(sink);
    }

    fn wire_overlay(&self, handles: &OverlayHandles<NodeId>, sink: InputSink<NodeId>) {
        self.overlays.borrow_mut().push((handles.clone(), sink));
    }

    fn listen_video(&self, video: &NodeId, sink: InputSink<NodeId>) {
        self.videos.borrow_mut().push((*video, sink));
    }

    fn listen_host_volume(&self, slider: &NodeId, sink: InputSink<NodeId>) {
        self.host_volumes.borrow_mut().push((*slider, sink));
    }
}

/// Locator answering from a table the test fills in.
#[derive(Default)]
pub struct ScriptedLocator {
    elements: RefCell<HashMap<ElementKind, NodeId>>,
    bound: RefCell<HashSet<(ElementKind, NodeId)>>,
}

impl ScriptedLocator {
    pub fn put(&self, kind: ElementKind, element: NodeId) {
        self.elements.borrow_mut().insert(kind, element);
    }
}

impl Locate for ScriptedLocator {
    type Element = NodeId;

    fn locate(&self, kind: ElementKind) -> Option<NodeId> {
        self.elements.borrow().get(&kind).copied()
    }

    fn locate_within(&self, kind: ElementKind, _scope: &NodeId) -> Option<NodeId> {
        self.locate(kind)
    }

    fn is_kind(&self, kind: ElementKind, element: &NodeId) -> bool {
        self.locate(kind) == Some(*element)
    }

    fn mark_bound(&self, kind: ElementKind, element: &NodeId) {
        self.bound.borrow_mut().insert((kind, *element));
    }

    fn is_bound(&self, kind: ElementKind, element: &NodeId) -> bool {
        self.bound.borrow().contains(&(kind, *element))
    }
}

/// Holds spawned futures until the test runs them.
#[derive(Clone, Default)]
pub struct QueuedSpawner {
    queue: Rc<RefCell<Vec<LocalBoxFuture<'static, ()>>>>,
}

impl QueuedSpawner {
    pub fn spawner(&self) -> Spawner {
        let queue = self.queue.clone();
        Rc::new(move |future: LocalBoxFuture<'static, ()>| {
            queue.borrow_mut().push(future)
        })
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run queued futures to completion, including ones they spawn.
    pub fn run_all(&self) {
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                if queue.is_empty() {
                    break;
                }
                queue.remove(0)
            };
            futures::executor::block_on(next);
        }
    }
}
