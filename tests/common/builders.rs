use shorts_controls::dom::{Dom, MemoryDom, NodeId};
use shorts_controls::watcher::MutationBatch;
use std::rc::Rc;

pub const SHORTS_URL: &str = "https://www.youtube.com/shorts/abc123";

pub const MUTE_CLASS: &str = "YtdDesktopShortsVolumeControlsMuteIconButton";
pub const SLIDER_CLASS: &str = "ytdVolumeControlsNativeSlider";

/// Pieces of the host player that can arrive separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    /// `#shorts-player` with the player container and video inside.
    Player,
    Mute,
    Slider,
    Fullscreen,
    Menu,
    ViewCount,
}

/// Host markup for one active Shorts item, built over [`MemoryDom`].
pub struct ShortsPage {
    pub dom: Rc<MemoryDom>,
    pub shorts: NodeId,
    pub renderer: NodeId,
    pub page_root: NodeId,
    pub container: NodeId,
    pub video: NodeId,
    pub controls: NodeId,
    pub mute: NodeId,
    pub slider: NodeId,
    pub fullscreen: NodeId,
    pub menu: NodeId,
    pub view_count: NodeId,
}

impl ShortsPage {
    pub fn node(&self, part: Part) -> NodeId {
        match part {
            Part::Player => self.page_root,
            Part::Mute => self.mute,
            Part::Slider => self.slider,
            Part::Fullscreen => self.fullscreen,
            Part::Menu => self.menu,
            Part::ViewCount => self.view_count,
        }
    }

    fn parent(&self, part: Part) -> NodeId {
        match part {
            Part::Mute | Part::Slider => self.controls,
            Part::Fullscreen | Part::Menu => self.renderer,
            Part::Player | Part::ViewCount => self.renderer,
        }
    }

    /// Attach `part` and return the batch an observer would report for it.
    pub fn insert(&self, part: Part) -> MutationBatch<NodeId> {
        let node = self.node(part);
        let wrapper = match part {
            // The host wraps these buttons; the wrapper is what gets added.
            Part::Fullscreen | Part::Menu => self.dom.parent_of(node).unwrap_or(node),
            _ => node,
        };
        self.dom.append(self.parent(part), wrapper);
        MutationBatch::added([wrapper])
    }

    /// Host rebuilds its volume controls: the old family goes away and a new
    /// one with fresh mute and slider elements is inserted.
    pub fn rebuild_volume_controls(&mut self) -> MutationBatch<NodeId> {
        self.dom.remove(self.controls);
        let controls = self.dom.element("desktop-shorts-volume-controls", None, &[]);
        let mute = self.dom.element("button", None, &[MUTE_CLASS]);
        let slider = self.dom.element("input", None, &[SLIDER_CLASS]);
        self.dom.set_input_value(&slider, "50");
        self.dom.append(controls, mute);
        self.dom.append(controls, slider);
        self.dom.append(self.renderer, controls);
        self.controls = controls;
        self.mute = mute;
        self.slider = slider;
        MutationBatch::added([controls])
    }

    /// Replace the volume control family with an empty one; the new mute
    /// button and slider are returned for the test to insert later.
    pub fn reset_volume_controls(&mut self) -> (MutationBatch<NodeId>, NodeId, NodeId) {
        self.dom.remove(self.controls);
        let controls = self.dom.element("desktop-shorts-volume-controls", None, &[]);
        self.dom.append(self.renderer, controls);
        self.controls = controls;
        let mute = self.dom.element("button", None, &[MUTE_CLASS]);
        let slider = self.dom.element("input", None, &[SLIDER_CLASS]);
        self.dom.set_input_value(&slider, "50");
        (MutationBatch::added([controls]), mute, slider)
    }

    pub fn overlay_count(&self) -> usize {
        let selector = shorts_controls::dom::Selector::parse(".shorts-ctl-controls").unwrap();
        self.dom.query_selector_all(None, &selector).len()
    }
}

pub struct PageBuilder {
    location: String,
    duration: f64,
    host_volume: &'static str,
    view_count: Option<&'static str>,
    attached: Vec<Part>,
}

impl PageBuilder {
    /// Every part attached.
    pub fn shorts() -> Self {
        Self {
            location: SHORTS_URL.to_string(),
            duration: 30.0,
            host_volume: "50",
            view_count: None,
            attached: vec![Part::Player, Part::Mute, Part::Slider, Part::Fullscreen],
        }
    }

    /// Only the feed and the active renderer; parts arrive via
    /// [`ShortsPage::insert`].
    pub fn empty() -> Self {
        Self {
            attached: Vec::new(),
            ..Self::shorts()
        }
    }

    pub fn at(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn host_volume(mut self, percent: &'static str) -> Self {
        self.host_volume = percent;
        self
    }

    pub fn with_view_count(mut self, label: &'static str) -> Self {
        self.view_count = Some(label);
        self.attached.push(Part::ViewCount);
        self
    }

    pub fn with_menu(mut self) -> Self {
        self.attached.push(Part::Menu);
        self
    }

    pub fn without(mut self, part: Part) -> Self {
        self.attached.retain(|p| *p != part);
        self
    }

    pub fn build(self) -> ShortsPage {
        let dom = Rc::new(MemoryDom::new(&self.location));

        let shorts = dom.element("ytd-shorts", None, &[]);
        let renderer = dom.element("ytd-reel-video-renderer", None, &[]);
        dom.set_attribute(&renderer, "is-active", "");
        dom.append(dom.body(), shorts);
        dom.append(shorts, renderer);

        let page_root = dom.element("div", Some("shorts-player"), &[]);
        let container = dom.element("div", Some("player-container"), &[]);
        let video = dom.element("video", None, &[]);
        dom.append(page_root, container);
        dom.append(container, video);
        let duration = self.duration;
        dom.update_media(video, |m| m.duration = duration);

        let controls = dom.element("desktop-shorts-volume-controls", None, &[]);
        dom.append(renderer, controls);
        let mute = dom.element("button", None, &[MUTE_CLASS]);
        let slider = dom.element("input", None, &[SLIDER_CLASS]);
        dom.set_input_value(&slider, self.host_volume);

        let fullscreen_menu = dom.element("div", None, &["fullscreen-action-menu"]);
        let fullscreen = dom.element("button", None, &[]);
        dom.append(fullscreen_menu, fullscreen);

        let menu_wrapper = dom.element("div", Some("menu-button"), &[]);
        let menu = dom.element("button", None, &[]);
        dom.append(menu_wrapper, menu);

        let view_count = dom.element("view-count-factoid-renderer", None, &[]);
        if let Some(label) = self.view_count {
            dom.set_attribute(&view_count, "aria-label", label);
        }

        let page = ShortsPage {
            dom,
            shorts,
            renderer,
            page_root,
            container,
            video,
            controls,
            mute,
            slider,
            fullscreen,
            menu,
            view_count,
        };
        for part in self.attached {
            page.insert(part);
        }
        page
    }
}
