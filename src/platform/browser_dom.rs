use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Event, EventInit, HtmlElement, HtmlInputElement, HtmlMediaElement, Window};

use crate::dom::{Dom, Media, Selector};
use crate::utils::errors::{OverlayError, Result};

/// [`Dom`] and [`Media`] over the live page.
pub struct BrowserDom {
    window: Window,
    document: Document,
}

impl BrowserDom {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| OverlayError::dom("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| OverlayError::dom("no document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn media(element: &Element) -> Option<&HtmlMediaElement> {
    element.dyn_ref::<HtmlMediaElement>()
}

fn elements(list: web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl Dom for BrowserDom {
    type Element = Element;

    fn query_selector(&self, scope: Option<&Element>, selector: &Selector) -> Option<Element> {
        let found = match scope {
            Some(scope) => scope.query_selector(selector.css()),
            None => self.document.query_selector(selector.css()),
        };
        found.ok().flatten()
    }

    fn query_selector_all(&self, scope: Option<&Element>, selector: &Selector) -> Vec<Element> {
        let found = match scope {
            Some(scope) => scope.query_selector_all(selector.css()),
            None => self.document.query_selector_all(selector.css()),
        };
        found.map(elements).unwrap_or_default()
    }

    fn matches(&self, element: &Element, selector: &Selector) -> bool {
        element.matches(selector.css()).unwrap_or(false)
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) {
        if let Err(e) = element.class_list().add_1(class) {
            debug!("Failed to add class {}: {:?}", class, e);
        }
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        if let Err(e) = element.set_attribute(name, value) {
            debug!("Failed to set attribute {}: {:?}", name, e);
        }
    }

    fn remove_attribute(&self, element: &Element, name: &str) {
        let _ = element.remove_attribute(name);
    }

    fn create_element(&self, tag: &str) -> Result<Element> {
        self.document
            .create_element(tag)
            .map_err(|e| OverlayError::dom(format!("create <{}>: {:?}", tag, e)))
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<()> {
        parent
            .append_child(child)
            .map(|_| ())
            .map_err(|e| OverlayError::dom(format!("append: {:?}", e)))
    }

    fn text(&self, element: &Element) -> Option<String> {
        element.text_content()
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn set_inner_html(&self, element: &Element, html: &str) {
        element.set_inner_html(html);
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        if let Some(html) = element.dyn_ref::<HtmlElement>()
            && let Err(e) = html.style().set_property(property, value)
        {
            debug!("Failed to set style {}: {:?}", property, e);
        }
    }

    fn computed_style(&self, element: &Element, property: &str) -> Option<String> {
        self.window
            .get_computed_style(element)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(property).ok())
            .filter(|value| !value.is_empty())
    }

    fn input_value(&self, element: &Element) -> Option<String> {
        element.dyn_ref::<HtmlInputElement>().map(HtmlInputElement::value)
    }

    fn set_input_value(&self, element: &Element, value: &str) {
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn dispatch_input(&self, element: &Element) {
        let init = EventInit::new();
        init.set_bubbles(true);
        match Event::new_with_event_init_dict("input", &init) {
            Ok(event) => {
                let _ = element.dispatch_event(&event);
            }
            Err(e) => debug!("Failed to create input event: {:?}", e),
        }
    }

    fn click(&self, element: &Element) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            html.click();
        }
    }

    fn is_connected(&self, element: &Element) -> bool {
        element.is_connected()
    }

    fn active_element(&self) -> Option<Element> {
        self.document.active_element()
    }

    fn tag_name(&self, element: &Element) -> String {
        element.tag_name()
    }

    fn is_content_editable(&self, element: &Element) -> bool {
        element
            .dyn_ref::<HtmlElement>()
            .is_some_and(HtmlElement::is_content_editable)
    }

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }
}

impl Media for BrowserDom {
    fn paused(&self, video: &Element) -> bool {
        media(video).is_none_or(HtmlMediaElement::paused)
    }

    fn play(&self, video: &Element) {
        let Some(media) = media(video) else {
            return;
        };
        match media.play() {
            // Autoplay policy rejections are routine.
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    debug!("play() rejected: {:?}", e);
                }
            }),
            Err(e) => debug!("play() failed: {:?}", e),
        }
    }

    fn pause(&self, video: &Element) {
        if let Some(media) = media(video)
            && let Err(e) = media.pause()
        {
            debug!("pause() failed: {:?}", e);
        }
    }

    fn current_time(&self, video: &Element) -> f64 {
        media(video).map_or(0.0, HtmlMediaElement::current_time)
    }

    fn set_current_time(&self, video: &Element, seconds: f64) {
        if let Some(media) = media(video) {
            media.set_current_time(seconds);
        }
    }

    fn duration(&self, video: &Element) -> f64 {
        media(video).map_or(0.0, HtmlMediaElement::duration)
    }

    fn volume(&self, video: &Element) -> f64 {
        media(video).map_or(0.0, HtmlMediaElement::volume)
    }

    fn set_volume(&self, video: &Element, volume: f64) {
        if let Some(media) = media(video) {
            media.set_volume(volume.clamp(0.0, 1.0));
        }
    }

    fn muted(&self, video: &Element) -> bool {
        media(video).is_some_and(HtmlMediaElement::muted)
    }

    fn looping(&self, video: &Element) -> bool {
        media(video).is_some_and(HtmlMediaElement::loop_)
    }

    fn set_looping(&self, video: &Element, looping: bool) {
        if let Some(media) = media(video) {
            media.set_loop(looping);
        }
    }
}
