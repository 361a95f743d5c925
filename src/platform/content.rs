//! Content script entry point: builds the orchestrator over the live page,
//! starts the mutation observer and wires browser events into it.

use anyhow::{Context, anyhow};
use futures::future::LocalBoxFuture;
use js_sys::Array;
use std::rc::Rc;
use tracing::{debug, error, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Element, Event, KeyboardEvent, MutationObserver, MutationObserverInit,
    MutationRecord,
};

use super::browser_dom::BrowserDom;
use super::chrome::{self, SyncStorage};
use super::logging;
use super::scheduler::BrowserScheduler;
use crate::app::{ContentScript, InputSink, KeySink, ListenerRegistry, Platform, Spawner};
use crate::dom::{KeyEvent, KeyOutcome};
use crate::locator::DomLocator;
use crate::player::{MediaEvent, OverlayHandles, OverlayInput};
use crate::services::LivenessGuard;
use crate::watcher::{AttributeChange, MutationBatch};

type Script = ContentScript<BrowserDom, DomLocator<BrowserDom>>;

#[wasm_bindgen(js_name = runContentScript)]
pub fn run_content_script() {
    logging::init();
    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = boot().await {
            error!("Content script failed to start: {:#}", e);
        }
    });
}

async fn boot() -> anyhow::Result<()> {
    let dom = Rc::new(BrowserDom::new()?);
    // A re-injected script must not trust markers left by its predecessor.
    let instance = format!("{}", js_sys::Date::now() as u64);
    let locator = Rc::new(DomLocator::with_instance(dom.clone(), instance));

    let spawner: Spawner = Rc::new(|future: LocalBoxFuture<'static, ()>| {
        wasm_bindgen_futures::spawn_local(future)
    });
    let platform = Platform {
        scheduler: Rc::new(BrowserScheduler::new()?),
        store: Rc::new(SyncStorage),
        registry: Rc::new(BrowserRegistry { dom: dom.clone() }),
        spawner,
        guard: LivenessGuard::new(chrome::is_context_alive),
    };

    let script = ContentScript::load(dom, locator, platform).await;
    script.start();
    observe(&script).context("starting mutation observer")?;

    let receiver = script.clone();
    chrome::on_runtime_message(move |message| receiver.on_message(message));

    info!("Content script ready");
    Ok(())
}

fn observe(script: &Rc<Script>) -> anyhow::Result<()> {
    let root = script
        .watcher()
        .observation_root()
        .ok_or_else(|| anyhow!("no element to observe"))?;

    let target = script.clone();
    let callback = Closure::<dyn Fn(Array, MutationObserver)>::new(
        move |records: Array, _observer: MutationObserver| {
            target.on_mutations(&to_batch(&records));
        },
    );
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
        .map_err(|e| anyhow!("MutationObserver: {:?}", e))?;
    callback.forget();

    let filter: Array = script
        .watcher()
        .attribute_filter()
        .into_iter()
        .map(JsValue::from_str)
        .collect();
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    init.set_attributes(true);
    init.set_attribute_filter(&filter);

    observer
        .observe_with_options(&root, &init)
        .map_err(|e| anyhow!("observe: {:?}", e))?;
    debug!("Observing <{}>", root.tag_name().to_lowercase());
    Ok(())
}

fn to_batch(records: &Array) -> MutationBatch<Element> {
    let mut batch = MutationBatch::default();
    for record in records.iter() {
        let record: MutationRecord = record.unchecked_into();
        match record.type_().as_str() {
            "childList" => {
                let nodes = record.added_nodes();
                batch.added.extend(
                    (0..nodes.length())
                        .filter_map(|i| nodes.get(i))
                        .filter_map(|node| node.dyn_into::<Element>().ok()),
                );
            }
            "attributes" => {
                if let Some(name) = record.attribute_name()
                    && let Some(target) = record.target()
                    && let Ok(target) = target.dyn_into::<Element>()
                {
                    batch.attributes.push(AttributeChange { target, name });
                }
            }
            _ => {}
        }
    }
    batch
}

/// Registers DOM listeners for the orchestrator. Listeners live as long as
/// the page, so their closures are leaked.
struct BrowserRegistry {
    dom: Rc<BrowserDom>,
}

fn listen(target: &Element, event: &str, capture: bool, handler: impl Fn(Event) + 'static) {
    let callback = Closure::<dyn Fn(Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_capture(capture);
    if let Err(e) = target.add_event_listener_with_callback_and_add_event_listener_options(
        event,
        callback.as_ref().unchecked_ref(),
        &options,
    ) {
        error!("Failed to listen for {}: {:?}", event, e);
        return;
    }
    callback.forget();
}

fn forward<E: Clone + 'static>(sink: &InputSink<E>, input: OverlayInput<E>) -> impl Fn(Event) + 'static {
    let sink = sink.clone();
    move |_| sink(input.clone())
}

fn key_event(event: &KeyboardEvent) -> KeyEvent {
    KeyEvent {
        key: event.key(),
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
    }
}

impl ListenerRegistry<Element> for BrowserRegistry {
    fn listen_keyboard(&self, sink: KeySink) {
        let callback = Closure::<dyn Fn(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if sink(&key_event(&event)) == KeyOutcome::Handled {
                event.prevent_default();
                event.stop_propagation();
                event.stop_immediate_propagation();
            }
        });
        if let Err(e) = self.dom.document().add_event_listener_with_callback_and_bool(
            "keydown",
            callback.as_ref().unchecked_ref(),
            true,
        ) {
            error!("Failed to listen for keydown: {:?}", e);
            return;
        }
        callback.forget();
    }

    fn wire_overlay(&self, handles: &OverlayHandles<Element>, sink: InputSink<Element>) {
        // Clicks on the overlay must not reach the host's play/pause surface.
        listen(&handles.root, "click", false, |event| event.stop_propagation());

        listen(&handles.play_button, "click", false, forward(&sink, OverlayInput::PlayClicked));
        listen(&handles.scrubber, "input", false, forward(&sink, OverlayInput::ScrubInput));
        listen(&handles.scrubber, "change", false, forward(&sink, OverlayInput::ScrubRelease));
        listen(&handles.volume_slider, "input", false, forward(&sink, OverlayInput::VolumeInput));
        listen(&handles.mute_button, "click", false, forward(&sink, OverlayInput::MuteClicked));
        listen(
            &handles.fullscreen_button,
            "click",
            false,
            forward(&sink, OverlayInput::FullscreenClicked),
        );
        listen(&handles.menu_button, "click", false, forward(&sink, OverlayInput::MenuClicked));
    }

    fn listen_video(&self, video: &Element, sink: InputSink<Element>) {
        for event in MediaEvent::ALL {
            let input = OverlayInput::Media {
                event,
                source: video.clone(),
            };
            listen(video, event.event_name(), false, forward(&sink, input));
        }
    }

    fn listen_host_volume(&self, slider: &Element, sink: InputSink<Element>) {
        let input = OverlayInput::HostVolumeChanged {
            source: slider.clone(),
        };
        listen(slider, "change", false, forward(&sink, input));
    }
}
