//! Content script orchestrator.
//!
//! Owns the binder and runs the effects it queues: registering listeners
//! through the platform's [`ListenerRegistry`], arming the navigation
//! re-check, requesting animation frames and persisting settings. Every
//! entry point goes through the liveness guard first.

use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

use crate::config::{Settings, SettingsChanges, SettingsPatch};
use crate::dom::{KeyEvent, KeyOutcome, Media};
use crate::locator::Locate;
use crate::player::{Binder, BinderState, Effect, OverlayHandles, OverlayInput};
use crate::services::{LivenessGuard, NavigationNotice, Scheduler, SettingsStore, TimerSlot};
use crate::watcher::{MutationBatch, MutationWatcher};

pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;
pub type KeySink = Rc<dyn Fn(&KeyEvent) -> KeyOutcome>;
pub type InputSink<E> = Rc<dyn Fn(OverlayInput<E>)>;

/// Platform side of event wiring. Each call registers one listener that
/// forwards into the given sink.
pub trait ListenerRegistry<E> {
    /// Capturing key listener on the document. A `Handled` outcome must fully
    /// suppress the event.
    fn listen_keyboard(&self, sink: KeySink);

    /// Click/input/change listeners on the overlay's own parts.
    fn wire_overlay(&self, handles: &OverlayHandles<E>, sink: InputSink<E>);

    /// Media events on a video element, tagged with that element as source.
    fn listen_video(&self, video: &E, sink: InputSink<E>);

    /// `change` on the host volume slider.
    fn listen_host_volume(&self, slider: &E, sink: InputSink<E>);
}

/// Everything the orchestrator needs from its environment.
pub struct Platform<E> {
    pub scheduler: Rc<dyn Scheduler>,
    pub store: Rc<dyn SettingsStore>,
    pub registry: Rc<dyn ListenerRegistry<E>>,
    pub spawner: Spawner,
    pub guard: LivenessGuard,
}

pub struct ContentScript<D: Media, L> {
    weak_self: Weak<Self>,
    binder: Rc<RefCell<Binder<D, L>>>,
    watcher: MutationWatcher<L>,
    platform: Platform<D::Element>,
    recheck: TimerSlot,
}

impl<D, L> ContentScript<D, L>
where
    D: Media + 'static,
    L: Locate<Element = D::Element> + 'static,
{
    pub fn new(
        dom: Rc<D>,
        locator: Rc<L>,
        settings: Settings,
        platform: Platform<D::Element>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            weak_self: weak_self.clone(),
            binder: Rc::new(RefCell::new(Binder::new(dom, locator.clone(), settings))),
            watcher: MutationWatcher::new(locator),
            platform,
            recheck: TimerSlot::new(),
        })
    }

    /// Read settings from the store, then build. Storage failures fall back
    /// to defaults; the change listener reconciles later writes.
    pub async fn load(
        dom: Rc<D>,
        locator: Rc<L>,
        platform: Platform<D::Element>,
    ) -> Rc<Self> {
        let settings = match platform.store.get().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to read settings, using defaults: {}", e);
                Settings::default()
            }
        };
        Self::new(dom, locator, settings, platform)
    }

    pub fn watcher(&self) -> &MutationWatcher<L> {
        &self.watcher
    }

    pub fn state(&self) -> BinderState {
        self.binder.borrow().state()
    }

    /// Read access to the binder, for inspection.
    pub fn binder(&self) -> std::cell::Ref<'_, Binder<D, L>> {
        self.binder.borrow()
    }

    /// Subscribe to settings changes and run the first discovery pass.
    pub fn start(&self) {
        let weak = self.weak_self.clone();
        self.platform.store.on_change(Box::new(move |changes| {
            if let Some(this) = weak.upgrade() {
                this.on_settings_changed(changes);
            }
        }));

        info!("Content script starting");
        self.with_binder(|binder| binder.start());
    }

    pub fn on_mutations(&self, batch: &MutationBatch<D::Element>) {
        if batch.is_empty() {
            return;
        }
        self.with_binder(|binder| {
            self.watcher.deliver(batch, binder);
            binder.note_document_mutation();
        });
    }

    /// Runtime message from the background context. Anything that is not a
    /// navigation notice is ignored.
    pub fn on_message(&self, message: Value) {
        let Some(notice) = NavigationNotice::from_message(message) else {
            trace!("Ignoring unrelated runtime message");
            return;
        };
        self.with_binder(|binder| binder.on_navigation(&notice));
    }

    pub fn on_input(&self, input: OverlayInput<D::Element>) {
        self.with_binder(|binder| binder.dispatch(input));
    }

    pub fn on_key(&self, event: &KeyEvent) -> KeyOutcome {
        self.with_binder(|binder| binder.handle_key(event))
            .unwrap_or(KeyOutcome::Ignored)
    }

    pub fn on_settings_changed(&self, changes: &SettingsChanges) {
        self.with_binder(|binder| {
            let changed = binder.apply_settings(changes);
            if !changed.is_empty() {
                debug!("Settings changed: {:?}", changed);
            }
        });
    }

    /// Run `f` against the binder and execute whatever it queued.
    ///
    /// Events raised synchronously by the binder's own DOM writes arrive
    /// while it is borrowed; those are dropped.
    fn with_binder<R>(&self, f: impl FnOnce(&mut Binder<D, L>) -> R) -> Option<R> {
        if !self.platform.guard.is_alive() {
            return None;
        }
        let (result, effects) = {
            let Ok(mut binder) = self.binder.try_borrow_mut() else {
                trace!("Dropping re-entrant event");
                return None;
            };
            let result = f(&mut binder);
            (result, binder.take_effects())
        };
        for effect in effects {
            self.execute(effect);
        }
        Some(result)
    }

    fn execute(&self, effect: Effect<D::Element>) {
        let registry = &self.platform.registry;
        match effect {
            Effect::ListenKeyboard => {
                debug!("Registering keyboard shortcuts");
                registry.listen_keyboard(self.key_sink());
            }
            Effect::WireOverlay(handles) => {
                registry.wire_overlay(&handles, self.input_sink());
            }
            Effect::ListenVideo(video) => {
                registry.listen_video(&video, self.input_sink());
            }
            Effect::ListenHostVolume(slider) => {
                registry.listen_host_volume(&slider, self.input_sink());
            }
            Effect::ScheduleRecheck(delay) => {
                let weak = self.weak_self.clone();
                self.recheck.arm(
                    self.platform.scheduler.as_ref(),
                    delay,
                    Box::new(move || {
                        if let Some(this) = weak.upgrade() {
                            this.recheck.fired();
                            this.with_binder(|binder| binder.recheck());
                        }
                    }),
                );
            }
            Effect::RequestViewCountFrame => {
                let weak = self.weak_self.clone();
                self.platform
                    .scheduler
                    .request_animation_frame(Box::new(move || {
                        if let Some(this) = weak.upgrade() {
                            this.with_binder(|binder| binder.refresh_view_count());
                        }
                    }));
            }
            Effect::Persist(patch) => self.persist(patch),
        }
    }

    fn persist(&self, patch: SettingsPatch) {
        let store = self.platform.store.clone();
        let guard = self.platform.guard.clone();
        (self.platform.spawner)(Box::pin(async move {
            if !guard.is_alive() {
                return;
            }
            if let Err(e) = store.set(patch).await {
                warn!("Failed to persist settings: {}", e);
            }
        }));
    }

    fn input_sink(&self) -> InputSink<D::Element> {
        let weak = self.weak_self.clone();
        Rc::new(move |input| {
            if let Some(this) = weak.upgrade() {
                this.on_input(input);
            }
        })
    }

    fn key_sink(&self) -> KeySink {
        let weak = self.weak_self.clone();
        Rc::new(move |event| match weak.upgrade() {
            Some(this) => this.on_key(event),
            None => KeyOutcome::Ignored,
        })
    }
}
