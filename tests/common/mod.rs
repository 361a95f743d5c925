pub mod builders;
pub mod mocks;

use builders::ShortsPage;
use mocks::{QueuedSpawner, RecordingRegistry};
use shorts_controls::app::{ContentScript, Platform};
use shorts_controls::config::Settings;
use shorts_controls::dom::MemoryDom;
use shorts_controls::locator::DomLocator;
use shorts_controls::services::{LivenessGuard, ManualScheduler, MemorySettingsStore};
use std::cell::Cell;
use std::rc::Rc;

pub type Script = ContentScript<MemoryDom, DomLocator<MemoryDom>>;

/// A content script running headless over a [`ShortsPage`].
pub struct TestContext {
    pub page: ShortsPage,
    pub scheduler: Rc<ManualScheduler>,
    pub store: Rc<MemorySettingsStore>,
    pub registry: Rc<RecordingRegistry>,
    pub spawner: QueuedSpawner,
    pub alive: Rc<Cell<bool>>,
    pub script: Rc<Script>,
}

impl TestContext {
    pub fn new(page: ShortsPage) -> Self {
        Self::with_settings(page, Settings::default())
    }

    pub fn with_settings(page: ShortsPage, settings: Settings) -> Self {
        let scheduler = ManualScheduler::new();
        let store = Rc::new(MemorySettingsStore::new());
        let registry = Rc::new(RecordingRegistry::default());
        let spawner = QueuedSpawner::default();
        let alive = Rc::new(Cell::new(true));

        let platform = Platform {
            scheduler: scheduler.clone(),
            store: store.clone(),
            registry: registry.clone(),
            spawner: spawner.spawner(),
            guard: LivenessGuard::from_flag(alive.clone()),
        };
        let locator = Rc::new(DomLocator::new(page.dom.clone()));
        let script = ContentScript::new(page.dom.clone(), locator, settings, platform);

        Self {
            page,
            scheduler,
            store,
            registry,
            spawner,
            alive,
            script,
        }
    }

    /// Build and start in one go.
    pub fn started(page: ShortsPage) -> Self {
        let ctx = Self::new(page);
        ctx.script.start();
        ctx
    }
}
