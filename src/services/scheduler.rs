//! Timers and animation frames.
//!
//! The browser implementation wraps `setTimeout` and
//! `requestAnimationFrame`; [`ManualScheduler`] drives the same contract by
//! hand in tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler {
    fn set_timeout(&self, delay: Duration, task: Task) -> TimerId;
    fn clear_timeout(&self, id: TimerId);
    fn request_animation_frame(&self, task: Task);
}

/// Holds at most one pending timer of a kind; arming it again cancels the
/// previous one.
#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Cell<Option<TimerId>>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&self, scheduler: &dyn Scheduler, delay: Duration, task: Task) {
        if let Some(previous) = self.pending.take() {
            trace!("Superseding timer {:?}", previous);
            scheduler.clear_timeout(previous);
        }
        self.pending.set(Some(scheduler.set_timeout(delay, task)));
    }

    /// Forget the pending timer once it has fired.
    pub fn fired(&self) {
        self.pending.set(None);
    }

    pub fn cancel(&self, scheduler: &dyn Scheduler) {
        if let Some(previous) = self.pending.take() {
            scheduler.clear_timeout(previous);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.get().is_some()
    }
}

struct PendingTimer {
    id: TimerId,
    due: Duration,
    task: Task,
}

/// Scheduler advanced explicitly by the caller.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_id: Cell<i32>,
    timers: RefCell<Vec<PendingTimer>>,
    frames: RefCell<Vec<Task>>,
}

impl ManualScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Move the clock forward and run every timer that became due, in due
    /// order.
    pub fn advance(&self, by: Duration) {
        let now = self.now.get() + by;
        self.now.set(now);

        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let position = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= now)
                    .min_by_key(|(_, t)| t.due)
                    .map(|(i, _)| i);
                position.map(|i| timers.remove(i))
            };
            match next {
                Some(timer) => {
                    trace!("Firing timer {:?}", timer.id);
                    (timer.task)()
                }
                None => break,
            }
        }
    }

    /// Run the frame callbacks queued so far.
    pub fn run_frames(&self) {
        let frames: Vec<Task> = self.frames.borrow_mut().drain(..).collect();
        for frame in frames {
            frame();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.timers.borrow_mut().push(PendingTimer {
            id,
            due: self.now.get() + delay,
            task,
        });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|t| t.id != id);
    }

    fn request_animation_frame(&self, task: Task) {
        self.frames.borrow_mut().push(task);
    }
}
