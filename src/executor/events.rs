//! Event emission capability
//!
//! Every test exposes a stream of zero or more `status` events followed by
//! exactly one `finished` event. [`EventBus`] is the single implementation
//! of the [`Emitter`] capability; `Test` delegates to it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::models::StatusSignal;

/// Event published by a running test
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestEvent {
    Status(StatusSignal),
    Finished,
}

impl TestEvent {
    pub fn as_status(&self) -> Option<&StatusSignal> {
        match self {
            TestEvent::Status(signal) => Some(signal),
            TestEvent::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TestEvent::Finished)
    }
}

pub type Listener = Rc<dyn Fn(&TestEvent)>;

/// Subscribe/emit capability
pub trait Emitter {
    fn subscribe(&self, listener: Listener);

    fn emit(&self, event: &TestEvent);

    /// Subscribe to status signals only
    fn on_status(&self, handler: impl Fn(&StatusSignal) + 'static)
    where
        Self: Sized,
    {
        self.subscribe(Rc::new(move |event: &TestEvent| {
            if let TestEvent::Status(signal) = event {
                handler(signal);
            }
        }));
    }

    /// Subscribe to the terminal `finished` event only
    fn on_finished(&self, handler: impl Fn() + 'static)
    where
        Self: Sized,
    {
        self.subscribe(Rc::new(move |event: &TestEvent| {
            if event.is_finished() {
                handler();
            }
        }));
    }
}

/// Listener list shared by every clone
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Drop every listener
    pub fn clear(&self) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        drop(listeners);
    }
}

impl Emitter for EventBus {
    fn subscribe(&self, listener: Listener) {
        self.listeners.borrow_mut().push(listener);
    }

    fn emit(&self, event: &TestEvent) {
        // Listeners may subscribe or emit again while being notified
        let snapshot: Vec<Listener> = self.listeners.borrow().clone();
        for listener in snapshot {
            listener(event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
