//! Notification bus
//!
//! A small signal-style emitter shared between the controller and whoever
//! aggregates notes. The owner creates it, hands an `Rc` to the controller
//! and subscribes its own listeners.
//!
//! ```
//! use caret_notes::bus::{Notification, NotificationBus};
//!
//! let bus = NotificationBus::new();
//! let id = bus.subscribe(|notification| {
//!     println!("{}", notification.name());
//! });
//! assert_eq!(bus.subscriber_count(), 1);
//! bus.unsubscribe(id);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;

use crate::annotation::Annotation;

/// Events published on the bus
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum Notification {
    /// A keyboard-created annotation was saved by the user
    AnnotationCreated(Annotation),
}

impl Notification {
    pub fn name(&self) -> &'static str {
        match self {
            Notification::AnnotationCreated(_) => "annotationCreated",
        }
    }
}

/// Handle returned by [`NotificationBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<RefCell<dyn FnMut(&Notification)>>;

#[derive(Default)]
pub struct NotificationBus {
    handlers: RefCell<Vec<(SubscriptionId, Handler)>>,
    next_id: Cell<u64>,
}

impl NotificationBus {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Notification) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let handler: Handler = Rc::new(RefCell::new(handler));
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Returns `false` if the subscription was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Deliver `notification` to every current subscriber, in subscription
    /// order.
    ///
    /// Handlers may subscribe or unsubscribe while running. A handler that
    /// publishes to itself is skipped for the nested delivery.
    pub fn publish(&self, notification: &Notification) {
        let snapshot: Vec<(SubscriptionId, Handler)> = self.handlers.borrow().clone();

        tracing::debug!(
            event = notification.name(),
            subscribers = snapshot.len(),
            "Publishing notification"
        );

        for (id, handler) in snapshot {
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(notification),
                Err(_) => tracing::warn!(
                    event = notification.name(),
                    subscription = id.0,
                    "Skipping re-entrant delivery"
                ),
            }
        }
    }
}
