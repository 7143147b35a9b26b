//! Typed publish/subscribe hub shared by every controller on a surface.
//!
//! DESIGN
//! ======
//! Window-level pointer move/up events are published here by the surface and
//! must reach exactly one drag owner. Owners claim the pointer slot with
//! [`EventHub::replace_all`] at gesture start, which evicts whichever
//! controller held it before. The evicted listener receives one
//! [`HubEvent::PointerLost`] so it can abandon a gesture still in progress.
//! There is no explicit release; an idle owner keeps the slot until the next
//! claim and ignores events while it is not dragging.
//!
//! All other event types are ordinary multi-listener lists. Subscriptions are
//! identified by [`Subscription`] tokens rather than by listener identity.
//!
//! Dispatch iterates a snapshot of the listener list, so a listener may
//! subscribe, unsubscribe or claim the pointer slot while being called
//! without affecting the in-flight publish.

#[cfg(test)]
#[path = "event_hub_test.rs"]
mod event_hub_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::input::{KeyEvent, PointerEvent};
use crate::shape::{ShapeHandle, ShapeId};

/// Discriminant of a [`HubEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A non-internal shape was mounted or unmounted.
    MountedOrUnmounted,
    /// Window-level pointer move or up. Single owner.
    Pointer,
    /// Window-level key-down, observed while a gesture is active.
    Key,
    /// A shape's displayed rectangle changed.
    ChildRectChanged,
    /// A shape received native focus.
    ChildFocus,
    /// A shape was shift-clicked.
    ChildToggleSelection,
}

/// An event carried by the hub.
#[derive(Clone)]
pub enum HubEvent {
    MountedOrUnmounted { handle: ShapeHandle, mounted: bool },
    Pointer(PointerEvent),
    /// Delivered once to a pointer owner evicted by a newer claim.
    PointerLost,
    Key(KeyEvent),
    ChildRectChanged { id: ShapeId, internal: bool },
    ChildFocus { id: ShapeId, internal: bool },
    ChildToggleSelection { id: ShapeId, internal: bool, pointer: PointerEvent },
}

impl HubEvent {
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::MountedOrUnmounted { .. } => EventType::MountedOrUnmounted,
            Self::Pointer(_) | Self::PointerLost => EventType::Pointer,
            Self::Key(_) => EventType::Key,
            Self::ChildRectChanged { .. } => EventType::ChildRectChanged,
            Self::ChildFocus { .. } => EventType::ChildFocus,
            Self::ChildToggleSelection { .. } => EventType::ChildToggleSelection,
        }
    }
}

impl fmt::Debug for HubEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MountedOrUnmounted { handle, mounted } => f
                .debug_struct("MountedOrUnmounted")
                .field("id", handle.id())
                .field("mounted", mounted)
                .finish(),
            Self::Pointer(ev) => f.debug_tuple("Pointer").field(ev).finish(),
            Self::PointerLost => f.write_str("PointerLost"),
            Self::Key(ev) => f.debug_tuple("Key").field(&ev.key).finish(),
            Self::ChildRectChanged { id, internal } => {
                f.debug_struct("ChildRectChanged").field("id", id).field("internal", internal).finish()
            }
            Self::ChildFocus { id, internal } => {
                f.debug_struct("ChildFocus").field("id", id).field("internal", internal).finish()
            }
            Self::ChildToggleSelection { id, internal, .. } => {
                f.debug_struct("ChildToggleSelection").field("id", id).field("internal", internal).finish()
            }
        }
    }
}

pub type Listener = Rc<dyn Fn(&HubEvent)>;

/// Opaque id of a single subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Token returned by [`EventHub::subscribe`] and [`EventHub::replace_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub event_type: EventType,
    pub id: SubscriptionId,
}

/// The publish/subscribe registry.
#[derive(Default)]
pub struct EventHub {
    next_id: Cell<u64>,
    listeners: RefCell<HashMap<EventType, Vec<(SubscriptionId, Listener)>>>,
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventType, usize> =
            self.listeners.borrow().iter().map(|(ty, list)| (*ty, list.len())).collect();
        f.debug_struct("EventHub").field("listeners", &counts).finish()
    }
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_subscription(&self, event_type: EventType) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Subscription { event_type, id: SubscriptionId(id) }
    }

    /// Append `listener` to the list for `event_type`. No deduplication.
    pub fn subscribe(&self, event_type: EventType, listener: Listener) -> Subscription {
        let sub = self.next_subscription(event_type);
        self.listeners.borrow_mut().entry(event_type).or_default().push((sub.id, listener));
        sub
    }

    /// Remove a subscription. Unknown or already-removed tokens are ignored.
    pub fn unsubscribe(&self, sub: Subscription) {
        if let Some(list) = self.listeners.borrow_mut().get_mut(&sub.event_type) {
            list.retain(|(id, _)| *id != sub.id);
        }
    }

    /// Drop every listener for `event_type` and install `listener` alone.
    pub fn replace_all(&self, event_type: EventType, listener: Listener) -> Subscription {
        let sub = self.next_subscription(event_type);
        self.listeners.borrow_mut().insert(event_type, vec![(sub.id, listener)]);
        trace!(?event_type, id = sub.id.0, "hub: listeners replaced");
        sub
    }

    /// Make `listener` the sole recipient of forwarded pointer events.
    ///
    /// Previous owners are told with [`HubEvent::PointerLost`] after the new
    /// listener is installed.
    pub fn claim_pointer(&self, listener: Listener) -> Subscription {
        let evicted = self.listeners.borrow_mut().remove(&EventType::Pointer).unwrap_or_default();
        let sub = self.replace_all(EventType::Pointer, listener);
        for (_, old) in evicted {
            old(&HubEvent::PointerLost);
        }
        sub
    }

    /// Invoke every listener for the event's type, in registration order.
    pub fn publish(&self, event: &HubEvent) {
        let snapshot: Vec<Listener> = match self.listeners.borrow().get(&event.event_type()) {
            Some(list) => list.iter().map(|(_, l)| Rc::clone(l)).collect(),
            None => return,
        };
        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of listeners currently registered for `event_type`.
    #[must_use]
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners.borrow().get(&event_type).map_or(0, Vec::len)
    }

    /// Whether `sub` is still registered.
    #[must_use]
    pub fn is_subscribed(&self, sub: Subscription) -> bool {
        self.listeners
            .borrow()
            .get(&sub.event_type)
            .is_some_and(|list| list.iter().any(|(id, _)| *id == sub.id))
    }
}
