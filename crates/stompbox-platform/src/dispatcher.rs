//! Listener registry that routes control events to callbacks.
//!
//! A listener matches an event when the kinds are equal and its source and
//! index filters are each either unset (wildcard) or equal to the event's.
//! Matching listeners run synchronously in registration order.
//!
//! Callbacks receive the event and a mutable context `C` owned by the
//! caller of [`Dispatcher::dispatch`], so listeners can mutate effect
//! parameters without shared ownership. The dispatcher never recomputes an
//! effect on its own: a listener that writes a parameter calls
//! [`Effect::update`](stompbox_core::Effect::update) itself.

use crate::ControlId;
use crate::event::{ControlEvent, EventKind};
use crate::queue::EventConsumer;

type Callback<C> = Box<dyn FnMut(&ControlEvent, &mut C) + Send>;

/// A registered callback with its filters.
pub struct Listener<C> {
    callback: Callback<C>,
    kind: EventKind,
    source: Option<ControlId>,
    index: Option<usize>,
}

impl<C> Listener<C> {
    /// Whether this listener wants `event`.
    pub fn matches(&self, event: &ControlEvent) -> bool {
        self.kind == event.kind
            && self.source.is_none_or(|s| s == event.source)
            && self.index.is_none_or(|i| i == event.index)
    }

    /// Event kind filter.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Source filter (`None` = any control).
    pub fn source(&self) -> Option<ControlId> {
        self.source
    }

    /// Index filter (`None` = any index).
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl<C> std::fmt::Debug for Listener<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// Routes events to listeners.
///
/// # Example
///
/// ```rust
/// use stompbox_platform::{ControlEvent, ControlId, Dispatcher, EventKind};
///
/// let mut presses = Dispatcher::<u32>::new();
/// presses.register_by_index(EventKind::ButtonPressed, 2, |_, count| *count += 1);
///
/// let mut count = 0;
/// presses.dispatch(&ControlEvent::button_pressed(ControlId::switch(2), 2, 0), &mut count);
/// presses.dispatch(&ControlEvent::button_pressed(ControlId::switch(1), 1, 0), &mut count);
/// assert_eq!(count, 1);
/// ```
#[derive(Debug)]
pub struct Dispatcher<C> {
    listeners: Vec<Listener<C>>,
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Dispatcher<C> {
    /// Creates a dispatcher with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Listens for `kind`, optionally only from `source`.
    pub fn register<F>(&mut self, kind: EventKind, source: Option<ControlId>, callback: F)
    where
        F: FnMut(&ControlEvent, &mut C) + Send + 'static,
    {
        self.push(kind, source, None, Box::new(callback));
    }

    /// Listens for `kind` from controls carrying `index`.
    pub fn register_by_index<F>(&mut self, kind: EventKind, index: usize, callback: F)
    where
        F: FnMut(&ControlEvent, &mut C) + Send + 'static,
    {
        self.push(kind, None, Some(index), Box::new(callback));
    }

    fn push(
        &mut self,
        kind: EventKind,
        source: Option<ControlId>,
        index: Option<usize>,
        callback: Callback<C>,
    ) {
        tracing::debug!(
            kind = kind.name(),
            source = ?source,
            index = ?index,
            "listener registered"
        );
        self.listeners.push(Listener {
            callback,
            kind,
            source,
            index,
        });
    }

    /// Removes every listener.
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Removes listeners whose source filter is `source`; returns how many.
    ///
    /// Wildcard listeners are kept.
    pub fn remove_listeners_for_source(&mut self, source: ControlId) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.source != Some(source));
        before - self.listeners.len()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Registered listeners, in registration order.
    pub fn listeners(&self) -> &[Listener<C>] {
        &self.listeners
    }

    /// Runs every matching listener; returns how many ran.
    pub fn dispatch(&mut self, event: &ControlEvent, context: &mut C) -> usize {
        let mut fired = 0;
        for listener in &mut self.listeners {
            if listener.matches(event) {
                (listener.callback)(event, context);
                fired += 1;
            }
        }
        tracing::trace!(
            kind = event.kind.name(),
            source = %event.source,
            index = event.index,
            fired,
            "event dispatched"
        );
        fired
    }

    /// Drains `queue` completely, dispatching each event; returns how many
    /// events were drained.
    pub fn process_events(&mut self, queue: &mut EventConsumer, context: &mut C) -> usize {
        let mut n = 0;
        while let Some(event) = queue.pop() {
            self.dispatch(&event, context);
            n += 1;
        }
        n
    }
}
