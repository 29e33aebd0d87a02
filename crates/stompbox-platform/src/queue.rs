//! Bounded single-producer/single-consumer event queue.
//!
//! The control-sampling context owns the [`EventProducer`]; the main loop
//! owns the [`EventConsumer`]. Both ends are wait-free, so a push from the
//! timer interrupt is safe while the consumer is mid-drain. When the queue
//! is full the new event is dropped and counted; the sampler never blocks.

use crate::ControlId;
use crate::event::{ControlEvent, EventKind};
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// The queue had no room; the event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("event queue full, dropped {} from {control}", .kind.name())]
pub struct QueueFull {
    /// Kind of the dropped event.
    pub kind: EventKind,
    /// Control that produced it.
    pub control: ControlId,
}

/// Creates a queue holding up to `capacity` events.
///
/// # Example
///
/// ```rust
/// use stompbox_platform::{ControlEvent, ControlId, event_queue};
///
/// let (mut tx, mut rx) = event_queue(2);
/// tx.push(ControlEvent::button_pressed(ControlId::switch(0), 0, 10)).unwrap();
/// tx.push(ControlEvent::button_released(ControlId::switch(0), 0, 20)).unwrap();
/// assert!(tx.push(ControlEvent::button_pressed(ControlId::switch(0), 0, 30)).is_err());
///
/// assert_eq!(rx.len(), 2);
/// assert_eq!(rx.dropped(), 1);
/// assert_eq!(rx.pop().map(|e| e.timestamp_ms), Some(10));
/// ```
pub fn event_queue(capacity: usize) -> (EventProducer, EventConsumer) {
    let (producer, consumer) = RingBuffer::<ControlEvent>::new(capacity.max(1));
    let dropped = Arc::new(AtomicUsize::new(0));
    (
        EventProducer {
            inner: producer,
            dropped: Arc::clone(&dropped),
        },
        EventConsumer {
            inner: consumer,
            dropped,
        },
    )
}

/// Producer half, owned by the control-sampling context.
pub struct EventProducer {
    inner: Producer<ControlEvent>,
    dropped: Arc<AtomicUsize>,
}

impl EventProducer {
    /// Enqueues an event without blocking.
    pub fn push(&mut self, event: ControlEvent) -> Result<(), QueueFull> {
        self.inner.push(event).map_err(|_| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            QueueFull {
                kind: event.kind,
                control: event.source,
            }
        })
    }

    /// Free slots.
    pub fn free(&self) -> usize {
        self.inner.slots()
    }

    /// Whether the next push would fail.
    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }
}

/// Consumer half, owned by the main loop.
pub struct EventConsumer {
    inner: Consumer<ControlEvent>,
    dropped: Arc<AtomicUsize>,
}

impl EventConsumer {
    /// Dequeues the oldest event.
    pub fn pop(&mut self) -> Option<ControlEvent> {
        self.inner.pop().ok()
    }

    /// Events waiting.
    pub fn len(&self) -> usize {
        self.inner.slots()
    }

    /// Whether no events are waiting.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Discards every waiting event and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let mut n = 0;
        while self.inner.pop().is_ok() {
            n += 1;
        }
        n
    }

    /// Events dropped because the queue was full, since creation.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for EventProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventProducer")
            .field("free", &self.free())
            .finish()
    }
}

impl std::fmt::Debug for EventConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventConsumer")
            .field("len", &self.len())
            .field("dropped", &self.dropped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(t: u32) -> ControlEvent {
        ControlEvent::button_pressed(ControlId::switch(0), 0, t)
    }

    #[test]
    fn test_fifo_order() {
        let (mut tx, mut rx) = event_queue(8);
        for t in 0..5 {
            tx.push(press(t)).unwrap();
        }
        let order: Vec<u32> = std::iter::from_fn(|| rx.pop()).map(|e| e.timestamp_ms).collect();
        assert_eq!(order, [0, 1, 2, 3, 4]);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_full_queue_drops_and_counts() {
        let (mut tx, rx) = event_queue(1);
        tx.push(press(0)).unwrap();
        assert!(tx.is_full());
        let err = tx.push(press(1)).unwrap_err();
        assert_eq!(err.control, ControlId::switch(0));
        assert_eq!(err.to_string(), "event queue full, dropped button_pressed from Switch_1");
        assert_eq!(rx.dropped(), 1);
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_clear() {
        let (mut tx, mut rx) = event_queue(4);
        tx.push(press(0)).unwrap();
        tx.push(press(1)).unwrap();
        assert_eq!(rx.clear(), 2);
        assert!(rx.is_empty());
        assert_eq!(tx.free(), 4);
    }

    #[test]
    fn test_push_from_another_thread() {
        let (mut tx, mut rx) = event_queue(256);
        let handle = std::thread::spawn(move || {
            for t in 0..200 {
                while tx.push(press(t)).is_err() {
                    std::thread::yield_now();
                }
            }
        });
        let mut seen = Vec::new();
        while seen.len() < 200 {
            if let Some(ev) = rx.pop() {
                seen.push(ev.timestamp_ms);
            }
        }
        handle.join().unwrap();
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }
}
