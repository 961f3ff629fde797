use std::time::Duration;

use crate::config::Limits;
use crate::error::BurgerError;
use crate::order::Order;
use crate::sync::{sleep, Locked};

/// Bounded ring buffer of pending orders (§3, §4.2). `tail == (head + size) %
/// MAX_QUEUE` is the ring invariant checked in the tests below.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FifoRing {
    ring: [Order; Limits::MAX_QUEUE],
    head: usize,
    tail: usize,
    size: usize,
}

impl FifoRing {
    pub const fn new() -> Self {
        FifoRing {
            ring: [Order::EMPTY; Limits::MAX_QUEUE],
            head: 0,
            tail: 0,
            size: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.size == Limits::MAX_QUEUE
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn push_back(&mut self, order: Order) {
        debug_assert!(!self.is_full());
        self.ring[self.tail] = order;
        self.tail = (self.tail + 1) % Limits::MAX_QUEUE;
        self.size += 1;
    }

    fn pop_front(&mut self) -> Option<Order> {
        if self.is_empty() {
            return None;
        }
        let order = self.ring[self.head];
        self.head = (self.head + 1) % Limits::MAX_QUEUE;
        self.size -= 1;
        Some(order)
    }

    fn invariant_holds(&self) -> bool {
        self.size <= Limits::MAX_QUEUE && self.tail == (self.head + self.size) % Limits::MAX_QUEUE
    }
}

impl Default for FifoRing {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocks while the ring is full, appends, and signals waiters. Never drops
/// an order (§4.2). `should_abort` is polled between waits so the generator
/// can fall out of an indefinite block on shutdown (§5 cancellation rule)
/// without the FIFO itself needing to know about `system_active`.
pub fn enqueue(
    fifo: &Locked<FifoRing>,
    order: Order,
    should_abort: impl Fn() -> bool,
    poll: Duration,
) -> Result<bool, BurgerError> {
    let mut guard = fifo.lock()?;
    while guard.is_full() {
        if should_abort() {
            return Ok(false);
        }
        drop(guard);
        sleep(poll);
        guard = fifo.lock()?;
    }
    if should_abort() {
        return Ok(false);
    }
    guard.push_back(order);
    debug_assert!(guard.invariant_holds());
    drop(guard);
    fifo.notify_all();
    Ok(true)
}

/// Non-blocking pop; returns `None` immediately when empty (§4.2, §5 — the
/// dispatcher must never block on an empty FIFO).
pub fn try_dequeue(fifo: &Locked<FifoRing>) -> Result<Option<Order>, BurgerError> {
    let mut guard = fifo.lock()?;
    let popped = guard.pop_front();
    debug_assert!(guard.invariant_holds());
    drop(guard);
    if popped.is_some() {
        fifo.notify_all();
    }
    Ok(popped)
}

/// Broadcasts the shared condition so any generator parked in `enqueue`
/// re-checks `should_abort` and returns (§4.2, §4.8, scenario 6).
pub fn drain_on_shutdown(fifo: &Locked<FifoRing>) {
    fifo.notify_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn order(id: u64) -> Order {
        Order::new(id, 0, &[0], 0)
    }

    #[test]
    fn fifo_preserves_enqueue_order() {
        let fifo = Locked::new(FifoRing::new());
        enqueue(&fifo, order(1), || false, Duration::from_millis(1)).unwrap();
        enqueue(&fifo, order(2), || false, Duration::from_millis(1)).unwrap();
        assert_eq!(try_dequeue(&fifo).unwrap().unwrap().id, 1);
        assert_eq!(try_dequeue(&fifo).unwrap().unwrap().id, 2);
    }

    #[test]
    fn try_dequeue_on_empty_returns_none_without_blocking() {
        let fifo = Locked::new(FifoRing::new());
        assert!(try_dequeue(&fifo).unwrap().is_none());
    }

    #[test]
    fn enqueue_blocks_while_full_and_unblocks_on_dequeue() {
        let fifo = Arc::new(Locked::new(FifoRing::new()));
        for i in 0..Limits::MAX_QUEUE as u64 {
            enqueue(&fifo, order(i), || false, Duration::from_millis(1)).unwrap();
        }
        assert!(fifo.lock().unwrap().is_full());

        let fifo_producer = fifo.clone();
        let accepted = Arc::new(AtomicBool::new(false));
        let accepted_clone = accepted.clone();
        let handle = thread::spawn(move || {
            let ok = enqueue(
                &fifo_producer,
                order(9999),
                || false,
                Duration::from_millis(1),
            )
            .unwrap();
            accepted_clone.store(ok, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(10));
        assert!(!accepted.load(Ordering::SeqCst));

        try_dequeue(&fifo).unwrap();
        handle.join().unwrap();
        assert!(accepted.load(Ordering::SeqCst));
    }

    #[test]
    fn enqueue_aborts_when_asked_instead_of_blocking_forever() {
        let fifo = Locked::new(FifoRing::new());
        for i in 0..Limits::MAX_QUEUE as u64 {
            enqueue(&fifo, order(i), || false, Duration::from_millis(1)).unwrap();
        }
        let accepted =
            enqueue(&fifo, order(9999), || true, Duration::from_millis(1)).unwrap();
        assert!(!accepted);
    }
}
