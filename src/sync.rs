//! Process-shared synchronization primitives.
//!
//! `std::sync::Mutex`/`Condvar` carry process-local poison/parker state and
//! are not a valid kind of primitive to place inside a region mapped by two
//! processes (§4.1). Everything here is instead built from plain atomics,
//! which are location-independent and therefore safe to embed directly in
//! the `repr(C)` shared-memory layout.
//!
//! `ShmCondvar` is intentionally poll-based (short sleep + re-check) rather
//! than a blocking futex wait: §4.2/§5 explicitly allow this ("polling with
//! a 100 ms sleep is acceptable; the reference behavior uses poll + condition"),
//! and a spin/poll condition is far simpler to make correct across two
//! independent address spaces than a cross-process futex.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::error::BurgerError;

pub(crate) fn sleep(d: Duration) {
    #[cfg(test)]
    let sleep_fn = std::thread::yield_now;

    #[cfg(test)]
    {
        let _ = d;
        sleep_fn();
    }

    #[cfg(not(test))]
    std::thread::sleep(d);
}

/// Default backoff between spin attempts while a `ShmMutex` is contended.
const LOCK_SPIN_BACKOFF: Duration = Duration::from_micros(50);

/// A process-shared mutex: a CAS spinlock guarding a pointer-free `T`.
#[repr(C)]
pub struct ShmMutex<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for ShmMutex<T> {}
unsafe impl<T: Send> Sync for ShmMutex<T> {}

impl<T> ShmMutex<T> {
    pub const fn new(value: T) -> Self {
        ShmMutex {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    pub fn lock(&self) -> Result<ShmMutexGuard<'_, T>, BurgerError> {
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            sleep(LOCK_SPIN_BACKOFF);
        }
        Ok(ShmMutexGuard { lock: self })
    }

    /// Non-blocking lock attempt, used by the dispatcher's eligibility scan so
    /// a station/dispenser held briefly by another thread does not stall it.
    pub fn try_lock(&self) -> Option<ShmMutexGuard<'_, T>> {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| ShmMutexGuard { lock: self })
    }
}

pub struct ShmMutexGuard<'a, T> {
    lock: &'a ShmMutex<T>,
}

impl<'a, T> std::ops::Deref for ShmMutexGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<'a, T> std::ops::DerefMut for ShmMutexGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<'a, T> Drop for ShmMutexGuard<'a, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

/// A process-shared condition, signaled by bumping a generation counter.
///
/// Waiters poll the predicate, sleeping `poll` between checks; `notify_all`
/// only needs to bump the counter; a waiter that is already re-checking when
/// the bump happens simply observes the now-true predicate on its next pass.
#[repr(C)]
pub struct ShmCondvar {
    generation: AtomicU64,
}

impl ShmCondvar {
    pub const fn new() -> Self {
        ShmCondvar {
            generation: AtomicU64::new(0),
        }
    }

    pub fn notify_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Waits, re-acquiring `mutex` between polls, while `should_wait(&T)` holds.
    pub fn wait_while<'a, T>(
        &self,
        mutex: &'a ShmMutex<T>,
        mut guard: ShmMutexGuard<'a, T>,
        mut should_wait: impl FnMut(&T) -> bool,
        poll: Duration,
    ) -> Result<ShmMutexGuard<'a, T>, BurgerError> {
        while should_wait(&guard) {
            drop(guard);
            sleep(poll);
            guard = mutex.lock()?;
        }
        Ok(guard)
    }
}

impl Default for ShmCondvar {
    fn default() -> Self {
        Self::new()
    }
}

/// A lock paired with its wait condition, the process-shared analogue of an
/// `Arc<(Mutex<T>, Condvar)>` pair.
#[repr(C)]
pub struct Locked<T> {
    pub mutex: ShmMutex<T>,
    pub cvar: ShmCondvar,
}

impl<T> Locked<T> {
    pub const fn new(value: T) -> Self {
        Locked {
            mutex: ShmMutex::new(value),
            cvar: ShmCondvar::new(),
        }
    }

    pub fn lock(&self) -> Result<ShmMutexGuard<'_, T>, BurgerError> {
        self.mutex.lock()
    }

    pub fn wait_while(
        &self,
        guard: ShmMutexGuard<'_, T>,
        should_wait: impl FnMut(&T) -> bool,
        poll: Duration,
    ) -> Result<ShmMutexGuard<'_, T>, BurgerError> {
        self.cvar.wait_while(&self.mutex, guard, should_wait, poll)
    }

    pub fn notify_all(&self) {
        self.cvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn mutex_serializes_increments() {
        let m = Arc::new(ShmMutex::new(0u64));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let m = m.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    *m.lock().unwrap() += 1;
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*m.lock().unwrap(), 8000);
    }

    #[test]
    fn wait_while_unblocks_after_notify() {
        let locked = Arc::new(Locked::new(false));
        let waiter = locked.clone();
        let handle = thread::spawn(move || {
            let guard = waiter.lock().unwrap();
            let guard = waiter
                .wait_while(guard, |ready| !*ready, Duration::from_millis(1))
                .unwrap();
            assert!(*guard);
        });

        thread::sleep(Duration::from_millis(5));
        *locked.lock().unwrap() = true;
        locked.notify_all();
        handle.join().unwrap();
    }
}
