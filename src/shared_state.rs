use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};

use shared_memory::{Shmem, ShmemConf};

use crate::clock::now_secs;
use crate::config::Limits;
use crate::error::{BurgerError, ErrorKind};
use crate::fifo::FifoRing;
use crate::recipe::RecipeCatalog;
use crate::station::Station;
use crate::sync::Locked;

/// Counters guarded by the global lock (§5: "only for counters and the
/// new-order condition"). `Locked<Counters>`'s bundled condvar plays the role
/// of the `new_order` condition in §3's Shared State row.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct Counters {
    pub total_generated: u64,
    pub total_processed: u64,
}

/// The single process-wide block of state (§3, §4.1): every station, the
/// FIFO, counters, and configuration, laid out so two processes can map it
/// byte-for-byte.
///
/// Lock hierarchy (§5), must always be acquired in this order:
///   1. `counters` (the global lock)
///   2. `fifo`
///   3. a `stations[i]` entry
///   4. a dispenser within that station's `Station::dispensers`
/// No thread holds two locks at the same level; a station lock is released
/// before the next station is scanned.
#[repr(C)]
pub struct SharedState {
    pub stations: [Locked<Station>; Limits::MAX_STATIONS],
    pub fifo: Locked<FifoRing>,
    pub num_stations: usize,
    pub system_active: AtomicBool,
    pub counters: Locked<Counters>,
    pub tick_per_ingredient_secs: u64,
    pub tick_between_orders_secs: u64,
    pub started_at_secs: u64,
}

impl SharedState {
    pub fn is_active(&self) -> bool {
        self.system_active.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.system_active.store(false, Ordering::SeqCst);
        self.fifo.notify_all();
        self.counters.notify_all();
        for station in &self.stations[..self.num_stations] {
            station.notify_all();
        }
    }

    pub fn active_stations(&self) -> &[Locked<Station>] {
        &self.stations[..self.num_stations]
    }
}

/// Owns the memory mapping backing a `SharedState`; the producer's handle is
/// the creator (and unlinks the name on drop), the operator's handle only
/// opens it (§4.1, §6).
pub struct ShmHandle {
    shmem: Shmem,
}

impl ShmHandle {
    /// Creates and initializes the region. Fatal at startup on failure (§4.1).
    pub fn create(
        name: &str,
        num_stations: usize,
        catalog: &RecipeCatalog,
        tick_per_ingredient_secs: u64,
        tick_between_orders_secs: u64,
    ) -> Result<Self, BurgerError> {
        let size = std::mem::size_of::<SharedState>();
        let shmem = ShmemConf::new()
            .size(size)
            .os_id(name)
            .create()
            .map_err(BurgerError::shmem)?;

        let names: Vec<String> = catalog.ingredient_names().to_vec();
        let value = SharedState {
            stations: core::array::from_fn(|i| Locked::new(Station::new(i, &names))),
            fifo: Locked::new(FifoRing::new()),
            num_stations,
            system_active: AtomicBool::new(true),
            counters: Locked::new(Counters::default()),
            tick_per_ingredient_secs,
            tick_between_orders_secs,
            started_at_secs: now_secs(),
        };

        // SAFETY: the mapping is exactly `size_of::<SharedState>()` bytes,
        // freshly created and not yet observed by any other thread/process.
        unsafe {
            (shmem.as_ptr() as *mut SharedState).write(value);
        }

        Ok(ShmHandle { shmem })
    }

    /// Attaches to an existing region by name. Fails if the name does not
    /// exist or the layout size does not match (§4.1, §6).
    pub fn attach(name: &str) -> Result<Self, BurgerError> {
        let shmem = ShmemConf::new().os_id(name).open().map_err(BurgerError::shmem)?;
        if shmem.len() != std::mem::size_of::<SharedState>() {
            return Err(BurgerError::new_of_kind(
                "shared region size does not match this build's SharedState layout",
                ErrorKind::SharedMemory,
            ));
        }
        Ok(ShmHandle { shmem })
    }

    pub fn is_owner(&self) -> bool {
        self.shmem.is_owner()
    }
}

impl Deref for ShmHandle {
    type Target = SharedState;

    fn deref(&self) -> &SharedState {
        // SAFETY: constructed only via `create`/`attach`, both of which
        // validate the mapping is sized for `SharedState`.
        unsafe { &*(self.shmem.as_ptr() as *const SharedState) }
    }
}

// SAFETY: every field behind a lock uses process-shared atomics, not
// process-local primitives; sharing the handle across threads is the point.
unsafe impl Send for ShmHandle {}
unsafe impl Sync for ShmHandle {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn create_and_attach_round_trip_in_process() {
        let name = format!("/burger_test_{}", std::process::id());
        let catalog = default_catalog();
        let producer = ShmHandle::create(&name, 2, &catalog, 1, 1).unwrap();
        assert!(producer.is_owner());
        assert_eq!(producer.num_stations, 2);
        assert!(producer.is_active());

        let operator = ShmHandle::attach(&name).unwrap();
        assert!(!operator.is_owner());
        assert_eq!(operator.num_stations, 2);
    }

    #[test]
    fn attach_fails_for_unknown_name() {
        let name = format!("/burger_test_missing_{}", std::process::id());
        assert!(ShmHandle::attach(&name).is_err());
    }
}
