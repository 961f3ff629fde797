//! Thin adapter from OS signals onto the Operator Control Surface (§4.7):
//! lets an operator drive the same pause/resume/refill operations the
//! `operator` binary exposes, without attaching a second process.
//!
//! `TERM`/`INT` request an orderly shutdown; `USER1`/`USER2` pause/resume a
//! station; `CONT` triggers a refill. Installed once, checked from the main
//! thread's wait loop rather than run inside the signal handler itself —
//! signal-hook's flag-based API hands us an `Arc<AtomicBool>` per signal so
//! the handler stays async-signal-safe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;
use rand::Rng;
use signal_hook::consts::{SIGCONT, SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook::flag;

use crate::control;
use crate::error::BurgerError;
use crate::shared_state::ShmHandle;

pub struct SignalFlags {
    pub shutdown: Arc<AtomicBool>,
    pub pause_one: Arc<AtomicBool>,
    pub resume_all: Arc<AtomicBool>,
    pub refill: Arc<AtomicBool>,
}

/// Registers the handlers. Must be called once, before the main loop starts
/// polling `SignalFlags`.
pub fn install() -> Result<SignalFlags, BurgerError> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let pause_one = Arc::new(AtomicBool::new(false));
    let resume_all = Arc::new(AtomicBool::new(false));
    let refill = Arc::new(AtomicBool::new(false));

    flag::register(SIGTERM, shutdown.clone()).map_err(BurgerError::sync)?;
    flag::register(SIGINT, shutdown.clone()).map_err(BurgerError::sync)?;
    flag::register(SIGUSR1, pause_one.clone()).map_err(BurgerError::sync)?;
    flag::register(SIGUSR2, resume_all.clone()).map_err(BurgerError::sync)?;
    flag::register(SIGCONT, refill.clone()).map_err(BurgerError::sync)?;

    Ok(SignalFlags {
        shutdown,
        pause_one,
        resume_all,
        refill,
    })
}

/// Applies whichever flags are set since the last poll, clearing each as it
/// is handled. Called from the producer's main wait loop.
pub fn poll(flags: &SignalFlags, shared: &ShmHandle) -> Result<(), BurgerError> {
    if flags.pause_one.swap(false, Ordering::SeqCst) {
        let id = rand::thread_rng().gen_range(0, shared.num_stations);
        info!("[ SIGNALS ]: SIGUSR1 — pausing station #{}", id);
        control::pause(shared, id)?;
    }

    if flags.resume_all.swap(false, Ordering::SeqCst) {
        info!("[ SIGNALS ]: SIGUSR2 — resuming all paused stations");
        for id in 0..shared.num_stations {
            control::resume(shared, id)?;
        }
    }

    if flags.refill.swap(false, Ordering::SeqCst) {
        let snapshots = control::snapshot_all(shared)?;
        let flagged: Vec<usize> = snapshots
            .iter()
            .filter(|s| s.needs_refill)
            .map(|s| s.id)
            .collect();
        if !flagged.is_empty() {
            info!("[ SIGNALS ]: SIGCONT — refilling {} flagged station(s)", flagged.len());
            for id in flagged {
                control::refill_station(shared, id)?;
            }
        } else {
            let id = rand::thread_rng().gen_range(0, shared.num_stations);
            info!("[ SIGNALS ]: SIGCONT — nothing flagged, refilling station #{}", id);
            control::refill_station(shared, id)?;
        }
    }

    Ok(())
}

pub fn shutdown_requested(flags: &SignalFlags) -> bool {
    flags.shutdown.load(Ordering::SeqCst)
}
