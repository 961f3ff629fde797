//! Operator Control Surface (§4.7): mutation entry points used by a second,
//! already-attached process. Every operation acquires only the lock(s) it
//! needs and never blocks beyond that brief acquisition; an invalid station
//! or dispenser index is a no-op rather than an error (§7).

use crate::clock::now_secs;
use crate::config::Limits;
use crate::error::BurgerError;
use crate::shared_state::SharedState;
use crate::station::StationState;

fn valid_station(shared: &SharedState, station_id: usize) -> bool {
    station_id < shared.num_stations
}

pub fn pause(shared: &SharedState, station_id: usize) -> Result<(), BurgerError> {
    if !valid_station(shared, station_id) {
        return Ok(());
    }
    let lock = &shared.stations[station_id];
    let mut station = lock.lock()?;
    if !station.paused {
        station.paused = true;
        station.log("PAUSED", now_secs(), false);
    }
    Ok(())
}

/// Idempotent: resuming a station that is not paused is a no-op (§8 laws).
pub fn resume(shared: &SharedState, station_id: usize) -> Result<(), BurgerError> {
    if !valid_station(shared, station_id) {
        return Ok(());
    }
    let lock = &shared.stations[station_id];
    let mut station = lock.lock()?;
    if station.paused {
        station.paused = false;
        station.log("RESUMED", now_secs(), false);
    }
    drop(station);
    lock.notify_all();
    Ok(())
}

/// Idempotent: refilling a station already at full capacity leaves the state
/// unchanged aside from the appended log (§8 laws).
pub fn refill_station(shared: &SharedState, station_id: usize) -> Result<(), BurgerError> {
    if !valid_station(shared, station_id) {
        return Ok(());
    }
    let lock = &shared.stations[station_id];
    let mut station = lock.lock()?;
    for dispenser in station.dispensers[..station.dispenser_count as usize].iter_mut() {
        dispenser.refill();
    }
    station.needs_refill = false;
    station.log("REFILLED", now_secs(), false);
    Ok(())
}

pub fn refill_ingredient(
    shared: &SharedState,
    station_id: usize,
    ingredient_index: usize,
) -> Result<(), BurgerError> {
    if !valid_station(shared, station_id) {
        return Ok(());
    }
    let lock = &shared.stations[station_id];
    let mut station = lock.lock()?;
    if ingredient_index >= station.dispenser_count as usize {
        return Ok(());
    }
    station.dispensers[ingredient_index].refill();
    station.needs_refill = station.classify_inventory();
    Ok(())
}

pub fn adjust_ingredient(
    shared: &SharedState,
    station_id: usize,
    ingredient_index: usize,
    delta: i32,
) -> Result<(), BurgerError> {
    if !valid_station(shared, station_id) {
        return Ok(());
    }
    let lock = &shared.stations[station_id];
    let mut station = lock.lock()?;
    if ingredient_index >= station.dispenser_count as usize {
        return Ok(());
    }
    station.dispensers[ingredient_index].adjust(delta);
    station.needs_refill = station.classify_inventory();
    Ok(())
}

pub fn refill_all_stations(shared: &SharedState) -> Result<(), BurgerError> {
    for id in 0..shared.num_stations {
        refill_station(shared, id)?;
    }
    Ok(())
}

/// Refills every station with at least one dispenser at/below `LOW_THRESHOLD`.
pub fn refill_critical(shared: &SharedState) -> Result<(), BurgerError> {
    for id in 0..shared.num_stations {
        let lock = &shared.stations[id];
        let is_critical = {
            let station = lock.lock()?;
            station.dispensers[..station.dispenser_count as usize]
                .iter()
                .any(|d| d.is_low())
        };
        if is_critical {
            refill_station(shared, id)?;
        }
    }
    Ok(())
}

/// Refills every station with at least one fully exhausted dispenser.
pub fn refill_exhausted(shared: &SharedState) -> Result<(), BurgerError> {
    for id in 0..shared.num_stations {
        let lock = &shared.stations[id];
        let is_exhausted = {
            let station = lock.lock()?;
            station.dispensers[..station.dispenser_count as usize]
                .iter()
                .any(|d| d.is_exhausted())
        };
        if is_exhausted {
            refill_station(shared, id)?;
        }
    }
    Ok(())
}

/// A plain-text snapshot of one station, for the operator binary's `status`
/// subcommand (dashboard rendering itself is out of scope, §1).
pub struct StationSnapshot {
    pub id: usize,
    pub state: StationState,
    pub active: bool,
    pub paused: bool,
    pub is_busy: bool,
    pub processed_count: u32,
    pub needs_refill: bool,
    pub status: String,
    pub dispensers: Vec<(String, u32)>,
}

pub fn snapshot(shared: &SharedState, station_id: usize) -> Result<Option<StationSnapshot>, BurgerError> {
    if !valid_station(shared, station_id) {
        return Ok(None);
    }
    let station = shared.stations[station_id].lock()?;
    let dispensers = (0..station.dispenser_count as usize)
        .map(|i| {
            (
                station.dispenser_names[i].as_str().to_string(),
                station.dispensers[i].quantity(),
            )
        })
        .collect();
    Ok(Some(StationSnapshot {
        id: station.id,
        state: station.state,
        active: station.active,
        paused: station.paused,
        is_busy: station.is_busy,
        processed_count: station.processed_count,
        needs_refill: station.needs_refill,
        status: station.status.as_str().to_string(),
        dispensers,
    }))
}

pub fn snapshot_all(shared: &SharedState) -> Result<Vec<StationSnapshot>, BurgerError> {
    let mut out = Vec::with_capacity(Limits::MAX_STATIONS);
    for id in 0..shared.num_stations {
        if let Some(s) = snapshot(shared, id)? {
            out.push(s);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::shared_state::ShmHandle;

    fn handle(name: &str) -> ShmHandle {
        ShmHandle::create(name, 2, &default_catalog(), 0, 0).unwrap()
    }

    #[test]
    fn pause_resume_round_trip_preserves_assignment() {
        let handle = handle(&format!("/burger_ctl_pause_{}", std::process::id()));
        {
            let mut s = handle.stations[0].lock().unwrap();
            s.is_busy = true;
            s.current_order.assign_to(0);
        }
        pause(&handle, 0).unwrap();
        assert!(handle.stations[0].lock().unwrap().paused);

        resume(&handle, 0).unwrap();
        let station = handle.stations[0].lock().unwrap();
        assert!(!station.paused);
        assert!(station.is_busy);
        assert_eq!(station.current_order.assigned_station, 0);
    }

    #[test]
    fn resume_on_non_paused_station_is_a_no_op() {
        let handle = handle(&format!("/burger_ctl_idem_{}", std::process::id()));
        resume(&handle, 0).unwrap();
        assert!(!handle.stations[0].lock().unwrap().paused);
    }

    #[test]
    fn refill_station_twice_is_idempotent() {
        let handle = handle(&format!("/burger_ctl_refill_{}", std::process::id()));
        {
            let mut s = handle.stations[0].lock().unwrap();
            s.dispensers[0].adjust(-5);
        }
        refill_station(&handle, 0).unwrap();
        let q1 = handle.stations[0].lock().unwrap().dispensers[0].quantity();
        refill_station(&handle, 0).unwrap();
        let q2 = handle.stations[0].lock().unwrap().dispensers[0].quantity();
        assert_eq!(q1, q2);
        assert_eq!(q1, Limits::CAPACITY);
    }

    #[test]
    fn invalid_station_id_is_a_no_op() {
        let handle = handle(&format!("/burger_ctl_invalid_{}", std::process::id()));
        assert!(pause(&handle, 999).is_ok());
        assert!(refill_station(&handle, 999).is_ok());
    }
}
