use std::sync::Arc;
use std::thread::{self, Builder, JoinHandle};

use crate::clock::now_secs;
use crate::config::Consts;
use crate::error::BurgerError;
use crate::shared_state::ShmHandle;

/// Spawns the Inventory Monitor thread (§4.6): periodically walks every
/// station, classifies its inventory, and appends a rate-limited alert log.
pub fn spawn(shared: Arc<ShmHandle>) -> std::io::Result<JoinHandle<Result<(), BurgerError>>> {
    Builder::new().name("[ MONITOR ]".to_string()).spawn(move || {
        let interval = Consts::monitor_interval();
        let rate_limit = Consts::alert_rate_limit();

        while shared.is_active() {
            thread::sleep(interval);
            if !shared.is_active() {
                break;
            }

            for station_lock in shared.active_stations() {
                let mut station = station_lock.lock()?;
                let needs_refill = station.classify_inventory();
                let any_exhausted = station.dispensers[..station.dispenser_count as usize]
                    .iter()
                    .any(|d| d.is_exhausted());

                station.needs_refill = needs_refill;

                if !needs_refill {
                    continue;
                }

                let now = now_secs();
                let rate_limited = now.saturating_sub(station.last_alert_at_secs)
                    < rate_limit.as_secs();
                if rate_limited {
                    continue;
                }

                let message = if any_exhausted {
                    let names: Vec<&str> = (0..station.dispenser_count as usize)
                        .filter(|&i| station.dispensers[i].is_exhausted())
                        .map(|i| station.dispenser_names[i].as_str())
                        .collect();
                    format!("ALERTA: BANDA {} SIN: {}", station.id, names.join(", "))
                } else {
                    format!(
                        "ALERTA: BANDA {} con inventario bajo en varios ingredientes",
                        station.id
                    )
                };
                station.log(&message, now, true);
                station.last_alert_at_secs = now;
            }
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::shared_state::ShmHandle;
    use std::time::Duration as StdDuration;

    #[test]
    fn exhausted_dispenser_trips_needs_refill_without_spamming_alerts() {
        let name = format!("/burger_monitor_test_{}", std::process::id());
        let catalog = default_catalog();
        let handle = ShmHandle::create(&name, 1, &catalog, 0, 0).unwrap();

        {
            let mut station = handle.stations[0].lock().unwrap();
            station.dispensers[0] = crate::dispenser::Dispenser::empty();
        }

        // Directly exercise the classification the monitor thread performs,
        // rather than spawning the real ~15s-interval thread in a unit test.
        let mut station = handle.stations[0].lock().unwrap();
        assert!(station.classify_inventory());
        station.needs_refill = true;
        station.last_alert_at_secs = now_secs();
        drop(station);

        thread::sleep(StdDuration::from_millis(1));
        let station = handle.stations[0].lock().unwrap();
        assert!(station.needs_refill);
    }
}
