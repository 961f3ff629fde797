use std::sync::Arc;
use std::thread::{self, Builder, JoinHandle};
use std::time::Duration;

use log::{debug, info};

use crate::clock::now_secs;
use crate::config::{Consts, Limits};
use crate::error::BurgerError;
use crate::fifo;
use crate::recipe::RecipeCatalog;
use crate::shared_state::{ShmHandle, SharedState};
use crate::station::StationState;

/// Spawns the Dispatcher thread (§4.4): pairs queued orders with eligible
/// stations under the resource-availability constraint, re-queuing orders
/// that find no eligible station up to `Limits::RETRY_BOUND` times.
pub fn spawn(
    shared: Arc<ShmHandle>,
    catalog: Arc<RecipeCatalog>,
) -> std::io::Result<JoinHandle<Result<(), BurgerError>>> {
    Builder::new().name("[ DISPATCHER ]".to_string()).spawn(move || {
        let poll = Consts::dispatch_poll();
        let backoff = Consts::dispatch_retry_backoff();

        while shared.is_active() {
            let order = match fifo::try_dequeue(&shared.fifo)? {
                Some(order) => order,
                None => {
                    thread::sleep(poll);
                    continue;
                }
            };

            if let Some(station_id) = assign(&shared, &catalog, order)? {
                debug!(
                    "[ DISPATCHER ]: order #{} assigned to station #{}",
                    order.id, station_id
                );
                continue;
            }

            let mut retried = order;
            retried.assignment_attempts += 1;
            if retried.assignment_attempts >= Limits::RETRY_BOUND {
                info!(
                    "[ DISPATCHER ]: TIMEOUT — order #{} dropped after {} assignment attempts",
                    retried.id, retried.assignment_attempts
                );
                continue;
            }

            fifo::enqueue(&shared.fifo, retried, || !shared.is_active(), poll)?;
            thread::sleep(backoff);
        }

        debug!("[ DISPATCHER ]: shutting down");
        Ok(())
    })
}

/// Scans stations in id order (§4.4 selection policy, §5 ordering: a station
/// lock is released before the next station is examined), assigning `order`
/// to the first eligible one. Returns the assigned station id, if any.
fn assign(
    shared: &SharedState,
    catalog: &RecipeCatalog,
    order: crate::order::Order,
) -> Result<Option<usize>, BurgerError> {
    for station_lock in shared.active_stations() {
        let mut station = station_lock.lock()?;
        if !station.can_accept(order.ingredient_indices()) {
            continue;
        }

        let recipe = &catalog.recipes()[order.recipe_index as usize];
        let mut assigned = order;
        assigned.assign_to(station.id);
        station.current_order = assigned;
        station.is_busy = true;
        station.state = StationState::Processing;
        station.status = crate::fixed_str::FixedStr::new(&format!(
            "preparing {}",
            recipe.name.as_str()
        ));
        station.log(
            &format!("ASSIGNED order #{} ({})", assigned.id, recipe.name.as_str()),
            now_secs(),
            false,
        );
        let station_id = station.id;
        drop(station);
        station_lock.notify_all();
        return Ok(Some(station_id));
    }
    Ok(None)
}
