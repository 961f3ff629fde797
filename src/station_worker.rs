use std::sync::Arc;
use std::thread::{self, Builder, JoinHandle};
use std::time::Duration;

use crate::clock::now_secs;
use crate::error::BurgerError;
use crate::fixed_str::FixedStr;
use crate::order::Order;
use crate::recipe::RecipeCatalog;
use crate::shared_state::{ShmHandle, SharedState};
use crate::station::StationState;

/// Spawns the worker thread owning one station (§4.5): waits for an
/// assignment, then consumes inventory and paces through the recipe.
pub fn spawn(
    id: usize,
    shared: Arc<ShmHandle>,
    catalog: Arc<RecipeCatalog>,
) -> std::io::Result<JoinHandle<Result<(), BurgerError>>> {
    Builder::new()
        .name(format!("[ STATION#{} ]", id))
        .spawn(move || run(id, &shared, &catalog))
}

fn run(id: usize, shared: &SharedState, catalog: &RecipeCatalog) -> Result<(), BurgerError> {
    let station_lock = &shared.stations[id];
    let poll = Duration::from_millis(100);

    'outer: loop {
        if !shared.is_active() {
            break;
        }

        let mut guard = station_lock.lock()?;
        loop {
            if !shared.is_active() {
                break 'outer;
            }
            // Pause check happens at the top of each wait loop and before
            // beginning a new order; it never interrupts mid-order work
            // (§4.5 pause semantics).
            if guard.paused {
                guard.state = StationState::Paused;
                drop(guard);
                thread::sleep(poll);
                guard = station_lock.lock()?;
                continue;
            }
            if !guard.is_busy {
                guard.state = StationState::Waiting;
                drop(guard);
                thread::sleep(poll);
                guard = station_lock.lock()?;
                continue;
            }
            break;
        }

        let order = guard.current_order;
        drop(guard);

        process_order(id, shared, catalog, order)?;
    }

    Ok(())
}

/// The processing algorithm of §4.5, preserving the preserved open question:
/// ingredients are consumed up-front, before the visible step loop, so a
/// refill arriving mid-order never rolls consumption back.
fn process_order(
    id: usize,
    shared: &SharedState,
    catalog: &RecipeCatalog,
    order: Order,
) -> Result<(), BurgerError> {
    let station_lock = &shared.stations[id];
    let recipe = &catalog.recipes()[order.recipe_index as usize];

    {
        let mut station = station_lock.lock()?;
        for &idx in order.ingredient_indices() {
            if idx >= 0 {
                station.dispensers[idx as usize].try_consume_one();
            }
        }
    }

    for step in 1..=order.ingredient_count {
        let idx = order.ingredient_indices()[(step - 1) as usize];
        {
            let mut station = station_lock.lock()?;
            station.current_order.current_step = step;
            let ingredient_name = if idx >= 0 {
                station.dispenser_names[idx as usize]
            } else {
                FixedStr::EMPTY
            };
            station.current_ingredient = ingredient_name;
            station.status = FixedStr::new(&format!("adding {}", ingredient_name.as_str()));
            station.log(
                &format!("ADDING {}", ingredient_name.as_str()),
                now_secs(),
                false,
            );
        }
        thread::sleep(Duration::from_secs(shared.tick_per_ingredient_secs));
    }

    {
        let mut station = station_lock.lock()?;
        station.status = FixedStr::new("finalizing");
        station.state = StationState::Finalizing;
        station.log("FINISHED", now_secs(), false);
    }
    thread::sleep(Duration::from_secs(1));

    {
        let mut station = station_lock.lock()?;
        station.is_busy = false;
        station.current_order.completed = true;
        station.current_order.clear_assignment();
        station.processed_count += 1;
        station.state = StationState::Idle;
        station.needs_refill = station.classify_inventory();
        station.log(
            &format!("COMPLETED order #{} ({})", order.id, recipe.name.as_str()),
            now_secs(),
            false,
        );
    }
    station_lock.notify_all();

    let mut counters = shared.counters.lock()?;
    counters.total_processed += 1;
    Ok(())
}
