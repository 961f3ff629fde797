use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, Builder, JoinHandle};
use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::clock::now_secs;
use crate::error::BurgerError;
use crate::fifo;
use crate::order::Order;
use crate::recipe::RecipeCatalog;
use crate::shared_state::ShmHandle;

/// Spawns the Order Generator thread (§4.3): at `tick_between_orders`, picks
/// a recipe uniformly at random, stamps a fresh monotonic id, and enqueues.
///
/// `enqueue`'s blocking wait is the generator's only suspension point and is
/// the system's backpressure signal (§4.2 edge-case policy): the generator is
/// expected to sit blocked there when every station is saturated.
pub fn spawn(
    shared: Arc<ShmHandle>,
    catalog: Arc<RecipeCatalog>,
) -> std::io::Result<JoinHandle<Result<(), BurgerError>>> {
    Builder::new().name("[ GENERATOR ]".to_string()).spawn(move || {
        let next_id = AtomicU64::new(1);
        let poll = Duration::from_millis(50);

        while shared.is_active() {
            thread::sleep(Duration::from_secs(shared.tick_between_orders_secs));
            if !shared.is_active() {
                break;
            }

            let recipe_index = rand::thread_rng().gen_range(0, catalog.recipes().len());
            let recipe = &catalog.recipes()[recipe_index];
            let indices: Vec<i8> = recipe
                .ingredients()
                .iter()
                .map(|ingredient| {
                    catalog
                        .ingredient_index(ingredient.as_str())
                        .expect("recipe ingredient must exist in the catalog") as i8
                })
                .collect();

            let id = next_id.fetch_add(1, Ordering::SeqCst);
            let order = Order::new(id, recipe_index as u16, &indices, now_secs());

            let accepted = fifo::enqueue(&shared.fifo, order, || !shared.is_active(), poll)?;
            if accepted {
                let mut counters = shared.counters.lock()?;
                counters.total_generated += 1;
                drop(counters);
                shared.counters.notify_all();
                debug!(
                    "[ GENERATOR ]: enqueued order #{} ({})",
                    id,
                    recipe.name.as_str()
                );
            } else {
                info!("[ GENERATOR ]: shutdown observed while blocked on a full queue");
            }
        }

        debug!("[ GENERATOR ]: shutting down");
        Ok(())
    })
}
