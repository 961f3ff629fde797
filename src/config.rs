use std::env;
use std::time::Duration;

use log::LevelFilter;

/// Fixed sizing limits for the shared-memory layout.
///
/// These bound the `repr(C)` types in `shared_state.rs`; they are compile-time
/// constants (not environment-overridable) because the producer and the
/// operator must agree on the exact layout (§6).
pub struct Limits;
impl Limits {
    /// Upper bound on concurrently configured stations.
    pub const MAX_STATIONS: usize = 16;
    /// Ingredient slots per station.
    pub const N_INGREDIENTS: usize = 9;
    /// Ingredients per recipe.
    pub const MAX_RECIPE_LEN: usize = 10;
    /// Capacity of a single dispenser.
    pub const CAPACITY: u32 = 100;
    /// Below this many units, a dispenser counts toward the "critical" alert.
    pub const LOW_THRESHOLD: u32 = 2;
    /// Number of dispensers at/below LOW_THRESHOLD that trips the less-severe alert.
    pub const LOW_THRESHOLD_COUNT: usize = 3;
    /// Assignment attempts before an order is dropped with a TIMEOUT notice.
    pub const RETRY_BOUND: u8 = 20;
    /// Ring capacity of the pending-order FIFO.
    pub const MAX_QUEUE: usize = 64;
    /// Rolling log entries kept per station.
    pub const LOG_CAPACITY: usize = 32;
    /// Recipe catalog size.
    pub const MAX_RECIPES: usize = 16;
}

/// Environment-overridable timing knobs, each read with
/// `env::var(...).unwrap_or(default).parse().unwrap_or(default)`.
pub struct Consts;
impl Consts {
    /// Seconds to pace each recipe step (`-t, --tiempo-ingrediente`), [1, 60], default 2.
    pub fn tick_per_ingredient() -> u64 {
        env::var("TICK_PER_INGREDIENTE")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u64>()
            .unwrap_or(2)
            .clamp(1, 60)
    }

    /// Seconds between generated orders (`-o, --tiempo-orden`), [1, 300], default 7.
    pub fn tick_between_orders() -> u64 {
        env::var("TICK_BETWEEN_ORDERS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<u64>()
            .unwrap_or(7)
            .clamp(1, 300)
    }

    /// Number of stations (`-n, --bandas`), [1, MAX_STATIONS], default 3.
    pub fn num_stations() -> usize {
        let n = env::var("N_BANDAS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<usize>()
            .unwrap_or(3);
        n.clamp(1, Limits::MAX_STATIONS)
    }

    /// Interval between Inventory Monitor scans (~15s per §4.6).
    pub fn monitor_interval() -> Duration {
        Duration::from_secs(
            env::var("MONITOR_INTERVAL_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse::<u64>()
                .unwrap_or(15),
        )
    }

    /// Minimum time between two alert logs for the same station (~30s per §4.6).
    pub fn alert_rate_limit() -> Duration {
        Duration::from_secs(
            env::var("ALERT_RATE_LIMIT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .unwrap_or(30),
        )
    }

    /// Dispatcher empty-FIFO poll interval (~200ms per §4.4/§5).
    pub fn dispatch_poll() -> Duration {
        Duration::from_millis(
            env::var("DISPATCH_POLL_MS")
                .unwrap_or_else(|_| "200".to_string())
                .parse::<u64>()
                .unwrap_or(200),
        )
    }

    /// Delay before re-attempting a re-queued order (~3s per §4.4).
    pub fn dispatch_retry_backoff() -> Duration {
        Duration::from_secs(
            env::var("DISPATCH_RETRY_BACKOFF_SECS")
                .unwrap_or_else(|_| "3".to_string())
                .parse::<u64>()
                .unwrap_or(3),
        )
    }
}

/// The stable shared-memory identifier both processes must agree on (§6).
pub const SHM_NAME: &str = "/burger_system";

/// Initializes the logger, reading `RUST_LOG` with a default level of `info`.
pub fn init_logger() {
    env_logger::builder()
        .filter(
            None,
            env::var("RUST_LOG")
                .unwrap_or_default()
                .parse::<LevelFilter>()
                .unwrap_or(LevelFilter::Info),
        )
        .format_timestamp(None)
        .init();
}
