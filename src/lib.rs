pub mod catalog;
pub mod clock;
pub mod config;
pub mod control;
pub mod dispatcher;
pub mod dispenser;
pub mod error;
pub mod fifo;
pub mod fixed_str;
pub mod generator;
pub mod lifecycle;
pub mod log_ring;
pub mod monitor;
pub mod order;
pub mod recipe;
pub mod shared_state;
pub mod signals;
pub mod station;
pub mod station_worker;
pub mod sync;
