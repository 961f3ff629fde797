//! The operator process (§4.7, §6): attaches to an already-running
//! producer's shared region and issues a single control operation or prints
//! a status snapshot. Exits with a fatal error if no producer is running.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use burger_line::config::{init_logger, SHM_NAME};
use burger_line::control;
use burger_line::shared_state::ShmHandle;

/// Burger production line operator: attaches to a running producer and
/// pauses, resumes, or refills stations.
#[derive(Parser)]
#[command(name = "operator")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pause one station.
    Pause { station_id: usize },
    /// Resume one paused station.
    Resume { station_id: usize },
    /// Refill every dispenser at one station.
    Refill { station_id: usize },
    /// Refill every station.
    RefillAll,
    /// Print a snapshot of every station.
    Status,
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    let shared = match ShmHandle::attach(SHM_NAME) {
        Ok(shared) => shared,
        Err(e) => {
            error!("[ OPERATOR ]: fatal — no producer running ({})", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Pause { station_id } => control::pause(&shared, station_id),
        Command::Resume { station_id } => control::resume(&shared, station_id),
        Command::Refill { station_id } => control::refill_station(&shared, station_id),
        Command::RefillAll => control::refill_all_stations(&shared),
        Command::Status => print_status(&shared),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("[ OPERATOR ]: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Plain-text snapshot, not a dashboard (out of scope, §1).
fn print_status(shared: &ShmHandle) -> Result<(), burger_line::error::BurgerError> {
    let counters = shared.counters.lock()?;
    println!(
        "generated={} processed={} queued={}",
        counters.total_generated,
        counters.total_processed,
        shared.fifo.lock()?.size()
    );
    drop(counters);

    for snapshot in control::snapshot_all(shared)? {
        println!(
            "station #{} [{:?}] active={} paused={} busy={} processed={} needs_refill={} status=\"{}\"",
            snapshot.id,
            snapshot.state,
            snapshot.active,
            snapshot.paused,
            snapshot.is_busy,
            snapshot.processed_count,
            snapshot.needs_refill,
            snapshot.status,
        );
        for (name, quantity) in &snapshot.dispensers {
            println!("    {} = {}", name, quantity);
        }
    }
    Ok(())
}
