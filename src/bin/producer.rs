//! The producer process (§4.8, §6): creates the shared region, starts the
//! order generator, dispatcher, inventory monitor, and station workers, then
//! waits for a shutdown signal.

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use log::{error, info};

use burger_line::catalog::default_catalog;
use burger_line::config::{init_logger, Consts, Limits, SHM_NAME};
use burger_line::recipe::RecipeCatalog;
use burger_line::{lifecycle, signals};

/// Burger production line producer: creates the shared-memory region and
/// runs the simulation until interrupted.
#[derive(Parser)]
#[command(name = "producer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Number of stations to run (`-n, --bandas`).
    #[arg(short = 'n', long = "bandas")]
    bandas: Option<usize>,

    /// Seconds to pace each recipe step (`-t, --tiempo-ingrediente`), [1, 60].
    #[arg(short = 't', long = "tiempo-ingrediente")]
    tiempo_ingrediente: Option<u64>,

    /// Seconds between generated orders (`-o, --tiempo-orden`), [1, 300].
    #[arg(short = 'o', long = "tiempo-orden")]
    tiempo_orden: Option<u64>,

    /// Print the recipe catalog and exit.
    #[arg(short = 'm', long = "menu")]
    menu: bool,
}

fn main() -> ExitCode {
    init_logger();
    dotenv().ok();

    let cli = Cli::parse();
    let catalog: RecipeCatalog = default_catalog();

    if cli.menu {
        print_menu(&catalog);
        return ExitCode::SUCCESS;
    }

    let num_stations = cli.bandas.unwrap_or_else(Consts::num_stations);
    let tick_per_ingredient = cli.tiempo_ingrediente.unwrap_or_else(Consts::tick_per_ingredient);
    let tick_between_orders = cli.tiempo_orden.unwrap_or_else(Consts::tick_between_orders);

    if num_stations == 0 || num_stations > Limits::MAX_STATIONS {
        error!(
            "[ PRODUCER ]: --bandas must be between 1 and {}",
            Limits::MAX_STATIONS
        );
        return ExitCode::FAILURE;
    }

    if !(1..=60).contains(&tick_per_ingredient) {
        error!("[ PRODUCER ]: --tiempo-ingrediente must be between 1 and 60");
        return ExitCode::FAILURE;
    }

    if !(1..=300).contains(&tick_between_orders) {
        error!("[ PRODUCER ]: --tiempo-orden must be between 1 and 300");
        return ExitCode::FAILURE;
    }

    let system = match lifecycle::start(
        SHM_NAME,
        num_stations,
        catalog,
        tick_per_ingredient,
        tick_between_orders,
    ) {
        Ok(system) => system,
        Err(e) => {
            error!("[ PRODUCER ]: fatal — could not start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let flags = match signals::install() {
        Ok(flags) => flags,
        Err(e) => {
            error!("[ PRODUCER ]: fatal — could not install signal handlers: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "[ PRODUCER ]: running with {} station(s); send SIGTERM/SIGINT to stop",
        num_stations
    );

    while !signals::shutdown_requested(&flags) {
        if let Err(e) = signals::poll(&flags, &system.shared) {
            error!("[ PRODUCER ]: signal handling error: {}", e);
        }
        thread::sleep(Duration::from_millis(200));
    }

    info!("[ PRODUCER ]: shutdown requested, waiting for threads to finish");
    if let Err(e) = lifecycle::shutdown(system) {
        error!("[ PRODUCER ]: error during shutdown: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// `-m, --menu` (§6): prints the recipe catalog and exits without starting
/// the production line.
fn print_menu(catalog: &RecipeCatalog) {
    println!("Ingredients: {}", catalog.ingredient_names().join(", "));
    for recipe in catalog.recipes() {
        let ingredients: Vec<&str> = recipe.ingredients().iter().map(|i| i.as_str()).collect();
        println!(
            "{} — {} ({} cents)",
            recipe.name,
            ingredients.join(", "),
            recipe.price_cents
        );
    }
}
