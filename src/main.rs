// Salon Grid
// Command-line entry point

fn main() -> anyhow::Result<()> {
    env_logger::init();

    log::info!("Starting salon-grid");

    salon_grid::cli::run()
}
