use consensus_core::ConsensusParams;
use hived::cli::{self, Command};
use hived::{commands, ui, Config, SimulationPlan};
use std::error::Error;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    let args = cli::parse_args();

    let mut config = match &args.config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_cli_overrides(&args)?;
    init_logging(&args, &config);

    let network = config.network_type()?;
    info!("Using {} parameters", network);

    match &args.command {
        Command::Params => println!("{}", commands::params_json(network)?),
        Command::DecodeBits { bits } => {
            let bits = cli::parse_bits(bits)?;
            let report = commands::decode_bits(bits, &ConsensusParams::for_network(network));
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Simulate { blocks, bees, graph } => {
            ui::print_status("…", &format!("Simulating {} regtest blocks", blocks), ui::StatusType::Info);
            let plan = SimulationPlan { blocks: *blocks, bees: *bees, graph: *graph };
            match commands::simulate(&config, &plan) {
                Ok(report) => ui::print_report(&report),
                Err(e) => {
                    ui::print_status("✗", &format!("Simulation failed: {}", e), ui::StatusType::Error);
                    return Err(e.into());
                }
            }
        }
        Command::ShowConfig => print!("{}", config.to_toml()?),
    }
    Ok(())
}

fn init_logging(args: &cli::Args, config: &Config) {
    use tracing_subscriber::{fmt, EnvFilter};

    // An explicit --log-level beats the config file.
    let level = if args.log_level != "info" { &args.log_level } else { &config.logging.level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(true).with_thread_ids(true).with_writer(std::io::stderr).init();
}
