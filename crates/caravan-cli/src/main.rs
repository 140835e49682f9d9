//! CLI frontend for the caravan engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use caravan_engine::Registries;

#[derive(Parser)]
#[command(
    name = "caravan",
    about = "Caravan sheet: derived statistics, rests, treasure, and rolls",
    version,
    propagate_version = true
)]
struct Cli {
    /// JSON file of extra or replacement traveler roles
    #[arg(long, global = true, value_name = "FILE")]
    role_file: Option<PathBuf>,

    /// JSON file of extra or replacement wagon types
    #[arg(long, global = true, value_name = "FILE")]
    wagon_file: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive every statistic of a caravan snapshot
    Derive {
        /// Caravan snapshot (JSON)
        file: PathBuf,

        /// Show where each value comes from
        #[arg(short, long)]
        sources: bool,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Show the field paths a modifier target changes
    Resolve {
        /// Modifier target, e.g. caravan_defense
        target: String,
    },

    /// List modifier and context-note targets
    Targets,

    /// List traveler roles
    Roles {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List wagon types
    Wagons {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show feat, traveler, wagon, and cargo counts
    Counts {
        /// Caravan snapshot (JSON)
        file: PathBuf,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Show context notes for a target
    Notes {
        /// Caravan snapshot (JSON)
        file: PathBuf,

        /// Note target, e.g. caravan_security
        target: String,
    },

    /// Rest the caravan for a night
    Rest {
        /// Caravan snapshot (JSON)
        file: PathBuf,

        /// Hours rested
        #[arg(long, default_value = "12")]
        hours: u32,

        /// Provisions supplied by magic
        #[arg(short, long, default_value = "0")]
        magical_provisions: i64,

        /// Do not rest linked travelers
        #[arg(long)]
        no_travelers: bool,

        /// Do not restore daily uses
        #[arg(long)]
        no_restore: bool,

        /// RNG seed for starvation damage
        #[arg(long)]
        seed: Option<u64>,

        /// Save the rested caravan back to the file
        #[arg(short, long)]
        write: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sell all treasure for coin
    Convert {
        /// Caravan snapshot (JSON)
        file: PathBuf,

        /// Remove sold treasure instead of zeroing its quantity
        #[arg(long)]
        delete: bool,

        /// Pay out platinum as well as gold
        #[arg(long)]
        platinum: bool,

        /// Save the result back to the file
        #[arg(short, long)]
        write: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Roll a resolve or security test, or the caravan attack
    Check {
        /// Caravan snapshot (JSON)
        file: PathBuf,

        /// resolve, security, or attack
        roll: String,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Roll a dice expression such as 2d6+1
    Roll {
        /// Dice expression
        expr: String,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Report problems with a caravan snapshot
    Validate {
        /// Caravan snapshot (JSON)
        file: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(command: Commands, registries: &Registries) -> Result<(), String> {
    match command {
        Commands::Derive {
            file,
            sources,
            json,
        } => commands::derive::run(&file, registries, sources, json),
        Commands::Resolve { target } => commands::targets::resolve(&target),
        Commands::Targets => commands::targets::run(registries),
        Commands::Roles { json } => commands::registry::roles(registries, json),
        Commands::Wagons { json } => commands::registry::wagon_types(registries, json),
        Commands::Counts { file, json } => commands::counts::run(&file, registries, json),
        Commands::Notes { file, target } => commands::notes::run(&file, registries, &target),
        Commands::Rest {
            file,
            hours,
            magical_provisions,
            no_travelers,
            no_restore,
            seed,
            write,
            json,
        } => {
            let options = caravan_engine::RestOptions::default()
                .with_hours(hours)
                .with_magical_provisions(magical_provisions)
                .with_rest_travelers(!no_travelers)
                .with_restore_daily_uses(!no_restore);
            commands::rest::run(&file, registries, &options, seed, write, json)
        }
        Commands::Convert {
            file,
            delete,
            platinum,
            write,
            json,
        } => {
            let options = caravan_engine::ConvertOptions::default()
                .with_delete(delete)
                .with_platinum(platinum);
            commands::convert::run(&file, &options, write, json)
        }
        Commands::Check {
            file,
            roll,
            seed,
            json,
        } => commands::check::run(&file, registries, &roll, seed, json),
        Commands::Roll { expr, seed } => commands::roll::run(&expr, seed),
        Commands::Validate { file } => commands::validate::run(&file, registries),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = commands::load_registries(cli.role_file.as_deref(), cli.wagon_file.as_deref())
        .and_then(|registries| dispatch(cli.command, &registries));

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
