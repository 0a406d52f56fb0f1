use std::process::ExitCode;

use asterviz::{
    catalog::import::{import_csv_path, load_seed_path, ImportOptions},
    derive_phase, Asterviz, AstervizError, AstervizParams, MemoryCatalog,
};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "asterviz")]
#[command(about = "Small-body catalog explorer: random picks, search and Keplerian ephemerides")]
struct Cli {
    /// Catalog files to load: `.csv` exports are imported, `.json` seeds are merged
    #[arg(short, long, global = true)]
    catalog: Vec<Utf8PathBuf>,

    /// CSV rows to skip before importing
    #[arg(long, default_value_t = 0, global = true)]
    import_offset: usize,

    /// Maximum number of CSV rows imported per file (0 = no limit)
    #[arg(long, default_value_t = 0, global = true)]
    import_limit: usize,

    /// Seed of the random source, for reproducible picks
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Gravitational parameter in AU³/year² (1.0 = normalized clock)
    #[arg(long, global = true)]
    mu: Option<f64>,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick one random object
    Random {
        /// mainbelt, neo, trojan, comet or any
        #[arg(long)]
        category: Option<String>,
    },

    /// Random sample of the catalog for display layers
    Explore {
        #[arg(long)]
        limit: Option<usize>,
        /// Comma-separated layers, e.g. "neo,comet"
        #[arg(long)]
        layers: Option<String>,
    },

    /// Search objects by name or designator
    Search { query: String },

    /// Show one object, by designator, key or name
    Object { id: String },

    /// Fixed-step positions of an object
    Ephemeris {
        id: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Stop date (YYYY-MM-DD)
        #[arg(long)]
        stop: String,
        /// Step, e.g. "1d" or "6h"
        #[arg(long)]
        step: Option<String>,
    },

    /// Position of an object at a date or at an instant
    Position {
        id: String,
        /// Date (YYYY-MM-DD), midnight UTC
        #[arg(long, required_unless_present = "at", conflicts_with = "at")]
        date: Option<String>,
        /// Instant (YYYY-MM-DDTHH:MM:SS, optional time scale suffix such as "UTC" or "TAI")
        #[arg(long)]
        at: Option<String>,
    },

    /// Closed polyline of the orbit of an object
    Orbit {
        id: String,
        /// Number of segments of the polyline
        #[arg(long)]
        segments: Option<usize>,
    },

    /// Number of objects per category
    Stats,

    /// Synthetic mean anomaly derived from a designator
    Phase { designator: String },

    /// Show the effective parameters
    Params,
}

fn init_tracing(log_json: bool) {
    let filter =
        EnvFilter::try_from_env("ASTERVIZ_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_catalog(cli: &Cli) -> Result<MemoryCatalog, AstervizError> {
    let mut catalog = MemoryCatalog::new();
    let options = ImportOptions {
        offset: cli.import_offset,
        limit: cli.import_limit,
    };
    for path in &cli.catalog {
        match path.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("json") => {
                load_seed_path(path, &mut catalog)?;
            }
            _ => {
                import_csv_path(path, &mut catalog, &options)?;
            }
        }
    }
    info!(objects = catalog.len(), "catalog ready");
    Ok(catalog)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AstervizError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), AstervizError> {
    let mut builder = AstervizParams::builder();
    if let Some(mu) = cli.mu {
        builder = builder.mu(mu);
    }
    let params = builder.build()?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match &cli.command {
        Commands::Phase { designator } => {
            return print_json(&serde_json::json!({
                "spkid": designator,
                "M0": derive_phase(designator),
            }));
        }
        Commands::Params => {
            println!("{params}");
            return Ok(());
        }
        _ => {}
    }

    let service = Asterviz::with_params(load_catalog(&cli)?, params);
    match &cli.command {
        Commands::Random { category } => {
            print_json(&service.random_object(category.as_deref(), &mut rng)?)
        }
        Commands::Explore { limit, layers } => {
            print_json(&service.explore_sample(*limit, layers.as_deref(), &mut rng)?)
        }
        Commands::Search { query } => print_json(&service.search(Some(query))?),
        Commands::Object { id } => print_json(&service.object_detail(id)?),
        Commands::Ephemeris {
            id,
            start,
            stop,
            step,
        } => print_json(&service.ephemeris(
            id,
            Some(start),
            Some(stop),
            step.as_deref(),
        )?),
        Commands::Position { id, date, at } => match at {
            Some(at) => print_json(&service.position_at(id, Some(at))?),
            None => print_json(&service.position(id, date.as_deref())?),
        },
        Commands::Orbit { id, segments } => print_json(&service.orbit(id, *segments)?),
        Commands::Stats => print_json(&service.stats()?),
        Commands::Phase { .. } | Commands::Params => Ok(()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "command failed");
            ExitCode::FAILURE
        }
    }
}
