use std::fmt::{Display, Write};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf, absolute};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use clap::builder::styling::Styles;
use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum, crate_version};
use clap_cargo::style::{ERROR, HEADER, INVALID, LITERAL, PLACEHOLDER, USAGE, VALID};
use dimensioned::si::Meter;
use strum::Display;
use sys_locale::get_locale;
use tracing::level_filters::LevelFilter;
use tracing::{Level, debug, info, instrument, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry, fmt};
use tripweaver::internal::report::route_report;
use tripweaver::{
    InsertionStrategy, Kilometers, MergedRoute, Miles, RouteOptions, RouteState, TripWeaverError,
    Waypoint,
};

pub const CLAP_STYLING: Styles = Styles::styled()
    .header(HEADER)
    .usage(USAGE)
    .literal(LITERAL)
    .placeholder(PLACEHOLDER)
    .error(ERROR)
    .valid(VALID)
    .invalid(INVALID);

static LONG_VERSION: LazyLock<String> =
    LazyLock::new(|| format!("{} (rustc {})", crate_version!(), env!("RUSTC_VERSION")));

/// Weave landmarks into a trip itinerary
///
/// Given a trip's cities in order and a set of landmarks discovered along the
/// way, places each landmark where visiting it adds the least distance,
/// without reordering the cities.
#[derive(Parser)]
#[command(
    name = "tripweaver",
    version,
    long_version = LONG_VERSION.as_str(),
    about,
    color = ColorChoice::Auto,
    styles = CLAP_STYLING,
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,

    /// Configure diagnostic logging level
    ///
    /// Set to DEBUG to see a performance summary following execution.
    #[clap(long, short = 'L', default_value_t = Level::ERROR)]
    log_level: Level,

    /// Log to a file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// The unit of distance used in reports on the command line.
    ///
    /// If unspecified, this will default to either km or mi based on your
    /// system locale.
    #[clap(long, short = 'u', default_value_t = DistUnit::Autodetect)]
    distance_unit: DistUnit,
}

#[derive(Copy, Clone, Display, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
#[clap(rename_all = "kebab-case")]
enum DistUnit {
    Autodetect,
    M,
    Km,
    Mi,
}

impl DistUnit {
    fn get(self) -> DistUnit {
        match self {
            Self::Autodetect => Self::auto_detect(),
            _ => self,
        }
    }

    fn auto_detect() -> DistUnit {
        let locale = get_locale().unwrap_or_else(|| String::from("en-US"));
        match locale.as_str() {
            "en-US" | "en-GB" => Self::Mi,
            _ => Self::Km,
        }
    }
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Strategy for scoring candidate landmark positions
    #[clap(long, short = 's', default_value_t = InsertionStrategy::FullPath)]
    strategy: InsertionStrategy,

    /// Reorder landmarks between cities after insertion, where that shortens
    /// the route
    #[clap(long, short, action)]
    refine: bool,
}

impl RouteArgs {
    fn options(&self) -> RouteOptions {
        RouteOptions::default()
            .with_strategy(self.strategy)
            .with_refine(self.refine)
    }
}

#[derive(Args, Debug)]
struct OptimizeArgs {
    /// JSON input path, containing an array of waypoints
    input: PathBuf,

    /// Output path for the merged route as JSON
    ///
    /// If unspecified, the merged route is written to stdout.
    #[clap(long, short)]
    output: Option<PathBuf>,

    /// Route state file
    ///
    /// If the file exists, its base cities and landmark history are used for
    /// the merge. The updated state is written back to it afterwards.
    #[clap(long)]
    state: Option<PathBuf>,

    /// Maximum number of waypoints accepted from the input
    #[clap(long, short = 'm', default_value_t = 500)]
    max_waypoints: usize,

    #[command(flatten)]
    route: RouteArgs,
}

#[derive(Args, Debug)]
struct StateArgs {
    /// Route state file, as written by `optimize --state`
    #[clap(long)]
    state: PathBuf,

    #[command(flatten)]
    route: RouteArgs,
}

#[derive(Args, Debug)]
struct BaseArgs {
    /// Route state file, as written by `optimize --state`
    #[clap(long)]
    state: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge landmarks into a route
    ///
    /// Reads cities and landmarks from a JSON file and inserts each landmark
    /// into the route of cities, in the order given.
    Optimize(OptimizeArgs),

    /// Print the merged route for a stored route state
    Combined(StateArgs),

    /// Print the base cities of a stored route state
    Base(BaseArgs),

    /// Print software license info
    License,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(
        File::open(path).with_context(|| format!("Opening {path:?}"))?,
    );
    serde_json::from_reader(reader).with_context(|| format!("Parsing JSON from {path:?}"))
}

fn write_json<T: serde::Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(
                File::create(path).with_context(|| format!("Creating {path:?}"))?,
            );
            serde_json::to_writer_pretty(writer, value)?;
            info!("Wrote {:?}", absolute(path)?);
        }
        None => {
            serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
            println!();
        }
    }
    Ok(())
}

fn read_state(path: &Path) -> Result<RouteState> {
    if path.exists() {
        read_json(path).context("The route state file is not valid. Check that it is correct.")
    } else {
        info!("No route state at {:?}, starting fresh", path);
        Ok(RouteState::new())
    }
}

#[instrument(level = "trace", skip_all)]
fn optimize_cmd(args: &Cli, sub_args: &OptimizeArgs) -> Result<String> {
    debug!("optimize args: {:?}", sub_args);

    let waypoints: Vec<Waypoint> = read_json(&sub_args.input)
        .context("Reading the <INPUT> file. Check that it is a JSON array of waypoints.")?;
    let state = match &sub_args.state {
        Some(path) => read_state(path)?,
        None => RouteState::new(),
    };

    let res = tripweaver::optimize_bounded(
        &state,
        &waypoints,
        &sub_args.route.options(),
        sub_args.max_waypoints,
    );
    let (state, merged) = match &res {
        Err(TripWeaverError::TooManyWaypoints(_, _)) => res.context(
            "The <INPUT> has more waypoints than allowed. Raise --max-waypoints to accept it.",
        ),
        _ => res.map_err(anyhow::Error::from),
    }?;

    for rejected in &merged.rejected {
        warn!(
            "Landmark {} was left out: {}",
            rejected.waypoint.id, rejected.reason
        );
    }

    write_json(&merged.waypoints, sub_args.output.as_deref())?;
    if let Some(path) = &sub_args.state {
        write_json(&state, Some(path)).context("Writing the route state file")?;
    }

    generate_report(args.distance_unit, &merged)
}

fn combined_cmd(args: &Cli, sub_args: &StateArgs) -> Result<String> {
    let state: RouteState = read_json(&sub_args.state)?;
    let merged = state.combined_waypoints(&sub_args.route.options())?;
    write_json(&merged.waypoints, None)?;
    generate_report(args.distance_unit, &merged)
}

fn base_cmd(sub_args: &BaseArgs) -> Result<String> {
    let state: RouteState = read_json(&sub_args.state)?;
    write_json(&state.extract_waypoints(), None)?;
    Ok(String::new())
}

fn generate_report(unit: DistUnit, merged: &MergedRoute) -> Result<String> {
    let report = match unit.get() {
        DistUnit::M => route_report::<Meter<f64>>(merged),
        DistUnit::Km => route_report::<Kilometers<f64>>(merged),
        DistUnit::Mi => route_report::<Miles<f64>>(merged),
        DistUnit::Autodetect => bail!("Failed to detect distance unit for report: {}", unit),
    }?;
    Ok(report)
}

fn license_cmd() -> Result<String> {
    let mut r = include_str!("../../LICENSE.txt").to_string();
    writeln!(
        &mut r,
        "\n===\n\nThis executable contains code from third-party open source projects,\n\
         whose licenses are listed in the crate's dependency metadata."
    )?;
    Ok(r)
}

fn print_report<T: Display>(report: T) {
    eprint!("{report}");
}

fn main() -> Result<()> {
    // Intentionally avoid wrapping argument parsing errors in anyhow::Result so
    // we preserve Clap's pretty formatting of usage info.
    let args = Cli::parse();

    let log_w: Box<dyn std::io::Write + Send> = match &args.log_file {
        Some(path) => Box::new(File::create(path).context("Creating the log file")?),
        None => Box::new(std::io::stderr()),
    };
    let (appender, _guard) = tracing_appender::non_blocking(log_w);

    // Enable the TRACE-level span tree layer for fmt logging level DEBUG.
    let fmt_layer = fmt::Layer::new()
        .with_writer(appender)
        .with_ansi(args.log_file.is_none())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::CLOSE)
        .with_filter(LevelFilter::from_level(args.log_level));
    if args.log_level >= Level::DEBUG {
        let span_tree_layer = tracing_span_tree::SpanTree::default().aggregate(true);
        tracing::subscriber::set_global_default(
            Registry::default().with(fmt_layer).with(span_tree_layer),
        )?;
    } else {
        tracing::subscriber::set_global_default(Registry::default().with(fmt_layer))?;
    }

    debug!("tripweaver {}", clap::crate_version!());

    let report = match &args.cmd {
        Commands::Optimize(sub_args) => optimize_cmd(&args, sub_args),
        Commands::Combined(sub_args) => combined_cmd(&args, sub_args),
        Commands::Base(sub_args) => base_cmd(sub_args),
        Commands::License => {
            print!("{}", license_cmd()?);
            return Ok(());
        }
    }?;

    print_report(report);
    Ok(())
}
