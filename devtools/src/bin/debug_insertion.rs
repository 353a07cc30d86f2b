use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tripweaver::internal::insertion_scores;
use tripweaver::{InsertionStrategy, Kilometers, Waypoint};

/// Debugs an unexpected landmark placement
///
/// Takes a route as a JSON array of waypoints and a candidate landmark's
/// coordinates, and prints the score of every insertion position under each
/// strategy, marking the position each one picks.
#[derive(Parser)]
struct Cli {
    /// JSON route path
    route: PathBuf,

    /// Candidate latitude
    #[clap(long, allow_hyphen_values = true)]
    lat: f64,

    /// Candidate longitude
    #[clap(long, allow_hyphen_values = true)]
    lng: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let route: Vec<Waypoint> = serde_json::from_reader(BufReader::new(
        File::open(&args.route).context("Opening the route file")?,
    ))?;
    let candidate = Waypoint::landmark("candidate", args.lat, args.lng);

    for strategy in [InsertionStrategy::FullPath, InsertionStrategy::Incremental] {
        let scores = insertion_scores(&route, &candidate, strategy)?;
        let chosen = tripweaver::find_optimal_position_with(&route, &candidate, strategy)?;
        println!("{strategy}:");
        for (i, score) in scores.iter().enumerate() {
            let before = route.get(i).map(|w| w.name.as_str()).unwrap_or("(end)");
            println!(
                "  {} {:>3} before {:<24} {:.6}",
                if i == chosen { "*" } else { " " },
                i,
                before,
                Kilometers::<f64>::from(*score)
            );
        }
    }
    Ok(())
}
