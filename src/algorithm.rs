//! Algorithms for placing landmarks along a route
//!
//! To merge a discovered landmark into a trip, we need to find the position in
//! the existing sequence of stops at which visiting the landmark adds the
//! least travel distance. This module implements that search (the cheapest
//! insertion heuristic) and an optional 2-opt refinement that may reorder
//! landmarks, but never cities, after insertion.

use std::iter;

use dimensioned::si::{M, Meter};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::geographic::haversine_distance;
use crate::types::{GeoPoint, TypeError, Waypoint};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgorithmError {
    #[error("invalid coordinates for waypoint {id}")]
    InvalidWaypoint { id: String, source: TypeError },
}

type Result<T> = std::result::Result<T, AlgorithmError>;

/// How candidate insertion positions are scored.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "cli", clap(rename_all = "kebab-case"))]
pub enum InsertionStrategy {
    /// Sum the length of the entire route for every trial position.
    #[default]
    FullPath,

    /// Only measure the detour around the trial position.
    ///
    /// Produces the same positions as [`InsertionStrategy::FullPath`] except
    /// where floating point rounding separates otherwise equal totals.
    Incremental,
}

/// Validates a waypoint's coordinates, naming it in the error.
pub(crate) fn waypoint_point(waypoint: &Waypoint) -> Result<GeoPoint> {
    waypoint
        .point()
        .map_err(|source| AlgorithmError::InvalidWaypoint {
            id: waypoint.id.clone(),
            source,
        })
}

pub(crate) fn waypoint_points(route: &[Waypoint]) -> Result<Vec<GeoPoint>> {
    route.iter().map(waypoint_point).collect()
}

/// Find the index at which inserting `candidate` into `route` yields the
/// shortest total route.
///
/// Every index from `0` through `route.len()` is tried. When several indices
/// give the same total, the earliest wins. An empty route yields `0`.
///
/// Fails if `candidate` or any waypoint in `route` has invalid coordinates;
/// there's no meaningful position for a point we can't place on the map.
///
/// # Example
///
/// ```
/// use tripweaver::{Waypoint, find_optimal_position};
///
/// let route = vec![Waypoint::city("A", 0.0, 0.0), Waypoint::city("B", 0.0, 10.0)];
/// let m = Waypoint::landmark("M", 0.0, 5.0);
/// assert_eq!(find_optimal_position(&route, &m).unwrap(), 1);
/// ```
pub fn find_optimal_position(route: &[Waypoint], candidate: &Waypoint) -> Result<usize> {
    find_optimal_position_with(route, candidate, InsertionStrategy::FullPath)
}

/// Like [`find_optimal_position`], with a choice of scoring strategy.
pub fn find_optimal_position_with(
    route: &[Waypoint],
    candidate: &Waypoint,
    strategy: InsertionStrategy,
) -> Result<usize> {
    let points = waypoint_points(route)?;
    let candidate_point = waypoint_point(candidate)?;
    Ok(best_position(&points, &candidate_point, strategy))
}

/// Position search over points already known to be valid.
#[instrument(level = "trace", skip_all)]
pub(crate) fn best_position(
    points: &[GeoPoint],
    candidate: &GeoPoint,
    strategy: InsertionStrategy,
) -> usize {
    let mut best_index = 0;
    let mut best_score = score(points, candidate, strategy, 0);
    for i in 1..=points.len() {
        let s = score(points, candidate, strategy, i);
        if s < best_score {
            best_index = i;
            best_score = s;
        }
    }
    trace!(
        "Best of {} positions is {} ({})",
        points.len() + 1,
        best_index,
        best_score
    );
    best_index
}

/// The score of every trial position for `candidate`, lowest best.
///
/// Exposes the values [`find_optimal_position_with`] compares, for diagnosing
/// unexpected placements.
pub fn insertion_scores(
    route: &[Waypoint],
    candidate: &Waypoint,
    strategy: InsertionStrategy,
) -> Result<Vec<Meter<f64>>> {
    let points = waypoint_points(route)?;
    let candidate_point = waypoint_point(candidate)?;
    Ok((0..=points.len())
        .map(|i| score(&points, &candidate_point, strategy, i))
        .collect())
}

fn score(
    points: &[GeoPoint],
    candidate: &GeoPoint,
    strategy: InsertionStrategy,
    index: usize,
) -> Meter<f64> {
    match strategy {
        InsertionStrategy::FullPath => spliced_path_length(points, candidate, index),
        InsertionStrategy::Incremental => insertion_cost(points, candidate, index),
    }
}

/// Length of the route with `candidate` spliced in before `points[index]`.
fn spliced_path_length(points: &[GeoPoint], candidate: &GeoPoint, index: usize) -> Meter<f64> {
    let mut sequence = points[..index]
        .iter()
        .chain(iter::once(candidate))
        .chain(points[index..].iter());

    let mut total = 0.0 * M;
    if let Some(mut prev) = sequence.next() {
        for p in sequence {
            total += haversine_distance(prev, p);
            prev = p;
        }
    }
    total
}

/// Distance added to the route by splicing `candidate` in before
/// `points[index]`.
fn insertion_cost(points: &[GeoPoint], candidate: &GeoPoint, index: usize) -> Meter<f64> {
    let prev = index.checked_sub(1).and_then(|i| points.get(i));
    let next = points.get(index);
    match (prev, next) {
        (Some(prev), Some(next)) => {
            haversine_distance(prev, candidate) + haversine_distance(candidate, next)
                - haversine_distance(prev, next)
        }
        (Some(prev), None) => haversine_distance(prev, candidate),
        (None, Some(next)) => haversine_distance(candidate, next),
        (None, None) => 0.0 * M,
    }
}

/// Improvements smaller than this are treated as rounding noise, which also
/// guarantees that refinement terminates.
const MIN_IMPROVEMENT_M: f64 = 1e-6;

/// Shorten a merged route by reordering the landmarks between its cities.
///
/// Runs 2-opt restricted to gaps: maximal runs of consecutive non-city
/// waypoints. A reversal is applied only when it strictly shortens the route,
/// and passes repeat until none does. Cities never move relative to each
/// other, and the result is deterministic.
pub fn refine_gaps(route: &[Waypoint]) -> Result<Vec<Waypoint>> {
    let mut points = waypoint_points(route)?;
    let mut route = route.to_vec();
    refine_gaps_in_place(&mut route, &mut points);
    Ok(route)
}

/// Applies [`refine_gaps`] to a route and its already validated points, which
/// must be the same length and kept in step.
#[instrument(level = "trace", skip_all)]
pub(crate) fn refine_gaps_in_place(route: &mut [Waypoint], points: &mut [GeoPoint]) {
    debug_assert_eq!(route.len(), points.len());

    let mut passes = 0usize;
    let mut reversals = 0usize;
    loop {
        passes += 1;
        let mut improved = false;
        for (start, end) in gaps(route) {
            for i in start..end {
                for j in (i + 1)..=end {
                    if reversal_gain(points, i, j).value_unsafe > MIN_IMPROVEMENT_M {
                        route[i..=j].reverse();
                        points[i..=j].reverse();
                        reversals += 1;
                        improved = true;
                    }
                }
            }
        }
        if !improved {
            break;
        }
    }
    debug!(
        "Refinement applied {} reversals over {} passes",
        reversals, passes
    );
}

/// Inclusive index ranges of the runs of non-city waypoints in `route`.
fn gaps(route: &[Waypoint]) -> Vec<(usize, usize)> {
    let mut result = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, waypoint) in route.iter().enumerate() {
        match (waypoint.is_landmark(), run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                result.push((start, i - 1));
                run_start = None;
            }
            _ => (),
        }
    }
    if let Some(start) = run_start {
        result.push((start, route.len() - 1));
    }
    result
}

/// How much shorter the route becomes by reversing `points[i..=j]`.
fn reversal_gain(points: &[GeoPoint], i: usize, j: usize) -> Meter<f64> {
    let before = i.checked_sub(1).map(|k| &points[k]);
    let after = points.get(j + 1);

    let mut old_edges = 0.0 * M;
    let mut new_edges = 0.0 * M;
    if let Some(b) = before {
        old_edges += haversine_distance(b, &points[i]);
        new_edges += haversine_distance(b, &points[j]);
    }
    if let Some(a) = after {
        old_edges += haversine_distance(&points[j], a);
        new_edges += haversine_distance(&points[i], a);
    }
    old_edges - new_edges
}
