//! A CLI tool and library for weaving landmarks into a trip itinerary.
//!
//! A trip is planned as an ordered list of cities. As landmarks and other
//! points of interest are discovered during planning, this crate places each
//! one between the cities where visiting it adds the least great-circle
//! distance, never reordering the cities themselves.
//!
//! See [`RouteState::optimize_full_route`] for the main entry point into the
//! library, and [`RouteState::combined_waypoints`] for rebuilding a merged
//! route from stored state.
//!
//! # Feature flags
//!
//! - `cli` enables the additional dependencies needed by the CLI

mod algorithm;
mod geographic;
pub mod internal;
mod measure;
mod route;
mod types;

use thiserror::Error;

pub use algorithm::{
    AlgorithmError, InsertionStrategy, find_optimal_position, find_optimal_position_with,
    refine_gaps,
};
pub use geographic::{EARTH_RADIUS_M, haversine_distance, haversine_km, path_length};
pub use measure::{DEG, Degrees, Kilometers, Miles};
pub use route::{
    MergedRoute, RejectedWaypoint, RouteError, RouteOptions, RouteState, optimize_full_route,
};
pub use types::{Coordinates, GeoPoint, GeoPointDimension, TypeError, Waypoint, WaypointKind};

#[derive(Error, Debug)]
pub enum TripWeaverError {
    #[error("Route assembly error")]
    Route(#[from] RouteError),
    #[error("Position search error")]
    Algorithm(#[from] AlgorithmError),
    #[error("Too many waypoints in input: {0} (limit {1})")]
    TooManyWaypoints(usize, usize),
}

pub type Result<T> = std::result::Result<T, TripWeaverError>;

/// Merge waypoints into a stored route state, after checking the input size.
///
/// Merging is quadratic in the number of waypoints per landmark, which is
/// negligible for a trip but not for arbitrary input. Hosts that accept
/// waypoints from outside should bound them here before they reach
/// [`RouteState::optimize_full_route`].
pub fn optimize_bounded(
    state: &RouteState,
    waypoints: &[Waypoint],
    options: &RouteOptions,
    max_waypoints: usize,
) -> Result<(RouteState, MergedRoute)> {
    if waypoints.len() > max_waypoints {
        return Err(TripWeaverError::TooManyWaypoints(
            waypoints.len(),
            max_waypoints,
        ));
    }
    Ok(state.optimize_full_route(waypoints, options)?)
}
