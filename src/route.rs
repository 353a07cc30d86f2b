//! Assembly of merged itineraries
//!
//! A trip's cities form its base route, whose order is fixed by the traveler.
//! Landmarks discovered along the way are inserted into it one at a time, each
//! at the position that adds the least distance as the route stands at that
//! moment. This greedy approach doesn't find an optimal tour, but it is fast
//! and deterministic enough to rerun on every change in an interactive
//! session.
//!
//! [`RouteState`] holds the canonical base route and the history of landmarks
//! added so far. Its operations never mutate it: each returns the updated state
//! for the caller to keep, so the caller decides where state lives and how
//! access to it is serialized.

use dimensioned::si::Meter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::algorithm::{
    AlgorithmError, InsertionStrategy, best_position, refine_gaps_in_place, waypoint_point,
    waypoint_points,
};
use crate::geographic::path_length;
use crate::types::{TypeError, Waypoint};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    #[error("Error placing waypoint")]
    Algorithm(#[from] AlgorithmError),
    #[error("waypoint {0} is not a city and can't be part of the base route")]
    NotACity(String),
    #[error("waypoint {0} is a city and can't be added as a landmark")]
    NotALandmark(String),
}

type Result<T> = std::result::Result<T, RouteError>;

/// Options for assembling a merged route.
#[derive(Clone, Debug, Default)]
pub struct RouteOptions {
    /// How insertion positions are scored.
    pub strategy: InsertionStrategy,

    /// Whether to run [`crate::refine_gaps`] over the merged route.
    pub refine: bool,
}

impl RouteOptions {
    pub fn with_strategy(mut self, strategy: InsertionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_refine(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }
}

/// A landmark left out of a merged route.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectedWaypoint {
    pub waypoint: Waypoint,
    pub reason: TypeError,
}

/// The result of merging landmarks into a base route.
///
/// Not an entity of its own: it is recomputed from a [`RouteState`] whenever
/// needed.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedRoute {
    /// The cities in their original order, with landmarks inserted.
    pub waypoints: Vec<Waypoint>,

    /// Landmarks that couldn't be placed because their coordinates are
    /// invalid.
    pub rejected: Vec<RejectedWaypoint>,

    /// Great-circle length of `waypoints`.
    pub total_distance: Meter<f64>,
}

impl MergedRoute {
    /// A route returned in the given order, without insertion.
    ///
    /// Coordinates are still checked the way [`merge`] checks them: an
    /// invalid city is an error, and an invalid landmark is left out and
    /// reported.
    fn unprocessed(waypoints: &[Waypoint]) -> Result<Self> {
        let mut kept = Vec::with_capacity(waypoints.len());
        let mut points = Vec::with_capacity(waypoints.len());
        let mut rejected = Vec::new();
        for waypoint in waypoints {
            match waypoint_point(waypoint) {
                Ok(point) => {
                    kept.push(waypoint.clone());
                    points.push(point);
                }
                Err(AlgorithmError::InvalidWaypoint { id, source }) if waypoint.is_landmark() => {
                    warn!("Skipping landmark {} with invalid coordinates: {}", id, source);
                    rejected.push(RejectedWaypoint {
                        waypoint: waypoint.clone(),
                        reason: source,
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Self {
            waypoints: kept,
            rejected,
            total_distance: path_length(&points),
        })
    }

    /// Number of non-city waypoints in the route.
    pub fn num_landmarks(&self) -> usize {
        self.waypoints.iter().filter(|w| w.is_landmark()).count()
    }

    /// Number of cities in the route.
    pub fn num_cities(&self) -> usize {
        self.waypoints.len() - self.num_landmarks()
    }
}

/// The stored inputs from which a merged route can be rebuilt.
///
/// Rebuilding from a stored base rather than from the last merged route keeps
/// repeated merges from compounding earlier insertions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteState {
    /// The canonical cities, in the traveler's order.
    pub base_cities: Vec<Waypoint>,

    /// Every landmark added so far, in order of discovery.
    pub landmarks: Vec<Waypoint>,
}

impl RouteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A state whose base route is `cities`.
    pub fn with_base(cities: Vec<Waypoint>) -> Result<Self> {
        if let Some(w) = cities.iter().find(|w| w.is_landmark()) {
            return Err(RouteError::NotACity(w.id.clone()));
        }
        Ok(Self {
            base_cities: cities,
            landmarks: Vec::new(),
        })
    }

    /// Returns a copy of this state with `landmark` in its history.
    ///
    /// A landmark whose id is already known replaces the earlier record
    /// without changing its place in the history.
    pub fn with_landmark(&self, landmark: Waypoint) -> Result<Self> {
        if !landmark.is_landmark() {
            return Err(RouteError::NotALandmark(landmark.id));
        }
        let mut state = self.clone();
        state.record_landmark(landmark);
        Ok(state)
    }

    /// Returns a copy of this state without the landmark `id`.
    pub fn without_landmark(&self, id: &str) -> Self {
        let mut state = self.clone();
        state.landmarks.retain(|w| w.id != id);
        state
    }

    /// Returns a copy of this state without the base city `id`.
    pub fn without_city(&self, id: &str) -> Self {
        let mut state = self.clone();
        state.base_cities.retain(|w| w.id != id);
        state
    }

    fn record_landmark(&mut self, landmark: Waypoint) {
        record_by_id(&mut self.landmarks, landmark);
    }

    /// Merge `waypoints` into a single route.
    ///
    /// Cities and landmarks are separated, keeping the relative order of each.
    /// Landmarks are then inserted one at a time into the base route: the
    /// stored base cities if there are any, otherwise the cities given here.
    /// Returns the updated state, which records the base route and the
    /// landmarks, alongside the merged route.
    ///
    /// A landmark id given more than once is inserted once, using its last
    /// record, as in [`RouteState::with_landmark`].
    ///
    /// Inputs with at most two waypoints, or with no base route to insert into,
    /// are returned in their given order. Landmarks with invalid coordinates
    /// are left out and reported in [`MergedRoute::rejected`], in every case.
    /// A city with invalid coordinates is an error.
    #[instrument(level = "trace", skip_all)]
    pub fn optimize_full_route(
        &self,
        waypoints: &[Waypoint],
        options: &RouteOptions,
    ) -> Result<(RouteState, MergedRoute)> {
        if waypoints.len() <= 2 {
            debug!("Nothing to optimize in {} waypoints", waypoints.len());
            return Ok((self.clone(), MergedRoute::unprocessed(waypoints)?));
        }

        let (cities, landmarks): (Vec<&Waypoint>, Vec<&Waypoint>) =
            waypoints.iter().partition(|w| !w.is_landmark());

        let mut state = self.clone();
        if state.base_cities.is_empty() {
            if cities.is_empty() {
                debug!("No base route for {} landmarks", landmarks.len());
                return Ok((self.clone(), MergedRoute::unprocessed(waypoints)?));
            }
            state.base_cities = cities.into_iter().cloned().collect();
        }
        // Repeated ids collapse into one landmark here as they do in the history.
        let mut incoming = Vec::with_capacity(landmarks.len());
        for landmark in landmarks {
            record_by_id(&mut incoming, landmark.clone());
            state.record_landmark(landmark.clone());
        }

        let merged = merge(&state.base_cities, &incoming, options)?;
        Ok((state, merged))
    }

    /// The merged route for this state's base and landmark history.
    ///
    /// The same route [`RouteState::optimize_full_route`] would produce given
    /// the base cities followed by the landmarks.
    pub fn combined_waypoints(&self, options: &RouteOptions) -> Result<MergedRoute> {
        if self.base_cities.len() + self.landmarks.len() <= 2 || self.base_cities.is_empty() {
            let mut waypoints = self.base_cities.clone();
            waypoints.extend(self.landmarks.iter().cloned());
            return MergedRoute::unprocessed(&waypoints);
        }
        merge(&self.base_cities, self.landmarks.iter(), options)
    }

    /// The stored base cities, without any landmarks.
    pub fn extract_waypoints(&self) -> Vec<Waypoint> {
        self.base_cities.clone()
    }
}

/// Merge a set of landmarks into `base`, ignoring any stored state.
///
/// Equivalent to [`RouteState::optimize_full_route`] on an empty state.
///
/// # Example
///
/// ```
/// use tripweaver::{RouteOptions, Waypoint, optimize_full_route};
///
/// let merged = optimize_full_route(
///     &[
///         Waypoint::city("A", 0.0, 0.0),
///         Waypoint::city("B", 0.0, 10.0),
///         Waypoint::landmark("M", 0.0, 5.0),
///     ],
///     &RouteOptions::default(),
/// )
/// .unwrap();
/// let ids: Vec<_> = merged.waypoints.iter().map(|w| w.id.as_str()).collect();
/// assert_eq!(ids, vec!["A", "M", "B"]);
/// ```
pub fn optimize_full_route(waypoints: &[Waypoint], options: &RouteOptions) -> Result<MergedRoute> {
    RouteState::new()
        .optimize_full_route(waypoints, options)
        .map(|(_, merged)| merged)
}

/// Replaces the waypoint with the same id in place, or appends.
fn record_by_id(waypoints: &mut Vec<Waypoint>, waypoint: Waypoint) {
    match waypoints.iter_mut().find(|w| w.id == waypoint.id) {
        Some(existing) => *existing = waypoint,
        None => waypoints.push(waypoint),
    }
}

fn merge<'a, I>(base: &[Waypoint], landmarks: I, options: &RouteOptions) -> Result<MergedRoute>
where
    I: IntoIterator<Item = &'a Waypoint>,
{
    let mut route = base.to_vec();
    let mut points = waypoint_points(&route)?;
    let mut rejected = Vec::new();

    for landmark in landmarks {
        let point = match waypoint_point(landmark) {
            Ok(point) => point,
            Err(AlgorithmError::InvalidWaypoint { id, source }) => {
                warn!("Skipping landmark {} with invalid coordinates: {}", id, source);
                rejected.push(RejectedWaypoint {
                    waypoint: landmark.clone(),
                    reason: source,
                });
                continue;
            }
        };
        let index = best_position(&points, &point, options.strategy);
        route.insert(index, landmark.clone());
        points.insert(index, point);
    }

    if options.refine {
        refine_gaps_in_place(&mut route, &mut points);
    }

    let total_distance = path_length(&points);
    debug!(
        "Merged {} landmarks into {} cities ({} rejected), total distance {}",
        route.len() - base.len(),
        base.len(),
        rejected.len(),
        total_distance
    );
    Ok(MergedRoute {
        waypoints: route,
        rejected,
        total_distance,
    })
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use approx::assert_relative_eq;
    use dimensioned::si::M;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    use super::{RouteError, RouteOptions, RouteState, optimize_full_route};
    use crate::algorithm::{AlgorithmError, InsertionStrategy};
    use crate::types::{Coordinates, GeoPointDimension, TypeError, Waypoint, WaypointKind};

    fn ids(route: &[Waypoint]) -> Vec<&str> {
        route.iter().map(|w| w.id.as_str()).collect()
    }

    fn a() -> Waypoint {
        Waypoint::city("A", 0.0, 0.0)
    }

    fn b() -> Waypoint {
        Waypoint::city("B", 0.0, 10.0)
    }

    fn c() -> Waypoint {
        Waypoint::city("C", 0.0, 20.0)
    }

    fn m() -> Waypoint {
        Waypoint::landmark("M", 0.0, 5.0)
    }

    fn n() -> Waypoint {
        Waypoint::landmark("N", 0.0, 15.0)
    }

    #[test]
    fn test_single_landmark() -> Result<()> {
        let merged = optimize_full_route(&[a(), b(), m()], &RouteOptions::default())?;
        assert_eq!(ids(&merged.waypoints), vec!["A", "M", "B"]);
        Ok(())
    }

    #[test]
    fn test_two_landmarks() -> Result<()> {
        let merged = optimize_full_route(&[a(), b(), c(), m(), n()], &RouteOptions::default())?;
        assert_eq!(ids(&merged.waypoints), vec!["A", "M", "B", "N", "C"]);
        assert_eq!(merged.num_cities(), 3);
        assert_eq!(merged.num_landmarks(), 2);
        Ok(())
    }

    #[test]
    fn test_interleaved_input() -> Result<()> {
        // Partitioning keeps each group's relative order wherever it appears.
        let merged = optimize_full_route(&[n(), a(), m(), b(), c()], &RouteOptions::default())?;
        assert_eq!(ids(&merged.waypoints), vec!["A", "M", "B", "N", "C"]);
        Ok(())
    }

    #[test]
    fn test_incremental_strategy() -> Result<()> {
        let options = RouteOptions::default().with_strategy(InsertionStrategy::Incremental);
        let merged = optimize_full_route(&[a(), b(), c(), m(), n()], &options)?;
        assert_eq!(ids(&merged.waypoints), vec!["A", "M", "B", "N", "C"]);
        Ok(())
    }

    #[test]
    fn test_short_inputs_unchanged() -> Result<()> {
        let options = RouteOptions::default();
        assert_eq!(optimize_full_route(&[], &options)?.waypoints, vec![]);
        assert_eq!(optimize_full_route(&[a()], &options)?.waypoints, vec![a()]);
        // Two waypoints are returned as given, even out of kind order.
        assert_eq!(
            optimize_full_route(&[m(), a()], &options)?.waypoints,
            vec![m(), a()]
        );
        Ok(())
    }

    #[test]
    fn test_no_cities_unchanged() -> Result<()> {
        let landmarks = vec![n(), m(), Waypoint::landmark("O", 1.0, 1.0)];
        let (state, merged) =
            RouteState::new().optimize_full_route(&landmarks, &RouteOptions::default())?;
        assert_eq!(merged.waypoints, landmarks);
        assert_eq!(state, RouteState::new());
        Ok(())
    }

    #[test]
    fn test_no_landmarks_unchanged() -> Result<()> {
        let cities = vec![c(), a(), b()];
        let merged = optimize_full_route(&cities, &RouteOptions::default())?;
        assert_eq!(merged.waypoints, cities);
        assert_eq!(merged.rejected, vec![]);
        Ok(())
    }

    #[test]
    fn test_total_distance() -> Result<()> {
        let merged = optimize_full_route(&[a(), c(), m()], &RouteOptions::default())?;
        // A, M and C all lie on the equator, 20 degrees of longitude apart.
        assert_relative_eq!(
            merged.total_distance,
            2223.898532891175 * 1000.0 * M,
            max_relative = 1e-9 * M
        );
        Ok(())
    }

    #[test]
    fn test_invalid_landmark_rejected() -> Result<()> {
        let bad = Waypoint::landmark("bad", f64::NAN, 3.0);
        let merged =
            optimize_full_route(&[a(), b(), bad, m()], &RouteOptions::default())?;
        assert_eq!(ids(&merged.waypoints), vec!["A", "M", "B"]);
        assert_eq!(merged.rejected.len(), 1);
        // NaN coordinates never compare equal, so match on the id and reason.
        assert_eq!(merged.rejected[0].waypoint.id, "bad");
        assert!(matches!(
            merged.rejected[0].reason,
            TypeError::GeoPointInvariant(GeoPointDimension::Latitude, _)
        ));
        Ok(())
    }

    #[test]
    fn test_short_input_reports_invalid_landmark() -> Result<()> {
        let bad = Waypoint::landmark("bad", f64::NAN, 3.0);
        let merged = optimize_full_route(&[a(), bad], &RouteOptions::default())?;
        assert_eq!(ids(&merged.waypoints), vec!["A"]);
        assert_eq!(merged.rejected.len(), 1);
        assert_eq!(merged.rejected[0].waypoint.id, "bad");
        assert_eq!(merged.total_distance, 0.0 * M);
        Ok(())
    }

    #[test]
    fn test_no_cities_reports_invalid_landmark() -> Result<()> {
        let bad = Waypoint::landmark("bad", 0.0, 200.0);
        let (_, merged) = RouteState::new()
            .optimize_full_route(&[m(), bad, n()], &RouteOptions::default())?;
        assert_eq!(ids(&merged.waypoints), vec!["M", "N"]);
        assert_eq!(
            merged.rejected[0].reason,
            TypeError::GeoPointInvariant(GeoPointDimension::Longitude, 200.0)
        );
        // M and N lie on the equator, 10 degrees of longitude apart.
        assert_relative_eq!(
            merged.total_distance,
            1111.9492664455873 * 1000.0 * M,
            max_relative = 1e-9 * M
        );
        Ok(())
    }

    #[test]
    fn test_short_input_invalid_city_is_error() {
        let bad = Waypoint::city("bad", f64::NAN, 0.0);
        let res = optimize_full_route(&[a(), bad], &RouteOptions::default());
        assert!(
            matches!(
                res,
                Err(RouteError::Algorithm(AlgorithmError::InvalidWaypoint { ref id, .. }))
                    if id == "bad"
            ),
            "{res:?}"
        );
    }

    #[test]
    fn test_repeated_landmark_id_inserted_once() -> Result<()> {
        let options = RouteOptions::default();
        let moved = Waypoint::landmark("M", 0.0, 6.0);
        let (state, merged) =
            RouteState::new().optimize_full_route(&[a(), b(), m(), moved.clone()], &options)?;

        assert_eq!(merged.waypoints, vec![a(), moved.clone(), b()]);
        assert_eq!(state.landmarks, vec![moved]);
        assert_eq!(state.combined_waypoints(&options)?, merged);
        Ok(())
    }

    #[test]
    fn test_invalid_city_is_error() {
        let bad = Waypoint::city("bad", 0.0, 181.0);
        let res = optimize_full_route(&[a(), bad, m()], &RouteOptions::default());
        assert!(
            matches!(
                res,
                Err(RouteError::Algorithm(AlgorithmError::InvalidWaypoint { ref id, .. }))
                    if id == "bad"
            ),
            "{res:?}"
        );
    }

    #[test]
    fn test_state_records_base_and_landmarks() -> Result<()> {
        let (state, _) =
            RouteState::new().optimize_full_route(&[a(), b(), c(), m()], &RouteOptions::default())?;
        assert_eq!(state.extract_waypoints(), vec![a(), b(), c()]);
        assert_eq!(state.landmarks, vec![m()]);
        Ok(())
    }

    #[test]
    fn test_repeated_calls_idempotent() -> Result<()> {
        let options = RouteOptions::default();
        let (state, first) = RouteState::new().optimize_full_route(&[a(), b(), c(), m()], &options)?;

        // Feed the merged route back in; the stored base keeps the result from
        // drifting.
        let (state, second) = state.optimize_full_route(&first.waypoints, &options)?;
        assert_eq!(first, second);
        let (_, third) = state.optimize_full_route(&second.waypoints, &options)?;
        assert_eq!(second, third);
        Ok(())
    }

    #[test]
    fn test_stored_base_wins() -> Result<()> {
        let options = RouteOptions::default();
        let state = RouteState::with_base(vec![a(), b(), c()])?;
        // The caller passes the cities in a different order, e.g. as they were
        // permuted by an earlier merge; the stored order is used.
        let (_, merged) = state.optimize_full_route(&[c(), b(), a(), n()], &options)?;
        assert_eq!(ids(&merged.waypoints), vec!["A", "B", "N", "C"]);
        Ok(())
    }

    #[test]
    fn test_incremental_discovery() -> Result<()> {
        let options = RouteOptions::default();
        let (state, _) = RouteState::new().optimize_full_route(&[a(), b(), c()], &options)?;
        assert_eq!(state.landmarks, vec![]);

        let state = state.with_landmark(n())?;
        let state = state.with_landmark(m())?;
        let merged = state.combined_waypoints(&options)?;
        assert_eq!(ids(&merged.waypoints), vec!["A", "M", "B", "N", "C"]);
        Ok(())
    }

    #[test]
    fn test_combined_matches_optimize() -> Result<()> {
        let options = RouteOptions::default();
        let o = Waypoint::new("O", "Opera", WaypointKind::Cultural, Coordinates::new(1.0, 12.0));
        let (state, _) =
            RouteState::new().optimize_full_route(&[a(), b(), c(), n(), o.clone()], &options)?;
        let state = state.with_landmark(m())?;

        let mut all = state.base_cities.clone();
        all.extend(state.landmarks.iter().cloned());
        let (_, expected) = state.optimize_full_route(&all, &options)?;
        assert_eq!(state.combined_waypoints(&options)?, expected);
        Ok(())
    }

    #[test]
    fn test_combined_empty_base() -> Result<()> {
        let state = RouteState::new().with_landmark(m())?.with_landmark(n())?;
        let merged = state.combined_waypoints(&RouteOptions::default())?;
        assert_eq!(merged.waypoints, vec![m(), n()]);
        Ok(())
    }

    #[test]
    fn test_landmark_history_by_id() -> Result<()> {
        let moved = Waypoint::landmark("M", 0.0, 6.0);
        let state = RouteState::new()
            .with_landmark(m())?
            .with_landmark(n())?
            .with_landmark(moved.clone())?;
        assert_eq!(state.landmarks, vec![moved, n()]);

        let state = state.without_landmark("M");
        assert_eq!(state.landmarks, vec![n()]);
        assert_eq!(state.without_landmark("nope"), state);
        Ok(())
    }

    #[test]
    fn test_without_city() -> Result<()> {
        let state = RouteState::with_base(vec![a(), b(), c()])?.with_landmark(n())?;
        let state = state.without_city("B");
        assert_eq!(state.extract_waypoints(), vec![a(), c()]);
        let merged = state.combined_waypoints(&RouteOptions::default())?;
        assert_eq!(ids(&merged.waypoints), vec!["A", "N", "C"]);
        Ok(())
    }

    #[test]
    fn test_kind_checks() {
        assert_eq!(
            RouteState::with_base(vec![a(), m()]),
            Err(RouteError::NotACity("M".to_owned()))
        );
        assert_eq!(
            RouteState::new().with_landmark(a()),
            Err(RouteError::NotALandmark("A".to_owned()))
        );
    }

    #[test]
    fn test_refine_option() -> Result<()> {
        let north = Waypoint::landmark("north", 1.0, 5.0);
        let south = Waypoint::landmark("south", -1.0, 5.0);
        let early = Waypoint::landmark("early", 2.0, 2.0);
        let input = [a(), b(), north, south, early];

        // Greedy insertion of "early" lands in front of a pair that is already
        // crossed relative to it.
        let plain = optimize_full_route(&input, &RouteOptions::default())?;
        assert_eq!(ids(&plain.waypoints), vec!["A", "early", "south", "north", "B"]);

        let refined = optimize_full_route(&input, &RouteOptions::default().with_refine(true))?;
        assert_eq!(ids(&refined.waypoints), vec!["A", "early", "north", "south", "B"]);
        assert!(refined.total_distance < plain.total_distance);
        Ok(())
    }

    #[derive(Clone, Debug)]
    struct ArbTrip {
        cities: Vec<Waypoint>,
        landmarks: Vec<Waypoint>,
    }

    fn arb_coordinates(g: &mut Gen) -> Coordinates {
        let lat = (u16::arbitrary(g) as f64 / u16::MAX as f64) * 20.0 + 35.0;
        let lng = (u16::arbitrary(g) as f64 / u16::MAX as f64) * 30.0 - 5.0;
        Coordinates::new(lat, lng)
    }

    impl Arbitrary for ArbTrip {
        fn arbitrary(g: &mut Gen) -> Self {
            let num_cities = 1 + usize::arbitrary(g) % 8;
            let num_landmarks = usize::arbitrary(g) % 8;
            let cities = (0..num_cities)
                .map(|i| {
                    let id = format!("city{i}");
                    Waypoint::new(id.clone(), id, WaypointKind::City, arb_coordinates(g))
                })
                .collect();
            let kinds = [
                WaypointKind::Landmark,
                WaypointKind::Cultural,
                WaypointKind::Other,
            ];
            let landmarks = (0..num_landmarks)
                .map(|i| {
                    let id = format!("poi{i}");
                    let kind = *g.choose(&kinds).unwrap_or(&WaypointKind::Landmark);
                    Waypoint::new(id.clone(), id, kind, arb_coordinates(g))
                })
                .collect();
            ArbTrip { cities, landmarks }
        }
    }

    impl ArbTrip {
        fn all(&self) -> Vec<Waypoint> {
            let mut all = self.cities.clone();
            all.extend(self.landmarks.iter().cloned());
            all
        }
    }

    #[quickcheck]
    fn qc_cities_keep_order(trip: ArbTrip, refine: bool) -> bool {
        let options = RouteOptions::default().with_refine(refine);
        let Ok(merged) = optimize_full_route(&trip.all(), &options) else {
            return false;
        };
        let cities: Vec<_> = merged
            .waypoints
            .iter()
            .filter(|w| !w.is_landmark())
            .cloned()
            .collect();
        cities == trip.cities && merged.waypoints.len() == trip.all().len()
    }

    #[quickcheck]
    fn qc_no_landmarks_is_identity(trip: ArbTrip) -> bool {
        match optimize_full_route(&trip.cities, &RouteOptions::default()) {
            Ok(merged) => merged.waypoints == trip.cities,
            Err(_) => false,
        }
    }

    #[quickcheck]
    fn qc_deterministic(trip: ArbTrip) -> bool {
        let options = RouteOptions::default();
        optimize_full_route(&trip.all(), &options) == optimize_full_route(&trip.all(), &options)
    }

    #[quickcheck]
    fn qc_combined_matches_optimize(trip: ArbTrip) -> bool {
        let options = RouteOptions::default();
        let Ok((state, merged)) = RouteState::new().optimize_full_route(&trip.all(), &options)
        else {
            return false;
        };
        if trip.all().len() <= 2 {
            return true;
        }
        state.combined_waypoints(&options) == Ok(merged)
    }
}
