//! Human-readable summaries of merged routes

use std::fmt::{Display, Write};

use dimensioned::si::Meter;

use crate::route::MergedRoute;

/// Summarize a merged route, with distances in the unit `T`.
///
/// ```
/// use tripweaver::internal::report::route_report;
/// use tripweaver::Kilometers;
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
/// let report = route_report::<Kilometers<f64>>(&merged).unwrap();
/// assert!(report.contains("1111.9km"));
/// ```
pub fn route_report<T>(merged: &MergedRoute) -> Result<String, std::fmt::Error>
where
    T: From<Meter<f64>> + Display,
{
    let mut r = String::new();
    writeln!(
        &mut r,
        "Route of {} cities and {} landmarks, {:.1} total",
        merged.num_cities(),
        merged.num_landmarks(),
        T::from(merged.total_distance),
    )?;

    if !merged.waypoints.is_empty() {
        writeln!(&mut r)?;
    }
    for (i, waypoint) in merged.waypoints.iter().enumerate() {
        writeln!(
            &mut r,
            "{:>3}. {} ({})",
            i + 1,
            waypoint.name,
            waypoint.kind
        )?;
    }

    if !merged.rejected.is_empty() {
        writeln!(
            &mut r,
            "\n{} landmarks were left out due to invalid coordinates:",
            merged.rejected.len()
        )?;
        for rejected in &merged.rejected {
            writeln!(
                &mut r,
                "  - {} ({}): {}",
                rejected.waypoint.name, rejected.waypoint.id, rejected.reason
            )?;
        }
    }
    Ok(r)
}
