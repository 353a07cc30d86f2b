use approx::{AbsDiffEq, RelativeEq, abs_diff_eq, relative_eq};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::measure::{DEG, Degrees};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("geographic point invariant: invalid value {1:?} for {0:?}")]
    GeoPointInvariant(GeoPointDimension, f64),
}

type Result<T> = std::result::Result<T, TypeError>;

/// A point on the surface of the earth.
///
/// Enforces valid latitude and longitude values as type invariants. Unlike
/// [`Coordinates`], a `GeoPoint` can never hold NaN or out-of-range values.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GeoPoint {
    lat: Degrees<f64>,
    lon: Degrees<f64>,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GeoPointDimension {
    Latitude,
    Longitude,
}

impl GeoPoint {
    pub fn new(lat: Degrees<f64>, lon: Degrees<f64>) -> Result<GeoPoint> {
        // RangeInclusive::contains rejects NaN as well as out-of-range values.
        if !(-90.0..=90.0).contains(&lat.0) {
            return Err(TypeError::GeoPointInvariant(
                GeoPointDimension::Latitude,
                lat.0,
            ));
        }
        if !(-180.0..=180.0).contains(&lon.0) {
            return Err(TypeError::GeoPointInvariant(
                GeoPointDimension::Longitude,
                lon.0,
            ));
        }
        Ok(Self { lat, lon })
    }

    /// Get point latitude
    pub fn lat(&self) -> Degrees<f64> {
        self.lat
    }

    /// Get point longitude
    pub fn lon(&self) -> Degrees<f64> {
        self.lon
    }
}

impl Default for GeoPoint {
    fn default() -> GeoPoint {
        GeoPoint {
            lat: 0.0 * DEG,
            lon: 0.0 * DEG,
        }
    }
}

impl AbsDiffEq for GeoPoint {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        abs_diff_eq!(self.lat.0, other.lat.0, epsilon = epsilon)
            && abs_diff_eq!(self.lon.0, other.lon.0, epsilon = epsilon)
    }
}

impl RelativeEq for GeoPoint {
    fn default_max_relative() -> Self::Epsilon {
        0.000_000_000_000_001
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        relative_eq!(
            self.lat.0,
            other.lat.0,
            epsilon = epsilon,
            max_relative = max_relative
        ) && relative_eq!(
            self.lon.0,
            other.lon.0,
            epsilon = epsilon,
            max_relative = max_relative
        )
    }
}

/// A latitude/longitude pair in degrees, as received from the host.
///
/// Nothing is checked on construction or deserialization; call
/// [`Coordinates::to_geo_point`] to validate.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn to_geo_point(self) -> Result<GeoPoint> {
        GeoPoint::new(self.lat * DEG, self.lng * DEG)
    }
}

impl From<GeoPoint> for Coordinates {
    fn from(p: GeoPoint) -> Self {
        Self {
            lat: p.lat().0,
            lng: p.lon().0,
        }
    }
}

/// What a waypoint represents on the itinerary.
///
/// Cities are the fixed stops of a trip. Every other kind is an optional point
/// that may be inserted between them.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WaypointKind {
    City,
    Landmark,
    Cultural,
    Other,
}

/// A point the route passes through.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    /// Stable identifier, owned by the host application.
    pub id: String,

    /// Display name.
    pub name: String,

    pub kind: WaypointKind,

    pub coordinates: Coordinates,
}

impl Waypoint {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: WaypointKind,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            coordinates,
        }
    }

    /// Shorthand for a city waypoint whose name is its id.
    pub fn city(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, WaypointKind::City, Coordinates::new(lat, lng))
    }

    /// Shorthand for a landmark waypoint whose name is its id.
    pub fn landmark(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        let id = id.into();
        Self::new(
            id.clone(),
            id,
            WaypointKind::Landmark,
            Coordinates::new(lat, lng),
        )
    }

    /// Whether this waypoint may be inserted into a route, rather than being
    /// one of its fixed stops.
    pub fn is_landmark(&self) -> bool {
        self.kind != WaypointKind::City
    }

    pub fn point(&self) -> Result<GeoPoint> {
        self.coordinates.to_geo_point()
    }
}

/// Some hosts flag landmarks with a boolean instead of a kind.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WaypointRecord {
    id: String,
    name: String,
    kind: Option<WaypointKind>,
    is_landmark: Option<bool>,
    coordinates: Coordinates,
}

impl<'de> Deserialize<'de> for Waypoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = WaypointRecord::deserialize(deserializer)?;
        let kind = match (record.kind, record.is_landmark) {
            (Some(kind), _) => kind,
            (None, Some(true)) => WaypointKind::Landmark,
            (None, Some(false)) => WaypointKind::City,
            (None, None) => {
                return Err(serde::de::Error::custom(format!(
                    "waypoint {} has neither kind nor isLandmark",
                    record.id
                )));
            }
        };
        Ok(Waypoint {
            id: record.id,
            name: record.name,
            kind,
            coordinates: record.coordinates,
        })
    }
}

/// Instantiate a `GeoPoint` with a tuple-like syntax.
#[macro_export]
macro_rules! geo_point {
    ( $lat:expr, $lon:expr ) => {
        $crate::GeoPoint::new($lat * $crate::DEG, $lon * $crate::DEG)?
    };
}

/// Instantiate a vec of `GeoPoint` with tuple-like syntax.
#[macro_export]
macro_rules! geo_points {
    ( $( ( $lat:expr, $lon:expr $(,)? ) ),* $(,)? ) => {
        vec![ $( $crate::geo_point!($lat, $lon) ),* ]
    };
}
