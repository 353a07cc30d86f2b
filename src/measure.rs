//! Simple zero-overhead unit of measure types
//!
//! Lengths are computed as `dimensioned` SI meters. The newtypes here cover
//! what `dimensioned` doesn't give us directly: angles in degrees, and the
//! kilometer and mile display units used when reporting on a route.

use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign, Div, Sub};

use approx::{AbsDiffEq, RelativeEq, relative_eq};
use dimensioned::si::Meter;
use num_traits::{Float, Num};

const METERS_PER_KILOMETER: f64 = 1000.0;
const METERS_PER_MILE: f64 = 1609.344;

macro_rules! unit_of_measure {
    ($u:ident, $suffix:literal) => {
        #[derive(Clone, Copy, Default, PartialEq, PartialOrd, Debug)]
        pub struct $u<N: Num>(pub N);

        impl<N> Add for $u<N>
        where
            N: Num + Add,
        {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl<N> Sub for $u<N>
        where
            N: Num + Sub,
        {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl<N> AddAssign for $u<N>
        where
            N: Num + AddAssign,
        {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl<N> Div<N> for $u<N>
        where
            N: Num + Div,
        {
            type Output = Self;

            fn div(self, rhs: N) -> Self {
                Self(self.0 / rhs)
            }
        }

        impl<N> Display for $u<N>
        where
            N: Num + Display,
        {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                match f.precision() {
                    Some(p) => write!(f, "{:.*}{}", p, self.0, $suffix),
                    None => write!(f, "{}{}", self.0, $suffix),
                }
            }
        }

        // Relative equality traits for approx support

        impl<N> AbsDiffEq for $u<N>
        where
            N: Num + Float + AbsDiffEq<N, Epsilon = N>,
        {
            type Epsilon = N;

            fn default_epsilon() -> Self::Epsilon {
                N::epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
                self.0.abs_diff_eq(&other.0, epsilon)
            }
        }

        impl<N> RelativeEq for $u<N>
        where
            N: Num + Float + AbsDiffEq<N, Epsilon = N> + RelativeEq<N>,
        {
            fn default_max_relative() -> Self::Epsilon {
                N::epsilon()
            }

            fn relative_eq(
                &self,
                other: &Self,
                epsilon: Self::Epsilon,
                max_relative: Self::Epsilon,
            ) -> bool {
                relative_eq!(
                    self.0,
                    other.0,
                    epsilon = epsilon,
                    max_relative = max_relative
                )
            }
        }
    };

    ($u:ident, $suffix:literal, $meters:expr) => {
        unit_of_measure!($u, $suffix);

        impl From<Meter<f64>> for $u<f64> {
            fn from(value: Meter<f64>) -> Self {
                Self(value.value_unsafe / $meters)
            }
        }
    };
}

// Angular units:
unit_of_measure![Degrees, "°"];

// Distance units:
unit_of_measure![Kilometers, "km", METERS_PER_KILOMETER];
unit_of_measure![Miles, "mi", METERS_PER_MILE];

impl Degrees<f64> {
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}

/// Shorthand for constructing `Degrees` from a bare value, as in `45.0 * DEG`.
pub const DEG: Degrees<f64> = Degrees(1.0);

impl std::ops::Mul<Degrees<f64>> for f64 {
    type Output = Degrees<f64>;

    fn mul(self, rhs: Degrees<f64>) -> Degrees<f64> {
        Degrees(self * rhs.0)
    }
}
