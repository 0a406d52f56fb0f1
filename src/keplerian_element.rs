//! # Keplerian orbital elements and heliocentric positions
//!
//! This module defines [`OrbitalElements`], the classical element set `(a, e, i, Ω, ω, M0)` at a
//! reference epoch, and [`Position`], the heliocentric Cartesian position produced by the
//! propagator.
//!
//! ## Units
//!
//! - Lengths: **AU**
//! - Angles: **radians** once constructed. Catalog records carry `i, Ω, ω` in degrees; they are
//!   converted exactly once by [`OrbitalElements::from_degrees`].
//! - Epoch: **Julian Day** (UTC calendar, see [`crate::time`])
//!
//! ## Domain
//!
//! Only bound orbits (`0 ≤ e < 1`, `a > 0`) are meaningful for the elliptic propagator. The
//! constructors do not reject other values; [`OrbitalElements::check_elliptic`] is the explicit
//! gate used by the service layer.
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    asterviz_errors::AstervizError,
    constants::{AstronomicalUnit, Degree, JulianDay, Radian, RADEG},
};

/// Keplerian orbital elements (osculating, two-body).
///
/// Units
/// -----
/// * `semi_major_axis`: AU.
/// * `eccentricity`: unitless.
/// * `inclination`: radians.
/// * `ascending_node_longitude`: radians (Ω).
/// * `periapsis_argument`: radians (ω).
/// * `mean_anomaly`: radians (M0, at `reference_epoch`).
/// * `reference_epoch`: Julian Day.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct OrbitalElements {
    pub semi_major_axis: AstronomicalUnit,
    pub eccentricity: f64,
    pub inclination: Radian,
    pub ascending_node_longitude: Radian,
    pub periapsis_argument: Radian,
    pub mean_anomaly: Radian,
    pub reference_epoch: JulianDay,
}

impl OrbitalElements {
    /// Build elements from catalog values, with `i`, `Ω` and `ω` given in degrees.
    ///
    /// Arguments
    /// ---------
    /// * `semi_major_axis` – `a` (AU).
    /// * `eccentricity` – `e`.
    /// * `inclination` – `i` (degrees).
    /// * `ascending_node_longitude` – `Ω` (degrees).
    /// * `periapsis_argument` – `ω` (degrees).
    /// * `mean_anomaly` – `M0` (radians).
    /// * `reference_epoch` – epoch of `M0` (Julian Day).
    ///
    /// Return
    /// ------
    /// * A new [`OrbitalElements`] with every angle in radians.
    pub fn from_degrees(
        semi_major_axis: AstronomicalUnit,
        eccentricity: f64,
        inclination: Degree,
        ascending_node_longitude: Degree,
        periapsis_argument: Degree,
        mean_anomaly: Radian,
        reference_epoch: JulianDay,
    ) -> Self {
        OrbitalElements {
            semi_major_axis,
            eccentricity,
            inclination: inclination * RADEG,
            ascending_node_longitude: ascending_node_longitude * RADEG,
            periapsis_argument: periapsis_argument * RADEG,
            mean_anomaly,
            reference_epoch,
        }
    }

    /// Check that the elements describe a finite, bound, elliptic orbit.
    ///
    /// Return
    /// ------
    /// * `Ok(())` when every field is finite, `a > 0` and `0 ≤ e < 1`.
    /// * [`AstervizError::UnsupportedOrbit`] otherwise, with the offending value.
    pub fn check_elliptic(&self) -> Result<(), AstervizError> {
        let fields = [
            self.semi_major_axis,
            self.eccentricity,
            self.inclination,
            self.ascending_node_longitude,
            self.periapsis_argument,
            self.mean_anomaly,
            self.reference_epoch,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(AstervizError::UnsupportedOrbit(
                "non-finite orbital element".into(),
            ));
        }
        if self.semi_major_axis <= 0.0 {
            return Err(AstervizError::UnsupportedOrbit(format!(
                "semi-major axis must be positive (a = {})",
                self.semi_major_axis
            )));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(AstervizError::UnsupportedOrbit(format!(
                "eccentricity must lie in [0, 1) (e = {})",
                self.eccentricity
            )));
        }
        Ok(())
    }
}

impl fmt::Display for OrbitalElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / std::f64::consts::PI;
        writeln!(
            f,
            "Keplerian Elements @ epoch (JD): {:.6}",
            self.reference_epoch
        )?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  a   (semi-major axis)       = {:.6} AU",
            self.semi_major_axis
        )?;
        writeln!(
            f,
            "  e   (eccentricity)          = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  i   (inclination)           = {:.6} rad ({:.6}°)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.6} rad ({:.6}°)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of periapsis) = {:.6} rad ({:.6}°)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )?;
        writeln!(
            f,
            "  M   (mean anomaly)          = {:.6} rad ({:.6}°)",
            self.mean_anomaly,
            self.mean_anomaly * rad_to_deg
        )
    }
}

/// Heliocentric Cartesian position (AU), in the frame of the input elements.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub x: AstronomicalUnit,
    pub y: AstronomicalUnit,
    pub z: AstronomicalUnit,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Position { x, y, z }
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Heliocentric distance (AU).
    pub fn norm(&self) -> AstronomicalUnit {
        self.to_vector().norm()
    }
}

impl From<Vector3<f64>> for Position {
    fn from(v: Vector3<f64>) -> Self {
        Position::new(v.x, v.y, v.z)
    }
}

impl From<Position> for (f64, f64, f64) {
    fn from(p: Position) -> Self {
        (p.x, p.y, p.z)
    }
}

#[cfg(test)]
pub(crate) mod test_keplerian_element {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    pub(crate) fn earth_like() -> OrbitalElements {
        OrbitalElements::from_degrees(1.0, 0.0167, 0.0, 0.0, 0.0, 0.0, 2451545.0)
    }

    #[test]
    fn test_degrees_are_converted_once() {
        let elem = OrbitalElements::from_degrees(2.5, 0.1, 90.0, 180.0, 45.0, 1.0, 2460000.5);
        assert_abs_diff_eq!(elem.inclination, PI / 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(elem.ascending_node_longitude, PI, epsilon = 1e-15);
        assert_abs_diff_eq!(elem.periapsis_argument, PI / 4.0, epsilon = 1e-15);
        // The mean anomaly is already in radians
        assert_eq!(elem.mean_anomaly, 1.0);
    }

    #[test]
    fn test_check_elliptic() {
        assert!(earth_like().check_elliptic().is_ok());

        let mut hyperbolic = earth_like();
        hyperbolic.eccentricity = 1.2;
        assert!(matches!(
            hyperbolic.check_elliptic(),
            Err(AstervizError::UnsupportedOrbit(_))
        ));

        let mut parabolic = earth_like();
        parabolic.eccentricity = 1.0;
        assert!(parabolic.check_elliptic().is_err());

        let mut degenerate = earth_like();
        degenerate.semi_major_axis = 0.0;
        assert!(degenerate.check_elliptic().is_err());

        let mut nan = earth_like();
        nan.mean_anomaly = f64::NAN;
        assert!(nan.check_elliptic().is_err());
    }

    #[test]
    fn test_position_norm() {
        let p = Position::new(3.0, 4.0, 12.0);
        assert_eq!(p.norm(), 13.0);
        let (x, y, z) = p.into();
        assert_eq!((x, y, z), (3.0, 4.0, 12.0));
        assert_eq!(Position::from(p.to_vector()), p);
    }

    #[test]
    fn test_display_header() {
        let s = format!("{}", earth_like());
        assert!(s.starts_with("Keplerian Elements @ epoch (JD): 2451545.000000"));
    }
}
