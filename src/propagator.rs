//! # Two-body Keplerian propagation
//!
//! Heliocentric positions from classical orbital elements:
//!
//! 1. `Δt = (t - epoch) / 365.25` (Julian years)
//! 2. mean motion `n = sqrt(mu / a³)` and `M = M0 + n·Δt`
//! 3. eccentric anomaly `E` from [`solve_eccentric_anomaly_with`]
//! 4. perifocal coordinates `x_p = a(cos E - e)`, `y_p = a·sqrt(max(0, 1 - e²))·sin E`
//! 5. rotation perifocal → ecliptic: `ω` in the orbital plane, tilt by `i`, then `Ω` about the pole
//!
//! ## Unit system
//!
//! Time is expressed in **Julian years** and distance in **AU**. With the default
//! [`NORMALIZED_MU`] (`mu = 1`), an orbit with `a = 1 AU` revolves once every 2π years: this is a
//! normalized visualization clock, not a physical one. Pass [`SUN_MU_AU3_PER_YEAR2`] to obtain
//! physically correct heliocentric periods.
//!
//! No perturbation, light-time or aberration correction is applied.
//!
//! [`NORMALIZED_MU`]: crate::constants::NORMALIZED_MU
//! [`SUN_MU_AU3_PER_YEAR2`]: crate::constants::SUN_MU_AU3_PER_YEAR2
use crate::{
    constants::{JulianDay, DAYS_PER_JULIAN_YEAR, DPI, KEPLER_MAX_ITER, NORMALIZED_MU},
    kepler::solve_eccentric_anomaly_with,
    keplerian_element::{OrbitalElements, Position},
};

/// Orbital elements with every trigonometric term of the perifocal → ecliptic rotation
/// evaluated once, ready to be sampled many times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerPropagator {
    elements: OrbitalElements,
    mean_motion: f64,
    sqrt_one_minus_e2: f64,
    kepler_max_iter: usize,
    cos_node: f64,
    sin_node: f64,
    cos_peri: f64,
    sin_peri: f64,
    cos_incl: f64,
    sin_incl: f64,
}

impl KeplerPropagator {
    /// Prepare a propagator.
    ///
    /// Arguments
    /// ---------
    /// * `elements`: orbital elements (radians, AU, Julian Day epoch).
    /// * `mu`: gravitational parameter in AU³/year².
    ///
    /// Note
    /// ----
    /// `a ≤ 0` is not rejected here: the mean motion becomes NaN or infinite. Use
    /// [`OrbitalElements::check_elliptic`] beforehand when the input is untrusted.
    pub fn new(elements: &OrbitalElements, mu: f64) -> Self {
        let e = elements.eccentricity;
        KeplerPropagator {
            elements: *elements,
            mean_motion: (mu / elements.semi_major_axis.powf(3.0)).sqrt(),
            sqrt_one_minus_e2: (1.0 - e * e).max(0.0).sqrt(),
            kepler_max_iter: KEPLER_MAX_ITER,
            cos_node: elements.ascending_node_longitude.cos(),
            sin_node: elements.ascending_node_longitude.sin(),
            cos_peri: elements.periapsis_argument.cos(),
            sin_peri: elements.periapsis_argument.sin(),
            cos_incl: elements.inclination.cos(),
            sin_incl: elements.inclination.sin(),
        }
    }

    /// Override the Newton–Raphson iteration cap of the Kepler solver.
    pub fn with_kepler_max_iter(mut self, max_iter: usize) -> Self {
        self.kepler_max_iter = max_iter;
        self
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    /// Mean motion in radians per Julian year.
    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    /// Orbital period in days under the configured `mu`.
    pub fn period_days(&self) -> f64 {
        DPI / self.mean_motion * DAYS_PER_JULIAN_YEAR
    }

    /// Mean anomaly (radians, not reduced) at the requested Julian Day.
    pub fn mean_anomaly_at(&self, target_jd: JulianDay) -> f64 {
        let dt_years = (target_jd - self.elements.reference_epoch) / DAYS_PER_JULIAN_YEAR;
        self.elements.mean_anomaly + self.mean_motion * dt_years
    }

    /// Heliocentric position at `target_jd`.
    pub fn position_at(&self, target_jd: JulianDay) -> Position {
        let mean_anomaly = self.mean_anomaly_at(target_jd);
        let ecc_anom = solve_eccentric_anomaly_with(
            mean_anomaly,
            self.elements.eccentricity,
            self.kepler_max_iter,
        );
        self.position_from_eccentric_anomaly(ecc_anom)
    }

    /// Heliocentric position at a given eccentric anomaly.
    pub fn position_from_eccentric_anomaly(&self, ecc_anom: f64) -> Position {
        let a = self.elements.semi_major_axis;
        let e = self.elements.eccentricity;

        let x_p = a * (ecc_anom.cos() - e);
        let y_p = a * self.sqrt_one_minus_e2 * ecc_anom.sin();

        // ω in the orbital plane
        let x1 = x_p * self.cos_peri - y_p * self.sin_peri;
        let y1 = x_p * self.sin_peri + y_p * self.cos_peri;

        // tilt by i around the line of nodes
        let x2 = x1;
        let y2 = y1 * self.cos_incl;
        let z2 = y1 * self.sin_incl;

        // Ω around the reference pole
        Position {
            x: x2 * self.cos_node - y2 * self.sin_node,
            y: x2 * self.sin_node + y2 * self.cos_node,
            z: z2,
        }
    }

    /// Closed polyline of the orbit, sampled uniformly in eccentric anomaly.
    ///
    /// Return
    /// ------
    /// * `segments + 1` positions; the last one closes the loop on the first.
    pub fn orbit_path(&self, segments: usize) -> Vec<Position> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|s| {
                let ecc_anom = s as f64 / segments as f64 * DPI;
                self.position_from_eccentric_anomaly(ecc_anom)
            })
            .collect()
    }
}

/// Heliocentric position of a body at `target_jd` with the normalized `mu = 1`.
///
/// See [`position_with_mu`] for the general form.
pub fn position(elements: &OrbitalElements, target_jd: JulianDay) -> Position {
    position_with_mu(elements, target_jd, NORMALIZED_MU)
}

/// Heliocentric position of a body at `target_jd`.
///
/// Arguments
/// ---------
/// * `elements`: orbital elements of the body.
/// * `target_jd`: Julian Day of the requested position.
/// * `mu`: gravitational parameter in AU³/year².
///
/// Return
/// ------
/// * The [`Position`] in AU, in the frame of the elements. The Kepler iteration never fails:
///   for degenerate inputs the best available estimate is used.
pub fn position_with_mu(elements: &OrbitalElements, target_jd: JulianDay, mu: f64) -> Position {
    KeplerPropagator::new(elements, mu).position_at(target_jd)
}
