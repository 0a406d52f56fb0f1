use super::constants::{DPI, HIGH_ECCENTRICITY, KEPLER_MAX_ITER, KEPLER_TOLERANCE};
use crate::constants::Radian;
use std::f64::consts::PI;

/// Retourne la valeur principale d'un angle en radians dans [0, 2π).
pub(crate) fn principal_angle(a: f64) -> f64 {
    a.rem_euclid(DPI)
}

/// Ramène un angle dans [-π, π).
pub(crate) fn wrap_to_pi(a: f64) -> f64 {
    (a + PI).rem_euclid(DPI) - PI
}

/// Solve Kepler's equation `M = E - e·sin(E)` for the eccentric anomaly `E`.
///
/// Equivalent to [`solve_eccentric_anomaly_with`] using the default cap of
/// [`KEPLER_MAX_ITER`] Newton–Raphson iterations.
pub fn solve_eccentric_anomaly(mean_anomaly: Radian, eccentricity: f64) -> Radian {
    solve_eccentric_anomaly_with(mean_anomaly, eccentricity, KEPLER_MAX_ITER)
}

/// Solve Kepler's equation with an explicit iteration cap.
///
/// The mean anomaly is first reduced to `[-π, π)`, whatever the number of revolutions
/// elapsed. The iteration starts from `M` for `e < 0.8` and from `±π` (sign of the reduced `M`)
/// otherwise. It stops after `max_iters` Newton steps, when the correction drops below
/// `1e-12`, or when the derivative `1 - e·cos(E)` vanishes.
///
/// There is no convergence check beyond the cap: the last iterate is returned as the best
/// available estimate. Eight iterations are enough to reach `1e-9` on Kepler's equation for
/// `e ≤ 0.95`; closer to `e = 1` the result is an approximation traded for a bounded cost.
/// Behaviour for `e ≥ 1` is undefined.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: mean anomaly `M` (radians), any real value.
/// * `eccentricity`: `0 ≤ e < 1`.
/// * `max_iters`: maximum number of Newton–Raphson steps.
///
/// Return
/// ------
/// * The eccentric anomaly `E` (radians), in the branch of the reduced mean anomaly.
pub fn solve_eccentric_anomaly_with(
    mean_anomaly: Radian,
    eccentricity: f64,
    max_iters: usize,
) -> Radian {
    let m = wrap_to_pi(mean_anomaly);

    let mut ecc_anom = if eccentricity < HIGH_ECCENTRICITY {
        m
    } else if m < 0.0 {
        -PI
    } else {
        PI
    };

    for _ in 0..max_iters {
        let Some(delta) = newton_step(ecc_anom, eccentricity, m) else {
            break;
        };
        ecc_anom += delta;
        if delta.abs() < KEPLER_TOLERANCE {
            break;
        }
    }

    ecc_anom
}

/// One Newton–Raphson correction of `E - e·sin(E) - M`, `None` when `1 - e·cos(E)` vanishes.
fn newton_step(ecc_anom: Radian, eccentricity: f64, m: Radian) -> Option<Radian> {
    let f = ecc_anom - eccentricity * ecc_anom.sin() - m;
    let fp = 1.0 - eccentricity * ecc_anom.cos();
    if fp == 0.0 {
        return None;
    }
    Some(-f / fp)
}
