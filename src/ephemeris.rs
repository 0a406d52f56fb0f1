//! # Fixed-step ephemeris generation
//!
//! An [`EphemerisSeries`] describes the positions of one body sampled from `start_jd` to
//! `stop_jd` every `step_days`. The series is **lazy** and **restartable**: nothing is computed
//! until it is iterated, and every call to [`EphemerisSeries::iter`] replays the same samples.
//!
//! ## Normalization
//!
//! - `stop_jd < start_jd` is swapped, so the samples are always increasing in time.
//! - `step_days` is floored to [`MIN_STEP_DAYS`] (6 hours).
//! - The series holds at most [`MAX_EPHEMERIS_POINTS`] samples; longer ranges are silently
//!   truncated. [`EphemerisSeries::is_truncated`] reports it.
//!
//! ## Step expressions
//!
//! [`parse_step_days`] accepts `"<number>d"` (days), `"<number>h"` (hours) or a bare number of
//! days, case-insensitive; missing input defaults to `1d`.
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    asterviz_errors::AstervizError,
    constants::{JulianDay, MAX_EPHEMERIS_POINTS, MIN_STEP_DAYS, NORMALIZED_MU},
    keplerian_element::{OrbitalElements, Position},
    propagator::KeplerPropagator,
};

static STEP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:e[+-]?[0-9]+)?)\s*([dh]?)$")
        .expect("step regex is valid")
});

/// One sample of an ephemeris, serialized as `{jd, x, y, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EphemerisPoint {
    pub jd: JulianDay,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EphemerisPoint {
    pub fn new(jd: JulianDay, position: Position) -> Self {
        EphemerisPoint {
            jd,
            x: position.x,
            y: position.y,
            z: position.z,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// Lazy, deterministic sequence of positions over a time range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemerisSeries {
    propagator: KeplerPropagator,
    start_jd: JulianDay,
    stop_jd: JulianDay,
    step_days: f64,
    max_points: usize,
}

impl EphemerisSeries {
    /// Build a series with the normalized `mu = 1` and the default point cap.
    ///
    /// Arguments
    /// ---------
    /// * `elements`: orbital elements of the body.
    /// * `start_jd`, `stop_jd`: bounds of the range (Julian Day), swapped if reversed.
    /// * `step_days`: sampling step, floored to [`MIN_STEP_DAYS`].
    pub fn new(
        elements: &OrbitalElements,
        start_jd: JulianDay,
        stop_jd: JulianDay,
        step_days: f64,
    ) -> Self {
        Self::from_propagator(
            KeplerPropagator::new(elements, NORMALIZED_MU),
            start_jd,
            stop_jd,
            step_days,
        )
    }

    /// Build a series over an already prepared propagator.
    pub fn from_propagator(
        propagator: KeplerPropagator,
        start_jd: JulianDay,
        stop_jd: JulianDay,
        step_days: f64,
    ) -> Self {
        let (start_jd, stop_jd) = if stop_jd < start_jd {
            debug!(start_jd, stop_jd, "ephemeris range reversed, swapping bounds");
            (stop_jd, start_jd)
        } else {
            (start_jd, stop_jd)
        };

        let floored = step_days.max(MIN_STEP_DAYS);
        if floored != step_days {
            debug!(step_days, floored, "ephemeris step below the minimum");
        }

        EphemerisSeries {
            propagator,
            start_jd,
            stop_jd,
            step_days: floored,
            max_points: MAX_EPHEMERIS_POINTS,
        }
    }

    /// Lower the sample cap, never above [`MAX_EPHEMERIS_POINTS`].
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points.min(MAX_EPHEMERIS_POINTS);
        self
    }

    pub fn start_jd(&self) -> JulianDay {
        self.start_jd
    }

    pub fn stop_jd(&self) -> JulianDay {
        self.stop_jd
    }

    pub fn step_days(&self) -> f64 {
        self.step_days
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Iterate over the samples, from the start of the range.
    pub fn iter(&self) -> EphemerisIter<'_> {
        EphemerisIter {
            series: self,
            next_jd: self.start_jd,
            emitted: 0,
        }
    }

    /// Number of samples the series yields.
    pub fn len(&self) -> usize {
        self.sample_times().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when the point cap cut the range short.
    pub fn is_truncated(&self) -> bool {
        match self.sample_times().last() {
            Some(jd) => self.len() == self.max_points && jd + self.step_days <= self.stop_jd,
            None => self.max_points == 0 && self.start_jd <= self.stop_jd,
        }
    }

    /// Evaluate every sample.
    pub fn to_points(&self) -> Vec<EphemerisPoint> {
        let points: Vec<EphemerisPoint> = self.iter().collect();
        if self.is_truncated() {
            debug!(
                max_points = self.max_points,
                start_jd = self.start_jd,
                stop_jd = self.stop_jd,
                step_days = self.step_days,
                "ephemeris truncated at the point cap"
            );
        }
        points
    }

    /// Sample epochs, accumulated the same way as the positions.
    fn sample_times(&self) -> impl Iterator<Item = JulianDay> + '_ {
        std::iter::successors(Some(self.start_jd), move |jd| Some(jd + self.step_days))
            .take_while(move |jd| *jd <= self.stop_jd)
            .take(self.max_points)
    }
}

impl<'a> IntoIterator for &'a EphemerisSeries {
    type Item = EphemerisPoint;
    type IntoIter = EphemerisIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the samples of an [`EphemerisSeries`].
#[derive(Debug, Clone)]
pub struct EphemerisIter<'a> {
    series: &'a EphemerisSeries,
    next_jd: JulianDay,
    emitted: usize,
}

impl Iterator for EphemerisIter<'_> {
    type Item = EphemerisPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.series.max_points || self.next_jd > self.series.stop_jd {
            return None;
        }
        let jd = self.next_jd;
        let point = EphemerisPoint::new(jd, self.series.propagator.position_at(jd));
        self.next_jd += self.series.step_days;
        self.emitted += 1;
        Some(point)
    }
}

/// Generate the ephemeris of a body over `[start_jd, stop_jd]`.
///
/// Shorthand for [`EphemerisSeries::new`]; see the module documentation for the
/// normalization rules.
pub fn generate(
    elements: &OrbitalElements,
    start_jd: JulianDay,
    stop_jd: JulianDay,
    step_days: f64,
) -> EphemerisSeries {
    EphemerisSeries::new(elements, start_jd, stop_jd, step_days)
}

/// Parse a step expression into days.
///
/// Arguments
/// ---------
/// * `raw`: `"<n>d"`, `"<n>h"`, `"<n>"` (days), or `None` for the default `"1d"`.
///
/// Return
/// ------
/// * The step in days, **not** floored (flooring happens in [`EphemerisSeries`]).
/// * [`AstervizError::InvalidStep`] for anything else, including non-finite values.
pub fn parse_step_days(raw: Option<&str>) -> Result<f64, AstervizError> {
    let raw = raw.unwrap_or("1d");
    let normalized = raw.trim().to_lowercase();
    let invalid = || AstervizError::InvalidStep(raw.to_string());

    let caps = STEP_REGEX.captures(&normalized).ok_or_else(invalid)?;
    let value: f64 = caps[1].parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    match &caps[2] {
        "h" => Ok(value / 24.0),
        _ => Ok(value),
    }
}
