//! # Service configuration
//!
//! [`AstervizParams`] gathers the tunable knobs of the propagation core and of the catalog
//! service: the gravitational parameter, the Kepler iteration cap, the ephemeris bounds, the
//! probe budgets of the sampler and the result limits of the service operations.
//!
//! Build it with [`AstervizParams::builder`] to get validation:
//!
//! ```rust,no_run
//! use asterviz::params::AstervizParams;
//! use asterviz::constants::SUN_MU_AU3_PER_YEAR2;
//!
//! let params = AstervizParams::builder()
//!     .mu(SUN_MU_AU3_PER_YEAR2)
//!     .explore_default_limit(2000)
//!     .build()?;
//! # Ok::<(), asterviz::asterviz_errors::AstervizError>(())
//! ```
use std::cmp::Ordering::Greater;
use std::fmt;

use crate::{
    asterviz_errors::AstervizError,
    constants::{
        KEPLER_MAX_ITER, MAX_EPHEMERIS_POINTS, MIN_STEP_DAYS, NORMALIZED_MU,
        SAMPLE_ATTEMPT_FACTOR, SEARCH_LIMIT, SINGLE_PICK_ATTEMPTS,
    },
    ephemeris::parse_step_days,
};

/// Tunable parameters of the asterviz service.
///
/// Default values:
///
/// * `mu`: 1.0 (normalized clock, see [`crate::propagator`])
/// * `kepler_max_iter`: 8
/// * `max_ephemeris_points`: 5000
/// * `min_step_days`: 0.25 d
/// * `default_step`: `"1d"`
/// * `single_pick_attempts`: 32
/// * `sample_attempt_factor`: 25
/// * `explore_default_limit`: 5000
/// * `explore_min_limit`: 100
/// * `explore_max_limit`: 20000
/// * `search_limit`: 50
/// * `validate_orbits`: true
#[derive(Debug, Clone, PartialEq)]
pub struct AstervizParams {
    // --- Propagation ---
    /// Gravitational parameter (AU³/year²).
    pub mu: f64,
    /// Newton–Raphson iteration cap of the Kepler solver.
    pub kepler_max_iter: usize,
    /// Reject records outside `a > 0`, `0 ≤ e < 1` before propagating them.
    pub validate_orbits: bool,

    // --- Ephemeris ---
    /// Sample cap of one ephemeris, at most [`MAX_EPHEMERIS_POINTS`].
    pub max_ephemeris_points: usize,
    /// Smallest step accepted (days), at least [`MIN_STEP_DAYS`].
    pub min_step_days: f64,
    /// Step used when the request omits it.
    pub default_step: String,

    // --- Sampling ---
    pub single_pick_attempts: usize,
    pub sample_attempt_factor: usize,
    pub explore_default_limit: usize,
    pub explore_min_limit: usize,
    pub explore_max_limit: usize,

    // --- Search ---
    pub search_limit: usize,
}

impl AstervizParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AstervizParamsBuilder {
        AstervizParamsBuilder::new()
    }

    /// Clamp a requested explore sample size into `[explore_min_limit, explore_max_limit]`.
    pub fn clamp_explore_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.explore_default_limit)
            .clamp(self.explore_min_limit, self.explore_max_limit)
    }
}

impl Default for AstervizParams {
    fn default() -> Self {
        AstervizParams {
            mu: NORMALIZED_MU,
            kepler_max_iter: KEPLER_MAX_ITER,
            validate_orbits: true,
            max_ephemeris_points: MAX_EPHEMERIS_POINTS,
            min_step_days: MIN_STEP_DAYS,
            default_step: "1d".to_string(),
            single_pick_attempts: SINGLE_PICK_ATTEMPTS,
            sample_attempt_factor: SAMPLE_ATTEMPT_FACTOR,
            explore_default_limit: 5000,
            explore_min_limit: 100,
            explore_max_limit: 20000,
            search_limit: SEARCH_LIMIT,
        }
    }
}

/// Builder for [`AstervizParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct AstervizParamsBuilder {
    params: AstervizParams,
}

impl AstervizParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mu(mut self, v: f64) -> Self {
        self.params.mu = v;
        self
    }
    pub fn kepler_max_iter(mut self, v: usize) -> Self {
        self.params.kepler_max_iter = v;
        self
    }
    pub fn validate_orbits(mut self, v: bool) -> Self {
        self.params.validate_orbits = v;
        self
    }
    pub fn max_ephemeris_points(mut self, v: usize) -> Self {
        self.params.max_ephemeris_points = v;
        self
    }
    pub fn min_step_days(mut self, v: f64) -> Self {
        self.params.min_step_days = v;
        self
    }
    pub fn default_step(mut self, v: impl Into<String>) -> Self {
        self.params.default_step = v.into();
        self
    }
    pub fn single_pick_attempts(mut self, v: usize) -> Self {
        self.params.single_pick_attempts = v;
        self
    }
    pub fn sample_attempt_factor(mut self, v: usize) -> Self {
        self.params.sample_attempt_factor = v;
        self
    }
    pub fn explore_default_limit(mut self, v: usize) -> Self {
        self.params.explore_default_limit = v;
        self
    }
    pub fn explore_min_limit(mut self, v: usize) -> Self {
        self.params.explore_min_limit = v;
        self
    }
    pub fn explore_max_limit(mut self, v: usize) -> Self {
        self.params.explore_max_limit = v;
        self
    }
    pub fn search_limit(mut self, v: usize) -> Self {
        self.params.search_limit = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater) && x.is_finite()
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `mu > 0`, finite.
    /// * `kepler_max_iter ≥ 1`.
    /// * `1 ≤ max_ephemeris_points ≤ 5000`.
    /// * `min_step_days ≥ 0.25`, finite.
    /// * `default_step` is a valid step expression.
    /// * `1 ≤ explore_min_limit ≤ explore_default_limit ≤ explore_max_limit`.
    /// * `search_limit ≥ 1`.
    ///
    /// Zero probe budgets are accepted: the sampler then only uses its ascending fallback.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(AstervizParams)` if all values are valid.
    /// * `Err(AstervizError::InvalidParams)` on the first rule that fails.
    pub fn build(self) -> Result<AstervizParams, AstervizError> {
        let p = &self.params;

        if !Self::gt0(p.mu) {
            return Err(AstervizError::InvalidParams(
                "mu must be finite and > 0".into(),
            ));
        }
        if p.kepler_max_iter == 0 {
            return Err(AstervizError::InvalidParams(
                "kepler_max_iter must be >= 1".into(),
            ));
        }
        if p.max_ephemeris_points == 0 || p.max_ephemeris_points > MAX_EPHEMERIS_POINTS {
            return Err(AstervizError::InvalidParams(format!(
                "max_ephemeris_points must lie in [1, {MAX_EPHEMERIS_POINTS}]"
            )));
        }
        if !Self::gt0(p.min_step_days) || p.min_step_days < MIN_STEP_DAYS {
            return Err(AstervizError::InvalidParams(format!(
                "min_step_days must be finite and >= {MIN_STEP_DAYS}"
            )));
        }
        if parse_step_days(Some(&p.default_step)).is_err() {
            return Err(AstervizError::InvalidParams(format!(
                "default_step is not a step expression: {}",
                p.default_step
            )));
        }

        let ordered = p.explore_min_limit <= p.explore_default_limit
            && p.explore_default_limit <= p.explore_max_limit;
        if p.explore_min_limit == 0 || !ordered {
            return Err(AstervizError::InvalidParams(
                "require 1 <= explore_min_limit <= explore_default_limit <= explore_max_limit"
                    .into(),
            ));
        }
        if p.search_limit == 0 {
            return Err(AstervizError::InvalidParams(
                "search_limit must be >= 1".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for AstervizParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Asterviz Parameters")?;
        writeln!(f, "-------------------")?;
        writeln!(f, "[Propagation]")?;
        writeln!(f, "  mu                    = {}", self.mu)?;
        writeln!(f, "  kepler_max_iter       = {}", self.kepler_max_iter)?;
        writeln!(f, "  validate_orbits       = {}", self.validate_orbits)?;
        writeln!(f, "[Ephemeris]")?;
        writeln!(f, "  max_ephemeris_points  = {}", self.max_ephemeris_points)?;
        writeln!(f, "  min_step_days         = {}", self.min_step_days)?;
        writeln!(f, "  default_step          = {}", self.default_step)?;
        writeln!(f, "[Sampling]")?;
        writeln!(f, "  single_pick_attempts  = {}", self.single_pick_attempts)?;
        writeln!(f, "  sample_attempt_factor = {}", self.sample_attempt_factor)?;
        writeln!(
            f,
            "  explore_limit         = {} (clamped to [{}, {}])",
            self.explore_default_limit, self.explore_min_limit, self.explore_max_limit
        )?;
        writeln!(f, "[Search]")?;
        write!(f, "  search_limit          = {}", self.search_limit)
    }
}
