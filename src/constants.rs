//! # Constants and type definitions for asterviz
//!
//! This module centralizes the **numerical constants**, **conversion factors**, and **type
//! aliases** shared by the propagation core, the ephemeris generator and the catalog sampler.
//!
//! ## Overview
//!
//! - Angular and calendar conversion factors
//! - Gravitational parameters for the normalized AU / year unit system
//! - Hard resource bounds (ephemeris points, probe budgets)
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Angular and calendar conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Number of days in a Julian year, the time unit of the mean motion
pub const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

// -------------------------------------------------------------------------------------------------
// Gravitational parameters
// -------------------------------------------------------------------------------------------------

/// Gaussian gravitational constant k (AU^(3/2) / day)
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// k², the heliocentric gravitational parameter in AU³/day²
pub const GAUSS_GRAV_SQUARED: f64 = GAUSS_GRAV * GAUSS_GRAV;

/// Normalized gravitational parameter used by default for propagation.
///
/// With `mu = 1.0`, distances in AU and time in Julian years, one full revolution of an
/// orbit with `a = 1 AU` takes 2π years. This is a visualization unit system, not a physical
/// one: use [`SUN_MU_AU3_PER_YEAR2`] for heliocentric periods that match reality.
pub const NORMALIZED_MU: f64 = 1.0;

/// Heliocentric gravitational parameter expressed in AU³/year² (≈ 4π²)
pub const SUN_MU_AU3_PER_YEAR2: f64 =
    GAUSS_GRAV_SQUARED * DAYS_PER_JULIAN_YEAR * DAYS_PER_JULIAN_YEAR;

// -------------------------------------------------------------------------------------------------
// Solver and resource bounds
// -------------------------------------------------------------------------------------------------

/// Newton–Raphson iteration cap of the Kepler solver
pub const KEPLER_MAX_ITER: usize = 8;

/// Step size below which the Kepler iteration is considered converged
pub const KEPLER_TOLERANCE: f64 = 1e-12;

/// Eccentricity from which the Kepler solver starts from ±π instead of M
pub const HIGH_ECCENTRICITY: f64 = 0.8;

/// Hard cap on the number of samples of one ephemeris series
pub const MAX_EPHEMERIS_POINTS: usize = 5000;

/// Smallest ephemeris step accepted, in days (6 hours)
pub const MIN_STEP_DAYS: f64 = 0.25;

/// Probe budget of a single random pick
pub const SINGLE_PICK_ATTEMPTS: usize = 32;

/// Probe budget multiplier of a bulk sample (`limit × factor` probes)
pub const SAMPLE_ATTEMPT_FACTOR: usize = 25;

/// Maximum number of results returned by a catalog search
pub const SEARCH_LIMIT: usize = 50;

/// Default number of segments of an orbit polyline
pub const ORBIT_SEGMENTS: usize = 256;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Julian Day (days)
pub type JulianDay = f64;
/// Opaque, monotonically increasing catalog key
pub type ObjectId = u64;
