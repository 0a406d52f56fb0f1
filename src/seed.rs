//! Reproducible synthetic mean anomaly phases.
//!
//! Catalog exports rarely carry a usable mean anomaly at epoch. To spread the bodies along
//! their orbits, each one receives a **synthetic** phase derived from its designator:
//!
//! 1. SHA-256 of the UTF-8 designator,
//! 2. the first 8 bytes read as a big-endian `u64`,
//! 3. divided by 2^64 and scaled by 2π.
//!
//! The value is stable across runs, platforms and processes. It is a visual placeholder and
//! carries no physical meaning.
use sha2::{Digest, Sha256};

use crate::{constants::Radian, constants::DPI, kepler::principal_angle};

/// 2^64 as a float
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Derive a phase in `[0, 2π)` from a designator.
///
/// Arguments
/// ---------
/// * `designator`: the unique designator of the body (e.g. `"433"` or `"2023 AB"`).
///
/// Return
/// ------
/// * An angle in radians, in `[0, 2π)`.
pub fn derive_phase(designator: &str) -> Radian {
    let digest = Sha256::digest(designator.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);

    let unit = u64::from_be_bytes(head) as f64 / TWO_POW_64;
    // u64 → f64 rounding may reach exactly 1.0
    principal_angle(unit * DPI)
}
