//! # Range-probe random sampling
//!
//! Random picks over a [`CatalogStore`] without scanning it. A probe draws a key `r` uniformly
//! in `[1, max_key]` and takes the first eligible item with a key `>= r`; this costs one indexed
//! lookup regardless of the catalog size.
//!
//! ## Bias
//!
//! The distribution is only approximately uniform: an item preceded by a gap in the key range
//! (deleted rows, or items of other categories) is hit by every probe landing in the gap, so it
//! is drawn more often than its neighbours. This is accepted for display sampling.
//!
//! ## Bounds
//!
//! * [`pick_random`] makes at most `attempts` probes, then falls back to the first eligible item.
//! * [`pick_sample`] makes at most `limit × attempt_factor` probes, then fills the shortfall with
//!   the first unchosen eligible items in ascending key order.
//!
//! The random source is always passed in by the caller; a seeded RNG makes every draw
//! reproducible.
use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::{
    asterviz_errors::AstervizError,
    catalog::{CatalogStore, CategoryFilter, SmallBody},
    constants::ObjectId,
};

/// Draw a uniform probe key in `[1, max_key]`.
fn probe_key<R: Rng + ?Sized>(rng: &mut R, max_key: ObjectId) -> ObjectId {
    rng.random_range(1..=max_key.max(1))
}

/// Pick one eligible item at random.
///
/// Arguments
/// ---------
/// * `store`: the catalog to draw from.
/// * `filter`: eligible categories.
/// * `attempts`: probe budget before falling back to the first eligible item.
/// * `rng`: random source.
///
/// Return
/// ------
/// * `Ok(None)` when no item is eligible, the picked item otherwise.
pub fn pick_random<S, R>(
    store: &S,
    filter: &CategoryFilter,
    attempts: usize,
    rng: &mut R,
) -> Result<Option<SmallBody>, AstervizError>
where
    S: CatalogStore + ?Sized,
    R: Rng + ?Sized,
{
    let Some(max_key) = store.max_key(filter)? else {
        return Ok(None);
    };

    for _ in 0..attempts {
        let key = probe_key(rng, max_key);
        if let Some(body) = store.first_at_or_after(filter, key)? {
            return Ok(Some(body));
        }
    }

    debug!(attempts, "probe budget exhausted, using the first eligible item");
    Ok(store
        .first_n_excluding(filter, 1, &HashSet::new())?
        .into_iter()
        .next())
}

/// Pick `limit` distinct eligible items at random.
///
/// When at most `limit` items are eligible, all of them are returned in ascending key order.
/// Otherwise the result holds exactly `limit` distinct items, probed ones first in draw order.
///
/// Arguments
/// ---------
/// * `store`: the catalog to draw from.
/// * `filter`: eligible categories.
/// * `limit`: size of the sample.
/// * `attempt_factor`: probe budget per requested item.
/// * `rng`: random source.
pub fn pick_sample<S, R>(
    store: &S,
    filter: &CategoryFilter,
    limit: usize,
    attempt_factor: usize,
    rng: &mut R,
) -> Result<Vec<SmallBody>, AstervizError>
where
    S: CatalogStore + ?Sized,
    R: Rng + ?Sized,
{
    let eligible = store.count(filter)?;
    if eligible <= limit {
        return store.first_n_excluding(filter, limit, &HashSet::new());
    }
    let Some(max_key) = store.max_key(filter)? else {
        return Ok(Vec::new());
    };

    let budget = limit.saturating_mul(attempt_factor);
    let mut chosen = Vec::with_capacity(limit);
    let mut chosen_ids: HashSet<ObjectId> = HashSet::with_capacity(limit);
    let mut tries = 0;

    while chosen.len() < limit && tries < budget {
        tries += 1;
        let key = probe_key(rng, max_key);
        let Some(body) = store.first_at_or_after(filter, key)? else {
            continue;
        };
        if chosen_ids.insert(body.id) {
            chosen.push(body);
        }
    }

    if chosen.len() < limit {
        let needed = limit - chosen.len();
        debug!(
            limit,
            tries,
            needed,
            "probe budget exhausted, filling with the first unchosen items"
        );
        chosen.extend(store.first_n_excluding(filter, needed, &chosen_ids)?);
    }

    Ok(chosen)
}
