//! # Catalog service
//!
//! [`Asterviz`] is the façade exposed to front ends (CLI, web handlers). It owns a
//! [`CatalogStore`] and an [`AstervizParams`], and turns raw request values (query strings,
//! ISO dates, step expressions) into typed, serializable responses.
//!
//! Operations
//! -----------------
//! * [`Asterviz::random_object`] – one random body, optionally restricted to a category.
//! * [`Asterviz::search`] – name / designator search.
//! * [`Asterviz::object_detail`] – lookup by designator, key or name.
//! * [`Asterviz::ephemeris`] – fixed-step positions of a body over a date range.
//! * [`Asterviz::position`] – position of a body at a date.
//! * [`Asterviz::position_at`] – position of a body at an instant with a time of day.
//! * [`Asterviz::orbit`] – closed polyline of the orbit of a body.
//! * [`Asterviz::explore_sample`] – random sample of the catalog for display layers.
//! * [`Asterviz::stats`] – population per category.
//!
//! Error policy
//! -----------------
//! * Malformed input is an `Err` ([`AstervizError::InvalidDate`], [`AstervizError::InvalidStep`],
//!   [`AstervizError::MissingParameter`]).
//! * Unknown objects are [`AstervizError::ObjectNotFound`].
//! * An empty population is **not** an error: [`RandomObject::Missing`] and an empty
//!   [`ExploreSample`] carry an explanatory `detail` instead.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    asterviz_errors::AstervizError,
    catalog::{CatalogStore, Category, CategoryFilter, SmallBody},
    constants::{JulianDay, ObjectId, MAX_EPHEMERIS_POINTS, ORBIT_SEGMENTS},
    ephemeris::{parse_step_days, EphemerisPoint, EphemerisSeries},
    keplerian_element::Position,
    params::AstervizParams,
    propagator::KeplerPropagator,
    sampler::{pick_random, pick_sample},
    time::{julian_day_from_date, julian_day_from_epoch, parse_iso_date, parse_iso_instant},
};

/// Layers of the explore sample when the request names none.
pub const DEFAULT_LAYERS: &str = "mainbelt,neo,trojan,comet";

/// Result of [`Asterviz::random_object`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RandomObject {
    Found(SmallBody),
    /// No body is eligible; `missing` is always `true`.
    Missing { detail: String, missing: bool },
}

impl RandomObject {
    fn missing() -> Self {
        RandomObject::Missing {
            detail: "No objects in this category. Import dataset first.".to_string(),
            missing: true,
        }
    }

    pub fn body(&self) -> Option<&SmallBody> {
        match self {
            RandomObject::Found(body) => Some(body),
            RandomObject::Missing { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub results: Vec<SmallBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EphemerisResponse {
    pub object: SmallBody,
    pub start: NaiveDate,
    pub stop: NaiveDate,
    pub step_days: f64,
    pub points: Vec<EphemerisPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionResponse {
    pub object: SmallBody,
    pub date: NaiveDate,
    pub jd: JulianDay,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Result of [`Asterviz::orbit`]: `segments + 1` positions, the last one closing the loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitResponse {
    pub object: SmallBody,
    pub segments: usize,
    pub points: Vec<Position>,
}

/// Result of [`Asterviz::explore_sample`]: `{objects, count}`, or `{objects: [], detail}` on an
/// empty population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreSample {
    pub objects: Vec<SmallBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub counts: BTreeMap<Category, usize>,
    pub total: usize,
}

/// Service façade over a catalog store.
#[derive(Debug, Clone)]
pub struct Asterviz<S: CatalogStore> {
    store: S,
    params: AstervizParams,
}

impl<S: CatalogStore> Asterviz<S> {
    /// Service with the default parameters.
    pub fn new(store: S) -> Self {
        Self::with_params(store, AstervizParams::default())
    }

    pub fn with_params(store: S, params: AstervizParams) -> Self {
        Asterviz { store, params }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn params(&self) -> &AstervizParams {
        &self.params
    }

    /// Pick one body at random.
    ///
    /// Arguments
    /// ---------
    /// * `category`: raw category parameter, parsed leniently (see [`CategoryFilter::lenient`]).
    /// * `rng`: random source.
    ///
    /// Return
    /// ------
    /// * [`RandomObject::Found`], or [`RandomObject::Missing`] when the population is empty.
    pub fn random_object<R: Rng + ?Sized>(
        &self,
        category: Option<&str>,
        rng: &mut R,
    ) -> Result<RandomObject, AstervizError> {
        let filter = CategoryFilter::lenient(category);
        let picked = pick_random(&self.store, &filter, self.params.single_pick_attempts, rng)?;
        Ok(picked.map_or_else(RandomObject::missing, RandomObject::Found))
    }

    /// Case-insensitive search on name and designator; a blank query returns no result.
    pub fn search(&self, query: Option<&str>) -> Result<SearchResults, AstervizError> {
        let query = query.unwrap_or_default().trim();
        if query.is_empty() {
            return Ok(SearchResults {
                results: Vec::new(),
            });
        }
        let results = self.store.search(query, self.params.search_limit)?;
        debug!(query, hits = results.len(), "catalog search");
        Ok(SearchResults { results })
    }

    /// Resolve a body from a designator, a numeric key or a name (case-insensitive), tried in
    /// that order.
    pub fn object_detail(&self, id: &str) -> Result<SmallBody, AstervizError> {
        let raw = id.trim();
        if raw.is_empty() {
            return Err(AstervizError::ObjectNotFound(id.to_string()));
        }

        if let Some(body) = self.store.get_by_designator(raw)? {
            return Ok(body);
        }
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(key) = raw.parse::<ObjectId>() {
                if let Some(body) = self.store.get(key)? {
                    return Ok(body);
                }
            }
        }
        self.store
            .find_by_name(raw)?
            .ok_or_else(|| AstervizError::ObjectNotFound(raw.to_string()))
    }

    /// Positions of a body every `step` from `start` to `stop`.
    ///
    /// Arguments
    /// ---------
    /// * `id`: body reference, see [`Asterviz::object_detail`].
    /// * `start`, `stop`: required ISO dates (`YYYY-MM-DD`), swapped if reversed.
    /// * `step`: step expression (`"1d"`, `"6h"`, ...), defaults to the configured step when
    ///   absent or blank, and is floored to `min_step_days`.
    ///
    /// Return
    /// ------
    /// * The normalized request echoed back with the sampled points.
    /// * [`AstervizError::MissingParameter`] when a date is absent,
    ///   [`AstervizError::InvalidDate`] / [`AstervizError::InvalidStep`] on malformed input,
    ///   [`AstervizError::UnsupportedOrbit`] for a non-elliptic record when orbit validation is on.
    pub fn ephemeris(
        &self,
        id: &str,
        start: Option<&str>,
        stop: Option<&str>,
        step: Option<&str>,
    ) -> Result<EphemerisResponse, AstervizError> {
        let object = self.object_detail(id)?;

        let (Some(start), Some(stop)) = (non_blank(start), non_blank(stop)) else {
            return Err(AstervizError::MissingParameter(
                "start and stop are required (YYYY-MM-DD)".into(),
            ));
        };
        let mut start = parse_iso_date(start)?;
        let mut stop = parse_iso_date(stop)?;
        let step = non_blank(step).unwrap_or(&self.params.default_step);
        let step_days = parse_step_days(Some(step))?
            .max(self.params.min_step_days);
        if stop < start {
            std::mem::swap(&mut start, &mut stop);
        }

        let propagator = self.propagator_for(&object)?;
        let series = EphemerisSeries::from_propagator(
            propagator,
            julian_day_from_date(start),
            julian_day_from_date(stop),
            step_days,
        )
        .with_max_points(self.params.max_ephemeris_points);

        Ok(EphemerisResponse {
            points: series.to_points(),
            step_days: series.step_days(),
            object,
            start,
            stop,
        })
    }

    /// Position of a body at midnight UTC of `date` (`YYYY-MM-DD`).
    pub fn position(&self, id: &str, date: Option<&str>) -> Result<PositionResponse, AstervizError> {
        let object = self.object_detail(id)?;
        let Some(date) = non_blank(date) else {
            return Err(AstervizError::MissingParameter(
                "date is required (YYYY-MM-DD)".into(),
            ));
        };
        let date = parse_iso_date(date)?;
        self.position_response(object, date, julian_day_from_date(date))
    }

    /// Position of a body at an ISO instant (`YYYY-MM-DDTHH:MM:SS`, UTC unless a time scale
    /// suffix says otherwise).
    ///
    /// The response carries the UTC calendar date of the instant and its exact Julian Day.
    pub fn position_at(
        &self,
        id: &str,
        at: Option<&str>,
    ) -> Result<PositionResponse, AstervizError> {
        let object = self.object_detail(id)?;
        let Some(raw) = non_blank(at) else {
            return Err(AstervizError::MissingParameter(
                "instant is required (YYYY-MM-DDTHH:MM:SS)".into(),
            ));
        };
        let epoch = parse_iso_instant(raw)?;
        let (year, month, day, ..) = epoch.to_gregorian_utc();
        let date = NaiveDate::from_ymd_opt(year, month.into(), day.into())
            .ok_or_else(|| AstervizError::InvalidDate(raw.to_string()))?;
        self.position_response(object, date, julian_day_from_epoch(epoch))
    }

    /// Closed polyline of the orbit of a body, uniform in eccentric anomaly.
    ///
    /// `segments` defaults to [`ORBIT_SEGMENTS`] and is clamped to
    /// `[1, MAX_EPHEMERIS_POINTS]`.
    pub fn orbit(&self, id: &str, segments: Option<usize>) -> Result<OrbitResponse, AstervizError> {
        let object = self.object_detail(id)?;
        let segments = segments
            .unwrap_or(ORBIT_SEGMENTS)
            .clamp(1, MAX_EPHEMERIS_POINTS);
        let points = self.propagator_for(&object)?.orbit_path(segments);
        Ok(OrbitResponse {
            object,
            segments,
            points,
        })
    }

    /// Random sample of the catalog for display.
    ///
    /// Arguments
    /// ---------
    /// * `limit`: sample size, default and clamp bounds from the parameters (5000, `[100, 20000]`).
    /// * `layers`: comma-separated categories among `mainbelt, neo, trojan, comet`, default all
    ///   four. A list naming none of them selects every category.
    /// * `rng`: random source.
    pub fn explore_sample<R: Rng + ?Sized>(
        &self,
        limit: Option<usize>,
        layers: Option<&str>,
        rng: &mut R,
    ) -> Result<ExploreSample, AstervizError> {
        let limit = self.params.clamp_explore_limit(limit);
        let filter = CategoryFilter::from_layers(layers.unwrap_or(DEFAULT_LAYERS));

        if self.store.count(&filter)? == 0 {
            return Ok(ExploreSample {
                objects: Vec::new(),
                count: None,
                detail: Some("No objects in DB. Run import_dataset.".to_string()),
            });
        }

        let objects = pick_sample(
            &self.store,
            &filter,
            limit,
            self.params.sample_attempt_factor,
            rng,
        )?;
        debug!(limit, sampled = objects.len(), "explore sample");
        Ok(ExploreSample {
            count: Some(objects.len()),
            objects,
            detail: None,
        })
    }

    /// Number of bodies per category, every category listed.
    pub fn stats(&self) -> Result<CatalogStats, AstervizError> {
        let counts = Category::ALL
            .iter()
            .map(|c| Ok((*c, self.store.count(&CategoryFilter::One(*c))?)))
            .collect::<Result<BTreeMap<_, _>, AstervizError>>()?;
        let total = counts.values().sum();
        Ok(CatalogStats { counts, total })
    }

    fn position_response(
        &self,
        object: SmallBody,
        date: NaiveDate,
        jd: JulianDay,
    ) -> Result<PositionResponse, AstervizError> {
        let Position { x, y, z } = self.propagator_for(&object)?.position_at(jd);
        Ok(PositionResponse {
            object,
            date,
            jd,
            x,
            y,
            z,
        })
    }

    fn propagator_for(&self, object: &SmallBody) -> Result<KeplerPropagator, AstervizError> {
        let elements = object.elements();
        if self.params.validate_orbits {
            if let Err(err) = elements.check_elliptic() {
                warn!(spkid = %object.spkid, %err, "orbit rejected");
                return Err(err);
            }
        }
        Ok(KeplerPropagator::new(&elements, self.params.mu)
            .with_kepler_max_iter(self.params.kepler_max_iter))
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod service_test {
    use super::*;
    use crate::catalog::{catalog_test::body, memory_store::MemoryCatalog};
    use rand::{rngs::StdRng, SeedableRng};

    fn service() -> Asterviz<MemoryCatalog> {
        let catalog = MemoryCatalog::from_bodies([
            body("433", "433 Eros (A898 PA)", Category::Neo),
            body("1", "1 Ceres (A801 AA)", Category::Mainbelt),
            body("4", "4 Vesta (A807 FA)", Category::Mainbelt),
            body("1P", "1P/Halley", Category::Comet),
            body("X1", "Oddball", Category::Other),
        ])
        .unwrap();
        Asterviz::new(catalog)
    }

    #[test]
    fn test_random_object() {
        let svc = service();
        let mut rng = StdRng::seed_from_u64(11);

        let picked = svc.random_object(Some("comet"), &mut rng).unwrap();
        assert_eq!(picked.body().unwrap().spkid, "1P");

        let any = svc.random_object(Some("nonsense"), &mut rng).unwrap();
        assert!(any.body().is_some());

        let missing = svc.random_object(Some("trojan"), &mut rng).unwrap();
        assert_eq!(missing, RandomObject::missing());
        let json = serde_json::to_value(&missing).unwrap();
        assert_eq!(json["missing"], true);
    }

    #[test]
    fn test_search() {
        let svc = service();
        assert!(svc.search(None).unwrap().results.is_empty());
        assert!(svc.search(Some("   ")).unwrap().results.is_empty());
        let hits = svc.search(Some("VEST")).unwrap().results;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].spkid, "4");
    }

    #[test]
    fn test_object_resolution_order() {
        let svc = service();
        // "1" is the designator of Ceres (key 2), not key 1
        assert_eq!(svc.object_detail("1").unwrap().name, "1 Ceres (A801 AA)");
        // "5" is no designator: falls back to the key
        assert_eq!(svc.object_detail("5").unwrap().spkid, "X1");
        assert_eq!(svc.object_detail(" oddball ").unwrap().spkid, "X1");
        assert_eq!(
            svc.object_detail("99"),
            Err(AstervizError::ObjectNotFound("99".into()))
        );
        assert!(matches!(
            svc.object_detail("  "),
            Err(AstervizError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_ephemeris_normalization() {
        let svc = service();
        let resp = svc
            .ephemeris("433", Some("2024-01-10"), Some("2024-01-01"), Some("1h"))
            .unwrap();
        assert_eq!(resp.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(resp.stop, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(resp.step_days, 0.25);
        assert_eq!(resp.points.len(), 37);
        assert_eq!(resp.points[0].jd, 2460310.5);

        let default_step = svc
            .ephemeris("433", Some("2024-01-01"), Some("2024-01-10"), None)
            .unwrap();
        assert_eq!(default_step.step_days, 1.0);
        assert_eq!(default_step.points.len(), 10);
    }

    #[test]
    fn test_blank_step_uses_default() {
        let svc = service();
        for step in ["", "  "] {
            let resp = svc
                .ephemeris("433", Some("2024-01-01"), Some("2024-01-03"), Some(step))
                .unwrap();
            assert_eq!(resp.step_days, 1.0);
            assert_eq!(resp.points.len(), 3);
        }
    }

    #[test]
    fn test_ephemeris_input_errors() {
        let svc = service();
        assert!(matches!(
            svc.ephemeris("433", None, Some("2024-01-01"), None),
            Err(AstervizError::MissingParameter(_))
        ));
        assert_eq!(
            svc.ephemeris("433", Some("2024-1-x"), Some("2024-01-01"), None)
                .unwrap_err(),
            AstervizError::InvalidDate("2024-1-x".into())
        );
        assert_eq!(
            svc.ephemeris("433", Some("2024-01-01"), Some("2024-01-02"), Some("fast"))
                .unwrap_err(),
            AstervizError::InvalidStep("fast".into())
        );
        assert!(matches!(
            svc.ephemeris("nope", Some("2024-01-01"), Some("2024-01-02"), None),
            Err(AstervizError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_hyperbolic_record_is_rejected() {
        let mut svc = service();
        let mut comet = body("C/2019 Q4", "Borisov", Category::Comet);
        comet.e = 3.36;
        svc.store_mut().insert(comet).unwrap();

        assert!(matches!(
            svc.position("C/2019 Q4", Some("2024-01-01")),
            Err(AstervizError::UnsupportedOrbit(_))
        ));

        let lenient = Asterviz::with_params(
            svc.store().clone(),
            AstervizParams::builder().validate_orbits(false).build().unwrap(),
        );
        assert!(lenient.position("C/2019 Q4", Some("2024-01-01")).is_ok());
    }

    #[test]
    fn test_position_matches_ephemeris() {
        let svc = service();
        let pos = svc.position("4", Some("2024-02-01")).unwrap();
        let eph = svc
            .ephemeris("4", Some("2024-02-01"), Some("2024-02-01"), None)
            .unwrap();
        assert_eq!(eph.points.len(), 1);
        assert_eq!((pos.x, pos.y, pos.z), (eph.points[0].x, eph.points[0].y, eph.points[0].z));
        assert_eq!(pos.jd, eph.points[0].jd);
    }

    #[test]
    fn test_position_at_instant() {
        let svc = service();
        let midnight = svc.position("4", Some("2024-02-01")).unwrap();
        let same = svc.position_at("4", Some("2024-02-01T00:00:00")).unwrap();
        assert_eq!(same, midnight);

        let morning = svc.position_at("4", Some("2024-02-01T06:00:00 UTC")).unwrap();
        assert_eq!(morning.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(morning.jd, 2460341.75);
        assert_ne!(morning.x, midnight.x);

        assert!(matches!(
            svc.position_at("4", Some(" ")),
            Err(AstervizError::MissingParameter(_))
        ));
        assert_eq!(
            svc.position_at("4", Some("noon")).unwrap_err(),
            AstervizError::InvalidDate("noon".into())
        );
    }

    #[test]
    fn test_orbit_polyline() {
        let svc = service();
        let orbit = svc.orbit("1", None).unwrap();
        assert_eq!(orbit.segments, ORBIT_SEGMENTS);
        assert_eq!(orbit.points.len(), ORBIT_SEGMENTS + 1);
        let (first, last) = (orbit.points[0], orbit.points[ORBIT_SEGMENTS]);
        assert!((first.to_vector() - last.to_vector()).norm() < 1e-12);

        // a = 2.5, e = 0.1: every vertex between q and Q
        assert!(orbit
            .points
            .iter()
            .all(|p| p.norm() >= 2.25 - 1e-9 && p.norm() <= 2.75 + 1e-9));

        assert_eq!(svc.orbit("1", Some(0)).unwrap().points.len(), 2);
        assert_eq!(
            svc.orbit("1", Some(usize::MAX)).unwrap().segments,
            MAX_EPHEMERIS_POINTS
        );
    }

    #[test]
    fn test_explore_sample() {
        let svc = service();
        let mut rng = StdRng::seed_from_u64(99);

        // Default layers exclude "other"
        let sample = svc.explore_sample(None, None, &mut rng).unwrap();
        assert_eq!(sample.count, Some(4));
        assert!(sample.objects.iter().all(|b| b.category != Category::Other));

        // No recognised layer: every category
        let all = svc.explore_sample(Some(10), Some("other"), &mut rng).unwrap();
        assert_eq!(all.count, Some(5));

        let empty = svc.explore_sample(None, Some("trojan"), &mut rng).unwrap();
        assert!(empty.objects.is_empty());
        assert!(empty.detail.is_some());
        let json = serde_json::to_value(&empty).unwrap();
        assert!(json.get("count").is_none());
    }

    #[test]
    fn test_stats() {
        let stats = service().stats().unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.counts[&Category::Mainbelt], 2);
        assert_eq!(stats.counts[&Category::Trojan], 0);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["counts"]["neo"], 1);
    }
}
