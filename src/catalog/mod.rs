//! # Small-body catalog
//!
//! The catalog is the collection of bodies the service draws from. This module defines the
//! record ([`SmallBody`]), its population classes ([`Category`], [`CategoryFilter`]) and the
//! storage seam ([`CatalogStore`]) that the sampler and the service query.
//!
//! Modules
//! -----------------
//! * [`memory_store`](crate::catalog::memory_store) – [`MemoryCatalog`](crate::catalog::memory_store::MemoryCatalog),
//!   an ordered in-memory implementation of [`CatalogStore`].
//! * [`import`](crate::catalog::import) – CSV import of small-body database exports and JSON
//!   demo seeds.
//!
//! Data Model
//! -----------------
//! * **Key:** [`ObjectId`], opaque and strictly increasing in insertion order. Keys may be
//!   sparse (deleted rows leave gaps).
//! * **Designator:** `spkid`, unique across the catalog.
//! * **Angles:** `i`, `Ω`, `ω` are stored in **degrees**, `M0` in **radians**, as in the source
//!   exports; [`SmallBody::elements`] performs the single conversion to radians.
//!
//! Wire format
//! -----------------
//! [`SmallBody`] serializes with the field names of the public API:
//! `id, name, spkid, category, a, e, i, Omega, omega, M0, epoch, H, q, Q, period`.
use std::{
    collections::{BTreeSet, HashSet},
    fmt,
    str::FromStr,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    asterviz_errors::AstervizError,
    constants::{AstronomicalUnit, Degree, ObjectId, Radian},
    keplerian_element::OrbitalElements,
    time::julian_day_from_date,
};

pub mod import;
pub mod memory_store;

/// Population class of a small body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Mainbelt,
    Neo,
    Trojan,
    Comet,
    Other,
}

impl Category {
    /// Every category, in reporting order.
    pub const ALL: [Category; 5] = [
        Category::Mainbelt,
        Category::Neo,
        Category::Trojan,
        Category::Comet,
        Category::Other,
    ];

    /// Categories offered as display layers by the explore sample.
    pub const LAYERS: [Category; 4] = [
        Category::Mainbelt,
        Category::Neo,
        Category::Trojan,
        Category::Comet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Mainbelt => "mainbelt",
            Category::Neo => "neo",
            Category::Trojan => "trojan",
            Category::Comet => "comet",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AstervizError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainbelt" => Ok(Category::Mainbelt),
            "neo" => Ok(Category::Neo),
            "trojan" => Ok(Category::Trojan),
            "comet" => Ok(Category::Comet),
            "other" => Ok(Category::Other),
            _ => Err(AstervizError::UnknownCategory(s.to_string())),
        }
    }
}

/// Restriction of a catalog query to some categories.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No restriction.
    #[default]
    Any,
    /// A single category.
    One(Category),
    /// Any category of the set. An empty set matches nothing.
    Set(BTreeSet<Category>),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::Any => true,
            CategoryFilter::One(c) => *c == category,
            CategoryFilter::Set(set) => set.contains(&category),
        }
    }

    /// Lenient parsing of a single-category query parameter.
    ///
    /// Missing input, `"any"` and any unrecognized value (including `"other"`) all fall back to
    /// [`CategoryFilter::Any`]: a random pick is never refused because of a bad category.
    pub fn lenient(raw: Option<&str>) -> Self {
        let normalized = raw.unwrap_or("any").trim().to_lowercase();
        match normalized.parse::<Category>() {
            Ok(category) if Category::LAYERS.contains(&category) => CategoryFilter::One(category),
            _ => CategoryFilter::Any,
        }
    }

    /// Parse a comma-separated list of layers.
    ///
    /// Entries are trimmed and lowercased; blanks, unknown names and `other` are dropped. When
    /// nothing remains the filter matches every category.
    pub fn from_layers(raw: &str) -> Self {
        let wanted: BTreeSet<Category> = raw
            .split(',')
            .filter_map(|layer| layer.parse::<Category>().ok())
            .filter(|category| Category::LAYERS.contains(category))
            .collect();
        if wanted.is_empty() {
            CategoryFilter::Any
        } else {
            CategoryFilter::Set(wanted)
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::One(category)
    }
}

/// A catalog record: identity, population class and orbital elements at epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallBody {
    /// Catalog key. Absent from seed files, assigned by the store.
    #[serde(default)]
    pub id: ObjectId,
    pub name: String,
    /// Unique designator (e.g. `"433"`, `"2023 AB"`)
    pub spkid: String,
    pub category: Category,
    /// Semi-major axis (AU)
    pub a: AstronomicalUnit,
    /// Eccentricity
    pub e: f64,
    /// Inclination (deg)
    pub i: Degree,
    /// Longitude of the ascending node Ω (deg)
    #[serde(rename = "Omega")]
    pub node: Degree,
    /// Argument of periapsis ω (deg)
    pub omega: Degree,
    /// Mean anomaly at epoch (rad)
    #[serde(rename = "M0")]
    pub mean_anomaly: Radian,
    /// Epoch date (UTC)
    pub epoch: NaiveDate,
    /// Absolute magnitude
    #[serde(rename = "H", default)]
    pub abs_magnitude: Option<f64>,
    /// Perihelion distance (AU)
    #[serde(rename = "q", default)]
    pub perihelion: Option<AstronomicalUnit>,
    /// Aphelion distance (AU)
    #[serde(rename = "Q", default)]
    pub aphelion: Option<AstronomicalUnit>,
    /// Orbital period (days)
    #[serde(default)]
    pub period: Option<f64>,
}

impl SmallBody {
    /// Orbital elements of the record, angles converted to radians and the epoch date to a
    /// Julian Day (midnight UTC).
    pub fn elements(&self) -> OrbitalElements {
        OrbitalElements::from_degrees(
            self.a,
            self.e,
            self.i,
            self.node,
            self.omega,
            self.mean_anomaly,
            julian_day_from_date(self.epoch),
        )
    }
}

impl fmt::Display for SmallBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.spkid)
    }
}

/// Read access to an ordered catalog of small bodies.
///
/// Items are ordered by ascending [`ObjectId`]. Every query taking a [`CategoryFilter`] only
/// considers the matching items ("eligible" items). The trait is the only capability the
/// sampler relies on, so any indexed table can back it.
pub trait CatalogStore: Send + Sync {
    /// Number of eligible items.
    fn count(&self, filter: &CategoryFilter) -> Result<usize, AstervizError>;

    /// Largest key among eligible items, `None` when there is none.
    fn max_key(&self, filter: &CategoryFilter) -> Result<Option<ObjectId>, AstervizError>;

    /// First eligible item whose key is `>= key`.
    fn first_at_or_after(
        &self,
        filter: &CategoryFilter,
        key: ObjectId,
    ) -> Result<Option<SmallBody>, AstervizError>;

    /// The `n` first eligible items in ascending key order, skipping `excluded` keys.
    fn first_n_excluding(
        &self,
        filter: &CategoryFilter,
        n: usize,
        excluded: &HashSet<ObjectId>,
    ) -> Result<Vec<SmallBody>, AstervizError>;

    fn get(&self, id: ObjectId) -> Result<Option<SmallBody>, AstervizError>;

    fn get_by_designator(&self, spkid: &str) -> Result<Option<SmallBody>, AstervizError>;

    /// Item whose name equals `name`, ignoring case.
    fn find_by_name(&self, name: &str) -> Result<Option<SmallBody>, AstervizError>;

    /// Items whose name or designator contains `query` (case-insensitive), ordered by name,
    /// at most `limit` of them.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SmallBody>, AstervizError>;
}

#[cfg(test)]
pub(crate) mod catalog_test {
    use super::*;

    pub(crate) fn body(spkid: &str, name: &str, category: Category) -> SmallBody {
        SmallBody {
            id: 0,
            name: name.to_string(),
            spkid: spkid.to_string(),
            category,
            a: 2.5,
            e: 0.1,
            i: 5.0,
            node: 80.0,
            omega: 70.0,
            mean_anomaly: 1.0,
            epoch: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            abs_magnitude: Some(15.2),
            perihelion: Some(2.25),
            aphelion: Some(2.75),
            period: Some(1444.0),
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(" NEO ".parse::<Category>().unwrap(), Category::Neo);
        assert_eq!("mainbelt".parse::<Category>().unwrap(), Category::Mainbelt);
        assert_eq!(
            "centaur".parse::<Category>(),
            Err(AstervizError::UnknownCategory("centaur".into()))
        );
        assert_eq!(Category::Trojan.to_string(), "trojan");
    }

    #[test]
    fn test_lenient_filter() {
        assert_eq!(CategoryFilter::lenient(None), CategoryFilter::Any);
        assert_eq!(CategoryFilter::lenient(Some("any")), CategoryFilter::Any);
        assert_eq!(CategoryFilter::lenient(Some("bogus")), CategoryFilter::Any);
        assert_eq!(CategoryFilter::lenient(Some("other")), CategoryFilter::Any);
        assert_eq!(
            CategoryFilter::lenient(Some(" Trojan")),
            CategoryFilter::One(Category::Trojan)
        );
    }

    #[test]
    fn test_layers_filter() {
        let filter = CategoryFilter::from_layers("NEO, comet,,other,unknown");
        assert_eq!(
            filter,
            CategoryFilter::Set([Category::Neo, Category::Comet].into_iter().collect())
        );
        assert!(filter.matches(Category::Neo));
        assert!(!filter.matches(Category::Other));

        assert_eq!(CategoryFilter::from_layers("other"), CategoryFilter::Any);
        assert_eq!(CategoryFilter::from_layers(""), CategoryFilter::Any);
        assert!(!CategoryFilter::Set(BTreeSet::new()).matches(Category::Neo));
    }

    #[test]
    fn test_small_body_wire_format() {
        let b = body("433", "433 Eros", Category::Neo);
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["spkid"], "433");
        assert_eq!(json["category"], "neo");
        assert_eq!(json["Omega"], 80.0);
        assert_eq!(json["M0"], 1.0);
        assert_eq!(json["epoch"], "2024-03-31");
        assert_eq!(json["q"], 2.25);
        assert_eq!(json["Q"], 2.75);
        assert_eq!(json["H"], 15.2);

        let back: SmallBody = serde_json::from_value(json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn test_seed_record_without_optional_fields() {
        let raw = r#"{"name": "Ceres", "spkid": "1", "category": "mainbelt",
            "a": 2.77, "e": 0.0785, "i": 10.59, "Omega": 80.3, "omega": 73.6,
            "M0": 1.2, "epoch": "2024-03-31"}"#;
        let b: SmallBody = serde_json::from_str(raw).unwrap();
        assert_eq!(b.id, 0);
        assert_eq!(b.period, None);
        assert_eq!(b.abs_magnitude, None);
    }

    #[test]
    fn test_elements_conversion() {
        let b = body("1", "Ceres", Category::Mainbelt);
        let elem = b.elements();
        assert_eq!(elem.semi_major_axis, 2.5);
        assert_eq!(elem.inclination, 5.0_f64.to_radians());
        assert_eq!(elem.mean_anomaly, 1.0);
        assert_eq!(elem.reference_epoch, 2460400.5);
    }
}
