//! # Catalog ingestion
//!
//! Two sources feed a [`MemoryCatalog`]:
//!
//! * **CSV exports** of the JPL small-body database ([`import_csv`], [`import_csv_path`]).
//!   Each row is upserted by designator, so importing the same file twice updates the records
//!   in place and keeps their keys.
//! * **JSON seed files** ([`load_seed`], [`load_seed_path`]): an array of [`SmallBody`] records
//!   in the wire format. Existing designators are left untouched.
//!
//! CSV columns
//! -----------------
//! | column      | field                     | notes                                   |
//! |-------------|---------------------------|-----------------------------------------|
//! | `pdes`      | `spkid`                   | required                                |
//! | `full_name` | `name`                    | falls back to the designator            |
//! | `epoch_cal` | `epoch`                   | required, trailing `.0` ignored          |
//! | `e`, `a`    | `e`, `a`                  | required                                |
//! | `i`, `om`, `w` | `i`, `Omega`, `omega`  | required, degrees                       |
//! | `H`, `q`, `ad` | `H`, `q`, `Q`          | optional                                |
//! | `per_y`     | `period`                  | optional, years → days (× 365.25)       |
//! | `neo`, `class` | `category`             | see [`category_from_class`]             |
//!
//! Numeric cells tolerate surrounding quotes and blanks; empty cells, `nan` and unparsable
//! values are treated as missing. Rows missing a required value are skipped and counted in
//! [`ImportReport::skipped`]. The CSV export carries no mean anomaly: `M0` is the synthetic
//! phase of [`derive_phase`].
use std::{fs::File, io::Read};

use camino::Utf8Path;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    asterviz_errors::AstervizError,
    catalog::{memory_store::MemoryCatalog, Category, SmallBody},
    constants::DAYS_PER_JULIAN_YEAR,
    seed::derive_phase,
};

/// Row interval between two progress messages
const PROGRESS_EVERY: usize = 2000;

/// Selection of the CSV rows to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOptions {
    /// Number of data rows to skip before importing.
    pub offset: usize,
    /// Maximum number of rows imported (created + updated); `0` means no limit.
    pub limit: usize,
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    /// Rows rejected for a missing or malformed required value.
    pub skipped: usize,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.created + self.updated
    }
}

/// Outcome of a seed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeedReport {
    pub created: usize,
    pub total: usize,
}

/// Raw CSV row. Unknown columns are ignored, absent ones read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    pdes: String,
    full_name: String,
    epoch_cal: String,
    e: String,
    a: String,
    i: String,
    om: String,
    w: String,
    #[serde(rename = "H")]
    h: String,
    q: String,
    ad: String,
    per_y: String,
    neo: String,
    class: String,
}

/// Lenient number parsing: quotes and blanks stripped, `nan` and garbage are missing.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_matches('"');
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Calendar epoch, `YYYY-MM-DD` or `YYYYMMDD`, with an optional trailing `.0`.
fn parse_epoch(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
        .ok()
}

/// Population class from the `neo` flag and the orbit class code of the export.
///
/// * NEO when `neo == "Y"` or the class is one of `APO`, `AMO`, `ATE`, `IEO`
/// * Trojan for `TJN`
/// * Main belt when the class contains `MB` or is one of `MBA`, `IMB`, `OMB`, `MCA`
/// * Other otherwise
pub fn category_from_class(neo_flag: &str, class: &str) -> Category {
    let is_neo = neo_flag.trim().eq_ignore_ascii_case("y");
    let class = class.trim().to_uppercase();

    if is_neo || matches!(class.as_str(), "APO" | "AMO" | "ATE" | "IEO") {
        Category::Neo
    } else if class == "TJN" {
        Category::Trojan
    } else if class.contains("MB") || matches!(class.as_str(), "MBA" | "IMB" | "OMB" | "MCA") {
        Category::Mainbelt
    } else {
        Category::Other
    }
}

fn parse_row(row: &CsvRow) -> Option<SmallBody> {
    let spkid = row.pdes.trim();
    if spkid.is_empty() {
        return None;
    }
    let name = match row.full_name.trim() {
        "" => spkid,
        full_name => full_name,
    };
    let epoch = parse_epoch(&row.epoch_cal)?;

    Some(SmallBody {
        id: 0,
        name: name.to_string(),
        spkid: spkid.to_string(),
        category: category_from_class(&row.neo, &row.class),
        a: parse_number(&row.a)?,
        e: parse_number(&row.e)?,
        i: parse_number(&row.i)?,
        node: parse_number(&row.om)?,
        omega: parse_number(&row.w)?,
        mean_anomaly: derive_phase(spkid),
        epoch,
        abs_magnitude: parse_number(&row.h),
        perihelion: parse_number(&row.q),
        aphelion: parse_number(&row.ad),
        period: parse_number(&row.per_y).map(|years| years * DAYS_PER_JULIAN_YEAR),
    })
}

/// Import a CSV export into `catalog`.
///
/// Arguments
/// ---------
/// * `reader`: CSV source with a header line.
/// * `catalog`: destination, records upserted by designator.
/// * `options`: rows to skip and maximum number of rows to import.
///
/// Return
/// ------
/// * An [`ImportReport`], or [`AstervizError::Csv`] when the file itself is malformed.
pub fn import_csv<R: Read>(
    reader: R,
    catalog: &mut MemoryCatalog,
    options: &ImportOptions,
) -> Result<ImportReport, AstervizError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let mut report = ImportReport::default();
    let limit_label = match options.limit {
        0 => "all".to_string(),
        n => n.to_string(),
    };
    info!(offset = options.offset, limit = %limit_label, "importing catalog rows");

    for (line, row) in csv_reader
        .deserialize::<CsvRow>()
        .enumerate()
        .skip(options.offset)
    {
        if options.limit != 0 && report.imported() >= options.limit {
            break;
        }
        let row = row?;
        let Some(body) = parse_row(&row) else {
            debug!(line = line + 1, pdes = %row.pdes, "skipping incomplete row");
            report.skipped += 1;
            continue;
        };

        match catalog.upsert(body) {
            (_, true) => report.created += 1,
            (_, false) => report.updated += 1,
        }
        if report.imported() % PROGRESS_EVERY == 0 {
            info!(imported = report.imported(), limit = %limit_label, "import progress");
        }
    }

    info!(
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        "catalog import done"
    );
    Ok(report)
}

/// Import a CSV export from a file. See [`import_csv`].
pub fn import_csv_path(
    path: &Utf8Path,
    catalog: &mut MemoryCatalog,
    options: &ImportOptions,
) -> Result<ImportReport, AstervizError> {
    let file = File::open(path)?;
    import_csv(file, catalog, options)
}

/// Load a JSON array of [`SmallBody`] records, keeping existing designators as they are.
pub fn load_seed<R: Read>(
    reader: R,
    catalog: &mut MemoryCatalog,
) -> Result<SeedReport, AstervizError> {
    let bodies: Vec<SmallBody> = serde_json::from_reader(reader)?;
    let created = bodies
        .into_iter()
        .filter(|body| catalog.get_or_create(body.clone()).1)
        .count();

    let report = SeedReport {
        created,
        total: catalog.len(),
    };
    info!(created = report.created, total = report.total, "seed catalog loaded");
    Ok(report)
}

/// Load a JSON seed file. See [`load_seed`].
pub fn load_seed_path(
    path: &Utf8Path,
    catalog: &mut MemoryCatalog,
) -> Result<SeedReport, AstervizError> {
    let file = File::open(path)?;
    load_seed(file, catalog)
}

#[cfg(test)]
mod import_test {
    use super::*;
    use crate::catalog::CatalogStore;

    const SAMPLE: &str = "\
pdes,full_name,epoch_cal,e,a,q,i,om,w,ad,per_y,H,neo,class
433,\"   433 Eros (A898 PA)\",2024-03-31.0,0.2227,1.458,1.133,10.83,304.3,178.9,1.783,1.76,10.4,Y,AMO
1,\"     1 Ceres (A801 AA)\",2024-03-31,0.0789,2.766,2.548,10.59,80.25,73.29,2.984,4.60,3.33,N,MBA
624,\"   624 Hektor (1907 XM)\",20240331,0.0238,5.237,5.112,18.17,342.8,184.0,5.362,11.98,7.49,N,TJN
,no designator,2024-03-31,0.1,2.0,,1.0,1.0,1.0,,,,N,MBA
99942,\"99942 Apophis (2004 MN4)\",,0.19,0.92,,3.3,204.0,126.0,,,19.1,Y,ATE
2000 XX,,2024-03-31,nan,2.5,,1.0,1.0,1.0,,,,N,OMB
C/2020 F3,,2024-03-31,\" 0.999 \",270.0,,128.9,61.0,37.3,,,,N,HYP
";

    #[test]
    fn test_category_rules() {
        assert_eq!(category_from_class("Y", "MBA"), Category::Neo);
        assert_eq!(category_from_class("N", "ate"), Category::Neo);
        assert_eq!(category_from_class("", "TJN"), Category::Trojan);
        assert_eq!(category_from_class("N", "IMB"), Category::Mainbelt);
        assert_eq!(category_from_class("N", "MCA"), Category::Mainbelt);
        assert_eq!(category_from_class("N", "CEN"), Category::Other);
        assert_eq!(category_from_class("", ""), Category::Other);
    }

    #[test]
    fn test_number_and_epoch_parsing() {
        assert_eq!(parse_number(" \"2.5\" "), Some(2.5));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);

        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(parse_epoch("2024-03-31.0"), Some(date));
        assert_eq!(parse_epoch("20240331"), Some(date));
        assert_eq!(parse_epoch(".0"), None);
        assert_eq!(parse_epoch("2024-13-01"), None);
    }

    #[test]
    fn test_import_sample() {
        let mut catalog = MemoryCatalog::new();
        let report = import_csv(SAMPLE.as_bytes(), &mut catalog, &ImportOptions::default()).unwrap();
        assert_eq!(
            report,
            ImportReport {
                created: 4,
                updated: 0,
                skipped: 3
            }
        );

        let eros = catalog.get_by_designator("433").unwrap().unwrap();
        assert_eq!(eros.name, "433 Eros (A898 PA)");
        assert_eq!(eros.category, Category::Neo);
        assert_eq!(eros.aphelion, Some(1.783));
        assert_eq!(eros.period, Some(1.76 * 365.25));
        assert_eq!(eros.mean_anomaly, derive_phase("433"));

        let hektor = catalog.get_by_designator("624").unwrap().unwrap();
        assert_eq!(hektor.category, Category::Trojan);

        let comet = catalog.get_by_designator("C/2020 F3").unwrap().unwrap();
        assert_eq!(comet.name, "C/2020 F3");
        assert_eq!(comet.e, 0.999);
        assert_eq!(comet.category, Category::Other);
        assert_eq!(comet.abs_magnitude, None);
    }

    #[test]
    fn test_reimport_updates_in_place() {
        let mut catalog = MemoryCatalog::new();
        import_csv(SAMPLE.as_bytes(), &mut catalog, &ImportOptions::default()).unwrap();
        let report = import_csv(SAMPLE.as_bytes(), &mut catalog, &ImportOptions::default()).unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 4);
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get_by_designator("1").unwrap().unwrap().id, 2);
    }

    #[test]
    fn test_offset_and_limit() {
        let mut catalog = MemoryCatalog::new();
        let options = ImportOptions {
            offset: 1,
            limit: 2,
        };
        let report = import_csv(SAMPLE.as_bytes(), &mut catalog, &options).unwrap();
        assert_eq!(report.imported(), 2);
        assert!(catalog.get_by_designator("433").unwrap().is_none());
        assert!(catalog.get_by_designator("1").unwrap().is_some());
        assert!(catalog.get_by_designator("624").unwrap().is_some());
    }

    #[test]
    fn test_malformed_csv_is_an_error() {
        let mut catalog = MemoryCatalog::new();
        let raw = [0xffu8, 0xfe, b'\n', 0xff, b'\n'];
        assert!(matches!(
            import_csv(&raw[..], &mut catalog, &ImportOptions::default()),
            Err(AstervizError::Csv(_))
        ));
    }

    #[test]
    fn test_load_seed() {
        let raw = r#"[
            {"name": "Ceres", "spkid": "1", "category": "mainbelt", "a": 2.77, "e": 0.0785,
             "i": 10.59, "Omega": 80.3, "omega": 73.6, "M0": 1.2, "epoch": "2024-03-31"},
            {"name": "Halley", "spkid": "1P", "category": "comet", "a": 17.8, "e": 0.967,
             "i": 162.3, "Omega": 58.4, "omega": 111.3, "M0": 0.5, "epoch": "1994-02-17",
             "H": null, "q": 0.586, "Q": 35.1, "period": 27510.0}
        ]"#;
        let mut catalog = MemoryCatalog::new();
        catalog
            .insert(crate::catalog::catalog_test::body("1", "Ceres (kept)", Category::Mainbelt))
            .unwrap();

        let report = load_seed(raw.as_bytes(), &mut catalog).unwrap();
        assert_eq!(report, SeedReport { created: 1, total: 2 });
        assert_eq!(catalog.get(1).unwrap().unwrap().name, "Ceres (kept)");
        assert_eq!(catalog.get(2).unwrap().unwrap().perihelion, Some(0.586));

        assert!(matches!(
            load_seed("{not json".as_bytes(), &mut catalog),
            Err(AstervizError::Json(_))
        ));
    }
}
