#![allow(dead_code)]

use approx::assert_relative_eq;
use asterviz::{
    catalog::import::{import_csv_path, load_seed_path, ImportOptions},
    MemoryCatalog, OrbitalElements, Position,
};
use camino::Utf8Path;

pub const DEMO_SEED: &str = "tests/data/demo_smallbodies.json";
pub const SBDB_SAMPLE: &str = "tests/data/sbdb_sample.csv";

pub fn demo_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    load_seed_path(Utf8Path::new(DEMO_SEED), &mut catalog).unwrap();
    catalog
}

pub fn sbdb_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    import_csv_path(
        Utf8Path::new(SBDB_SAMPLE),
        &mut catalog,
        &ImportOptions::default(),
    )
    .unwrap();
    catalog
}

pub fn assert_elements_close(actual: &OrbitalElements, expected: &OrbitalElements, epsilon: f64) {
    assert_relative_eq!(
        actual.reference_epoch,
        expected.reference_epoch,
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.semi_major_axis,
        expected.semi_major_axis,
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.eccentricity,
        expected.eccentricity,
        epsilon = epsilon
    );
    assert_relative_eq!(actual.inclination, expected.inclination, epsilon = epsilon);
    assert_relative_eq!(
        actual.ascending_node_longitude,
        expected.ascending_node_longitude,
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.periapsis_argument,
        expected.periapsis_argument,
        epsilon = epsilon
    );
    assert_relative_eq!(
        actual.mean_anomaly,
        expected.mean_anomaly,
        epsilon = epsilon
    );
}

pub fn assert_position_close(actual: &Position, expected: &Position, epsilon: f64) {
    assert_relative_eq!(actual.x, expected.x, epsilon = epsilon);
    assert_relative_eq!(actual.y, expected.y, epsilon = epsilon);
    assert_relative_eq!(actual.z, expected.z, epsilon = epsilon);
}
