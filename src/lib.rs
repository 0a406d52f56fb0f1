pub mod asterviz_errors;
pub mod catalog;
pub mod constants;
pub mod ephemeris;
pub mod kepler;
pub mod keplerian_element;
pub mod params;
pub mod propagator;
pub mod sampler;
pub mod seed;
pub mod service;
pub mod time;

pub use asterviz_errors::AstervizError;
pub use catalog::{memory_store::MemoryCatalog, CatalogStore, Category, CategoryFilter, SmallBody};
pub use ephemeris::{generate, EphemerisPoint, EphemerisSeries};
pub use keplerian_element::{OrbitalElements, Position};
pub use params::AstervizParams;
pub use propagator::{position, KeplerPropagator};
pub use sampler::{pick_random, pick_sample};
pub use seed::derive_phase;
pub use service::Asterviz;
