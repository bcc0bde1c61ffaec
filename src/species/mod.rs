pub mod client;
pub mod dates;
pub mod record;

pub use client::{SpeciesClient, SpeciesProvider};
pub use record::{SpeciesPayload, SpeciesRecord, SpeciesReport, DATA_SOURCES, ERROR_SOURCE};
