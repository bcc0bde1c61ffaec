//! Scubex - viewport-driven marine species scanning
//!
//! The library turns a settled map viewport into a bounded species query:
//! a debounced [`scan::ViewportTracker`] publishes viewport snapshots, a
//! [`scan::ScanSession`] runs at most one fetch at a time through a
//! [`species::SpeciesProvider`], and [`server`] hosts the species service
//! that aggregates OBIS occurrences enriched with iNaturalist taxa.

pub mod config;
pub mod errors;
pub mod geo;
pub mod scan;
pub mod server;
pub mod species;
