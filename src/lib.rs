//! catalog-genome: aggregates per-sample variant calls against a shared
//! reference genome and gene annotation into a consolidated allele/
//! proteoform catalog.
//!
//! The crate root just declares modules and re-exports the pieces a driver
//! needs; the interesting logic lives one level down, one module per
//! component described in the design document.

#[macro_use]
extern crate log;

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod filter;
pub mod reconstruct;
pub mod reference;
pub mod sample;
pub mod sequence;
pub mod stats;
pub mod structure;
pub mod variants;

pub use config::BuildConfig;
pub use engine::Engine;
pub use errors::{CatalogError, Result};
