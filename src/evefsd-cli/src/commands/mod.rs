//! Step handlers for the evefsd pipeline
//!
//! Each step has its own module with a `run` function that returns the
//! counters it collected.

pub mod blueprints;
pub mod cleanup;
pub mod fsdbinary;
pub mod index;
pub mod setup;
pub mod stellar;
pub mod types;
