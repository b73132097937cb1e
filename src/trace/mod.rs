//! Decoded trace data types.
//!
//! # Module Organization
//!
//! - [`models`]: Zone (duration) and plot (sample) records decoded from export rows
//! - [`constants`]: Column names, process ids and default marker names

pub mod constants;
pub mod models;

pub use models::*;
