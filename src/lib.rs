//! Representative positions of OSM buildings, extracted in bounded memory.
//!
//! Building ways are split into bins by id; each bin costs a few sequential passes over
//! the dataset, so only one bin's ways and node locations are held at a time.

pub mod cache;
pub mod config;
pub mod counters;
pub mod data;
pub mod errors;
pub mod geometry;
pub mod passes;
pub mod pipeline;
pub mod source;
