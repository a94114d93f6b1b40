//! Merge logic for the dependency report.
//!
//! This module provides the aggregator that folds the input reports into
//! one collection of records.

pub mod aggregator;

pub use aggregator::{PassStats, ReportAggregator};
