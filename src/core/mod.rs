//! Core module for review analysis
//!
//! This module contains the category dictionary, the keyword classifier, main
//! category selection and the aggregation of per-model and per-category
//! statistics.

pub mod aggregator;
pub mod categories;
pub mod classifier;
pub mod review;
pub mod selector;
