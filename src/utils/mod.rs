//! Utility modules for review analyzer
//!
//! This module contains input loading and output formatting helpers.

pub mod output_formatter;
pub mod review_loader;
