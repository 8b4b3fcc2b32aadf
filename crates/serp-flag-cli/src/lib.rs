//! Command-line driver for the serp-flag annotator.

pub mod cli;
