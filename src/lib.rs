//! Per-contributor code review statistics
//!
//! Reads review data downloaded from Gerrit, runs a single filtered pass over
//! every change, patch set, approval and inline comment, and accumulates one
//! record per contributor.

pub mod app;
pub mod cli;
pub mod config;
pub mod dated;
pub mod error;
pub mod filter;
pub mod logging;
pub mod model;
pub mod output;
pub mod parser;
pub mod perperson;
pub mod processor;

pub use error::{Result, StatsError};
