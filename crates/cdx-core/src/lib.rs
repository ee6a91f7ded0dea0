//! cdx-bridge core library
//!
//! This library provides the estimators and their surfaces:
//! - PPV and bridging estimators with delta-method variances
//! - Percentage normalization for free-text queries
//! - Function-tool definitions and dispatch for agent front-ends
//! - Batch scenario evaluation
//! - Output rendering, structured logging and exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod batch;
pub mod estimate;
pub mod exit_codes;
pub mod logging;
pub mod normalize;
pub mod output;
pub mod tools;
