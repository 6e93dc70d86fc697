//! # IronXSO Bench
//!
//! Benchmarking utilities for IronXSO performance testing.

pub mod fixtures;
pub mod throughput;
