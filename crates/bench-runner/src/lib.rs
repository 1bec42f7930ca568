//! Benchmark driver around the deliberation engine.
//!
//! - `datasets`: one thin driver per benchmark, owning prompt construction
//!   and answer post-processing.
//! - `runner`: batch execution with idempotent resumption, a bounded worker
//!   pool, and deterministic persistence order.
//! - `store`: newline-delimited JSON result store with merge-by-identifier
//!   appends and a repair pass for damaged files.

pub mod datasets;
pub mod runner;
pub mod store;
