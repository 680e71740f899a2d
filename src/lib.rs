//! Cross-model conformance harness.
//!
//! Dispatches standardized prompts, paired with coding-standard instruction
//! content, to multiple generative backends, scores the returned code against
//! expected/forbidden structural patterns, and aggregates persisted results
//! into a consistency analysis feeding an automated pass/fail gate.
//!
//! Pipeline: registry -> runner (rules + provider + scorer) -> store, then
//! offline: store -> analysis -> report -> gate.

pub mod analysis;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod provider;
pub mod registry;
pub mod report;
pub mod rules;
pub mod runner;
pub mod scorer;
pub mod store;
pub mod types;

pub use error::HarnessError;
