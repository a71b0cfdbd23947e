//! studypal-core: study-plan generation, quiz sampling, and schedule export.
//!
//! Everything here is stateless and synchronous. The only process-wide state
//! is the immutable [`catalog::Catalog`], loaded once from an embedded TOML
//! library. HTTP wiring lives in the `studypal-cli` crate.

pub mod catalog;
pub mod export;
pub mod plan;
