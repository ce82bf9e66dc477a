//! Employee shuttle route formation and repair pipeline.
//!
//! [`orchestrator::Orchestrator`] is the entry point: it drives zoning
//! (`zone_assigner`), heuristic group formation (`grouping`), single-vehicle
//! re-sequencing (`polish`), fleet assignment (`fleet`), guard-avoidance
//! swaps (`guard`), deviation/ETA validation (`validate`), and unrouted
//! recovery (`unrouted`) over the road-network and VRP-solver abstractions in
//! `services`.

pub mod api;
pub mod config;
pub mod error;
pub mod fleet;
pub mod geo;
pub mod grouping;
pub mod guard;
pub mod models;
pub mod orchestrator;
pub mod polish;
pub mod services;
pub mod time;
pub mod unrouted;
pub mod utils;
pub mod validate;
pub mod zone_assigner;

pub use error::PipelineError;
pub use orchestrator::Orchestrator;
