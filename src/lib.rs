//! Threat Response Core
//!
//! Tracks the current risk level, keeps a bounded event log, and rotates
//! the network identity when a high-risk event calls for it.

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;

pub use error::{EngineError, EngineResult};
pub use logic::config::EngineConfig;
pub use logic::engine::{Engine, EngineSnapshot, StepOutcome};
pub use logic::threat::{DetectionEvent, RiskLevel};
