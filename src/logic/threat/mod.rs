//! Threat Module
//!
//! Risk level tracking. Detection events come in, the level follows them.
//!
//! ## Structure
//! - `types`: RiskLevel, DetectionEvent, Transition
//! - `machine`: ThreatStateMachine (consumes events, appends to the log)

pub mod types;
pub mod machine;

pub use types::{DetectionEvent, RiskLevel, Transition};
pub use machine::ThreatStateMachine;
