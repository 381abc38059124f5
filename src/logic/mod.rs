//! Logic Module - Threat State & Response
//!
//! ## Layout
//! - `threat/` - Risk levels and the level state machine
//! - `detection/` - Detection sources and reputation lookups
//! - `identity/` - Network identity and rotation
//! - `response/` - Automated and manual mitigation
//! - `engine/` - Serialized owner of all mutable state

// Domain
pub mod threat;
pub mod detection;
pub mod identity;
pub mod response;
pub mod event_log;

// Engine & runtime
pub mod config;
pub mod state;
pub mod events;
pub mod engine;
pub mod analysis_loop;
pub mod audit;
