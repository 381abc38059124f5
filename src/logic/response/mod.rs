//! Response Module - Automated Threat Response
//!
//! Identity rotation as the single mitigation, triggered by the policy on
//! HIGH events, by the user (panic rotate), or by the rotation schedule.
//!
//! # Components
//! - `types.rs`: MitigationTrigger, Mitigation
//! - `policy.rs`: ResponsePolicy (decision + shared rotation path)

pub mod types;
pub mod policy;

pub use types::{Mitigation, MitigationTrigger};
pub use policy::ResponsePolicy;
