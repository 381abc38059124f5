//! Detection Module
//!
//! Where detection events come from. The engine only depends on the
//! `DetectionSource` trait, so the randomized detector can be swapped for
//! real traffic analysis without touching the state machine.
//!
//! # Components
//! - `types.rs`: Sensitivity, DetectionProfile, ReputationVerdict
//! - `random.rs`: Seedable randomized detector
//! - `reputation.rs`: Keyword denylist reputation check

pub mod types;
pub mod random;
pub mod reputation;

pub use types::{DetectionProfile, ReputationVerdict, Sensitivity};
pub use random::RandomDetector;
pub use reputation::ReputationChecker;

use crate::logic::threat::DetectionEvent;

/// Pluggable source of detection events
pub trait DetectionSource: Send {
    fn name(&self) -> &str;

    /// Called once per monitoring interval; `None` means nothing observed
    fn tick(&mut self) -> Option<DetectionEvent>;

    /// Classify a user supplied URL or address
    fn check_reputation(&self, target: &str) -> ReputationVerdict;

    fn sensitivity(&self) -> Sensitivity {
        Sensitivity::default()
    }

    /// Sources without tunable rates ignore this
    fn set_sensitivity(&mut self, _sensitivity: Sensitivity) {}
}
