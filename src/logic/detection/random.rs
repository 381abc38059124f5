//! Randomized Detector
//!
//! Stand-in for real traffic analysis: each tick draws a uniform number and
//! maps it to a quiet tick, a MEDIUM event or a HIGH event.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::reputation::ReputationChecker;
use super::types::{DetectionProfile, ReputationVerdict, Sensitivity};
use super::DetectionSource;
use crate::logic::threat::{DetectionEvent, RiskLevel};

const HIGH_EVENT_DESCRIPTION: &str = "Critical port scan attempt";
const HIGH_EVENT_ORIGIN: &str = "210.5.4.1";
const MEDIUM_EVENT_DESCRIPTION: &str = "Suspicious data outflow detected";
const MEDIUM_EVENT_ORIGIN: &str = "Tracking.io";

pub struct RandomDetector {
    rng: StdRng,
    sensitivity: Sensitivity,
    profile: DetectionProfile,
    reputation: ReputationChecker,
}

impl RandomDetector {
    pub fn new(sensitivity: Sensitivity, reputation: ReputationChecker) -> Self {
        Self::with_rng(StdRng::from_entropy(), sensitivity, reputation)
    }

    /// Reproducible event stream
    pub fn with_seed(seed: u64, sensitivity: Sensitivity, reputation: ReputationChecker) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), sensitivity, reputation)
    }

    fn with_rng(rng: StdRng, sensitivity: Sensitivity, reputation: ReputationChecker) -> Self {
        Self {
            rng,
            sensitivity,
            profile: sensitivity.profile(),
            reputation,
        }
    }

    pub fn profile(&self) -> DetectionProfile {
        self.profile
    }
}

impl DetectionSource for RandomDetector {
    fn name(&self) -> &str {
        "random"
    }

    fn tick(&mut self) -> Option<DetectionEvent> {
        let draw: f64 = self.rng.gen();
        match self.profile.classify_draw(draw)? {
            RiskLevel::High => Some(DetectionEvent::new(
                HIGH_EVENT_DESCRIPTION,
                HIGH_EVENT_ORIGIN,
                RiskLevel::High,
            )),
            RiskLevel::Medium => Some(DetectionEvent::new(
                MEDIUM_EVENT_DESCRIPTION,
                MEDIUM_EVENT_ORIGIN,
                RiskLevel::Medium,
            )),
            RiskLevel::Safe => None,
        }
    }

    fn check_reputation(&self, target: &str) -> ReputationVerdict {
        self.reputation.check(target)
    }

    fn sensitivity(&self) -> Sensitivity {
        self.sensitivity
    }

    fn set_sensitivity(&mut self, sensitivity: Sensitivity) {
        self.sensitivity = sensitivity;
        self.profile = sensitivity.profile();
    }
}
