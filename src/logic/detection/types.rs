//! Detection Types
//!
//! Sensitivity presets and reputation verdicts.

use serde::{Deserialize, Serialize};

use crate::logic::threat::RiskLevel;

// ============================================================================
// SENSITIVITY
// ============================================================================

/// Detection sensitivity selected in settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// Fewer false positives
    Low,
    /// Recommended
    #[default]
    Medium,
    /// Maximum security
    High,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }

    pub fn profile(&self) -> DetectionProfile {
        match self {
            Sensitivity::Low => DetectionProfile::low_sensitivity(),
            Sensitivity::Medium => DetectionProfile::default(),
            Sensitivity::High => DetectionProfile::high_sensitivity(),
        }
    }
}

impl std::str::FromStr for Sensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            other => Err(format!("Unknown sensitivity: {}", other)),
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// DETECTION PROFILE
// ============================================================================

/// Per-tick event probabilities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionProfile {
    /// Chance of a MEDIUM event per tick
    pub medium_probability: f64,
    /// Chance of a HIGH event per tick
    pub high_probability: f64,
}

impl Default for DetectionProfile {
    fn default() -> Self {
        Self {
            medium_probability: 0.15,
            high_probability: 0.05,
        }
    }
}

impl DetectionProfile {
    /// High sensitivity - more alerts
    pub fn high_sensitivity() -> Self {
        Self {
            medium_probability: 0.22,
            high_probability: 0.08,
        }
    }

    /// Low sensitivity - fewer alerts
    pub fn low_sensitivity() -> Self {
        Self {
            medium_probability: 0.08,
            high_probability: 0.02,
        }
    }

    /// Map a uniform draw in [0, 1) to a severity (None = quiet tick)
    pub fn classify_draw(&self, draw: f64) -> Option<RiskLevel> {
        let high_cut = 1.0 - self.high_probability;
        // Summed first so the default cuts land exactly on 0.95 / 0.80
        let medium_cut = 1.0 - (self.high_probability + self.medium_probability);

        if draw > high_cut {
            Some(RiskLevel::High)
        } else if draw > medium_cut {
            Some(RiskLevel::Medium)
        } else {
            None
        }
    }
}

// ============================================================================
// REPUTATION VERDICT
// ============================================================================

/// Result of classifying a user supplied URL or address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationVerdict {
    pub target: String,
    pub level: RiskLevel,
    pub rationale: String,
    /// Estimated risk, 0-100
    pub risk_score: u8,
    /// Denylist keywords found in the target
    pub matched: Vec<String>,
}

impl ReputationVerdict {
    pub fn is_safe(&self) -> bool {
        self.level == RiskLevel::Safe
    }
}
