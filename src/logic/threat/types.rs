//! Threat Types
//!
//! Core types for risk tracking.
//! No logic here - data structures only.

use serde::{Deserialize, Serialize};

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Coarse severity of the current system exposure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Nothing notable, no action needed
    #[default]
    Safe,
    /// Anomalous activity, keep watching
    Medium,
    /// Active threat, mitigation expected
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Label used by the dashboard (SAFE reads as LOW)
    pub fn display_label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }

    /// One-line status shown in the status bar
    pub fn status_text(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "System Status: Secure",
            RiskLevel::Medium => "Alert: Anomalous Activity Detected",
            RiskLevel::High => "Threat Detected: HIGH - Automated Response Active",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            RiskLevel::Safe => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "#28a745",   // Green
            RiskLevel::Medium => "#ffc107", // Yellow
            RiskLevel::High => "#dc3545",   // Red
        }
    }

    pub fn is_elevated(&self) -> bool {
        *self != RiskLevel::Safe
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "safe" | "low" => Ok(RiskLevel::Safe),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

// ============================================================================
// DETECTION EVENT
// ============================================================================

/// A discrete observation asserting a risk level.
///
/// Produced by a detection source, consumed exactly once by the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub description: String,
    /// Source/destination the observation is about
    pub origin: String,
    pub severity: RiskLevel,
}

impl DetectionEvent {
    pub fn new(description: impl Into<String>, origin: impl Into<String>, severity: RiskLevel) -> Self {
        Self {
            description: description.into(),
            origin: origin.into(),
            severity,
        }
    }
}

// ============================================================================
// TRANSITION
// ============================================================================

/// Level change produced by consuming one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: RiskLevel,
    pub to: RiskLevel,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(RiskLevel::Safe < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::High.severity_level(), 2);
    }

    #[test]
    fn test_default_is_safe() {
        assert_eq!(RiskLevel::default(), RiskLevel::Safe);
        assert_eq!(RiskLevel::default().severity_level(), 0);
    }

    #[test]
    fn test_parse_accepts_dashboard_label() {
        assert_eq!("LOW".parse::<RiskLevel>(), Ok(RiskLevel::Safe));
        assert_eq!(" High ".parse::<RiskLevel>(), Ok(RiskLevel::High));
        assert!("critical".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
