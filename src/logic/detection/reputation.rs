//! Reputation Check
//!
//! Classifies a URL or address against a keyword denylist.
//! Any keyword occurring anywhere in the target (case-insensitive) makes it unsafe.

use regex::RegexSet;

use super::types::ReputationVerdict;
use crate::logic::threat::RiskLevel;

const UNSAFE_RISK_SCORE: u8 = 90;
const TRUSTED_RISK_SCORE: u8 = 5;

pub struct ReputationChecker {
    keywords: Vec<String>,
    patterns: RegexSet,
}

impl ReputationChecker {
    pub fn new<I, S>(keywords: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let patterns = RegexSet::new(
            keywords.iter().map(|k| format!("(?i){}", regex::escape(k))),
        )?;

        Ok(Self { keywords, patterns })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Classify `target` (expected already trimmed and non-empty)
    pub fn check(&self, target: &str) -> ReputationVerdict {
        let matched: Vec<String> = self
            .patterns
            .matches(target)
            .into_iter()
            .map(|i| self.keywords[i].clone())
            .collect();

        if matched.is_empty() {
            ReputationVerdict {
                target: target.to_string(),
                level: RiskLevel::Safe,
                rationale: format!(
                    "SAFE: Destination is trusted. Risk Score: Low ({}%).",
                    TRUSTED_RISK_SCORE
                ),
                risk_score: TRUSTED_RISK_SCORE,
                matched,
            }
        } else {
            ReputationVerdict {
                target: target.to_string(),
                level: RiskLevel::High,
                rationale: format!(
                    "UNSAFE: Destination classified as High Risk ({}%), matched {}. Connection blocked.",
                    UNSAFE_RISK_SCORE,
                    matched.join(", ")
                ),
                risk_score: UNSAFE_RISK_SCORE,
                matched,
            }
        }
    }
}

impl std::fmt::Debug for ReputationChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReputationChecker")
            .field("keywords", &self.keywords)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_DENYLIST;

    fn checker() -> ReputationChecker {
        ReputationChecker::new(DEFAULT_DENYLIST.iter().copied()).unwrap()
    }

    #[test]
    fn test_trusted_target() {
        let verdict = checker().check("safe-site.com");
        assert_eq!(verdict.level, RiskLevel::Safe);
        assert_eq!(verdict.risk_score, 5);
        assert!(verdict.rationale.contains("trusted"));
        assert!(verdict.matched.is_empty());
    }

    #[test]
    fn test_denylisted_target() {
        let verdict = checker().check("tracker-malware.net");
        assert_eq!(verdict.level, RiskLevel::High);
        assert_eq!(verdict.risk_score, 90);
        assert!(verdict.rationale.contains("UNSAFE"));
        assert_eq!(verdict.matched, vec!["malware".to_string(), "tracker".to_string()]);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(checker().check("https://PhIsHiNg.example/login").level, RiskLevel::High);
    }

    #[test]
    fn test_keywords_are_literal() {
        let checker = ReputationChecker::new(["bad.site"]).unwrap();
        assert_eq!(checker.check("badXsite.org").level, RiskLevel::Safe);
        assert_eq!(checker.check("www.bad.site").level, RiskLevel::High);
    }

    #[test]
    fn test_empty_keywords_are_dropped() {
        let checker = ReputationChecker::new(["", "  ", "evil"]).unwrap();
        assert_eq!(checker.keywords(), &["evil".to_string()]);
        assert_eq!(checker.check("example.org").level, RiskLevel::Safe);
    }
}
