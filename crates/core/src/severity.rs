use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::types::Severity;

/// Tunable severity policy. Loaded from the `[severity]` table of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPolicy {
    pub high_score: f64,
    pub medium_score: f64,
    pub high_keywords: Vec<String>,
    pub medium_keywords: Vec<String>,
    pub high_entropy_bits: f64,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            high_score: 85.0,
            medium_score: 70.0,
            high_keywords: [
                "trojan",
                "ransom",
                "keylogger",
                "backdoor",
                "rootkit",
                "exploit",
                "spyware",
                "stealer",
                "worm",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            medium_keywords: [
                "executable",
                "script",
                "packed",
                "packer",
                "obfuscat",
                "entropy",
                "encrypted",
                "macro",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            high_entropy_bits: 7.5,
        }
    }
}

/// Everything the scanner told us about one finding that bears on its severity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeveritySignals {
    /// Lowercased risk label as supplied by the scanner.
    pub label: Option<String>,
    pub score: Option<f64>,
    pub rule: Option<String>,
    pub entropy_high: bool,
}

#[derive(Debug, Clone)]
pub struct SeverityRules {
    policy: SeverityPolicy,
    high: Option<Regex>,
    medium: Option<Regex>,
}

static DEFAULT_RULES: Lazy<SeverityRules> =
    Lazy::new(|| SeverityRules::compile(SeverityPolicy::default()));

impl Default for SeverityRules {
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

fn keyword_regex(keywords: &[String]) -> Option<Regex> {
    let alternation = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    if alternation.is_empty() {
        return None;
    }
    RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()
        .ok()
}

impl SeverityRules {
    pub fn compile(policy: SeverityPolicy) -> Self {
        let high = keyword_regex(&policy.high_keywords);
        let medium = keyword_regex(&policy.medium_keywords);
        Self {
            policy,
            high,
            medium,
        }
    }

    pub fn entropy_is_high(&self, bits: f64) -> bool {
        bits.is_finite() && bits >= self.policy.high_entropy_bits
    }

    /// Explicit label, then score thresholds, then rule keywords (high before
    /// medium), then a high entropy classification, then low.
    pub fn classify(&self, signals: &SeveritySignals) -> Severity {
        match signals.label.as_deref() {
            Some("high") => return Severity::High,
            Some("medium") => return Severity::Medium,
            Some("low") => return Severity::Low,
            _ => {}
        }

        if let Some(score) = signals.score {
            if score >= self.policy.high_score {
                return Severity::High;
            }
            if score >= self.policy.medium_score {
                return Severity::Medium;
            }
        }

        if let Some(rule) = signals.rule.as_deref() {
            if self.high.as_ref().is_some_and(|re| re.is_match(rule)) {
                return Severity::High;
            }
            if self.medium.as_ref().is_some_and(|re| re.is_match(rule)) {
                return Severity::Medium;
            }
        }

        if signals.entropy_high {
            return Severity::Medium;
        }

        Severity::Low
    }
}
