use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Law id reported when no law matched.
pub const DEFAULT_LAW_ID: &str = "DEFAULT";

/// Reason reported when no law matched.
pub const DEFAULT_REASON: &str = "no applicable law";

/// Terminal outcome of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Allow,
    Deny,
    Quarantine,
    Simulate,
    Review,
}

impl Decision {
    pub const ALL: [Decision; 5] = [
        Decision::Allow,
        Decision::Deny,
        Decision::Quarantine,
        Decision::Simulate,
        Decision::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Deny => "DENY",
            Decision::Quarantine => "QUARANTINE",
            Decision::Simulate => "SIMULATE",
            Decision::Review => "REVIEW",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Decision::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

/// Output of the law engine for one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: Decision,
    /// Id of the law that fired, or `DEFAULT`
    pub matched_law_id: String,
    /// Name of the law that fired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub law_name: Option<String>,
    /// Human-readable justification (the law description)
    pub reason: String,
    pub risk: f64,
}

impl Verdict {
    /// The verdict returned when no law applies.
    pub fn default_allow(risk: f64) -> Self {
        Self {
            decision: Decision::Allow,
            matched_law_id: DEFAULT_LAW_ID.to_string(),
            law_name: None,
            reason: DEFAULT_REASON.to_string(),
            risk,
        }
    }

    pub fn is_default(&self) -> bool {
        self.matched_law_id == DEFAULT_LAW_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parsing_is_case_insensitive() {
        assert_eq!("deny".parse::<Decision>(), Ok(Decision::Deny));
        assert_eq!(" Quarantine ".parse::<Decision>(), Ok(Decision::Quarantine));
        assert!("BLOCK".parse::<Decision>().is_err());
    }

    #[test]
    fn test_decision_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Decision::Simulate).unwrap(), "\"SIMULATE\"");
    }

    #[test]
    fn test_default_verdict() {
        let verdict = Verdict::default_allow(0.25);
        assert_eq!(verdict.decision, Decision::Allow);
        assert_eq!(verdict.matched_law_id, "DEFAULT");
        assert_eq!(verdict.reason, "no applicable law");
        assert_eq!(verdict.risk, 0.25);
        assert!(verdict.is_default());
    }
}
