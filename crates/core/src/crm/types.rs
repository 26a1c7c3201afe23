//! Pipeline and activity enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of a deal in the sales pipeline.
///
/// Deals usually move Lead → Qualified → Proposal → Negotiation and close as
/// Won or Lost. Any stage may be set directly; the pipeline is not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
    /// Fresh inbound or outbound interest.
    #[default]
    Lead,
    /// Budget and need confirmed.
    Qualified,
    /// Proposal sent.
    Proposal,
    /// Terms under discussion.
    Negotiation,
    /// Closed, signed.
    Won,
    /// Closed, not signed.
    Lost,
}

impl DealStage {
    /// All stages in pipeline order.
    pub const ALL: [Self; 6] = [
        Self::Lead,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::Won,
        Self::Lost,
    ];

    /// Returns the string stored in `deals.stage`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// Parses a stage, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lead" => Some(Self::Lead),
            "qualified" => Some(Self::Qualified),
            "proposal" => Some(Self::Proposal),
            "negotiation" => Some(Self::Negotiation),
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a logged deal activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Phone or video call.
    Call,
    /// Email exchange.
    Email,
    /// In-person meeting.
    Meeting,
    /// Free-form note.
    Note,
    /// Follow-up task.
    Task,
}

impl ActivityKind {
    /// Returns the string stored in `activities.kind`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Email => "email",
            Self::Meeting => "meeting",
            Self::Note => "note",
            Self::Task => "task",
        }
    }

    /// Parses a kind, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "call" => Some(Self::Call),
            "email" => Some(Self::Email),
            "meeting" => Some(Self::Meeting),
            "note" => Some(Self::Note),
            "task" => Some(Self::Task),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_roundtrip() {
        for stage in DealStage::ALL {
            assert_eq!(DealStage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(DealStage::parse(" Won "), Some(DealStage::Won));
        assert_eq!(DealStage::parse("closed"), None);
    }

    #[test]
    fn test_stage_default_is_lead() {
        assert_eq!(DealStage::default(), DealStage::Lead);
    }

    #[test]
    fn test_stage_serde_lowercase() {
        let json = serde_json::to_string(&DealStage::Negotiation).unwrap();
        assert_eq!(json, "\"negotiation\"");
    }

    #[test]
    fn test_activity_kind_parse() {
        assert_eq!(ActivityKind::parse("MEETING"), Some(ActivityKind::Meeting));
        assert_eq!(ActivityKind::parse("lunch"), None);
        assert_eq!(ActivityKind::Task.to_string(), "task");
    }
}
