//! Achievement - static milestone catalog and per-user earned records

use crate::entities::UserId;
use crate::errors::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    PaperPublished,
    ReviewCompleted,
    BlogPosted,
    FundingSecured,
    HackathonCompleted,
    FirstSubmission,
    CollaborationStarted,
    MentorAssigned,
    PaperRejected,
    WorkshopAccepted,
    ConferenceAccepted,
    BestPaper,
}

impl AchievementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementKind::PaperPublished => "paper_published",
            AchievementKind::ReviewCompleted => "review_completed",
            AchievementKind::BlogPosted => "blog_posted",
            AchievementKind::FundingSecured => "funding_secured",
            AchievementKind::HackathonCompleted => "hackathon_completed",
            AchievementKind::FirstSubmission => "first_submission",
            AchievementKind::CollaborationStarted => "collaboration_started",
            AchievementKind::MentorAssigned => "mentor_assigned",
            AchievementKind::PaperRejected => "paper_rejected",
            AchievementKind::WorkshopAccepted => "workshop_accepted",
            AchievementKind::ConferenceAccepted => "conference_accepted",
            AchievementKind::BestPaper => "best_paper",
        }
    }

    /// Catalog entry for this kind
    pub fn definition(&self) -> &'static AchievementDefinition {
        let index = match self {
            AchievementKind::PaperPublished => 0,
            AchievementKind::ReviewCompleted => 1,
            AchievementKind::BlogPosted => 2,
            AchievementKind::FundingSecured => 3,
            AchievementKind::HackathonCompleted => 4,
            AchievementKind::FirstSubmission => 5,
            AchievementKind::CollaborationStarted => 6,
            AchievementKind::MentorAssigned => 7,
            AchievementKind::PaperRejected => 8,
            AchievementKind::WorkshopAccepted => 9,
            AchievementKind::ConferenceAccepted => 10,
            AchievementKind::BestPaper => 11,
        };
        &ACHIEVEMENT_CATALOG[index]
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACHIEVEMENT_CATALOG
            .iter()
            .map(|d| d.kind)
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| DomainError::InvalidAchievement(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDefinition {
    pub kind: AchievementKind,
    pub title: &'static str,
    pub description: &'static str,
    pub points: u32,
}

/// Every achievement a user can unlock
pub const ACHIEVEMENT_CATALOG: &[AchievementDefinition] = &[
    AchievementDefinition {
        kind: AchievementKind::PaperPublished,
        title: "Published Author",
        description: "Get a research paper published.",
        points: 300,
    },
    AchievementDefinition {
        kind: AchievementKind::ReviewCompleted,
        title: "Critical Eye",
        description: "Complete a review of a peer's work.",
        points: 60,
    },
    AchievementDefinition {
        kind: AchievementKind::BlogPosted,
        title: "Science Communicator",
        description: "Publish a blog post about your research.",
        points: 80,
    },
    AchievementDefinition {
        kind: AchievementKind::FundingSecured,
        title: "Funded",
        description: "Secure funding for a research project.",
        points: 200,
    },
    AchievementDefinition {
        kind: AchievementKind::HackathonCompleted,
        title: "Hacker",
        description: "Present a project at a hackathon.",
        points: 120,
    },
    AchievementDefinition {
        kind: AchievementKind::FirstSubmission,
        title: "First Steps",
        description: "Submit your first paper.",
        points: 50,
    },
    AchievementDefinition {
        kind: AchievementKind::CollaborationStarted,
        title: "Team Player",
        description: "Start a collaboration with another researcher.",
        points: 40,
    },
    AchievementDefinition {
        kind: AchievementKind::MentorAssigned,
        title: "Guided",
        description: "Get an advisor assigned to your research.",
        points: 30,
    },
    AchievementDefinition {
        kind: AchievementKind::PaperRejected,
        title: "Resilient",
        description: "Receive a rejection and keep going.",
        points: 20,
    },
    AchievementDefinition {
        kind: AchievementKind::WorkshopAccepted,
        title: "Workshop Speaker",
        description: "Get a paper accepted at a workshop.",
        points: 150,
    },
    AchievementDefinition {
        kind: AchievementKind::ConferenceAccepted,
        title: "Conference Speaker",
        description: "Get a paper accepted at a conference.",
        points: 250,
    },
    AchievementDefinition {
        kind: AchievementKind::BestPaper,
        title: "Best Paper",
        description: "Win a best paper award.",
        points: 500,
    },
];

/// Existence of a record marks the achievement unlocked for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedAchievement {
    pub user_id: UserId,
    pub kind: AchievementKind,
    pub earned_at: DateTime<Utc>,
}

/// Catalog entry merged with the viewer's earned state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementView {
    pub kind: AchievementKind,
    pub title: &'static str,
    pub description: &'static str,
    pub points: u32,
    pub earned_at: Option<DateTime<Utc>>,
}

impl AchievementView {
    pub fn is_unlocked(&self) -> bool {
        self.earned_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_every_kind_once() {
        for def in ACHIEVEMENT_CATALOG {
            let count = ACHIEVEMENT_CATALOG
                .iter()
                .filter(|d| d.kind == def.kind)
                .count();
            assert_eq!(count, 1, "{}", def.kind);
            assert_eq!(def.kind.definition(), def);
        }
        assert_eq!(ACHIEVEMENT_CATALOG.len(), 12);
    }

    #[test]
    fn test_definition_matches_kind() {
        let best = AchievementKind::BestPaper.definition();
        assert_eq!(best.kind, AchievementKind::BestPaper);
        assert_eq!(best.title, "Best Paper");
        assert_eq!(best.points, 500);

        let guided = AchievementKind::MentorAssigned.definition();
        assert_eq!(guided.kind, AchievementKind::MentorAssigned);
        assert_eq!(guided.points, 30);
        assert_ne!(guided, &ACHIEVEMENT_CATALOG[0]);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(
            "best_paper".parse::<AchievementKind>().unwrap(),
            AchievementKind::BestPaper
        );
        assert!("speedrun".parse::<AchievementKind>().is_err());
    }
}
