//! Deliverable Catalog - static registry of kinds, stage sequences and checklists
//!
//! Every kind owns a fixed, ordered stage sequence. The set of kinds is closed,
//! so an unknown kind can only appear at a parsing boundary.

mod templates;

pub use templates::{tasks_for, TaskTemplate};

use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of research output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableKind {
    Paper,
    BlogPost,
    FundingApplication,
    HackathonProject,
}

/// Lifecycle phase of a deliverable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Overview,
    Research,
    Writing,
    Review,
    Final,
    Drafting,
    Editing,
    Publish,
    Proposal,
    Budget,
    Submission,
    Build,
    Demo,
}

const PAPER_STAGES: &[Stage] = &[
    Stage::Overview,
    Stage::Research,
    Stage::Writing,
    Stage::Review,
    Stage::Final,
];

const BLOG_POST_STAGES: &[Stage] = &[
    Stage::Overview,
    Stage::Drafting,
    Stage::Editing,
    Stage::Publish,
];

const FUNDING_APPLICATION_STAGES: &[Stage] = &[
    Stage::Overview,
    Stage::Proposal,
    Stage::Budget,
    Stage::Submission,
];

const HACKATHON_PROJECT_STAGES: &[Stage] = &[Stage::Overview, Stage::Build, Stage::Demo];

impl DeliverableKind {
    /// All kinds, in the order a research project family is created
    pub const ALL: [DeliverableKind; 4] = [
        DeliverableKind::Paper,
        DeliverableKind::BlogPost,
        DeliverableKind::FundingApplication,
        DeliverableKind::HackathonProject,
    ];

    /// Stored identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliverableKind::Paper => "paper",
            DeliverableKind::BlogPost => "blog_post",
            DeliverableKind::FundingApplication => "funding_application",
            DeliverableKind::HackathonProject => "hackathon_project",
        }
    }

    /// Human readable label, used as the title suffix of sibling projects
    pub fn label(&self) -> &'static str {
        match self {
            DeliverableKind::Paper => "Research Paper",
            DeliverableKind::BlogPost => "Blog Post",
            DeliverableKind::FundingApplication => "Funding Application",
            DeliverableKind::HackathonProject => "Hackathon Project",
        }
    }

    /// Ordered stage sequence
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            DeliverableKind::Paper => PAPER_STAGES,
            DeliverableKind::BlogPost => BLOG_POST_STAGES,
            DeliverableKind::FundingApplication => FUNDING_APPLICATION_STAGES,
            DeliverableKind::HackathonProject => HACKATHON_PROJECT_STAGES,
        }
    }

    pub fn first_stage(&self) -> Stage {
        self.stages()[0]
    }

    pub fn final_stage(&self) -> Stage {
        self.stages()[self.stages().len() - 1]
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.stages().contains(&stage)
    }

    /// Position of `stage` in the sequence
    pub fn stage_index(&self, stage: Stage) -> DomainResult<usize> {
        self.stages()
            .iter()
            .position(|s| *s == stage)
            .ok_or(DomainError::StageNotInSequence { kind: *self, stage })
    }

    pub fn parse_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "paper" => Ok(DeliverableKind::Paper),
            "blog_post" => Ok(DeliverableKind::BlogPost),
            "funding_application" => Ok(DeliverableKind::FundingApplication),
            "hackathon_project" => Ok(DeliverableKind::HackathonProject),
            _ => Err(DomainError::InvalidKind(s.to_string())),
        }
    }
}

impl fmt::Display for DeliverableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliverableKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeliverableKind::parse_str(s)
    }
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Overview => "overview",
            Stage::Research => "research",
            Stage::Writing => "writing",
            Stage::Review => "review",
            Stage::Final => "final",
            Stage::Drafting => "drafting",
            Stage::Editing => "editing",
            Stage::Publish => "publish",
            Stage::Proposal => "proposal",
            Stage::Budget => "budget",
            Stage::Submission => "submission",
            Stage::Build => "build",
            Stage::Demo => "demo",
        }
    }

    /// Capitalized name for headings ("Overview Stage")
    pub fn title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn parse_str(s: &str) -> DomainResult<Self> {
        let stage = match s.trim().to_lowercase().as_str() {
            "overview" => Stage::Overview,
            "research" => Stage::Research,
            "writing" => Stage::Writing,
            "review" => Stage::Review,
            "final" => Stage::Final,
            "drafting" => Stage::Drafting,
            "editing" => Stage::Editing,
            "publish" => Stage::Publish,
            "proposal" => Stage::Proposal,
            "budget" => Stage::Budget,
            "submission" => Stage::Submission,
            "build" => Stage::Build,
            "demo" => Stage::Demo,
            _ => return Err(DomainError::InvalidStage(s.to_string())),
        };
        Ok(stage)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::parse_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_sequence() {
        let names: Vec<&str> = DeliverableKind::Paper
            .stages()
            .iter()
            .map(Stage::as_str)
            .collect();
        assert_eq!(names, ["overview", "research", "writing", "review", "final"]);
        assert_eq!(DeliverableKind::Paper.first_stage(), Stage::Overview);
        assert_eq!(DeliverableKind::Paper.final_stage(), Stage::Final);
    }

    #[test]
    fn test_every_kind_starts_at_overview() {
        for kind in DeliverableKind::ALL {
            assert_eq!(kind.first_stage(), Stage::Overview, "{kind}");
            assert!(kind.stages().len() >= 2);
        }
    }

    #[test]
    fn test_stage_index() {
        let kind = DeliverableKind::BlogPost;
        assert_eq!(kind.stage_index(Stage::Editing).unwrap(), 2);
        assert_eq!(
            kind.stage_index(Stage::Research),
            Err(DomainError::StageNotInSequence {
                kind,
                stage: Stage::Research
            })
        );
    }

    #[test]
    fn test_round_trip_names() {
        for kind in DeliverableKind::ALL {
            assert_eq!(kind.as_str().parse::<DeliverableKind>().unwrap(), kind);
            for stage in kind.stages() {
                assert_eq!(stage.as_str().parse::<Stage>().unwrap(), *stage);
            }
        }
        assert!("poster".parse::<DeliverableKind>().is_err());
    }

    #[test]
    fn test_stage_title() {
        assert_eq!(Stage::Overview.title(), "Overview");
        assert_eq!(Stage::Demo.title(), "Demo");
    }
}
