use super::{DeliverableKind, Stage};
use crate::value_objects::Role;

/// Canonical checklist entry seeded into a stage on first view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTemplate {
    pub title: &'static str,
    pub description: &'static str,
    /// Lowest role allowed to tick the item
    pub required_role: Role,
}

impl TaskTemplate {
    const fn new(title: &'static str, description: &'static str) -> Self {
        Self {
            title,
            description,
            required_role: Role::Student,
        }
    }

    const fn requires(mut self, role: Role) -> Self {
        self.required_role = role;
        self
    }
}

const PAPER_OVERVIEW: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Review Literature",
        "Review existing literature in your field to understand current research and identify gaps.",
    ),
    TaskTemplate::new(
        "Define Research Question",
        "Clearly articulate your research question and objectives based on the literature review.",
    ),
    TaskTemplate::new(
        "Create Research Plan",
        "Develop a detailed plan outlining your research methodology, timeline, and required resources.",
    ),
];

const PAPER_RESEARCH: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Gather Data",
        "Collect and organize all necessary data following your research methodology.",
    ),
    TaskTemplate::new(
        "Analyze Results",
        "Process and analyze the collected data using appropriate methods and tools.",
    ),
    TaskTemplate::new(
        "Document Methodology",
        "Write a detailed description of your research methods and procedures.",
    ),
];

const PAPER_WRITING: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Draft Introduction",
        "Write the introduction section including background, objectives, and significance of your research.",
    ),
    TaskTemplate::new(
        "Write Methods",
        "Document your methodology in detail, including procedures, materials, and analysis methods.",
    ),
    TaskTemplate::new(
        "Present Results",
        "Present your research findings using clear explanations, tables, and figures.",
    ),
    TaskTemplate::new(
        "Draft Discussion",
        "Interpret your results and discuss their implications in the context of existing literature.",
    ),
];

const PAPER_REVIEW: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Internal Review",
        "Conduct a thorough review of your paper for content, clarity, and coherence.",
    )
    .requires(Role::Researcher),
    TaskTemplate::new(
        "Address Feedback",
        "Incorporate feedback from reviewers and make necessary revisions.",
    ),
    TaskTemplate::new(
        "Format Paper",
        "Ensure the paper follows all required formatting guidelines and citation styles.",
    ),
];

const PAPER_FINAL: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Final Proofreading",
        "Complete final proofreading for grammar, spelling, and formatting consistency.",
    ),
    TaskTemplate::new(
        "Submit Paper",
        "Submit the final version of your paper to the intended destination.",
    )
    .requires(Role::Advisor),
    TaskTemplate::new(
        "Archive Research Data",
        "Properly archive all research data and supporting materials.",
    ),
];

const OVERVIEW_SHARED: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Define Audience",
        "Identify who the deliverable is for and what they should take away from it.",
    ),
    TaskTemplate::new(
        "Outline Scope",
        "Agree on the scope, key messages and a rough timeline.",
    ),
];

const BLOG_DRAFTING: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Write First Draft",
        "Turn the outline into a complete first draft written for a general audience.",
    ),
    TaskTemplate::new(
        "Prepare Figures",
        "Create or adapt figures and diagrams that explain the research visually.",
    ),
];

const BLOG_EDITING: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Peer Edit",
        "Have a peer edit the draft for clarity, tone and technical accuracy.",
    )
    .requires(Role::Researcher),
    TaskTemplate::new(
        "Check References",
        "Verify links, citations and attributions.",
    ),
];

const BLOG_PUBLISH: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Publish Post",
        "Publish the post on the group blog or the chosen platform.",
    ),
    TaskTemplate::new(
        "Share Post",
        "Announce the post on the group's channels.",
    ),
];

const FUNDING_PROPOSAL: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Identify Funding Call",
        "Find a call whose eligibility and topic match the project.",
    ),
    TaskTemplate::new(
        "Draft Proposal",
        "Write the project summary, objectives, work plan and expected impact.",
    ),
];

const FUNDING_BUDGET: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Estimate Costs",
        "Estimate personnel, equipment and travel costs for the project duration.",
    ),
    TaskTemplate::new(
        "Approve Budget",
        "Review and sign off the budget before submission.",
    )
    .requires(Role::Advisor),
];

const FUNDING_SUBMISSION: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Collect Letters of Support",
        "Gather any letters of support or institutional endorsements required by the call.",
    ),
    TaskTemplate::new(
        "Submit Application",
        "Submit the complete application before the deadline.",
    )
    .requires(Role::Advisor),
];

const HACKATHON_BUILD: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Form Team",
        "Assemble a team and split responsibilities.",
    ),
    TaskTemplate::new(
        "Build Prototype",
        "Implement a working prototype of the core idea.",
    ),
    TaskTemplate::new(
        "Push Code",
        "Push the code to a public repository with a short README.",
    ),
];

const HACKATHON_DEMO: &[TaskTemplate] = &[
    TaskTemplate::new(
        "Prepare Pitch",
        "Prepare a short pitch explaining the problem, the solution and the research behind it.",
    ),
    TaskTemplate::new(
        "Present Demo",
        "Present the prototype to the judges.",
    ),
];

/// Checklist templates for `(kind, stage)`
///
/// A stage outside the kind's sequence yields an empty slice.
pub fn tasks_for(kind: DeliverableKind, stage: Stage) -> &'static [TaskTemplate] {
    use DeliverableKind::*;

    match (kind, stage) {
        (Paper, Stage::Overview) => PAPER_OVERVIEW,
        (Paper, Stage::Research) => PAPER_RESEARCH,
        (Paper, Stage::Writing) => PAPER_WRITING,
        (Paper, Stage::Review) => PAPER_REVIEW,
        (Paper, Stage::Final) => PAPER_FINAL,
        (BlogPost | FundingApplication | HackathonProject, Stage::Overview) => OVERVIEW_SHARED,
        (BlogPost, Stage::Drafting) => BLOG_DRAFTING,
        (BlogPost, Stage::Editing) => BLOG_EDITING,
        (BlogPost, Stage::Publish) => BLOG_PUBLISH,
        (FundingApplication, Stage::Proposal) => FUNDING_PROPOSAL,
        (FundingApplication, Stage::Budget) => FUNDING_BUDGET,
        (FundingApplication, Stage::Submission) => FUNDING_SUBMISSION,
        (HackathonProject, Stage::Build) => HACKATHON_BUILD,
        (HackathonProject, Stage::Demo) => HACKATHON_DEMO,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_stage_has_a_checklist() {
        for kind in DeliverableKind::ALL {
            for stage in kind.stages() {
                assert!(
                    !tasks_for(kind, *stage).is_empty(),
                    "{kind}/{stage} has no templates"
                );
            }
        }
    }

    #[test]
    fn test_stage_outside_sequence_is_empty() {
        assert!(tasks_for(DeliverableKind::Paper, Stage::Demo).is_empty());
        assert!(tasks_for(DeliverableKind::HackathonProject, Stage::Writing).is_empty());
    }

    #[test]
    fn test_paper_overview_templates() {
        let titles: Vec<_> = tasks_for(DeliverableKind::Paper, Stage::Overview)
            .iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(
            titles,
            [
                "Review Literature",
                "Define Research Question",
                "Create Research Plan"
            ]
        );
    }

    #[test]
    fn test_role_gated_items() {
        let submit = tasks_for(DeliverableKind::Paper, Stage::Final)
            .iter()
            .find(|t| t.title == "Submit Paper")
            .copied()
            .unwrap();
        assert_eq!(submit.required_role, Role::Advisor);
    }
}
