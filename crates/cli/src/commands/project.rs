use crate::context::AppContext;
use crate::report;
use crate::util::{format_time, parse_id};
use anyhow::Result;
use clap::{ArgGroup, Args, Subcommand};
use colored::*;
use domain::{Project, ProjectStatus};

#[derive(Debug, Args)]
pub struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProjectSubcommand {
    /// Create a research project: one deliverable of every kind
    #[command(name = "create")]
    Create { title: String, description: String },
    /// Your projects, grouped by research project
    #[command(name = "list")]
    List,
    /// Project details, stage ladder and progress
    #[command(name = "show")]
    Show { id: String },
    /// Ask an advisor to review the active stage
    #[command(name = "request-review")]
    RequestReview { id: String },
    /// Approve or send back a project awaiting review (advisor only)
    #[command(name = "review")]
    #[command(group(ArgGroup::new("decision").required(true).args(["approve", "reject"])))]
    Review {
        id: String,
        #[arg(long)]
        approve: bool,
        #[arg(long)]
        reject: bool,
    },
}

impl ProjectCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        match self.command {
            ProjectSubcommand::Create { title, description } => {
                let session = ctx.session()?;
                let projects = ctx
                    .service
                    .create_project(&session, &title, &description)
                    .await?;
                println!(
                    "{} {}",
                    "✓".green(),
                    format!("Created {} projects", projects.len()).bold()
                );
                for project in &projects {
                    print_row(project);
                }
            }
            ProjectSubcommand::List => {
                let session = ctx.current_session();
                let groups = ctx.service.list_projects(session.as_ref()).await?;
                if session.is_none() {
                    report::sign_in_hint();
                    return Ok(());
                }
                if groups.is_empty() {
                    println!("{} No projects yet", "ℹ".blue());
                }
                for group in groups {
                    println!("{} {}", "■".cyan(), group.title.bold());
                    if !group.description.is_empty() {
                        println!("  {}", group.description.dimmed());
                    }
                    for project in &group.projects {
                        print_row(project);
                    }
                }
            }
            ProjectSubcommand::Show { id } => {
                let id = parse_id(&id, "project")?;
                let project = ctx.service.get_project(&id).await?;
                let progress = ctx.service.project_progress(&id).await?;

                println!("{} {}", "☐".cyan(), project.title.bold());
                println!("  id: {}", project.id);
                println!("  kind: {}", project.kind.label());
                println!("  owner: {}", project.owner_id);
                println!("  status: {}", status_label(project.status));
                println!("  created: {}", format_time(&project.created_at));
                println!("  updated: {}", format_time(&project.updated_at));
                if !project.description.is_empty() {
                    println!("  {}", project.description);
                }

                let ladder: Vec<String> = project
                    .kind
                    .stages()
                    .iter()
                    .map(|stage| {
                        if *stage == project.stage {
                            format!("[{}]", stage.title()).bold().to_string()
                        } else {
                            stage.title()
                        }
                    })
                    .collect();
                println!("  stages: {}", ladder.join(" → "));
                println!(
                    "  progress: {}/{} tasks ({:.0}%)",
                    progress.completed, progress.total, progress.percent
                );
            }
            ProjectSubcommand::RequestReview { id } => {
                let session = ctx.session()?;
                let id = parse_id(&id, "project")?;
                let project = ctx.service.request_review(&session, &id).await?;
                println!(
                    "{} {} is {}",
                    "✓".green(),
                    project.title.bold(),
                    status_label(project.status)
                );
            }
            ProjectSubcommand::Review {
                id,
                approve,
                reject,
            } => {
                let session = ctx.session()?;
                let approve = approve && !reject;
                let id = parse_id(&id, "project")?;
                let project = ctx.service.review_project(&session, &id, approve).await?;
                println!(
                    "{} {} is {}",
                    "✓".green(),
                    project.title.bold(),
                    status_label(project.status)
                );
            }
        }
        Ok(())
    }
}

fn print_row(project: &Project) {
    println!(
        "  {}  {} [{} · {}]",
        project.id.to_string().dimmed(),
        project.title,
        project.stage,
        status_label(project.status)
    );
}

fn status_label(status: ProjectStatus) -> ColoredString {
    match status {
        ProjectStatus::Draft => status.as_str().normal(),
        ProjectStatus::PendingReview => status.as_str().yellow(),
        ProjectStatus::Approved => status.as_str().green(),
        ProjectStatus::ChangesRequested => status.as_str().red(),
    }
}
