use crate::context::AppContext;
use crate::util::parse_id;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

#[derive(Debug, Args)]
pub struct TasksCommand {
    /// Project id
    id: String,
}

impl TasksCommand {
    /// Seed the active stage on first view, then print its checklist
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let session = ctx.session()?;
        let id = parse_id(&self.id, "project")?;
        let checklist = ctx.service.stage_checklist(&session, &id).await?;

        println!(
            "{} {} · {} ({}/{})",
            "☐".cyan(),
            checklist.project.title.bold(),
            checklist.stage.title(),
            checklist.completed_count(),
            checklist.items.len()
        );
        for item in &checklist.items {
            let mark = if item.task.is_completed() {
                "[x]".green()
            } else {
                "[ ]".normal()
            };
            let lock = if item.locked {
                format!(" 🔒 {}", item.task.required_role).yellow()
            } else {
                "".normal()
            };
            println!(
                "  {} {}{}  {}",
                mark,
                item.task.title,
                lock,
                item.task.id.to_string().dimmed()
            );
            println!("      {}", item.task.description.dimmed());
        }

        if checklist.can_advance {
            println!("{} Stage complete, ready to advance", "✓".green());
        } else if checklist.all_completed {
            println!("{} Stage complete, waiting for an advisor", "ℹ".blue());
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    command: TaskSubcommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum TaskSubcommand {
    /// Mark a checklist item completed
    #[command(name = "done")]
    Done { id: String },
    /// Mark a checklist item pending again
    #[command(name = "undo")]
    Undo { id: String },
}

impl TaskCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let (id, completed) = match self.command {
            TaskSubcommand::Done { id } => (id, true),
            TaskSubcommand::Undo { id } => (id, false),
        };
        let session = ctx.session()?;
        let id = parse_id(&id, "task")?;
        let task = ctx.service.toggle_task(&session, &id, completed).await?;

        if completed {
            println!("{} {} completed", "✓".green(), task.title.bold());
        } else {
            println!("{} {} reopened", "☐".cyan(), task.title.bold());
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct AdvanceCommand {
    /// Project id
    id: String,
}

impl AdvanceCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let session = ctx.session()?;
        let id = parse_id(&self.id, "project")?;
        let project = ctx.service.advance_stage(&session, &id).await?;

        println!(
            "{} {} moved to {}",
            "✓".green(),
            project.title.bold(),
            project.stage.title().cyan()
        );
        if project.is_at_final_stage() {
            println!("  final stage reached");
        }
        Ok(())
    }
}
