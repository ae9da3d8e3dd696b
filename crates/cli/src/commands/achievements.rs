use crate::context::AppContext;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use domain::{total_points, AchievementKind};

#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct AchievementsCommand {
    #[command(subcommand)]
    command: Option<AchievementsSubcommand>,
    /// Whose achievements to show (default: yourself)
    user: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum AchievementsSubcommand {
    /// Record an achievement for a user (advisor only)
    #[command(name = "award")]
    Award { user: String, kind: String },
}

impl AchievementsCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        match self.command {
            Some(AchievementsSubcommand::Award { user, kind }) => {
                let session = ctx.session()?;
                let kind: AchievementKind = kind.parse()?;
                let title = kind.definition().title;
                if ctx.service.award_achievement(&session, &user, kind).await? {
                    println!("{} {} unlocked {}", "✓".green(), user.bold(), title.bold());
                } else {
                    println!("{} {} already has {}", "ℹ".blue(), user.bold(), title);
                }
            }
            None => {
                let user_id = ctx.target_user(self.user)?;
                let views = ctx.service.list_achievements(&user_id).await?;
                let unlocked = views.iter().filter(|v| v.is_unlocked()).count();

                println!(
                    "{} {} · {} points, {}/{} unlocked",
                    "Σ".yellow(),
                    user_id.bold(),
                    total_points(&views),
                    unlocked,
                    views.len()
                );
                for view in &views {
                    match view.earned_at {
                        Some(at) => println!(
                            "  {} {} ({} pts) {}",
                            "★".yellow(),
                            view.title.bold(),
                            view.points,
                            crate::util::format_time(&at).dimmed()
                        ),
                        None => println!(
                            "  {} {} ({} pts)",
                            "·".dimmed(),
                            view.title.dimmed(),
                            view.points
                        ),
                    }
                    println!("      {}", view.description.dimmed());
                }
            }
        }
        Ok(())
    }
}
