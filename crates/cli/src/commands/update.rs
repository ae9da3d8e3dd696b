use crate::context::AppContext;
use crate::util::{format_time, parse_id, stars};
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

#[derive(Debug, Args)]
pub struct UpdateCommand {
    #[command(subcommand)]
    command: UpdateSubcommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum UpdateSubcommand {
    /// Post a weekly progress update
    #[command(name = "post")]
    Post { text: String },
    /// Most recent updates first
    #[command(name = "list")]
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Rate an update from 1 to 5 stars
    #[command(name = "rate")]
    Rate {
        id: String,
        #[arg(allow_hyphen_values = true)]
        value: i64,
    },
}

impl UpdateCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        match self.command {
            UpdateSubcommand::Post { text } => {
                let session = ctx.session()?;
                match ctx.service.post_update(&session, &text).await? {
                    Some(update) => {
                        println!("{} Update posted", "✓".green());
                        println!("  id: {}", update.id);
                    }
                    None => println!("{} Nothing to post", "ℹ".blue()),
                }
            }
            UpdateSubcommand::List { limit } => {
                let viewer = ctx.current_session().map(|s| s.user_id);
                let updates = ctx.service.list_updates(limit).await?;
                println!(
                    "{} {}",
                    "✓".green(),
                    format!("Updates: {}", updates.len()).bold()
                );
                for update in updates {
                    let average = update
                        .average_rating()
                        .map(|avg| format!("{avg:.1} avg, {} rating(s)", update.ratings.len()))
                        .unwrap_or_else(|| "not rated".to_string());
                    println!(
                        "- {} {} {}",
                        update.author_id.bold(),
                        format_time(&update.created_at).dimmed(),
                        update.id.to_string().dimmed()
                    );
                    println!("  {}", update.content);
                    match &viewer {
                        Some(viewer) => println!(
                            "  {} ({})",
                            stars(update.star_states(viewer)).yellow(),
                            average
                        ),
                        None => println!("  ({})", average),
                    }
                }
            }
            UpdateSubcommand::Rate { id, value } => {
                let session = ctx.session()?;
                let id = parse_id(&id, "update")?;
                let ratings = ctx.service.rate_update(&session, &id, value).await?;
                println!(
                    "{} Rated {} ({} rating(s) total)",
                    "✓".green(),
                    "★".repeat(value as usize).yellow(),
                    ratings.len()
                );
            }
        }
        Ok(())
    }
}
