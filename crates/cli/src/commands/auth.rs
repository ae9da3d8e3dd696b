use crate::context::AppContext;
use anyhow::Result;
use clap::Args;
use colored::*;

#[derive(Debug, Args)]
pub struct LoginCommand {
    /// Display name shown on projects and updates
    #[arg(long)]
    name: Option<String>,
}

impl LoginCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let session = ctx.session()?;
        let user = ctx.service.sign_in(&session, self.name.as_deref()).await?;
        let role = ctx.service.resolve_role(&user.id).await;

        println!(
            "{} Signed in as {} ({})",
            "✓".green(),
            user.display_name.bold(),
            user.id
        );
        println!("  role: {}", role.as_str().cyan());
        Ok(())
    }
}

/// Profile and effective role of the signed-in user
pub async fn whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.session()?;
    let role = ctx.service.resolve_role(&session.user_id).await;

    match ctx.service.profile(&session.user_id).await? {
        Some(user) => {
            println!("{} {}", "☐".cyan(), user.display_name.bold());
            println!("  id: {}", user.id);
            println!("  since: {}", crate::util::format_time(&user.created_at));
        }
        None => {
            println!("{} {}", "☐".cyan(), session.user_id.bold());
            println!("  profile not recorded yet, run {}", "rtrack login".bold());
        }
    }
    println!("  role: {}", role.as_str().cyan());
    Ok(())
}
