use crate::context::AppContext;
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use domain::Role;

#[derive(Debug, Args)]
pub struct RoleCommand {
    #[command(subcommand)]
    command: RoleSubcommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum RoleSubcommand {
    /// Effective role and grants of a user (default: yourself)
    #[command(name = "show")]
    Show { user: Option<String> },
    /// Grant a role to a user (advisor only)
    #[command(name = "grant")]
    Grant { user: String, role: String },
}

impl RoleCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        match self.command {
            RoleSubcommand::Show { user } => {
                let user_id = ctx.target_user(user)?;
                let role = ctx.service.resolve_role(&user_id).await;
                let grants = ctx.service.role_grants(&user_id).await?;

                println!("{} {} is {}", "ℹ".blue(), user_id.bold(), role.as_str().cyan());
                if grants.is_empty() {
                    println!("  no grants");
                }
                for grant in grants {
                    println!(
                        "  - {} (since {})",
                        grant.role,
                        crate::util::format_time(&grant.granted_at)
                    );
                }
            }
            RoleSubcommand::Grant { user, role } => {
                let session = ctx.session()?;
                let role = Role::parse_str(&role)?;
                if ctx.service.grant_role(&session, &user, role).await? {
                    println!("{} Granted {} to {}", "✓".green(), role.as_str().cyan(), user.bold());
                } else {
                    println!("{} {} already holds {}", "ℹ".blue(), user.bold(), role);
                }
            }
        }
        Ok(())
    }
}
