use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::commands::{
    auth, AchievementsCommand, AdvanceCommand, CatalogCommand, LoginCommand, ProjectCommand,
    RoleCommand, TaskCommand, TasksCommand, UpdateCommand,
};
use cli::{report, util, AppContext};
use common::{init_structured_logging, ConfigLoader, LoggingConfig, OperationTimer};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "rtrack")]
#[command(about = "Research progress tracker: projects, stages, updates and achievements")]
#[command(version)]
struct Cli {
    /// Act as this user (overrides RTRACK_USER)
    #[arg(long = "user", id = "acting_user", global = true)]
    user: Option<String>,

    /// SQLite database file (overrides RTRACK_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON log lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record your profile; first sign-in grants the default role
    Login(LoginCommand),
    /// Show the signed-in user
    Whoami,
    /// Inspect and grant roles
    Role(RoleCommand),
    /// Create, list and review projects
    Project(ProjectCommand),
    /// Active-stage checklist of a project
    Tasks(TasksCommand),
    /// Tick or untick a checklist item
    Task(TaskCommand),
    /// Move a project to its next stage (advisor only)
    Advance(AdvanceCommand),
    /// Weekly updates feed
    Update(UpdateCommand),
    /// Achievement ledger
    Achievements(AchievementsCommand),
    /// Deliverable kinds, stages and their checklists
    Catalog(CatalogCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Login(_) => "login",
            Commands::Whoami => "whoami",
            Commands::Role(_) => "role",
            Commands::Project(_) => "project",
            Commands::Tasks(_) => "tasks",
            Commands::Task(_) => "task",
            Commands::Advance(_) => "advance",
            Commands::Update(_) => "update",
            Commands::Achievements(_) => "achievements",
            Commands::Catalog(_) => "catalog",
        }
    }

    async fn execute(self, ctx: &AppContext) -> Result<()> {
        match self {
            Commands::Login(cmd) => cmd.execute(ctx).await,
            Commands::Whoami => auth::whoami(ctx).await,
            Commands::Role(cmd) => cmd.execute(ctx).await,
            Commands::Project(cmd) => cmd.execute(ctx).await,
            Commands::Tasks(cmd) => cmd.execute(ctx).await,
            Commands::Task(cmd) => cmd.execute(ctx).await,
            Commands::Advance(cmd) => cmd.execute(ctx).await,
            Commands::Update(cmd) => cmd.execute(ctx).await,
            Commands::Achievements(cmd) => cmd.execute(ctx).await,
            Commands::Catalog(cmd) => cmd.execute(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    report::finish(run(cli).await)
}

async fn run(cli: Cli) -> Result<()> {
    let loader = ConfigLoader::with_home(util::tracker_home()?);
    let mut config = loader.load().await?;
    if let Some(user) = cli.user {
        config.auth.user = Some(user);
    }
    if let Some(db) = cli.db {
        config.database.path = Some(db);
    }
    if cli.json_logs {
        config.logging.json = true;
    }

    init_structured_logging(LoggingConfig::from_level_name(
        &config.logging.level,
        config.logging.json,
    ))?;

    debug!(home = %loader.home().display(), "configuration loaded");

    let ctx = AppContext::open(config, loader.home()).await?;
    let timer = OperationTimer::new(cli.command.name());
    let result = cli.command.execute(&ctx).await;
    timer.finish_with_result(&result);
    result
}
