use anyhow::Result;
use clap::Args;
use colored::*;
use domain::{tasks_for, DeliverableKind, Role};

#[derive(Debug, Args)]
pub struct CatalogCommand {
    /// Only this kind (paper, blog_post, funding_application, hackathon_project)
    kind: Option<String>,
}

impl CatalogCommand {
    pub fn execute(self) -> Result<()> {
        let kinds = match self.kind {
            Some(kind) => vec![DeliverableKind::parse_str(&kind)?],
            None => DeliverableKind::ALL.to_vec(),
        };

        for kind in kinds {
            println!("{} {} ({})", "■".cyan(), kind.label().bold(), kind);
            for (index, stage) in kind.stages().iter().enumerate() {
                println!("  {}. {}", index + 1, stage.title().bold());
                for template in tasks_for(kind, *stage) {
                    let gate = if template.required_role > Role::Student {
                        format!(" [{}]", template.required_role).yellow()
                    } else {
                        "".normal()
                    };
                    println!("     - {}{}", template.title, gate);
                }
            }
        }
        Ok(())
    }
}
