//! Terminal reporting of command failures

use colored::*;
use domain::DomainError;
use std::process::ExitCode;
use tracker::{FailureKind, TrackerError};

/// Print the outcome of a command and pick the process exit code
pub fn finish(result: anyhow::Result<()>) -> ExitCode {
    let Err(err) = result else {
        return ExitCode::SUCCESS;
    };

    if let Some(tracker_err) = err.downcast_ref::<TrackerError>() {
        return match tracker_err.kind() {
            FailureKind::AuthenticationAbsent => {
                sign_in_hint();
                ExitCode::SUCCESS
            }
            FailureKind::StoreFailure => error_toast(&err),
            FailureKind::DomainRule | FailureKind::NotFound => notice(tracker_err),
        };
    }

    if let Some(domain_err) = err.downcast_ref::<DomainError>() {
        return notice(domain_err);
    }

    error_toast(&err)
}

pub fn sign_in_hint() {
    println!(
        "{} Not signed in. Run {} or set {}.",
        "ℹ".blue(),
        "rtrack --user <ID> login".bold(),
        "RTRACK_USER".bold()
    );
}

fn notice(err: &dyn std::fmt::Display) -> ExitCode {
    eprintln!("{} {}", "⚠".yellow(), err.to_string().yellow());
    ExitCode::FAILURE
}

fn error_toast(err: &anyhow::Error) -> ExitCode {
    eprintln!("{} {:#}", "Error:".red().bold(), err);
    ExitCode::FAILURE
}
