//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod automation;
mod reports;
mod tracking;

use crate::error::CommandError;
use crate::state::AppState;
use clap::{CommandFactory, Parser, Subcommand};
use jobtrail_core::AppConfig;

#[derive(Parser)]
#[command(name = "jobtrail")]
#[command(about = "Automated job search, Easy Apply and application tracking")]
#[command(version)]
pub struct Cli {
    /// Without a subcommand the help text is printed
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape jobs and save them, without applying
    Scrape,

    /// Run the full daily routine: scrape, save, apply, follow-ups, report
    Apply,

    /// List applications due for a follow-up
    Followups,

    /// Send reminders for interviews in the next two days
    Interviews,

    /// Generate today's report
    Report,

    /// Generate the weekly report and show seven-day statistics
    Weekly,

    /// Show statistics
    Stats {
        /// Window in days
        #[arg(default_value = "30")]
        days: u32,
    },

    /// List recent applications
    List {
        /// Maximum number of applications to show
        #[arg(default_value = "20")]
        limit: u32,
        /// Only applications with this status
        #[arg(short, long)]
        status: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the daily routine and checks at their scheduled times
    Scheduler,

    /// Record an application made outside the bot
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        location: String,
        /// Job URL (a placeholder is generated when omitted)
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        salary: Option<String>,
    },

    /// Update the status of a tracked application
    SetStatus {
        url: String,
        /// One of: Applied, Interview Scheduled, Rejected, Offer, Accepted, Declined
        status: String,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Put an interview on the calendar for a tracked application
    ScheduleInterview {
        url: String,
        /// Interview date (YYYY-MM-DD)
        date: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

impl Commands {
    /// Commands that drive the browser and log in.
    fn needs_credentials(&self) -> bool {
        matches!(self, Self::Scrape | Self::Apply | Self::Scheduler)
    }
}

/// Parse arguments, load configuration and run the chosen command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = AppConfig::load_with_env()?;
    if command.needs_credentials() && config.require_credentials().is_err() {
        return Err(CommandError::MissingCredentials.into());
    }

    let state = AppState::open(config).await?;

    match command {
        Commands::Scrape => automation::cmd_scrape(&state).await,
        Commands::Apply => automation::cmd_apply(&state).await,
        Commands::Scheduler => automation::cmd_scheduler(&state).await,
        Commands::Followups => tracking::cmd_followups(&state).await,
        Commands::Interviews => tracking::cmd_interviews(&state).await,
        Commands::Stats { days } => tracking::cmd_stats(&state, days).await,
        Commands::List {
            limit,
            status,
            json,
        } => tracking::cmd_list(&state, limit, status.as_deref(), json).await,
        Commands::Add {
            title,
            company,
            location,
            url,
            salary,
        } => {
            tracking::cmd_add(
                &state,
                &title,
                &company,
                &location,
                url.as_deref(),
                salary.as_deref(),
            )
            .await
        }
        Commands::SetStatus { url, status, notes } => {
            tracking::cmd_set_status(&state, &url, &status, notes.as_deref()).await
        }
        Commands::ScheduleInterview { url, date, notes } => {
            tracking::cmd_schedule_interview(&state, &url, &date, notes.as_deref()).await
        }
        Commands::Report => reports::cmd_report(&state).await,
        Commands::Weekly => reports::cmd_weekly(&state).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["jobtrail"]).expect("parse without subcommand");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_stats_and_list_defaults() {
        let cli = Cli::try_parse_from(["jobtrail", "stats"]).expect("parse stats");
        assert!(matches!(cli.command, Some(Commands::Stats { days: 30 })));

        let cli = Cli::try_parse_from(["jobtrail", "list"]).expect("parse list");
        assert!(matches!(
            cli.command,
            Some(Commands::List {
                limit: 20,
                status: None,
                json: false
            })
        ));

        let cli = Cli::try_parse_from(["jobtrail", "list", "5"]).expect("parse list 5");
        assert!(matches!(cli.command, Some(Commands::List { limit: 5, .. })));
    }

    #[test]
    fn test_browser_commands_need_credentials() {
        for (args, needs) in [
            (vec!["jobtrail", "scrape"], true),
            (vec!["jobtrail", "apply"], true),
            (vec!["jobtrail", "scheduler"], true),
            (vec!["jobtrail", "report"], false),
            (vec!["jobtrail", "stats", "7"], false),
        ] {
            let command = Cli::try_parse_from(args).expect("parse").command;
            assert_eq!(command.expect("subcommand").needs_credentials(), needs);
        }
    }

    #[test]
    fn test_set_status_arguments() {
        let cli = Cli::try_parse_from([
            "jobtrail",
            "set-status",
            "https://x/job/1",
            "Interview Scheduled",
            "--notes",
            "phone screen",
        ])
        .expect("parse set-status");
        match cli.command {
            Some(Commands::SetStatus { url, status, notes }) => {
                assert_eq!(url, "https://x/job/1");
                assert_eq!(status, "Interview Scheduled");
                assert_eq!(notes.as_deref(), Some("phone screen"));
            }
            _ => panic!("expected set-status"),
        }
    }
}
