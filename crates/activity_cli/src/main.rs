//! Terminal front end for the activity log.
//!
//! # Responsibility
//! - Map subcommands onto the activity page flows.
//! - Answer page dialogs from stdin through `TerminalCollector`.

mod terminal;

use activity_core::{
    format_date, init_logging, ActivityConfig, ActivityId, ActivityPage, PageOutcome,
    SqliteGateway,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use terminal::TerminalCollector;

#[derive(Parser, Debug)]
#[command(name = "activity", about = "Record and review physical activities", version)]
struct Args {
    /// SQLite file holding the activity list (overrides ACTIVITY_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Assume "yes" for confirmation dialogs
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print stored activities
    List,
    /// Record a new activity
    Add,
    /// Change an existing activity
    Edit { id: ActivityId },
    /// Delete an activity
    Remove { id: ActivityId },
    /// Print core linkage information
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ActivityConfig::from_env();

    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("logging disabled: {err}");
        }
    }

    let command = args.command.unwrap_or(Command::List);
    if let Command::Ping = command {
        println!("activity_core ping={}", activity_core::ping());
        println!("activity_core version={}", activity_core::core_version());
        return Ok(());
    }

    let db_path = args.db.unwrap_or(config.db_path);
    let gateway = Arc::new(SqliteGateway::new(&db_path));
    let mut page = ActivityPage::create(gateway, TerminalCollector::new(args.yes))
        .await
        .with_context(|| format!("cannot open activity storage at {}", db_path.display()))?;

    let outcome = match command {
        Command::List => None,
        Command::Add => Some(page.add_activity().await),
        Command::Edit { id } => Some(page.edit_activity(id).await),
        Command::Remove { id } => Some(page.delete_activity(id).await),
        Command::Ping => None,
    };

    if let Some(outcome) = outcome.as_ref() {
        report(outcome);
    }
    print_list(&page);

    page.store()
        .flush()
        .await
        .context("activity list was not saved")?;
    page.close().await?;

    if let Some(PageOutcome::Rejected(_)) = outcome {
        bail!("no changes were made");
    }
    Ok(())
}

fn report(outcome: &PageOutcome) {
    match outcome {
        PageOutcome::Added(id) => println!("added {id}"),
        PageOutcome::Updated(id) => println!("updated {id}"),
        PageOutcome::Removed(id) => println!("removed {id}"),
        PageOutcome::Cancelled => println!("cancelled"),
        PageOutcome::Rejected(notice) => eprintln!("{notice}"),
    }
}

fn print_list(page: &ActivityPage<SqliteGateway, TerminalCollector>) {
    let activities = page.activities();
    if activities.is_empty() {
        println!("No activities recorded.");
        return;
    }
    for activity in activities {
        println!(
            "{}  {}  {:<20} {} min",
            activity.id,
            format_date(activity.date),
            activity.kind,
            activity.duration_minutes
        );
    }
}
