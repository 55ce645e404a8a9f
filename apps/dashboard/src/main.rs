use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{ExplanationPanels, IssueCard, ScheduleBoard};
use serde_json::Value;
use shared::domain::ScheduleId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Terminal front end for the scan-schedule service")]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the schedule collection and print the table once.
    List,
    /// Create a schedule, then print the resynchronized table.
    Create {
        #[arg(long)]
        url: String,
        #[arg(long)]
        interval_minutes: u32,
    },
    /// Delete a schedule by id, then print the resynchronized table.
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Ask the explanation service about one finding.
    Explain {
        #[arg(long)]
        issue: String,
        #[arg(long)]
        severity: String,
        /// Supporting reason; repeat the flag for several.
        #[arg(long)]
        reasons: Vec<String>,
    },
    /// Print the table and re-fetch on demand (Enter refreshes, q quits).
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings(args.server_url, args.api_key)?;
    info!(server_url = %settings.server_url, "dashboard starting");

    match args.command {
        Command::List => {
            let board = ScheduleBoard::new(&settings.server_url, &settings.api_key);
            board.load_schedules().await;
            print!("{}", render::schedule_table(&board.view().await));
        }
        Command::Create {
            url,
            interval_minutes,
        } => {
            let board = ScheduleBoard::new(&settings.server_url, &settings.api_key);
            board.create_schedule(&url, interval_minutes).await;
            print!("{}", render::schedule_table(&board.view().await));
        }
        Command::Delete { id } => {
            let board = ScheduleBoard::new(&settings.server_url, &settings.api_key);
            board.delete_schedule(&ScheduleId(id)).await;
            print!("{}", render::schedule_table(&board.view().await));
        }
        Command::Explain {
            issue,
            severity,
            reasons,
        } => {
            let panels = ExplanationPanels::new(&settings.server_url);
            let card = IssueCard {
                issue: Value::String(issue),
                severity: Value::String(severity),
                reasons: Value::Array(reasons.into_iter().map(Value::String).collect()),
            };
            panels.request_explanation(0, &card).await;
            println!("{}", panels.panel(0).await.text);
        }
        Command::Watch => {
            let board = ScheduleBoard::new(&settings.server_url, &settings.api_key);
            board.load_schedules().await;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                print!("{}", render::schedule_table(&board.view().await));
                println!("-- Enter refreshes, q quits --");
                match lines.next_line().await? {
                    Some(line) if line.trim() == "q" => break,
                    Some(_) => {
                        info!("refreshing schedule table");
                        board.load_schedules().await;
                    }
                    None => {
                        warn!("stdin closed, leaving watch mode");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
