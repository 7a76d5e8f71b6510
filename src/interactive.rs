//! Interactive search prompt.
//!
//! Reads one driver name per line from stdin. Each new name starts a new
//! search; a search still in flight is aborted and its result, should it
//! arrive anyway, is discarded by generation.

use crate::api::{BiographyApi, StatsApi};
use crate::models::{RaceView, SearchStatus};
use crate::report::generate_text_report;
use crate::search::{Aggregator, SearchSession, SearchState, SearchTicket};
use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const HELP: &str = "Type a driver name to search. Commands: :podiums, :all, :toggle, :help, :quit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    ShowAll,
    ShowPodiums,
    Toggle,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line.is_empty() {
            return Command::Empty;
        }

        let Some(command) = line.strip_prefix(':') else {
            return Command::Search(line.to_string());
        };

        match command.trim().to_lowercase().as_str() {
            "all" | "a" => Command::ShowAll,
            "podiums" | "podium" | "p" => Command::ShowPodiums,
            "toggle" | "t" => Command::Toggle,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Run the prompt until `:quit` or end of input.
pub async fn run<S, B>(aggregator: Arc<Aggregator<S, B>>) -> Result<()>
where
    S: StatsApi + 'static,
    B: BiographyApi + 'static,
{
    let session = Arc::new(SearchSession::new());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Option<JoinHandle<()>> = None;

    println!("{}", HELP);
    prompt();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Empty => {}
            Command::Help => println!("{}", HELP),
            Command::Unknown(cmd) => println!("Unknown command :{}. {}", cmd, HELP),
            Command::ShowAll => print_state(&session.set_view(RaceView::All)),
            Command::ShowPodiums => print_state(&session.set_view(RaceView::Podiums)),
            Command::Toggle => print_state(&session.toggle_view()),
            Command::Search(query) => {
                let Some(ticket) = session.begin(&query) else {
                    continue;
                };

                if let Some(previous) = in_flight.take() {
                    if !previous.is_finished() {
                        debug!("Aborting superseded search");
                        previous.abort();
                    }
                }

                debug!("Search #{} for {:?}", ticket.generation(), ticket.query());
                println!("⏳ Searching for {}...", ticket.query());

                in_flight = Some(spawn_search(
                    Arc::clone(&aggregator),
                    Arc::clone(&session),
                    ticket,
                    |state| {
                        print_state(&state);
                        prompt();
                    },
                ));
                continue;
            }
        }
        prompt();
    }

    // Let the last search finish when input ends
    if let Some(handle) = in_flight {
        if let Err(e) = handle.await {
            warn!("Last search did not complete: {}", e);
        }
    }

    Ok(())
}

/// Run the search for `ticket` on its own task.
///
/// `on_applied` is called with the new state only if the result was still
/// current when it arrived.
fn spawn_search<S, B, F>(
    aggregator: Arc<Aggregator<S, B>>,
    session: Arc<SearchSession>,
    ticket: SearchTicket,
    on_applied: F,
) -> JoinHandle<()>
where
    S: StatsApi + 'static,
    B: BiographyApi + 'static,
    F: FnOnce(SearchState) + Send + 'static,
{
    tokio::spawn(async move {
        let result = aggregator.resolve_driver_stats(ticket.query()).await;
        if let Some(state) = session.finish(&ticket, result) {
            on_applied(state);
        }
    })
}

fn prompt() {
    print!("driver> ");
    let _ = std::io::stdout().flush();
}

fn print_state(state: &SearchState) {
    match (&state.status, &state.outcome) {
        (SearchStatus::Success, Some(outcome)) => {
            println!("\n{}", generate_text_report(outcome, state.view));
        }
        (SearchStatus::NotFound, _) => {
            println!("\n❌ Driver not found. Please enter a valid F1 driver name.");
        }
        (SearchStatus::Error(msg), _) => {
            println!("\n❌ Error fetching data: {}. Please try again.", msg);
        }
        _ if state.is_loading() => println!("⏳ Still loading..."),
        _ => println!("No search yet. {}", HELP),
    }
}
