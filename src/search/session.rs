//! Search state with generation tracking.
//!
//! Every search gets a ticket stamped with a monotonically increasing
//! generation. Only the completion carrying the newest generation may
//! update the state; anything older is dropped.

use crate::error::SearchError;
use crate::models::{RaceRecord, RaceView, SearchOutcome, SearchStatus};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Snapshot of what is currently displayed.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub status: SearchStatus,
    pub outcome: Option<Arc<SearchOutcome>>,
    pub view: RaceView,
    /// Generation of the most recent search.
    pub generation: u64,
}

impl SearchState {
    /// Races for the current view, empty when there is no outcome.
    pub fn visible_races(&self) -> &[RaceRecord] {
        self.outcome
            .as_deref()
            .map(|o| o.races_for(self.view))
            .unwrap_or(&[])
    }

    pub fn is_loading(&self) -> bool {
        self.status == SearchStatus::Loading
    }
}

/// Handle for one in-flight search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Owner of the current search state.
#[derive(Debug, Default)]
pub struct SearchSession {
    state: Mutex<SearchState>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new search, invalidating any previous one.
    ///
    /// Empty or whitespace-only queries return `None` and leave the
    /// state untouched.
    pub fn begin(&self, query: &str) -> Option<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let mut state = self.lock();
        state.generation += 1;
        state.status = SearchStatus::Loading;
        state.outcome = None;
        state.view = RaceView::All;

        debug!("Search #{} started for {:?}", state.generation, query);

        Some(SearchTicket {
            generation: state.generation,
            query: query.to_string(),
        })
    }

    /// Apply the result of a search.
    ///
    /// Returns the new state, or `None` if a newer search has started
    /// since `ticket` was issued.
    pub fn finish(
        &self,
        ticket: &SearchTicket,
        result: Result<SearchOutcome, SearchError>,
    ) -> Option<SearchState> {
        let mut state = self.lock();

        if state.generation != ticket.generation {
            info!(
                "Discarding stale result of search #{} for {:?}",
                ticket.generation, ticket.query
            );
            return None;
        }

        match result {
            Ok(outcome) => {
                state.status = SearchStatus::Success;
                state.outcome = Some(Arc::new(outcome));
            }
            Err(SearchError::EmptyInput) => {
                state.status = SearchStatus::Idle;
                state.outcome = None;
            }
            Err(SearchError::DriverNotFound(_)) => {
                state.status = SearchStatus::NotFound;
                state.outcome = None;
            }
            Err(e) => {
                state.status = SearchStatus::Error(e.to_string());
                state.outcome = None;
            }
        }

        Some(state.clone())
    }

    /// Switch between all races and podiums only.
    pub fn toggle_view(&self) -> SearchState {
        let mut state = self.lock();
        state.view = state.view.toggled();
        state.clone()
    }

    pub fn set_view(&self, view: RaceView) -> SearchState {
        let mut state = self.lock();
        state.view = view;
        state.clone()
    }

    pub fn state(&self) -> SearchState {
        self.lock().clone()
    }
}
