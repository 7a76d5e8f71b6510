//! Driver search: the aggregation pipeline and the session state it feeds.

pub mod aggregator;
pub mod session;

pub use aggregator::{Aggregator, AggregatorConfig, DEFAULT_FLOOR_YEAR};
pub use session::{SearchSession, SearchState, SearchTicket};
