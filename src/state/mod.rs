//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `SessionState`: lifecycle of one crawl session (idle, running, complete, failed, cancelled)
//! - `VisitOutcome`: what happened to a single visited route

mod session_state;
mod visit_outcome;

// Re-export main types
pub use session_state::SessionState;
pub use visit_outcome::VisitOutcome;
