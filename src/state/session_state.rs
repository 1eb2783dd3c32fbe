/// Session state definitions for one crawl invocation
///
/// A session moves `Idle → Running` once the renderer has been opened and
/// then ends in exactly one terminal state. Terminal states never change.
use crate::TrawlerError;
use std::fmt;

/// Represents the lifecycle state of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Session created, renderer not yet opened
    Idle,

    /// Renderer opened, routes are being visited
    Running,

    // ===== Terminal States =====
    /// Every discovered route has been settled
    Complete,

    /// The renderer could not be started
    Failed,

    /// Stopped early by an external cancellation request
    Cancelled,
}

impl SessionState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Cancelled)
    }

    /// Checks whether moving from this state to `next` is allowed
    ///
    /// `Failed` is only reachable from `Idle`: once the renderer is running,
    /// individual page failures never fail the session.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Failed)
                | (Self::Idle, Self::Cancelled)
                | (Self::Running, Self::Complete)
                | (Self::Running, Self::Cancelled)
        )
    }

    /// Returns `next` if the transition is allowed
    pub fn transition(self, next: SessionState) -> Result<SessionState, TrawlerError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TrawlerError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
