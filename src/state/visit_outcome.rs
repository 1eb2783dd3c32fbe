use std::fmt;

/// Final outcome of one attempted visit
///
/// Every outcome is terminal for its route: a route is never visited again
/// within the same session, whatever happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Page rendered and its captures were stored
    Captured,

    /// Page rendered but the sink refused the captures
    CaptureFailed(String),

    /// Navigation or extraction failed
    RenderFailed(String),

    /// Navigation did not finish before the deadline
    TimedOut,
}

impl VisitOutcome {
    /// True when the page itself could be rendered
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Captured | Self::CaptureFailed(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Captured)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Captured => "captured",
            Self::CaptureFailed(_) => "capture_failed",
            Self::RenderFailed(_) => "render_failed",
            Self::TimedOut => "timed_out",
        }
    }

    /// Error message, if the outcome carries one
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::CaptureFailed(msg) | Self::RenderFailed(msg) => Some(msg),
            Self::Captured | Self::TimedOut => None,
        }
    }
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "{}: {}", self.label(), msg),
            None => f.write_str(self.label()),
        }
    }
}
