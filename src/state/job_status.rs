/// Job lifecycle states for crawl jobs
///
/// A job starts in `Pending`, moves to `Processing` when the orchestrator
/// picks it up, and ends in one of the terminal states. `Stopped` is only
/// reached through an external stop request.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the lifecycle state of a crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job has been created but not started
    Pending,

    /// Job is actively being crawled
    Processing,

    /// Job finished normally (frontier exhausted or depth bound reached)
    Completed,

    /// Job aborted due to a setup-level failure
    Failed,

    /// Job was stopped by an external request; partial results retained
    Stopped,
}

impl JobStatus {
    /// Returns true if this is a terminal state (no further link mutation)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }

    /// Returns true if `start` is a valid operation in this state
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if `stop` is a valid operation in this state
    pub fn can_stop(&self) -> bool {
        matches!(self, Self::Processing)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Returns all possible job statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Processing,
            Self::Completed,
            Self::Failed,
            Self::Stopped,
        ]
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
