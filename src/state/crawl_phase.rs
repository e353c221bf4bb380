/// Crawl phase definitions for tracking coordinator progress
///
/// A crawl moves linearly through these phases. The only branch is a root
/// fetch failure, which ends the crawl in `Failed` before any work is dispatched.
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Coordinator constructed, nothing fetched yet
    Idle,

    /// Fetching the root catalog page and extracting cities
    FetchingRoot,

    /// Submitting one worker task per city
    Dispatching,

    /// Waiting for every city worker to finish
    AwaitingWorkers,

    /// Writing the raw aggregate to the export sink
    Exporting,

    /// Crawl finished; the aggregate is ready for processing
    Done,

    /// Root page unreachable; no cities could be discovered
    Failed,
}

impl CrawlPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::FetchingRoot)
                | (Self::FetchingRoot, Self::Dispatching)
                | (Self::FetchingRoot, Self::Failed)
                | (Self::Dispatching, Self::AwaitingWorkers)
                | (Self::AwaitingWorkers, Self::Exporting)
                | (Self::Exporting, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingRoot => "fetching_root",
            Self::Dispatching => "dispatching",
            Self::AwaitingWorkers => "awaiting_workers",
            Self::Exporting => "exporting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
