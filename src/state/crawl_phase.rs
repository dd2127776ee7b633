//! Per-category crawl phases and stop reasons
//!
//! A category crawl cycles `FetchingPage → Extracting → DecidingContinuation`
//! until the continuation decision yields `Done`.

use std::fmt;

/// Current phase of one category's pagination loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Waiting on the page request
    FetchingPage,

    /// Locating cards and running the extractor
    Extracting,

    /// Choosing between the next page and stopping
    DecidingContinuation,

    /// Terminal
    Done,
}

impl CrawlPhase {
    /// Returns true if the loop may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::FetchingPage, Self::Extracting)
                | (Self::FetchingPage, Self::Done)
                | (Self::Extracting, Self::DecidingContinuation)
                | (Self::Extracting, Self::Done)
                | (Self::DecidingContinuation, Self::FetchingPage)
                | (Self::DecidingContinuation, Self::Done)
        )
    }

    /// Moves to `next`
    ///
    /// Illegal transitions are programming errors and trip a debug assertion.
    pub fn advance(self, next: CrawlPhase) -> CrawlPhase {
        debug_assert!(
            self.can_transition_to(next),
            "invalid crawl phase transition: {:?} -> {:?}",
            self,
            next
        );
        next
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FetchingPage => "fetching_page",
            Self::Extracting => "extracting",
            Self::DecidingContinuation => "deciding_continuation",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Why a category's pagination loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The request for `page` failed
    FetchFailed { page: u32 },

    /// `page` held no product cards
    NoCards { page: u32 },

    /// `page` contributed no previously unseen records
    Stagnated { page: u32 },

    /// `page` had neither a next link nor a pager
    NoPagination { page: u32 },

    /// `page` was the last page allowed by the page ceiling
    PageCeiling { page: u32 },
}

impl StopReason {
    /// Page number on which the loop stopped
    pub fn page(&self) -> u32 {
        match *self {
            Self::FetchFailed { page }
            | Self::NoCards { page }
            | Self::Stagnated { page }
            | Self::NoPagination { page }
            | Self::PageCeiling { page } => page,
        }
    }

    /// Returns true if the category ended because of a failed request
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FetchFailed { .. })
    }

    /// Converts the reason to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::FetchFailed { .. } => "fetch_failed",
            Self::NoCards { .. } => "no_cards",
            Self::Stagnated { .. } => "stagnated",
            Self::NoPagination { .. } => "no_pagination",
            Self::PageCeiling { .. } => "page_ceiling",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on page {}", self.to_db_string(), self.page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_transitions() {
        let phase = CrawlPhase::FetchingPage
            .advance(CrawlPhase::Extracting)
            .advance(CrawlPhase::DecidingContinuation)
            .advance(CrawlPhase::FetchingPage);
        assert_eq!(phase, CrawlPhase::FetchingPage);
    }

    #[test]
    fn test_every_active_phase_can_finish() {
        assert!(CrawlPhase::FetchingPage.can_transition_to(CrawlPhase::Done));
        assert!(CrawlPhase::Extracting.can_transition_to(CrawlPhase::Done));
        assert!(CrawlPhase::DecidingContinuation.can_transition_to(CrawlPhase::Done));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!CrawlPhase::FetchingPage.can_transition_to(CrawlPhase::DecidingContinuation));
        assert!(!CrawlPhase::Extracting.can_transition_to(CrawlPhase::FetchingPage));
        assert!(!CrawlPhase::Done.can_transition_to(CrawlPhase::FetchingPage));
        assert!(!CrawlPhase::Done.can_transition_to(CrawlPhase::Done));
    }

    #[test]
    fn test_is_terminal() {
        assert!(CrawlPhase::Done.is_terminal());
        assert!(!CrawlPhase::Extracting.is_terminal());
    }

    #[test]
    fn test_stop_reason_page_and_failure() {
        let reason = StopReason::FetchFailed { page: 4 };
        assert_eq!(reason.page(), 4);
        assert!(reason.is_failure());
        assert!(!StopReason::PageCeiling { page: 50 }.is_failure());
    }

    #[test]
    fn test_stop_reason_display() {
        let reason = StopReason::Stagnated { page: 3 };
        assert_eq!(reason.to_string(), "stagnated on page 3");
    }
}
