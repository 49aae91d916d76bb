//! Progress estimation for message pagination
//!
//! The server never reports a total, so the estimate is a guess: one page
//! of slack while more pages remain, the exact count once they do not. It
//! can overshoot or undershoot and may move in either direction between
//! pages; only the final value is exact.

use larkexport_domain::ProgressEstimate;

/// Running progress of one message pagination run
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    page_size: usize,
    processed: usize,
    pages: usize,
}

impl ProgressTracker {
    pub fn new(page_size: u32) -> Self {
        Self { page_size: page_size as usize, processed: 0, pages: 0 }
    }

    /// Record one received page and return the updated estimate.
    pub fn record_page(&mut self, items: usize, has_more: bool) -> ProgressEstimate {
        self.pages += 1;
        self.processed += items;

        let estimated_total = if has_more {
            self.processed + self.page_size
        } else {
            // final page, including a short first page
            self.processed
        };

        ProgressEstimate { processed: self.processed, estimated_total, has_more }
    }

    /// Exact estimate once pagination has ended.
    pub fn finish(&self) -> ProgressEstimate {
        ProgressEstimate {
            processed: self.processed,
            estimated_total: self.processed,
            has_more: false,
        }
    }

    pub fn pages(&self) -> usize {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_single_item_pages() {
        let mut tracker = ProgressTracker::new(50);
        assert_eq!(
            tracker.record_page(1, true),
            ProgressEstimate { processed: 1, estimated_total: 51, has_more: true }
        );
        assert_eq!(
            tracker.record_page(1, false),
            ProgressEstimate { processed: 2, estimated_total: 2, has_more: false }
        );
        assert_eq!(tracker.pages(), 2);
    }

    #[test]
    fn short_first_page_is_exact() {
        let mut tracker = ProgressTracker::new(50);
        let estimate = tracker.record_page(7, false);
        assert_eq!(estimate.estimated_total, 7);
        assert_eq!(tracker.finish(), estimate);
    }

    #[test]
    fn estimate_may_shrink_on_final_page() {
        let mut tracker = ProgressTracker::new(50);
        let first = tracker.record_page(50, true);
        let last = tracker.record_page(3, false);
        assert_eq!(first.estimated_total, 100);
        assert_eq!(last.estimated_total, 53);
        assert!(last.processed >= first.processed);
    }
}
