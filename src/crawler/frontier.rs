//! Frontier for managing listing-page traversal
//!
//! This module handles:
//! - FIFO queueing of discovered listing URLs (breadth-first traversal)
//! - De-duplication against both visited and pending URLs
//! - Termination once the page budget is spent

use std::collections::{HashSet, VecDeque};

/// Frontier owns crawl de-duplication and termination
///
/// A URL enters the visited set at most once and is never queued twice while
/// unvisited. The budget counts distinct pages dequeued, not page numbers.
#[derive(Debug)]
pub struct Frontier {
    /// Pending URLs in discovery order
    pending: VecDeque<String>,

    /// Mirror of `pending` for O(1) membership checks
    pending_set: HashSet<String>,

    /// URLs already handed out for processing
    visited: HashSet<String>,

    /// Maximum number of URLs that may be visited
    budget: usize,
}

impl Frontier {
    /// Creates an empty frontier that will visit at most `budget` URLs
    pub fn new(budget: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            pending_set: HashSet::new(),
            visited: HashSet::new(),
            budget,
        }
    }

    /// Adds a URL to the pending queue
    ///
    /// # Returns
    ///
    /// * `true` - The URL was queued
    /// * `false` - The URL was already visited or pending
    pub fn enqueue(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.visited.contains(&url) || self.pending_set.contains(&url) {
            return false;
        }
        self.pending_set.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Pops the oldest pending URL without marking it visited
    pub fn dequeue_next(&mut self) -> Option<String> {
        let url = self.pending.pop_front()?;
        self.pending_set.remove(&url);
        Some(url)
    }

    /// Records a URL as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Returns true when draining should stop
    ///
    /// Draining stops once the pending queue is empty or the budget is spent.
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() || self.visited.len() >= self.budget
    }

    /// Gets the next URL to process and marks it visited
    ///
    /// # Returns
    ///
    /// * `Some(String)` - A URL that has not been processed before
    /// * `None` - The queue is empty or the budget is spent
    pub fn next_url(&mut self) -> Option<String> {
        if self.is_exhausted() {
            return None;
        }
        let url = self.dequeue_next()?;
        self.mark_visited(&url);
        Some(url)
    }

    /// Returns the number of URLs visited so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns the number of URLs waiting in the queue
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if the URL has already been handed out
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize_page_url;

    #[test]
    fn test_new_frontier() {
        let frontier = Frontier::new(3);
        assert_eq!(frontier.pending_count(), 0);
        assert_eq!(frontier.visited_count(), 0);
        assert!(frontier.is_exhausted());
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new(10);
        frontier.enqueue("a");
        frontier.enqueue("b");
        frontier.enqueue("c");

        assert_eq!(frontier.next_url().as_deref(), Some("a"));
        assert_eq!(frontier.next_url().as_deref(), Some("b"));
        assert_eq!(frontier.next_url().as_deref(), Some("c"));
        assert_eq!(frontier.next_url(), None);
    }

    #[test]
    fn test_pending_duplicate_rejected() {
        let mut frontier = Frontier::new(10);
        assert!(frontier.enqueue("a"));
        assert!(!frontier.enqueue("a"));
        assert_eq!(frontier.pending_count(), 1);
    }

    #[test]
    fn test_visited_url_never_requeued() {
        let mut frontier = Frontier::new(10);
        frontier.enqueue("a");
        assert_eq!(frontier.next_url().as_deref(), Some("a"));

        assert!(!frontier.enqueue("a"));
        assert_eq!(frontier.next_url(), None);
    }

    #[test]
    fn test_canonical_forms_dequeued_once() {
        let mut frontier = Frontier::new(10);
        for link in [
            "https://x.com/s?page=2&q=nike",
            "https://x.com/s?q=nike&page=2",
            "https://x.com/s?q=nike&page=2#results",
        ] {
            let canonical = canonicalize_page_url(link, "page").unwrap();
            frontier.enqueue(canonical.as_str());
        }

        assert!(frontier.next_url().is_some());
        assert!(frontier.next_url().is_none());
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_budget_respected() {
        let mut frontier = Frontier::new(2);
        for i in 0..10 {
            frontier.enqueue(format!("page-{}", i));
        }

        let mut processed = Vec::new();
        while let Some(url) = frontier.next_url() {
            processed.push(url);
            // Discovering more pages never extends the budget
            frontier.enqueue(format!("late-{}", processed.len()));
        }

        assert_eq!(processed, vec!["page-0", "page-1"]);
        assert_eq!(frontier.visited_count(), 2);
    }

    #[test]
    fn test_mark_visited_is_idempotent() {
        let mut frontier = Frontier::new(5);
        assert!(frontier.mark_visited("a"));
        assert!(!frontier.mark_visited("a"));
        assert_eq!(frontier.visited_count(), 1);
        assert!(frontier.is_visited("a"));
    }

    #[test]
    fn test_zero_budget_visits_nothing() {
        let mut frontier = Frontier::new(0);
        frontier.enqueue("a");
        assert!(frontier.next_url().is_none());
    }
}
