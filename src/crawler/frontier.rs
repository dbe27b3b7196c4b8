//! Breadth-first crawl frontier
//!
//! This module handles:
//! - The FIFO queue of crawl tasks (depth-nondecreasing, discovery order)
//! - The visited set, keyed by normalized URL
//! - The depth ceiling applied on enqueue and on dequeue

use crate::crawler::types::CrawlTask;
use crate::url::normalize_url;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Queue and visited set of one crawl
///
/// A URL enters the queue at most once and is visited at most once. Keys are
/// normalized so `/a#top` and `/a` count as the same page.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
    visited: HashSet<String>,
    queued: HashSet<String>,
    max_depth: u32,
}

impl Frontier {
    /// Creates a frontier seeded with the start URL at depth 0
    pub fn new(start: Url, max_depth: u32) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            queued: HashSet::new(),
            max_depth,
        };
        frontier.queued.insert(visit_key(&start));
        frontier.queue.push_back(CrawlTask {
            url: start,
            depth: 0,
        });
        frontier
    }

    /// Takes the next task that still needs a visit
    ///
    /// Tasks already visited or deeper than the ceiling are dropped on the
    /// way. The returned task is not yet marked visited; call [`Frontier::visit`].
    pub fn next_task(&mut self) -> Option<CrawlTask> {
        while let Some(task) = self.queue.pop_front() {
            if task.depth > self.max_depth || self.visited.contains(&visit_key(&task.url)) {
                tracing::trace!("Skipping {} at depth {}", task.url, task.depth);
                continue;
            }
            return Some(task);
        }
        None
    }

    /// Marks a task's URL as visited
    ///
    /// # Returns
    ///
    /// `false` if the URL had already been visited
    pub fn visit(&mut self, task: &CrawlTask) -> bool {
        self.visited.insert(visit_key(&task.url))
    }

    /// Enqueues a link found on a page at `parent_depth`
    ///
    /// # Returns
    ///
    /// * `true` - The link was queued
    /// * `false` - Too deep, already visited or already queued
    pub fn enqueue_child(&mut self, url: Url, parent_depth: u32) -> bool {
        let depth = parent_depth + 1;
        if depth > self.max_depth {
            return false;
        }

        let key = visit_key(&url);
        if self.visited.contains(&key) || !self.queued.insert(key) {
            return false;
        }

        self.queue.push_back(CrawlTask { url, depth });
        true
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Visited-set key: the normalized URL, or the raw URL when normalization fails
fn visit_key(url: &Url) -> String {
    normalize_url(url.as_str())
        .map(|normalized| normalized.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_start_task_first() {
        let mut frontier = Frontier::new(url("https://example.com/"), 2);
        let task = frontier.next_task().unwrap();
        assert_eq!(task.url.as_str(), "https://example.com/");
        assert_eq!(task.depth, 0);
        assert!(frontier.visit(&task));
        assert!(frontier.next_task().is_none());
    }

    #[test]
    fn test_fifo_order_by_discovery() {
        let mut frontier = Frontier::new(url("https://example.com/"), 2);
        let start = frontier.next_task().unwrap();
        frontier.visit(&start);

        assert!(frontier.enqueue_child(url("https://example.com/b"), 0));
        assert!(frontier.enqueue_child(url("https://example.com/a"), 0));

        let b = frontier.next_task().unwrap();
        assert_eq!(b.url.path(), "/b");
        frontier.visit(&b);
        assert!(frontier.enqueue_child(url("https://example.com/c"), b.depth));

        let order: Vec<(String, u32)> = std::iter::from_fn(|| frontier.next_task())
            .map(|t| (t.url.path().to_string(), t.depth))
            .collect();
        assert_eq!(
            order,
            vec![("/a".to_string(), 1), ("/c".to_string(), 2)]
        );
    }

    #[test]
    fn test_depth_ceiling() {
        let mut frontier = Frontier::new(url("https://example.com/"), 1);
        assert!(frontier.enqueue_child(url("https://example.com/a"), 0));
        assert!(!frontier.enqueue_child(url("https://example.com/b"), 1));

        let mut zero = Frontier::new(url("https://example.com/"), 0);
        assert!(!zero.enqueue_child(url("https://example.com/a"), 0));
    }

    #[test]
    fn test_no_duplicate_queue_entries() {
        let mut frontier = Frontier::new(url("https://example.com/"), 3);
        assert!(frontier.enqueue_child(url("https://example.com/a"), 0));
        assert!(!frontier.enqueue_child(url("https://example.com/a#top"), 0));
        assert!(!frontier.enqueue_child(url("https://example.com/"), 0));
        assert_eq!(frontier.pending(), 2);
    }

    #[test]
    fn test_visited_not_requeued() {
        let mut frontier = Frontier::new(url("https://example.com/"), 3);
        let start = frontier.next_task().unwrap();
        frontier.visit(&start);
        assert!(!frontier.enqueue_child(url("https://example.com/?utm_source=x"), 0));
        assert_eq!(frontier.visited_count(), 1);
        assert!(frontier.is_empty());
    }
}
