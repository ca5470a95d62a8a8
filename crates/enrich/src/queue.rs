use std::collections::{HashSet, VecDeque};

/// Counters for one pipeline's queue, reported alongside stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct QueueStats {
    pub enqueued_total: u64,
    pub dropped_oldest: u64,
    pub dispatched: u64,
    pub skipped: u64,
    pub failed: u64,
    pub completed: u64,
}

/// Bounded FIFO of tab ids awaiting an enrichment pass. An id already
/// waiting is not enqueued twice; on overflow the oldest entry is
/// dropped and counted.
#[derive(Debug)]
pub struct EnrichQueue {
    queue: VecDeque<i64>,
    queued: HashSet<i64>,
    cap: usize,
    stats: QueueStats,
}

impl EnrichQueue {
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            cap: cap.max(1),
            stats: QueueStats::default(),
        }
    }

    /// Returns `true` when the id was newly queued.
    pub fn push(&mut self, tab_id: i64) -> bool {
        if !self.queued.insert(tab_id) {
            return false;
        }
        if self.queue.len() >= self.cap {
            if let Some(oldest) = self.queue.pop_front() {
                self.queued.remove(&oldest);
                self.stats.dropped_oldest += 1;
            }
        }
        self.queue.push_back(tab_id);
        self.stats.enqueued_total += 1;
        true
    }

    pub fn pop(&mut self) -> Option<i64> {
        let tab_id = self.queue.pop_front()?;
        self.queued.remove(&tab_id);
        Some(tab_id)
    }

    /// Drop a removed tab from the wait list, if present.
    pub fn forget(&mut self, tab_id: i64) {
        if self.queued.remove(&tab_id) {
            self.queue.retain(|id| *id != tab_id);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    pub fn stats_mut(&mut self) -> &mut QueueStats {
        &mut self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fifo_order_and_id_dedup() {
        let mut queue = EnrichQueue::new(8);
        assert!(queue.push(1));
        assert!(queue.push(2));
        assert!(!queue.push(1));
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), None);
        // once drained, the same id may queue again
        assert!(queue.push(1));
    }

    #[test]
    fn overflow_drops_oldest_and_counts() {
        let mut queue = EnrichQueue::new(3);
        for id in 1..=5 {
            queue.push(id);
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.stats().dropped_oldest, 2);
        assert_eq!(queue.pop(), Some(3));
        assert_eq!(queue.pop(), Some(4));
        assert_eq!(queue.pop(), Some(5));
    }

    #[test]
    fn forget_removes_waiting_entry() {
        let mut queue = EnrichQueue::new(8);
        queue.push(1);
        queue.push(2);
        queue.forget(1);
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), None);
    }
}
