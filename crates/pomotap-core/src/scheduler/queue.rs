//! Single-threaded timer queue.
//!
//! Stands in for an event loop's `setTimeout` / `setInterval`. Callers hold
//! a [`TimerHandle`] per pending timer and drain due handles with
//! [`TimerQueue::pop_due`]. Cancellation happens immediately: a cancelled
//! handle is never returned, and cancelling twice (or after a one-shot has
//! fired) does nothing.

use std::collections::BTreeMap;

/// Identifies one pending timer. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Entry {
    deadline_ms: u64,
    /// `Some` for repeating timers.
    period_ms: Option<u64>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: BTreeMap<TimerHandle, Entry>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `delay_ms` after `now_ms`.
    pub fn set_timeout(&mut self, now_ms: u64, delay_ms: u64) -> TimerHandle {
        self.insert(Entry {
            deadline_ms: now_ms.saturating_add(delay_ms),
            period_ms: None,
        })
    }

    /// Fire every `period_ms`, first at `now_ms + period_ms`.
    pub fn set_interval(&mut self, now_ms: u64, period_ms: u64) -> TimerHandle {
        let period_ms = period_ms.max(1);
        self.insert(Entry {
            deadline_ms: now_ms.saturating_add(period_ms),
            period_ms: Some(period_ms),
        })
    }

    /// Drop a pending timer. Returns whether anything was removed.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest deadline among pending timers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.values().map(|e| e.deadline_ms).min()
    }

    /// Take the earliest timer due at `now_ms`, oldest handle first on ties.
    ///
    /// One-shot timers are removed. Repeating timers move to their next
    /// deadline; one that has fallen behind `now_ms` re-arms a full period
    /// after `now_ms` rather than firing once per missed period.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<TimerHandle> {
        let (handle, entry) = self
            .entries
            .iter()
            .filter(|(_, e)| e.deadline_ms <= now_ms)
            .min_by_key(|(handle, e)| (e.deadline_ms, **handle))
            .map(|(h, e)| (*h, *e))?;

        match entry.period_ms {
            None => {
                self.entries.remove(&handle);
            }
            Some(period) => {
                let mut next = entry.deadline_ms.saturating_add(period);
                if next <= now_ms {
                    next = now_ms.saturating_add(period);
                }
                if let Some(e) = self.entries.get_mut(&handle) {
                    e.deadline_ms = next;
                }
            }
        }
        Some(handle)
    }

    fn insert(&mut self, entry: Entry) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.insert(handle, entry);
        handle
    }
}
