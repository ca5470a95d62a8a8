use std::time::{Duration, Instant};
use tokio::time;

/// Trailing-edge debounce: each trigger resets the quiet-period
/// deadline, and the action fires once after the burst goes quiet. A
/// separate max-batch deadline, anchored at the first trigger of the
/// burst, bounds how long a never-quiet stream can defer the action.
/// Triggers accumulate; a reset never drops them before the fire.
#[derive(Debug)]
pub struct DebounceTimer {
    quiet: Duration,
    max_batch: Duration,
    dirty: bool,
    pending: usize,
    last_trigger: Option<Instant>,
    first_trigger: Option<Instant>,
    force_immediate: bool,
}

impl DebounceTimer {
    #[must_use]
    pub fn new(quiet: Duration, max_batch: Duration) -> Self {
        Self {
            quiet,
            max_batch,
            dirty: false,
            pending: 0,
            last_trigger: None,
            first_trigger: None,
            force_immediate: false,
        }
    }

    pub fn record(&mut self) {
        self.pending += 1;
        self.last_trigger = Some(Instant::now());
        self.first_trigger.get_or_insert_with(Instant::now);
        self.dirty = true;
    }

    /// Arm for immediate execution, skipping the quiet period.
    pub fn force(&mut self) {
        self.pending += 1;
        self.force_immediate = true;
        self.dirty = true;
    }

    #[must_use]
    pub const fn should_run(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub const fn pending(&self) -> usize {
        self.pending
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<time::Instant> {
        if !self.dirty {
            return None;
        }
        if self.force_immediate {
            return Some(time::Instant::now());
        }

        let mut deadline = self.last_trigger.map(|last| last + self.quiet);
        if let Some(first) = self.first_trigger {
            let forced = first + self.max_batch;
            deadline = Some(match deadline {
                Some(current) if forced < current => forced,
                Some(current) => current,
                None => forced,
            });
        }
        deadline.map(time::Instant::from_std)
    }

    pub fn reset(&mut self) {
        self.dirty = false;
        self.pending = 0;
        self.last_trigger = None;
        self.first_trigger = None;
        self.force_immediate = false;
    }
}
