//! Per-character action queue (spec.md §4.4.1): FIFO with a single active
//! cooldown timer. This type holds only the queue's mechanical state; the
//! actual dequeue-and-execute step is driven by the registry against the
//! world, since it needs to invoke command handlers.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueuedCommand {
    pub raw_input: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActionQueue {
    pending: VecDeque<QueuedCommand>,
    is_processing: bool,
    cooldown_remaining_secs: u64,
}

impl ActionQueue {
    pub fn new() -> Self {
        ActionQueue::default()
    }

    pub fn is_busy(&self) -> bool {
        self.is_processing || self.cooldown_remaining_secs > 0
    }

    /// Appends a command. Returns `true` if the caller should execute it
    /// immediately (nothing running, no active cooldown); `false` means it
    /// was queued and the caller should send a "queued" notice.
    pub fn enqueue(&mut self, cmd: QueuedCommand) -> bool {
        if self.is_busy() {
            self.pending.push_back(cmd);
            false
        } else {
            self.pending.push_back(cmd);
            true
        }
    }

    /// Pops the next command to run, marking the queue as processing. Only
    /// valid to call when `!is_busy()`.
    pub fn start_next(&mut self) -> Option<QueuedCommand> {
        let next = self.pending.pop_front();
        if next.is_some() {
            self.is_processing = true;
        }
        next
    }

    /// Arms the cooldown after a command finishes executing.
    pub fn finish_with_cooldown(&mut self, cooldown_secs: u64) {
        self.is_processing = false;
        self.cooldown_remaining_secs = cooldown_secs;
    }

    /// Advances the cooldown timer. Returns `true` exactly on the tick that
    /// crosses from armed to expired.
    pub fn tick_cooldown(&mut self, elapsed_secs: u64) -> bool {
        if self.cooldown_remaining_secs == 0 {
            return false;
        }
        self.cooldown_remaining_secs = self.cooldown_remaining_secs.saturating_sub(elapsed_secs);
        self.cooldown_remaining_secs == 0
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Cancellation (spec.md §5): destroying a character cancels the timer
    /// and drops the queue.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.is_processing = false;
        self.cooldown_remaining_secs = 0;
    }

    /// Drops the running command's remaining cooldown without touching
    /// pending entries (spec.md §4.4.1 `CombatBusyMode::Interrupt`), so the
    /// caller can dispatch a new command immediately instead of queuing it.
    pub fn interrupt(&mut self) {
        self.is_processing = false;
        self.cooldown_remaining_secs = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_command_runs_immediately_then_queues() {
        let mut q = ActionQueue::new();
        assert!(q.enqueue(QueuedCommand { raw_input: "attack".into() }));
        assert!(q.start_next().is_some());
        q.finish_with_cooldown(3);

        assert!(!q.enqueue(QueuedCommand { raw_input: "attack".into() }));
        assert!(q.has_pending());

        assert!(!q.tick_cooldown(2));
        assert!(q.tick_cooldown(1));
        assert!(!q.is_busy());
        assert!(q.start_next().is_some());
    }

    #[test]
    fn interrupt_clears_cooldown_but_keeps_pending() {
        let mut q = ActionQueue::new();
        q.enqueue(QueuedCommand { raw_input: "a".into() });
        q.start_next();
        q.finish_with_cooldown(5);
        q.enqueue(QueuedCommand { raw_input: "b".into() });

        q.interrupt();
        assert!(!q.is_busy());
        assert!(q.has_pending());
    }

    #[test]
    fn cancel_drops_queue_and_timer() {
        let mut q = ActionQueue::new();
        q.enqueue(QueuedCommand { raw_input: "a".into() });
        q.start_next();
        q.finish_with_cooldown(5);
        q.enqueue(QueuedCommand { raw_input: "b".into() });
        q.cancel();
        assert!(!q.is_busy());
        assert!(!q.has_pending());
    }
}
