//! Bounded buffer of inputs awaiting acknowledgement by the authority.
//!
//! Entries stay in sequence order. When the buffer is full the oldest entry
//! is dropped: an input that old can no longer be replayed meaningfully.

use std::collections::VecDeque;

use tracing::warn;

use crossfire_core::commands::InputCommand;

#[derive(Debug, Clone)]
pub struct InputBuffer {
    entries: VecDeque<InputCommand>,
    capacity: usize,
    dropped: u64,
}

impl InputBuffer {
    /// Create a buffer holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append a command. Returns the evicted oldest command if the buffer was full.
    pub fn push(&mut self, command: InputCommand) -> Option<InputCommand> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            self.dropped += 1;
            warn!(
                sequence = old.sequence,
                capacity = self.capacity,
                "pending input buffer full, dropping oldest unacknowledged input"
            );
        }
        self.entries.push_back(command);
        evicted
    }

    /// Drop every entry with `sequence <= sequence`. Returns how many were removed.
    pub fn acknowledge(&mut self, sequence: u32) -> usize {
        let before = self.entries.len();
        self.entries.retain(|c| c.sequence > sequence);
        before - self.entries.len()
    }

    /// Pending commands in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &InputCommand> {
        self.entries.iter()
    }

    pub fn oldest_sequence(&self) -> Option<u32> {
        self.entries.front().map(|c| c.sequence)
    }

    pub fn newest_sequence(&self) -> Option<u32> {
        self.entries.back().map(|c| c.sequence)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total entries evicted by the capacity policy.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
