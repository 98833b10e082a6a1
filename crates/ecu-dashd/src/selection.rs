//! Channel selection state machine
//!
//! One state per channel index. An active button sample advances the index
//! (wrapping at the channel count) only when the debounce interval has
//! passed since the previous accepted transition.
//!
//! Holding the button past the debounce interval re-triggers once per
//! interval. This is interval gating, not single-shot edge detection, and it
//! is what makes a long press scroll through channels.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Current selection and the time of the last accepted transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    pub current_index: usize,
    pub last_transition: Option<Instant>,
}

/// Debounced channel selector
#[derive(Debug)]
pub struct SelectionStateMachine {
    state: SelectionState,
    channel_count: usize,
    debounce: Duration,
}

impl SelectionStateMachine {
    /// Start at index 0
    ///
    /// # Panics
    ///
    /// Panics if `channel_count` is zero. Channel tables are never empty.
    pub fn new(channel_count: usize, debounce: Duration) -> Self {
        assert!(channel_count > 0, "selection needs at least one channel");
        Self {
            state: SelectionState {
                current_index: 0,
                last_transition: None,
            },
            channel_count,
            debounce,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    /// Move to the next channel unconditionally
    pub fn advance(&mut self, now: Instant) -> usize {
        self.state.current_index = (self.state.current_index + 1) % self.channel_count;
        self.state.last_transition = Some(now);
        self.state.current_index
    }

    /// Feed one input sample; returns true when it caused a transition
    pub fn on_sample(&mut self, active: bool, now: Instant) -> bool {
        if !active {
            return false;
        }

        if let Some(last) = self.state.last_transition {
            if now.saturating_duration_since(last) < self.debounce {
                return false;
            }
        }

        let index = self.advance(now);
        debug!(index, "Channel selection advanced");
        true
    }
}

/// Single-writer, single-reader cell carrying the selected index between
/// the input task and the acquisition task
#[derive(Debug, Clone, Default)]
pub struct SharedSelection {
    index: Arc<AtomicUsize>,
}

impl SharedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, index: usize) {
        self.index.store(index, Ordering::Release);
    }

    pub fn current(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }
}
