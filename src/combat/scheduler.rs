//! Time-ordered event queue.
//!
//! Events order by `(time, kind rank, sequence)`. A heal scheduled for the same instant as a
//! strike lands first; events of the same kind at the same instant fire in scheduling order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BossStrike,
    HealerCast(usize),
}

impl EventKind {
    /// Tie-break rank for simultaneous events. Lower fires first.
    pub const fn rank(self) -> u8 {
        match self {
            Self::HealerCast(_) => 0,
            Self::BossStrike => 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduledEvent {
    pub time: f64,
    pub kind: EventKind,
    sequence: u64,
}

impl ScheduledEvent {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, time: f64, kind: EventKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(ScheduledEvent {
            time,
            kind,
            sequence,
        }));
    }

    pub fn pop_earliest(&mut self) -> Result<ScheduledEvent, EngineError> {
        self.heap
            .pop()
            .map(|Reverse(event)| event)
            .ok_or(EngineError::EmptyQueue)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
