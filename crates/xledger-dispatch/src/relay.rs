//! The dispatcher's side of the relay boundary.
//!
//! The relay service itself is external. It picks envelopes up from each
//! chain's [`Outbox`] in sequence order and drops them, at least once, into
//! the destination's [`Inbox`].

use std::collections::VecDeque;

use xledger_types::{ChainId, Envelope, RelayPayload};

/// Envelopes emitted by one chain, numbered in emission order.
#[derive(Debug)]
pub struct Outbox {
    source: ChainId,
    next_sequence: u64,
    queue: Vec<Envelope>,
}

impl Outbox {
    #[must_use]
    pub fn new(source: ChainId) -> Self {
        Self {
            source,
            next_sequence: 0,
            queue: Vec::new(),
        }
    }

    /// Queue `payload` for `destination`. Returns its sequence number.
    pub fn push(&mut self, destination: ChainId, payload: RelayPayload) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(Envelope {
            source: self.source,
            destination,
            sequence,
            payload,
        });
        sequence
    }

    /// Hand everything queued so far to the relay.
    pub fn take(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.queue)
    }

    #[must_use]
    pub fn pending(&self) -> &[Envelope] {
        &self.queue
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Envelopes delivered to one chain, awaiting the dispatcher.
#[derive(Debug, Default)]
pub struct Inbox {
    queue: VecDeque<Envelope>,
}

impl Inbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, envelope: Envelope) {
        self.queue.push_back(envelope);
    }

    pub fn pop(&mut self) -> Option<Envelope> {
        self.queue.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
