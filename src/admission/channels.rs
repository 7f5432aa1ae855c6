use crate::types::ChannelSpan;
use std::sync::atomic::{AtomicU64, Ordering};

/// Each registry draws its id namespace from a process-wide sequence
static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies an admitted channel. Ids carry the registry they were issued
/// by, so a handle leaked to another controller never matches there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId {
    registry: u64,
    seq: u64,
}

/// Token returned on admission; required to release the channel.
///
/// Handles, not spans, are the unit of release: two admissions of the same
/// span coexist under distinct handles.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: ChannelId,
    span: ChannelSpan,
}

impl ChannelHandle {
    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// The span this handle was admitted for
    pub fn span(&self) -> ChannelSpan {
        self.span
    }
}

#[derive(Debug, Clone)]
struct ActiveChannel {
    id: ChannelId,
    span: ChannelSpan,
}

/// Registry of admitted channel spans, sorted ascending by span bounds
/// then admission order.
#[derive(Debug, Clone)]
pub struct ActiveChannelSet {
    registry_id: u64,
    next_seq: u64,
    channels: Vec<ActiveChannel>,
}

impl Default for ActiveChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveChannelSet {
    pub fn new() -> Self {
        Self {
            registry_id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            next_seq: 0,
            channels: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Insert a span, keeping sort order; returns the release handle
    pub fn insert(&mut self, span: ChannelSpan) -> ChannelHandle {
        let id = ChannelId {
            registry: self.registry_id,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let key = (span.min_frequency, span.max_frequency, id);
        let index = self.channels.partition_point(|entry| {
            (entry.span.min_frequency, entry.span.max_frequency, entry.id) < key
        });
        self.channels.insert(index, ActiveChannel { id, span });

        ChannelHandle { id, span }
    }

    /// Remove a channel by id; false when it is not present
    pub fn remove(&mut self, id: ChannelId) -> bool {
        match self.channels.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.channels.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        self.channels.iter().any(|entry| entry.id == id)
    }

    /// Lowest admitted frequency in Hz
    pub fn min_frequency(&self) -> Option<u64> {
        self.channels.first().map(|entry| entry.span.min_frequency)
    }

    /// Highest admitted frequency in Hz. Scans every member: a wide span
    /// can end above the last-sorted member's upper edge.
    pub fn max_frequency(&self) -> Option<u64> {
        self.channels
            .iter()
            .map(|entry| entry.span.max_frequency)
            .max()
    }

    /// Both admitted extremes at once, None when the set is empty
    pub fn extremes(&self) -> Option<(u64, u64)> {
        match (self.min_frequency(), self.max_frequency()) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }

    /// Admitted spans in ascending order
    pub fn spans(&self) -> impl Iterator<Item = ChannelSpan> + '_ {
        self.channels.iter().map(|entry| entry.span)
    }
}
