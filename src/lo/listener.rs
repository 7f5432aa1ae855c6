use std::fmt;

/// Notification emitted after a committed oscillator state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoEvent {
    /// New center frequency in Hz
    FrequencyChanged(u64),
    /// New correction offset in Hz
    CorrectionChanged(i64),
    /// New device bandwidth in Hz
    BandwidthChanged(u64),
}

/// Identifies a registered listener so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked for committed oscillator changes
pub type FrequencyListener = Box<dyn FnMut(&LoEvent) + Send>;

/// Ordered collection of frequency listeners.
///
/// Listeners run synchronously in registration order. Removing one keeps
/// the relative order of the rest.
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, FrequencyListener)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener; the returned id removes it later
    pub fn add(&mut self, listener: impl FnMut(&LoEvent) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; false when the id is unknown
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener, in registration order
    pub fn notify(&mut self, event: &LoEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
