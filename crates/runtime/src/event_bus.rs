use crate::frame::Frame;

/// An event tagged with the frame it was emitted in.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<K> {
    pub frame_index: u64,
    pub kind: K,
}

/// Append-only, drainable event log.
///
/// Events are kept in emission order; nothing is dispatched. Hosts read or
/// drain the log after each tick.
#[derive(Debug)]
pub struct EventBus<K> {
    events: Vec<Event<K>>,
}

impl<K> Default for EventBus<K> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<K> EventBus<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, kind: K) {
        self.events.push(Event {
            frame_index: frame.index,
            kind,
        });
    }

    pub fn events(&self) -> &[Event<K>] {
        &self.events
    }

    pub fn count(&self, mut pred: impl FnMut(&K) -> bool) -> usize {
        self.events.iter().filter(|e| pred(&e.kind)).count()
    }

    pub fn drain(&mut self) -> Vec<Event<K>> {
        std::mem::take(&mut self.events)
    }
}
