//! Playback Session
//!
//! Per-render state of the fallback machine: the element, the position to
//! carry across strategies and the listeners registered for the current
//! attempt.

use fos_dom::{Document, EventType, ListenerId, NodeId};

/// Events the dispatcher listens for on each attempt
pub(crate) const INTERCEPTED_EVENTS: [EventType; 4] = [
    EventType::LoadStart,
    EventType::Progress,
    EventType::LoadedMetadata,
    EventType::Error,
];

#[derive(Debug)]
pub(crate) struct PlaybackSession {
    element: NodeId,
    /// Last position reported by a progress event, in seconds
    position: Option<f64>,
    strategy_index: usize,
    completed: bool,
    /// A captured position waits to be applied to the next attempt
    restore_pending: bool,
    listeners: Vec<(EventType, ListenerId)>,
}

impl PlaybackSession {
    pub fn new(element: NodeId) -> Self {
        Self {
            element,
            position: None,
            strategy_index: 0,
            completed: false,
            restore_pending: false,
            listeners: Vec::new(),
        }
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn strategy_index(&self) -> usize {
        self.strategy_index
    }

    /// Register the intercepting listeners on the element
    pub(crate) fn listen(&mut self, document: &mut Document) {
        for event_type in INTERCEPTED_EVENTS {
            let id = document.add_event_listener(self.element, event_type);
            self.listeners.push((event_type, id));
        }
    }

    /// Remove every listener this session registered
    pub(crate) fn unlisten_all(&mut self, document: &mut Document) {
        for (_, id) in self.listeners.drain(..) {
            document.remove_event_listener(id);
        }
    }

    /// True if any of `reached` is one of this session's registrations
    pub(crate) fn owns(&self, reached: &[ListenerId]) -> bool {
        self.listeners.iter().any(|(_, id)| reached.contains(id))
    }

    /// Remember the element's position. Ignored while an earlier position
    /// still has to be restored, since a fresh source starts at zero.
    pub(crate) fn capture_position(&mut self, current_time: f64) {
        if self.restore_pending || !current_time.is_finite() {
            return;
        }
        self.position = Some(current_time);
    }

    pub(crate) fn advance(&mut self) -> usize {
        self.strategy_index += 1;
        self.restore_pending = self.position.is_some();
        self.strategy_index
    }

    /// Position to seek to once the current attempt is playable
    pub(crate) fn take_restore(&mut self) -> Option<f64> {
        if !self.restore_pending {
            return None;
        }
        self.restore_pending = false;
        self.position
    }

    /// Flip `completed`; false if it was already set
    pub(crate) fn complete(&mut self) -> bool {
        !std::mem::replace(&mut self.completed, true)
    }
}
