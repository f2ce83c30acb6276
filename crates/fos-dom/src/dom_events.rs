//! DOM Events
//!
//! Event types, queued events and the listener registry.
//!
//! Listeners are not closures: a registration is a `ListenerId` handed back
//! to the owner, and the event loop asks the registry which IDs an event
//! reaches. The owner keeps the IDs it registered and removes them itself.

use crate::NodeId;

/// DOM event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    // Media lifecycle
    LoadStart,
    Progress,
    LoadedMetadata,
    CanPlay,
    Error,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadStart => "loadstart",
            Self::Progress => "progress",
            Self::LoadedMetadata => "loadedmetadata",
            Self::CanPlay => "canplay",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queued DOM event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: EventType,
    pub target: NodeId,
    /// Source generation of the target when the event was queued. Media
    /// elements bump their generation on every new source, which lets
    /// consumers drop events left over from an abandoned source.
    pub generation: u32,
}

impl Event {
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            generation: 0,
        }
    }

    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }
}

/// Handle to one listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
struct Registration {
    id: ListenerId,
    target: NodeId,
    event_type: EventType,
}

/// Listener registry (addEventListener / removeEventListener)
#[derive(Debug, Default)]
pub struct EventListeners {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `event_type` on `target`
    pub fn add(&mut self, target: NodeId, event_type: EventType) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration { id, target, event_type });
        id
    }

    /// Remove a registration; false if it was already gone
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        before != self.registrations.len()
    }

    /// Drop every listener on `target`
    pub fn remove_all_for(&mut self, target: NodeId) -> usize {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.target != target);
        before - self.registrations.len()
    }

    /// Listeners an event of `event_type` on `target` reaches, in
    /// registration order
    pub fn listeners_for(&self, target: NodeId, event_type: EventType) -> Vec<ListenerId> {
        self.registrations
            .iter()
            .filter(|r| r.target == target && r.event_type == event_type)
            .map(|r| r.id)
            .collect()
    }

    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.registrations.iter().any(|r| r.id == id)
    }

    /// Number of listeners attached to `target`
    pub fn count_for(&self, target: NodeId) -> usize {
        self.registrations.iter().filter(|r| r.target == target).count()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
