use std::collections::VecDeque;

use foundation::Revision;

/// Events kept between drains; older ones are dropped first.
pub const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventKind {
    DocumentChanged,
    Rendered,
    RenderSuspended,
    ValidationFailed,
    SearchCompleted,
    SearchFailed,
    PointSelected,
    RouteSkipped,
}

/// Change notification emitted by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub revision: Revision,
    pub kind: EventKind,
    pub message: String,
}

/// Bounded event log.
///
/// Hosts drain it after every action they forward to the session. A host
/// that never drains still sees the latest [`EVENT_CAPACITY`] events.
#[derive(Debug, Default)]
pub struct EventBus {
    events: VecDeque<SessionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    pub fn emit(&mut self, revision: Revision, kind: EventKind, message: impl Into<String>) {
        if self.events.len() == EVENT_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(SessionEvent {
            revision,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &VecDeque<SessionEvent> {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }
}
