//! Event dispatcher pieces: the vendor event table, the payload handed to
//! callbacks, and deferred delivery.
//!
//! Correlation and teardown live on `SessionManager::dispatch`, which
//! returns a [`Delivery`] so callbacks run after the manager has finished
//! mutating its state.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::host::AnimationHost;
use crate::ids::SessionId;

/// Normalized lifecycle notification kind.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleKind {
    Start,
    Iteration,
    End,
    Unknown,
}

impl LifecycleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleKind::Start => "start",
            LifecycleKind::Iteration => "iteration",
            LifecycleKind::End => "end",
            LifecycleKind::Unknown => "unknown",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == LifecycleKind::End
    }
}

const VENDOR_EVENTS: &[(&str, LifecycleKind)] = &[
    ("animationstart", LifecycleKind::Start),
    ("webkitAnimationStart", LifecycleKind::Start),
    ("MSAnimationStart", LifecycleKind::Start),
    ("oanimationstart", LifecycleKind::Start),
    ("oAnimationStart", LifecycleKind::Start),
    ("animationiteration", LifecycleKind::Iteration),
    ("webkitAnimationIteration", LifecycleKind::Iteration),
    ("MSAnimationIteration", LifecycleKind::Iteration),
    ("oanimationiteration", LifecycleKind::Iteration),
    ("oAnimationIteration", LifecycleKind::Iteration),
    ("animationend", LifecycleKind::End),
    ("webkitAnimationEnd", LifecycleKind::End),
    ("MSAnimationEnd", LifecycleKind::End),
    ("oanimationend", LifecycleKind::End),
    ("oAnimationEnd", LifecycleKind::End),
];

/// Concrete native event names and the kind each one normalizes to.
#[derive(Debug, Clone)]
pub struct EventTable {
    names: Vec<&'static str>,
    kinds: HashMap<&'static str, LifecycleKind>,
}

impl Default for EventTable {
    fn default() -> Self {
        Self::vendor()
    }
}

impl EventTable {
    /// Unprefixed and vendor-prefixed animation start/iteration/end events.
    pub fn vendor() -> Self {
        Self {
            names: VENDOR_EVENTS.iter().map(|(name, _)| *name).collect(),
            kinds: VENDOR_EVENTS.iter().copied().collect(),
        }
    }

    /// Event names the per-element listener subscribes to.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    pub fn kind(&self, event_type: &str) -> LifecycleKind {
        self.kinds
            .get(event_type)
            .copied()
            .unwrap_or(LifecycleKind::Unknown)
    }
}

/// Payload handed to session callbacks.
pub struct SessionEvent<H: AnimationHost> {
    pub id: SessionId,
    pub kind: LifecycleKind,
    /// The raw native notification.
    pub event: H::Event,
    /// Present only when the session carries a payload.
    pub info: Option<H::Info>,
}

impl<H: AnimationHost> Clone for SessionEvent<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            kind: self.kind,
            event: self.event.clone(),
            info: self.info.clone(),
        }
    }
}

impl<H: AnimationHost> fmt::Debug for SessionEvent<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEvent")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("has_info", &self.info.is_some())
            .finish_non_exhaustive()
    }
}

/// Invoked on every lifecycle notification of a session.
pub type EventCallback<H> = Rc<dyn Fn(&SessionEvent<H>)>;

/// Invoked once on the terminal notification with `success = !cancelled`.
pub type CompletionCallback<H> = Rc<dyn Fn(bool, &SessionEvent<H>)>;

/// Callbacks and payload for one correlated notification. The manager has
/// already applied every state change by the time this exists.
pub struct Delivery<H: AnimationHost> {
    pub payload: SessionEvent<H>,
    on_event: Option<EventCallback<H>>,
    completion: Option<(bool, CompletionCallback<H>)>,
}

impl<H: AnimationHost> Delivery<H> {
    pub(crate) fn new(
        payload: SessionEvent<H>,
        on_event: Option<EventCallback<H>>,
        completion: Option<(bool, CompletionCallback<H>)>,
    ) -> Self {
        Self {
            payload,
            on_event,
            completion,
        }
    }

    /// `Some(success)` when this delivery will run a completion callback.
    pub fn completion(&self) -> Option<bool> {
        self.completion.as_ref().map(|(success, _)| *success)
    }

    /// Run `on_event`, then `on_completion` for terminal notifications.
    pub fn deliver(self) {
        if let Some(cb) = &self.on_event {
            cb(&self.payload);
        }
        if let Some((success, cb)) = &self.completion {
            cb(*success, &self.payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_table_normalizes() {
        let table = EventTable::vendor();
        assert_eq!(table.kind("animationstart"), LifecycleKind::Start);
        assert_eq!(table.kind("webkitAnimationIteration"), LifecycleKind::Iteration);
        assert_eq!(table.kind("MSAnimationEnd"), LifecycleKind::End);
        assert_eq!(table.kind("oanimationend"), LifecycleKind::End);
        assert_eq!(table.kind("transitionend"), LifecycleKind::Unknown);
        assert_eq!(table.names().len(), 15);
    }

    #[test]
    fn kind_names() {
        assert_eq!(LifecycleKind::Iteration.as_str(), "iteration");
        assert!(LifecycleKind::End.is_terminal());
        assert!(!LifecycleKind::Unknown.is_terminal());
        assert_eq!(
            serde_json::to_string(&LifecycleKind::Start).unwrap(),
            "\"start\""
        );
    }
}
