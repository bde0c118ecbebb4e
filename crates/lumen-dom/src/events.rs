//! DOM Events
//!
//! Event objects, listener options and the per-node listener registries.
//! Dispatch itself lives on [`Document`](crate::Document) because listeners
//! receive the document mutably.

use std::collections::HashMap;
use std::rc::Rc;

use crate::{Document, NodeId};

/// Listener callback. Receives the document and the event being dispatched.
pub type EventCallback = Rc<dyn Fn(&mut Document, &mut Event)>;

/// Event handler function ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u64);

/// Options passed to `add_event_listener`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Fire during capture instead of bubble
    pub capture: bool,
    /// Remove after the first invocation
    pub once: bool,
    /// `prevent_default` is ignored inside the listener
    pub passive: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self {
            capture: true,
            ..Self::default()
        }
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn passive(mut self) -> Self {
        self.passive = true;
        self
    }
}

/// Event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// Synthetic event
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    pub(crate) target: Option<NodeId>,
    pub(crate) current_target: Option<NodeId>,
    pub(crate) phase: EventPhase,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_stopped: bool,
    pub(crate) in_passive: bool,
}

impl Event {
    pub fn new(event_type: &str, bubbles: bool, cancelable: bool) -> Self {
        Self {
            event_type: event_type.to_string(),
            bubbles,
            cancelable,
            target: None,
            current_target: None,
            phase: EventPhase::None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_stopped: false,
            in_passive: false,
        }
    }

    /// Bubbling, cancelable event (e.g. `click`)
    pub fn bubbling(event_type: &str) -> Self {
        Self::new(event_type, true, true)
    }

    #[inline]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    #[inline]
    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    #[inline]
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    #[inline]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    #[inline]
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target
    }

    #[inline]
    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    #[inline]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    #[inline]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    #[inline]
    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_stopped
    }

    /// Stop after the current node finishes
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Also skip the remaining listeners on the current node
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_stopped = true;
    }

    /// Record that the default action should not run
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive {
            self.default_prevented = true;
        }
    }

    /// Reset dispatch state so the event object can be dispatched again
    pub(crate) fn begin_dispatch(&mut self, target: NodeId) {
        self.target = Some(target);
        self.current_target = None;
        self.phase = EventPhase::None;
        self.propagation_stopped = false;
        self.immediate_stopped = false;
        self.in_passive = false;
    }

    pub(crate) fn end_dispatch(&mut self) {
        self.current_target = None;
        self.phase = EventPhase::None;
        self.in_passive = false;
    }
}

/// One registration in a listener list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisteredListener {
    pub handler: HandlerId,
    pub once: bool,
    pub passive: bool,
}

/// Capture and bubble listener lists of one node, keyed by event type
#[derive(Debug, Default, Clone)]
pub struct ListenerRegistry {
    capture: HashMap<String, Vec<RegisteredListener>>,
    bubble: HashMap<String, Vec<RegisteredListener>>,
}

impl ListenerRegistry {
    fn phase(&self, capture: bool) -> &HashMap<String, Vec<RegisteredListener>> {
        if capture { &self.capture } else { &self.bubble }
    }

    fn phase_mut(&mut self, capture: bool) -> &mut HashMap<String, Vec<RegisteredListener>> {
        if capture {
            &mut self.capture
        } else {
            &mut self.bubble
        }
    }

    /// Add a listener. Returns false if the same handler is already
    /// registered for this type and phase.
    pub fn add(&mut self, event_type: &str, handler: HandlerId, options: ListenerOptions) -> bool {
        let list = self
            .phase_mut(options.capture)
            .entry(event_type.to_string())
            .or_default();
        if list.iter().any(|l| l.handler == handler) {
            return false;
        }
        list.push(RegisteredListener {
            handler,
            once: options.once,
            passive: options.passive,
        });
        true
    }

    /// Remove a listener, returning whether it was registered
    pub fn remove(&mut self, event_type: &str, handler: HandlerId, capture: bool) -> bool {
        let phase = self.phase_mut(capture);
        let Some(list) = phase.get_mut(event_type) else {
            return false;
        };
        let Some(index) = list.iter().position(|l| l.handler == handler) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            phase.remove(event_type);
        }
        true
    }

    /// Listeners for a type and phase in registration order
    pub fn listeners(&self, event_type: &str, capture: bool) -> &[RegisteredListener] {
        self.phase(capture)
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, event_type: &str, handler: HandlerId, capture: bool) -> bool {
        self.listeners(event_type, capture)
            .iter()
            .any(|l| l.handler == handler)
    }

    pub fn is_empty(&self) -> bool {
        self.capture.is_empty() && self.bubble.is_empty()
    }
}
