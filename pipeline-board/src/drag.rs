//! Drag gesture state machine
//!
//! `Idle -> Dragging -> {Dropped | Cancelled} -> Idle`. One tracker instance
//! follows record drags (containers are categories) and another follows
//! column drags (containers are column indices). The tracker only tracks the
//! gesture; the session decides what a drop means.

use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

/// Current phase of a gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState<I, C> {
    Idle,
    Dragging {
        item: I,
        source: C,
        /// Container under the pointer, for highlighting only
        over: Option<C>,
    },
}

/// How a gesture ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome<I, C> {
    /// Drop or cancel arrived with no gesture active
    NotDragging,
    /// Escape, or released outside any valid target
    Cancelled { item: I },
    /// Released over the container it started in
    Unchanged { item: I, container: C },
    /// Released over a different container
    Moved { item: I, from: C, to: C },
}

#[derive(Debug, Clone)]
pub struct DragTracker<I, C> {
    kind: &'static str,
    state: DragState<I, C>,
}

impl<I, C> DragTracker<I, C>
where
    I: Clone + PartialEq + Debug,
    C: Clone + PartialEq + Debug,
{
    /// `kind` labels log lines ("record", "column")
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState<I, C> {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragging_item(&self) -> Option<&I> {
        match &self.state {
            DragState::Dragging { item, .. } => Some(item),
            DragState::Idle => None,
        }
    }

    pub fn source(&self) -> Option<&C> {
        match &self.state {
            DragState::Dragging { source, .. } => Some(source),
            DragState::Idle => None,
        }
    }

    pub fn over(&self) -> Option<&C> {
        match &self.state {
            DragState::Dragging { over, .. } => over.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Begin a gesture. Ignored (returns false) while one is already active.
    pub fn start(&mut self, item: I, source: C) -> bool {
        if self.is_dragging() {
            debug!(kind = self.kind, ?item, "drag start ignored, gesture already active");
            return false;
        }
        debug!(kind = self.kind, ?item, ?source, "drag started");
        self.state = DragState::Dragging {
            item,
            source: source.clone(),
            over: Some(source),
        };
        true
    }

    /// Update the candidate destination. No effect when idle.
    pub fn hover(&mut self, container: Option<C>) {
        if let DragState::Dragging { over, .. } = &mut self.state {
            *over = container;
        }
    }

    pub fn cancel(&mut self) -> DragOutcome<I, C> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => DragOutcome::NotDragging,
            DragState::Dragging { item, .. } => {
                debug!(kind = self.kind, ?item, "drag cancelled");
                DragOutcome::Cancelled { item }
            }
        }
    }

    /// End the gesture over `destination`; `None` means no valid target.
    pub fn release(&mut self, destination: Option<C>) -> DragOutcome<I, C> {
        let (item, source) = match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Idle => return DragOutcome::NotDragging,
            DragState::Dragging { item, source, .. } => (item, source),
        };

        match destination {
            None => {
                debug!(kind = self.kind, ?item, "dropped outside any target");
                DragOutcome::Cancelled { item }
            }
            Some(to) if to == source => DragOutcome::Unchanged {
                item,
                container: source,
            },
            Some(to) => {
                debug!(kind = self.kind, ?item, from = ?source, ?to, "dropped");
                DragOutcome::Moved {
                    item,
                    from: source,
                    to,
                }
            }
        }
    }
}
