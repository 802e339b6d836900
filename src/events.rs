//! Typed table routing host events to handlers.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Resize,
    Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Scroll { offset: f64 },
    Resize,
    Visibility { hidden: bool, now_ms: f64 },
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::Scroll { .. } => EventKind::Scroll,
            HostEvent::Resize => EventKind::Resize,
            HostEvent::Visibility { .. } => EventKind::Visibility,
        }
    }
}

pub type Handler<C> = fn(&mut C, &HostEvent);

pub struct Subscriptions<C> {
    table: HashMap<EventKind, Vec<Handler<C>>>,
}

impl<C> Default for Subscriptions<C> {
    fn default() -> Self {
        Self {
            table: HashMap::new(),
        }
    }
}

impl<C> Subscriptions<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: Handler<C>) {
        self.table.entry(kind).or_default().push(handler);
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.table.get(&kind).is_some_and(|h| !h.is_empty())
    }

    /// Runs the handlers for the event's kind in subscription order and
    /// returns how many ran.
    pub fn dispatch(&self, ctx: &mut C, event: &HostEvent) -> usize {
        let Some(handlers) = self.table.get(&event.kind()) else {
            return 0;
        };
        for handler in handlers {
            handler(ctx, event);
        }
        handlers.len()
    }
}
