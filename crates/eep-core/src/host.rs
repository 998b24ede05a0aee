//! The seam between the engine and the game's scripting runtime.
//!
//! The real host accepts exactly one handler per channel and calls it once
//! per occurrence. [`ScriptHost`] is a headless stand-in used by tests and by
//! the overlay harness: it stores handlers, fires events into them, and can
//! simulate a runtime restart that forgets every handler.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::channel::{CHANNEL_COUNT, ChannelId, Event, TickEvent};
use crate::id::Tick;

/// A low-level handler the host invokes for every occurrence of a channel.
pub type HostHandler = Rc<dyn Fn(&Event)>;

/// A scripting runtime that delivers events to registered handlers.
pub trait EventHost {
    /// Register the handler for `channel`, replacing any previous one.
    fn on_event(&self, channel: ChannelId, handler: HostHandler);
}

// ---------------------------------------------------------------------------
// ScriptHost
// ---------------------------------------------------------------------------

/// Headless host runtime. Events are delivered synchronously, one at a time.
pub struct ScriptHost {
    handlers: RefCell<[Option<HostHandler>; CHANNEL_COUNT]>,
    tick: Cell<Tick>,
}

impl std::fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let installed: Vec<ChannelId> = ChannelId::ALL
            .into_iter()
            .filter(|c| self.has_handler(*c))
            .collect();
        f.debug_struct("ScriptHost")
            .field("installed", &installed)
            .field("tick", &self.tick.get())
            .finish()
    }
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(std::array::from_fn(|_| None)),
            tick: Cell::new(0),
        }
    }

    /// Deliver an event to its channel's handler. Returns `false` when no
    /// handler is installed for the channel.
    ///
    /// The handler is cloned out before it runs, so it may register further
    /// handlers while executing.
    pub fn fire(&self, event: impl Into<Event>) -> bool {
        let event = event.into();
        let handler = self.handlers.borrow()[event.channel().index()].clone();
        match handler {
            Some(handler) => {
                tracing::trace!(channel = ?event.channel(), tick = event.tick(), "firing event");
                handler(&event);
                true
            }
            None => false,
        }
    }

    /// Advance the game by one tick and fire [`ChannelId::Tick`].
    pub fn advance(&self) -> Tick {
        let tick = self.tick.get() + 1;
        self.tick.set(tick);
        self.fire(TickEvent { tick });
        tick
    }

    /// The current tick.
    pub fn tick(&self) -> Tick {
        self.tick.get()
    }

    pub fn has_handler(&self, channel: ChannelId) -> bool {
        self.handlers.borrow()[channel.index()].is_some()
    }

    /// Number of channels with a handler.
    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().iter().filter(|h| h.is_some()).count()
    }

    /// Simulate a runtime reload: every handler is dropped. The tick counter
    /// survives, as the game state does.
    pub fn restart(&self) {
        tracing::debug!(
            dropped = self.handler_count(),
            "host restarted, handlers dropped"
        );
        *self.handlers.borrow_mut() = std::array::from_fn(|_| None);
    }
}

impl EventHost for ScriptHost {
    fn on_event(&self, channel: ChannelId, handler: HostHandler) {
        let previous = self.handlers.borrow_mut()[channel.index()].replace(handler);
        if previous.is_some() {
            tracing::warn!(?channel, "host handler replaced");
        } else {
            tracing::debug!(?channel, "host handler installed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_without_handler_returns_false() {
        let host = ScriptHost::new();
        assert!(!host.fire(TickEvent { tick: 1 }));
    }

    #[test]
    fn advance_fires_tick() {
        let host = ScriptHost::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        host.on_event(
            ChannelId::Tick,
            Rc::new(move |event: &Event| sink.borrow_mut().push(event.tick())),
        );

        host.advance();
        host.advance();
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(host.tick(), 2);
    }

    #[test]
    fn handler_may_register_while_running() {
        let host = Rc::new(ScriptHost::new());
        let inner = Rc::clone(&host);
        host.on_event(
            ChannelId::Tick,
            Rc::new(move |_: &Event| {
                inner.on_event(ChannelId::GuiClick, Rc::new(|_: &Event| {}));
            }),
        );

        host.advance();
        assert!(host.has_handler(ChannelId::GuiClick));
        assert_eq!(host.handler_count(), 2);
    }

    #[test]
    fn restart_drops_handlers_keeps_tick() {
        let host = ScriptHost::new();
        host.on_event(ChannelId::Tick, Rc::new(|_: &Event| {}));
        host.advance();
        host.restart();
        assert_eq!(host.handler_count(), 0);
        assert_eq!(host.tick(), 1);
    }
}
