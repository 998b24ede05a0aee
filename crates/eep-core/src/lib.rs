//! EEP Core -- predicate-gated event subscription and dispatch for the
//! electricity/fluid price overlay.
//!
//! Every interactive element of the overlay (buttons, dropdowns, text fields,
//! tabs, window lifecycle) listens to a small set of host-fired channels
//! through one [`engine::EventEngine`]. Each listener carries its own
//! activation predicates and may deregister itself while the pass that is
//! invoking it is still running.
//!
//! # Listener Lifecycle
//!
//! A registration is created by `subscribe` and leaves the channel table when
//!
//! 1. a predicate reports [`registration::PredicateResult::Stale`] (the
//!    guarded widget or session is gone), or
//! 2. its callback returns [`registration::HandlerResult::Remove`], or
//! 3. the owner calls `unsubscribe` with the same [`registration::Callback`].
//!
//! The first two are applied at the end of the dispatch pass, never while it
//! is still iterating.
//!
//! ```rust,ignore
//! let engine = EventEngine::new();
//! let host = ScriptHost::new();
//! engine.subscribe::<OnTick>(&Callback::persistent(|e| println!("{}", e.tick)), vec![]);
//! engine.install(&host);
//! host.advance();
//! ```
//!
//! # Key Types
//!
//! - [`engine::EventEngine`] -- Channel table, `install`, and the dispatch pass.
//! - [`channel::Event`] / [`channel::Channel`] -- Typed channels and payloads.
//! - [`host::EventHost`] / [`host::ScriptHost`] -- The host runtime seam.
//! - [`gui::Gui`] -- Generational GUI element arena.
//! - [`widgets`] -- Widget wrappers and the validity/ownership/identity adapter.

pub mod channel;
pub mod engine;
pub mod gui;
pub mod host;
pub mod id;
pub mod registration;
pub mod widgets;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
