//! The channel table and dispatch engine.
//!
//! Collaborators [`subscribe`](EventEngine::subscribe) callbacks with
//! predicates; [`install`](EventEngine::install) hands the host exactly one
//! low-level handler per channel with registrations; every firing of that
//! handler runs one dispatch pass over the channel.
//!
//! # Dispatch pass
//!
//! 1. Snapshot the channel's registration sequence.
//! 2. For each registration in subscription order, evaluate its predicates.
//!    `Stale` marks it for removal without invoking the callback, `Fail`
//!    skips it, and if every predicate passes the callback runs. A callback
//!    returning [`HandlerResult::Remove`] marks its registration too.
//! 3. After the whole snapshot has been walked, marked registrations are
//!    pruned from the live sequence, survivors keep their relative order.
//!
//! Registrations added during a pass are not part of the snapshot and first
//! run on the next firing. Registrations unsubscribed during a pass are
//! skipped if the pass has not reached them yet.
//!
//! The engine is shared as `Rc<EventEngine>` and is single-threaded. No
//! interior borrow is held while a predicate or callback runs, so callbacks
//! are free to subscribe, unsubscribe and install.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::channel::{CHANNEL_COUNT, Channel, ChannelId, Event};
use crate::host::EventHost;
use crate::registration::{
    Callback, CallbackKey, Eligibility, HandlerResult, Predicate, Registration,
};

// ---------------------------------------------------------------------------
// Channel table
// ---------------------------------------------------------------------------

/// Channel id -> ordered registrations. `None` means no interest yet.
#[derive(Debug)]
struct ChannelTable {
    channels: [Option<Vec<Rc<Registration>>>; CHANNEL_COUNT],
}

impl ChannelTable {
    fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| None),
        }
    }

    fn push(&mut self, channel: ChannelId, registration: Registration) {
        self.channels[channel.index()]
            .get_or_insert_with(Vec::new)
            .push(Rc::new(registration));
    }

    fn get(&self, channel: ChannelId) -> Option<&Vec<Rc<Registration>>> {
        self.channels[channel.index()].as_ref()
    }

    /// Remove the first live registration made with `key`.
    fn remove_first(&mut self, channel: ChannelId, key: CallbackKey) -> bool {
        let Some(registrations) = self.channels[channel.index()].as_mut() else {
            return false;
        };
        let Some(pos) = registrations.iter().position(|r| r.key() == key) else {
            return false;
        };
        let removed = registrations.remove(pos);
        removed.detach();
        true
    }

    /// Drop every registration in `finished`, preserving survivor order.
    fn prune(&mut self, channel: ChannelId, finished: &[Rc<Registration>]) {
        let Some(registrations) = self.channels[channel.index()].as_mut() else {
            return;
        };
        registrations.retain(|r| !finished.iter().any(|f| Rc::ptr_eq(f, r)));
        for registration in finished {
            registration.detach();
        }
    }
}

// ---------------------------------------------------------------------------
// EventEngine
// ---------------------------------------------------------------------------

/// Process-wide registry of event subscriptions. Construct one at startup and
/// hand `Rc` clones to every collaborator that creates listeners.
#[derive(Debug)]
pub struct EventEngine {
    table: RefCell<ChannelTable>,
    /// Channels that already have a host handler.
    installed: [Cell<bool>; CHANNEL_COUNT],
}

impl EventEngine {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            table: RefCell::new(ChannelTable::new()),
            installed: std::array::from_fn(|_| Cell::new(false)),
        })
    }

    /// Register `callback` on channel `C`. Predicates are evaluated in the
    /// given order; an empty list means always eligible.
    ///
    /// Subscribing the same callback twice creates two independent
    /// registrations.
    pub fn subscribe<C: Channel>(
        &self,
        callback: &Callback<C::Payload>,
        predicates: Vec<Predicate<C::Payload>>,
    ) {
        let registration = Registration::typed::<C>(callback, &predicates);
        self.table.borrow_mut().push(C::ID, registration);
    }

    /// Register `callback` on every channel in `channels`, one independent
    /// registration per channel sharing the callback and predicate list.
    pub fn subscribe_many(
        &self,
        channels: &[ChannelId],
        callback: &Callback<Event>,
        predicates: Vec<Predicate<Event>>,
    ) {
        let mut table = self.table.borrow_mut();
        for &channel in channels {
            table.push(channel, Registration::untyped(callback, &predicates));
        }
    }

    /// Remove the first registration of `callback` on channel `C`. Returns
    /// whether one was found; removing an unknown callback is a no-op.
    pub fn unsubscribe<C: Channel>(&self, callback: &Callback<C::Payload>) -> bool {
        self.table.borrow_mut().remove_first(C::ID, callback.key())
    }

    /// Remove the first registration of `callback` on each of `channels`.
    /// Returns how many registrations were removed.
    pub fn unsubscribe_many(&self, channels: &[ChannelId], callback: &Callback<Event>) -> usize {
        let mut table = self.table.borrow_mut();
        let mut removed = 0;
        for &channel in channels {
            if table.remove_first(channel, callback.key()) {
                removed += 1;
            }
        }
        removed
    }

    /// Install a host handler for every channel that has registrations and no
    /// handler yet. Safe to call repeatedly; already installed channels are
    /// left untouched. Returns the number of newly installed channels.
    pub fn install(self: &Rc<Self>, host: &dyn EventHost) -> usize {
        let pending: Vec<ChannelId> = {
            let table = self.table.borrow();
            ChannelId::ALL
                .into_iter()
                .filter(|channel| !self.installed[channel.index()].get())
                .filter(|&channel| table.get(channel).is_some_and(|r| !r.is_empty()))
                .collect()
        };

        for &channel in &pending {
            self.installed[channel.index()].set(true);
            let engine = Rc::downgrade(self);
            host.on_event(
                channel,
                Rc::new(move |event: &Event| {
                    if let Some(engine) = engine.upgrade() {
                        engine.dispatch(event);
                    }
                }),
            );
        }

        pending.len()
    }

    /// Run one dispatch pass for `event` over its channel's registrations.
    pub fn dispatch(&self, event: &Event) {
        let channel = event.channel();
        let snapshot: Vec<Rc<Registration>> = match self.table.borrow().get(channel) {
            Some(registrations) if !registrations.is_empty() => registrations.clone(),
            _ => return,
        };

        let mut finished = Vec::new();
        for registration in &snapshot {
            if registration.is_detached() {
                continue;
            }
            match registration.eligibility(event) {
                Eligibility::Stale => finished.push(Rc::clone(registration)),
                Eligibility::Skip => {}
                Eligibility::Invoke => {
                    if registration.invoke(event) == HandlerResult::Remove {
                        finished.push(Rc::clone(registration));
                    }
                }
            }
        }

        if !finished.is_empty() {
            self.table.borrow_mut().prune(channel, &finished);
        }
    }

    /// Forget every registration and every installed-handler flag. Used when
    /// the host restarts and collaborators re-create their listeners.
    pub fn reset(&self) {
        let mut table = self.table.borrow_mut();
        for registrations in table.channels.iter_mut().flatten() {
            for registration in registrations.iter() {
                registration.detach();
            }
        }
        *table = ChannelTable::new();
        for flag in &self.installed {
            flag.set(false);
        }
    }

    /// Number of live registrations on a channel.
    pub fn registration_count(&self, channel: ChannelId) -> usize {
        self.table.borrow().get(channel).map_or(0, Vec::len)
    }

    /// Whether the channel has ever been subscribed to since the last reset.
    pub fn has_channel(&self, channel: ChannelId) -> bool {
        self.table.borrow().get(channel).is_some()
    }

    /// Whether a host handler has been installed for the channel.
    pub fn is_installed(&self, channel: ChannelId) -> bool {
        self.installed[channel.index()].get()
    }

    /// Whether `callback` has a live registration on channel `C`.
    pub fn is_subscribed<C: Channel>(&self, callback: &Callback<C::Payload>) -> bool {
        let key = callback.key();
        self.table
            .borrow()
            .get(C::ID)
            .is_some_and(|registrations| registrations.iter().any(|r| r.key() == key))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::channels::*;
    use crate::channel::{GuiClickEvent, TickEvent};
    use crate::host::ScriptHost;
    use crate::id::PlayerId;
    use crate::registration::PredicateResult;

    fn tick(n: u64) -> Event {
        TickEvent { tick: n }.into()
    }

    fn recorder(
        log: &Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
    ) -> Callback<TickEvent> {
        let log = Rc::clone(log);
        Callback::persistent(move |_| log.borrow_mut().push(name))
    }

    #[test]
    fn dispatch_runs_in_subscription_order() {
        let engine = EventEngine::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["A", "B", "C"] {
            engine.subscribe::<OnTick>(&recorder(&log, name), vec![]);
        }

        engine.dispatch(&tick(1));
        assert_eq!(*log.borrow(), vec!["A", "B", "C"]);
    }

    #[test]
    fn unsubscribe_removes_first_match_only() {
        let engine = EventEngine::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder(&log, "A");

        engine.subscribe::<OnTick>(&a, vec![]);
        engine.subscribe::<OnTick>(&a, vec![]);
        assert_eq!(engine.registration_count(ChannelId::Tick), 2);

        assert!(engine.unsubscribe::<OnTick>(&a));
        assert_eq!(engine.registration_count(ChannelId::Tick), 1);

        engine.dispatch(&tick(1));
        assert_eq!(*log.borrow(), vec!["A"]);
    }

    #[test]
    fn unsubscribe_unknown_is_noop() {
        let engine = EventEngine::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = recorder(&log, "A");

        assert!(!engine.unsubscribe::<OnTick>(&a));
        engine.subscribe::<OnTick>(&a, vec![]);
        assert!(engine.unsubscribe::<OnTick>(&a));
        assert!(!engine.unsubscribe::<OnTick>(&a));
        assert_eq!(engine.registration_count(ChannelId::Tick), 0);
        assert!(engine.has_channel(ChannelId::Tick));
    }

    #[test]
    fn stale_registration_is_pruned_without_invocation() {
        let engine = EventEngine::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let cb = Callback::<TickEvent>::persistent(move |_| counter.set(counter.get() + 1));

        engine.subscribe::<OnTick>(&cb, vec![Predicate::new(|_| PredicateResult::Stale)]);
        engine.dispatch(&tick(1));

        assert_eq!(calls.get(), 0);
        assert!(!engine.is_subscribed::<OnTick>(&cb));
    }

    #[test]
    fn failed_predicate_skips_but_keeps_registration() {
        let engine = EventEngine::new();
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let cb = Callback::<GuiClickEvent>::persistent(move |_| counter.set(counter.get() + 1));
        let owner = Predicate::check(|e: &GuiClickEvent| e.player == PlayerId(1));

        engine.subscribe::<OnGuiClick>(&cb, vec![owner]);

        let click = |player| -> Event {
            GuiClickEvent {
                player: PlayerId(player),
                element: None,
                tick: 0,
            }
            .into()
        };

        engine.dispatch(&click(2));
        assert_eq!(clicks.get(), 0);
        assert!(engine.is_subscribed::<OnGuiClick>(&cb));

        engine.dispatch(&click(1));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn remove_result_prunes_after_pass() {
        let engine = EventEngine::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let once_log = Rc::clone(&log);
        let once = Callback::<TickEvent>::new(move |_| {
            once_log.borrow_mut().push("once");
            HandlerResult::Remove
        });

        engine.subscribe::<OnTick>(&once, vec![]);
        engine.subscribe::<OnTick>(&recorder(&log, "always"), vec![]);

        engine.dispatch(&tick(1));
        engine.dispatch(&tick(2));

        assert_eq!(*log.borrow(), vec!["once", "always", "always"]);
        assert_eq!(engine.registration_count(ChannelId::Tick), 1);
    }

    #[test]
    fn subscribe_during_pass_waits_for_next_firing() {
        let engine = EventEngine::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_engine = Rc::clone(&engine);
        let inner_log = Rc::clone(&log);
        let spawner = Callback::<TickEvent>::new(move |_| {
            inner_log.borrow_mut().push("spawner");
            inner_engine.subscribe::<OnTick>(&recorder(&inner_log, "spawned"), vec![]);
            HandlerResult::Remove
        });
        engine.subscribe::<OnTick>(&spawner, vec![]);

        engine.dispatch(&tick(1));
        assert_eq!(*log.borrow(), vec!["spawner"]);

        engine.dispatch(&tick(2));
        assert_eq!(*log.borrow(), vec!["spawner", "spawned"]);
    }

    #[test]
    fn subscribe_many_creates_one_registration_per_channel() {
        let engine = EventEngine::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let cb = Callback::<Event>::persistent(move |e| sink.borrow_mut().push(e.channel()));

        engine.subscribe_many(&[ChannelId::Tick, ChannelId::GuiClick], &cb, vec![]);
        assert_eq!(engine.registration_count(ChannelId::Tick), 1);
        assert_eq!(engine.registration_count(ChannelId::GuiClick), 1);

        engine.dispatch(&tick(1));
        engine.dispatch(
            &GuiClickEvent {
                player: PlayerId(1),
                element: None,
                tick: 1,
            }
            .into(),
        );
        assert_eq!(*seen.borrow(), vec![ChannelId::Tick, ChannelId::GuiClick]);

        assert_eq!(
            engine.unsubscribe_many(&[ChannelId::Tick, ChannelId::GuiClick], &cb),
            2
        );
        assert_eq!(
            engine.unsubscribe_many(&[ChannelId::Tick, ChannelId::GuiClick], &cb),
            0
        );
    }

    #[test]
    fn install_is_idempotent_and_skips_empty_channels() {
        let engine = EventEngine::new();
        let host = ScriptHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        assert_eq!(engine.install(&host), 0);

        let a = recorder(&log, "A");
        engine.subscribe::<OnTick>(&a, vec![]);
        assert_eq!(engine.install(&host), 1);
        assert_eq!(engine.install(&host), 0);
        assert!(engine.is_installed(ChannelId::Tick));
        assert!(!engine.is_installed(ChannelId::GuiClick));

        // A channel emptied before its first install never gets a handler.
        let b = Callback::<GuiClickEvent>::persistent(|_| {});
        engine.subscribe::<OnGuiClick>(&b, vec![]);
        engine.unsubscribe::<OnGuiClick>(&b);
        assert_eq!(engine.install(&host), 0);
        assert!(!host.has_handler(ChannelId::GuiClick));

        host.fire(tick(1));
        assert_eq!(*log.borrow(), vec!["A"]);
    }

    #[test]
    fn reset_forgets_registrations_and_installs() {
        let engine = EventEngine::new();
        let host = ScriptHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        engine.subscribe::<OnTick>(&recorder(&log, "A"), vec![]);
        engine.install(&host);
        engine.reset();

        assert!(!engine.has_channel(ChannelId::Tick));
        assert!(!engine.is_installed(ChannelId::Tick));

        engine.subscribe::<OnTick>(&recorder(&log, "B"), vec![]);
        assert_eq!(engine.install(&host), 1);
        host.fire(tick(1));
        assert_eq!(*log.borrow(), vec!["B"]);
    }
}
