//! End-to-end dispatch scenarios through the headless host.
//!
//! Every test installs the engine on a [`ScriptHost`] and fires events the way
//! the game would, so the full subscribe -> install -> fire -> prune path is
//! exercised.

use std::cell::Cell;
use std::rc::Rc;

use eep_core::channel::channels::*;
use eep_core::channel::{ChannelId, GuiClickEvent, TickEvent};
use eep_core::gui::{ElementKind, ElementSpec};
use eep_core::id::PlayerId;
use eep_core::registration::{Callback, HandlerResult, Predicate};
use eep_core::test_utils::*;
use eep_core::widgets::{Button, validity};

// ===========================================================================
// Ordering and unsubscription
// ===========================================================================

/// A, B, C run in order; once B starts unsubscribing C, only A and B run.
#[test]
fn unsubscribe_from_inside_a_callback() {
    let h = Harness::new();
    let log = log();

    let a = recorder::<TickEvent>(&log, "A");
    let c = recorder::<TickEvent>(&log, "C");
    let armed = Rc::new(Cell::new(false));

    let b = {
        let log = Rc::clone(&log);
        let engine = Rc::clone(h.engine());
        let c = c.clone();
        let armed = Rc::clone(&armed);
        Callback::persistent(move |_: &TickEvent| {
            log.borrow_mut().push("B");
            if armed.get() {
                engine.unsubscribe::<OnTick>(&c);
            }
        })
    };

    h.engine().subscribe::<OnTick>(&a, vec![]);
    h.engine().subscribe::<OnTick>(&b, vec![]);
    h.engine().subscribe::<OnTick>(&c, vec![]);
    h.install();

    h.host.advance();
    assert_eq!(*log.borrow(), vec!["A", "B", "C"]);

    log.borrow_mut().clear();
    armed.set(true);
    h.host.advance();
    assert_eq!(*log.borrow(), vec!["A", "B"]);
    assert_eq!(h.engine().registration_count(ChannelId::Tick), 2);
}

/// Owner predicate filters by session without removing the listener.
#[test]
fn ownership_predicate_filters_sessions() {
    let h = Harness::new();
    let log = log();
    let d = recorder::<GuiClickEvent>(&log, "D");
    let is_owner = Predicate::check(|e: &GuiClickEvent| e.player == PlayerId(1));

    h.engine().subscribe::<OnGuiClick>(&d, vec![is_owner]);
    h.install();

    let click = |player| GuiClickEvent {
        player: PlayerId(player),
        element: None,
        tick: 0,
    };

    h.host.fire(click(2));
    assert!(log.borrow().is_empty());
    assert!(h.engine().is_subscribed::<OnGuiClick>(&d));

    h.host.fire(click(1));
    assert_eq!(*log.borrow(), vec!["D"]);
}

/// A validity-guarded listener is dropped once its widget is destroyed.
#[test]
fn destroyed_widget_prunes_listener() {
    let h = Harness::new();
    let log = log();
    let frame = h.element(PlayerId(1), ElementKind::Frame);
    let e = recorder::<TickEvent>(&log, "E");

    h.engine()
        .subscribe::<OnTick>(&e, vec![validity(&h.ui.gui, frame)]);
    h.install();

    h.host.advance();
    assert_eq!(*log.borrow(), vec!["E"]);

    h.destroy(frame);
    h.host.advance();
    assert_eq!(*log.borrow(), vec!["E"]);
    assert!(!h.engine().is_subscribed::<OnTick>(&e));

    h.host.advance();
    assert_eq!(h.engine().registration_count(ChannelId::Tick), 0);
    // The channel keeps its installed handler after being emptied.
    assert!(h.host.has_handler(ChannelId::Tick));
}

/// Two widgets of different players never see each other's clicks.
#[test]
fn widget_listeners_are_isolated_by_owner() {
    let h = Harness::new();
    let hits = [Rc::new(Cell::new(0)), Rc::new(Cell::new(0))];
    let mut buttons = Vec::new();

    for (i, player) in [PlayerId(1), PlayerId(2)].into_iter().enumerate() {
        let root = h.element(player, ElementKind::Flow);
        let button = Button::new(&h.ui, root, ElementSpec::new(ElementKind::Button)).unwrap();
        let counter = Rc::clone(&hits[i]);
        button.on_click(move |_| counter.set(counter.get() + 1));
        buttons.push((player, button));
    }
    h.install();

    // Player 2 "clicks" player 1's button: ownership fails.
    h.host.fire(click(PlayerId(2), buttons[0].1.element()));
    assert_eq!((hits[0].get(), hits[1].get()), (0, 0));

    h.host.fire(click(PlayerId(1), buttons[0].1.element()));
    h.host.fire(click(PlayerId(2), buttons[1].1.element()));
    assert_eq!((hits[0].get(), hits[1].get()), (1, 1));
}

/// Remove-me from one listener and stale from another in the same pass do
/// not disturb a third listener between them.
#[test]
fn mixed_removals_in_one_pass() {
    let h = Harness::new();
    let log = log();
    let frame = h.element(PlayerId(1), ElementKind::Frame);

    h.engine()
        .subscribe::<OnTick>(&one_shot(&log, "once"), vec![]);
    h.engine()
        .subscribe::<OnTick>(&recorder(&log, "stay"), vec![]);
    h.engine()
        .subscribe::<OnTick>(&recorder(&log, "guarded"), vec![validity(&h.ui.gui, frame)]);
    h.install();

    h.destroy(frame);
    h.host.advance();
    h.host.advance();

    assert_eq!(*log.borrow(), vec!["once", "stay", "stay"]);
    assert_eq!(h.engine().registration_count(ChannelId::Tick), 1);
}

/// A listener installing a new channel mid-pass gets its handler immediately
/// and its registration runs from the next firing on.
#[test]
fn install_during_dispatch() {
    let h = Harness::new();
    let log = log();

    let setup = {
        let engine = Rc::clone(h.engine());
        let host = Rc::clone(&h.host);
        let log = Rc::clone(&log);
        Callback::new(move |_: &TickEvent| {
            engine.subscribe::<OnGuiClick>(&recorder(&log, "click"), vec![]);
            engine.subscribe::<OnTick>(&recorder(&log, "late tick"), vec![]);
            engine.install(&*host);
            HandlerResult::Remove
        })
    };
    h.engine().subscribe::<OnTick>(&setup, vec![]);
    h.install();

    h.host.advance();
    assert!(log.borrow().is_empty());
    assert!(h.host.has_handler(ChannelId::GuiClick));

    let button = h.element(PlayerId(1), ElementKind::Button);
    h.host.fire(click(PlayerId(1), button));
    h.host.advance();
    assert_eq!(*log.borrow(), vec!["click", "late tick"]);
}

/// After a host restart the engine is reset, listeners are re-created and
/// install runs again against the fresh registrations.
#[test]
fn reinstall_after_restart() {
    let h = Harness::new();
    let log = log();

    h.engine()
        .subscribe::<OnTick>(&recorder(&log, "before"), vec![]);
    h.install();
    h.host.advance();

    h.host.restart();
    h.engine().reset();
    assert!(!h.host.fire(tick(2)));

    h.engine()
        .subscribe::<OnTick>(&recorder(&log, "after"), vec![]);
    assert_eq!(h.install(), 1);
    h.host.advance();

    assert_eq!(*log.borrow(), vec!["before", "after"]);
}

/// A panicking callback aborts only the current firing.
#[test]
fn panicking_callback_only_ends_current_firing() {
    let h = Harness::new();
    let log = log();
    let exploded = Rc::new(Cell::new(false));

    let bomb = {
        let exploded = Rc::clone(&exploded);
        Callback::persistent(move |_: &TickEvent| {
            if !exploded.replace(true) {
                panic!("listener failure");
            }
        })
    };
    h.engine().subscribe::<OnTick>(&bomb, vec![]);
    h.engine()
        .subscribe::<OnTick>(&recorder(&log, "after bomb"), vec![]);
    h.install();

    let host = Rc::clone(&h.host);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        host.advance();
    }));
    assert!(result.is_err());
    assert!(log.borrow().is_empty());

    h.host.advance();
    assert_eq!(*log.borrow(), vec!["after bomb"]);
    assert_eq!(h.engine().registration_count(ChannelId::Tick), 2);
}
