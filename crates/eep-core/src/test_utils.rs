//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::channel::{
    Event, GuiClickEvent, GuiClosedEvent, GuiSelectionChangedEvent, GuiTextChangedEvent, TickEvent,
};
use crate::engine::EventEngine;
use crate::gui::{ElementKind, ElementSpec, Gui, GuiRoot};
use crate::host::ScriptHost;
use crate::id::{ElementId, PlayerId, Tick};
use crate::registration::{Callback, HandlerResult};
use crate::widgets::UiContext;

// ===========================================================================
// Fixtures
// ===========================================================================

/// A fresh engine, host and GUI arena.
pub struct Harness {
    pub ui: UiContext,
    pub host: Rc<ScriptHost>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            ui: UiContext::new(Gui::shared(), EventEngine::new()),
            host: Rc::new(ScriptHost::new()),
        }
    }

    pub fn engine(&self) -> &Rc<EventEngine> {
        &self.ui.events
    }

    /// Install pending channels on the host.
    pub fn install(&self) -> usize {
        self.ui.events.install(&*self.host)
    }

    /// Add a bare element under the player's center root.
    pub fn element(&self, player: PlayerId, kind: ElementKind) -> ElementId {
        let mut gui = self.ui.gui.borrow_mut();
        let root = gui.root(player, GuiRoot::Center);
        gui.add(root, ElementSpec::new(kind))
            .expect("root is always valid")
    }

    pub fn destroy(&self, element: ElementId) {
        self.ui
            .gui
            .borrow_mut()
            .destroy(element)
            .expect("element should be valid");
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Recording callbacks
// ===========================================================================

/// Shared invocation log.
pub type Log = Rc<RefCell<Vec<&'static str>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// A callback that appends `name` to `log` and keeps its registration.
pub fn recorder<P: 'static>(log: &Log, name: &'static str) -> Callback<P> {
    let log = Rc::clone(log);
    Callback::persistent(move |_: &P| log.borrow_mut().push(name))
}

/// A callback that appends `name` to `log` and asks to be removed.
pub fn one_shot<P: 'static>(log: &Log, name: &'static str) -> Callback<P> {
    let log = Rc::clone(log);
    Callback::new(move |_: &P| {
        log.borrow_mut().push(name);
        HandlerResult::Remove
    })
}

// ===========================================================================
// Event constructors
// ===========================================================================

pub fn tick(tick: Tick) -> Event {
    TickEvent { tick }.into()
}

pub fn click(player: PlayerId, element: ElementId) -> Event {
    GuiClickEvent {
        player,
        element: Some(element),
        tick: 0,
    }
    .into()
}

pub fn text_changed(player: PlayerId, element: ElementId, text: &str) -> Event {
    GuiTextChangedEvent {
        player,
        element,
        text: text.to_string(),
        tick: 0,
    }
    .into()
}

pub fn selection_changed(player: PlayerId, element: ElementId) -> Event {
    GuiSelectionChangedEvent {
        player,
        element,
        tick: 0,
    }
    .into()
}

pub fn closed(player: PlayerId, element: ElementId) -> Event {
    GuiClosedEvent {
        player,
        element: Some(element),
        tick: 0,
    }
    .into()
}
