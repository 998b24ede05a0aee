//! Overlay bootstrap and the game-wide listeners.

use eep_core::channel::channels::{OnConfigurationChanged, OnGuiClick, OnPlayerJoined, OnTick};
use eep_core::channel::{ConfigurationChangedEvent, GuiClickEvent, PlayerJoinedEvent, TickEvent};
use eep_core::gui::{ElementKind, ElementSpec, GuiError, GuiRoot};
use eep_core::id::{ElementId, PlayerId, Tick};
use eep_core::registration::{Callback, HandlerResult, Predicate};

use crate::context::OverlayContext;
use crate::error::OverlayError;
use crate::warn_on_error;
use crate::window::{MainWindow, WINDOW_NAME};

pub const OPEN_BUTTON_NAME: &str = "eep.top.open-main-window";
const OPEN_BUTTON_CAPTION: &str = "EEP";

/// The running overlay.
#[derive(Debug)]
pub struct Overlay {
    ctx: OverlayContext,
}

impl Overlay {
    /// Subscribe the overlay's listeners and install them on the host.
    pub fn init(ctx: OverlayContext) -> Self {
        register(&ctx);
        let installed = ctx.install();
        tracing::info!(
            players = ctx.players().len(),
            installed,
            "energy estimation overlay initialised"
        );
        Self { ctx }
    }

    pub fn context(&self) -> &OverlayContext {
        &self.ctx
    }

    /// Re-run initialisation after the host runtime restarted. Window
    /// instances are forgotten; their frames stay in the GUI and are rebuilt
    /// by the bootstrap if they are still the player's opened GUI.
    pub fn reload(&self) {
        self.ctx.windows.borrow_mut().clear();
        self.ctx.ui.events.reset();
        register(&self.ctx);
        let installed = self.ctx.install();
        tracing::info!(installed, "overlay reloaded");
    }

    /// Persist the overlay state.
    pub fn save(&self, tick: Tick) -> Result<Vec<u8>, OverlayError> {
        Ok(self.ctx.state.borrow().save(tick)?)
    }
}

fn register(ctx: &OverlayContext) {
    let events = &ctx.ui.events;

    // First tick: the game world is available, set up every known player.
    let bootstrap = {
        let ctx = ctx.clone();
        Callback::new(move |_: &TickEvent| {
            for player in ctx.players() {
                warn_on_error(player, "create open button", ensure_open_button(&ctx, player));
                warn_on_error(player, "reopen window", reopen_window(&ctx, player));
            }
            HandlerResult::Remove
        })
    };
    events.subscribe::<OnTick>(&bootstrap, vec![]);

    let on_open = {
        let ctx = ctx.clone();
        Callback::persistent(move |event: &GuiClickEvent| {
            let opened = MainWindow::get_or_create(&ctx, event.player);
            warn_on_error(event.player, "open main window", opened);
        })
    };
    events.subscribe::<OnGuiClick>(&on_open, vec![is_open_button(ctx)]);

    let on_joined = {
        let ctx = ctx.clone();
        Callback::persistent(move |event: &PlayerJoinedEvent| {
            ctx.add_player(event.player);
            warn_on_error(
                event.player,
                "create open button",
                ensure_open_button(&ctx, event.player),
            );
        })
    };
    events.subscribe::<OnPlayerJoined>(&on_joined, vec![]);

    let on_configuration_changed = {
        let ctx = ctx.clone();
        Callback::persistent(move |event: &ConfigurationChangedEvent| {
            let players: Vec<PlayerId> = ctx.windows.borrow().keys().copied().collect();
            for player in &players {
                MainWindow::close(&ctx, *player);
            }
            tracing::info!(
                old = ?event.old_version,
                new = ?event.new_version,
                closed = players.len(),
                "configuration changed, windows closed"
            );
        })
    };
    events.subscribe::<OnConfigurationChanged>(&on_configuration_changed, vec![]);
}

fn is_open_button(ctx: &OverlayContext) -> Predicate<GuiClickEvent> {
    let gui = ctx.ui.gui.clone();
    Predicate::check(move |event: &GuiClickEvent| {
        event.element.is_some_and(|element| {
            gui.borrow()
                .get(element)
                .is_some_and(|e| e.name.as_deref() == Some(OPEN_BUTTON_NAME))
        })
    })
}

/// The player's open button, if it exists.
pub fn open_button(ctx: &OverlayContext, player: PlayerId) -> Option<ElementId> {
    let mut gui = ctx.ui.gui.borrow_mut();
    let top = gui.root(player, GuiRoot::Top);
    gui.child_by_name(top, OPEN_BUTTON_NAME)
}

/// Create the open button in the player's top bar unless it already exists.
pub fn ensure_open_button(
    ctx: &OverlayContext,
    player: PlayerId,
) -> Result<ElementId, GuiError> {
    let mut gui = ctx.ui.gui.borrow_mut();
    let top = gui.root(player, GuiRoot::Top);
    let button = match gui.child_by_name(top, OPEN_BUTTON_NAME) {
        Some(button) => button,
        None => gui.add(
            top,
            ElementSpec::new(ElementKind::Button).name(OPEN_BUTTON_NAME),
        )?,
    };
    gui.expect_kind_mut(button, ElementKind::Button)?.caption =
        OPEN_BUTTON_CAPTION.to_string();
    Ok(button)
}

/// Rebuild the window if the player still has it open.
fn reopen_window(ctx: &OverlayContext, player: PlayerId) -> Result<(), OverlayError> {
    let window_open = {
        let gui = ctx.ui.gui.borrow();
        gui.opened(player)
            .and_then(|opened| gui.get(opened))
            .is_some_and(|e| e.name.as_deref() == Some(WINDOW_NAME))
    };
    if window_open {
        MainWindow::get_or_create(ctx, player)?;
    }
    Ok(())
}
