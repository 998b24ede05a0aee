//! The per-player main window.
//!
//! At most one window exists per player. It is found again by name in the
//! player's center area, so a window that survived a script reload is reused
//! instead of duplicated.

use std::rc::Rc;

use eep_core::channel::channels::{OnGuiClosed, OnGuiTabChanged};
use eep_core::channel::{GuiClosedEvent, GuiTabChangedEvent, PlayerEvent};
use eep_core::gui::{ElementKind, ElementSpec, GuiRoot};
use eep_core::id::{ElementId, PlayerId};
use eep_core::registration::{Callback, HandlerResult, Predicate};
use eep_core::widgets::{TabPane, validity};

use crate::context::OverlayContext;
use crate::electricity_tab::{ELECTRICITY_TAB_NAME, ElectricityTab};
use crate::error::OverlayError;
use crate::fluid_tab::{FLUID_TAB_NAME, FluidTab};

pub const WINDOW_NAME: &str = "eep.main-window";
const WINDOW_CAPTION: &str = "Energy Estimation";

#[derive(Debug)]
pub struct MainWindow {
    ctx: OverlayContext,
    player: PlayerId,
    frame: ElementId,
    tabs: TabPane,
    electricity: Rc<ElectricityTab>,
    fluid: Rc<FluidTab>,
    tab_listener: Callback<GuiTabChangedEvent>,
}

impl MainWindow {
    /// The player's window, built and opened on first use.
    pub fn get_or_create(
        ctx: &OverlayContext,
        player: PlayerId,
    ) -> Result<Rc<Self>, OverlayError> {
        if let Some(window) = ctx.window(player) {
            return Ok(window);
        }

        let window = Self::create(ctx, player)?;
        ctx.windows
            .borrow_mut()
            .insert(player, Rc::clone(&window));
        ctx.install();
        tracing::debug!(?player, "main window opened");
        Ok(window)
    }

    fn create(ctx: &OverlayContext, player: PlayerId) -> Result<Rc<Self>, OverlayError> {
        let frame = {
            let mut gui = ctx.ui.gui.borrow_mut();
            let center = gui.root(player, GuiRoot::Center);
            let frame = match gui.child_by_name(center, WINDOW_NAME) {
                Some(frame) => frame,
                None => gui.add(
                    center,
                    ElementSpec::new(ElementKind::Frame)
                        .name(WINDOW_NAME)
                        .caption(WINDOW_CAPTION),
                )?,
            };
            gui.set_opened(player, frame)?;
            gui.clear(frame)?;
            frame
        };

        let tabs = TabPane::new(&ctx.ui, frame, ElementSpec::new(ElementKind::TabbedPane))?;
        let (_, electricity_content) = tabs.add_tab(
            ElementSpec::new(ElementKind::Tab)
                .name(ELECTRICITY_TAB_NAME)
                .caption("Electricity"),
            ElementSpec::new(ElementKind::Flow),
        )?;
        let (_, fluid_content) = tabs.add_tab(
            ElementSpec::new(ElementKind::Tab)
                .name(FLUID_TAB_NAME)
                .caption("Fluids"),
            ElementSpec::new(ElementKind::Flow),
        )?;

        let electricity = ElectricityTab::new(ctx, player, electricity_content)?;
        let fluid = FluidTab::new(ctx, player, fluid_content)?;

        let last_tab = ctx.state.borrow_mut().window(player).selected_tab.clone();
        tabs.set_selected_tab(Some(last_tab.as_deref().unwrap_or(ELECTRICITY_TAB_NAME)))?;

        let state = Rc::clone(&ctx.state);
        let tab_listener = tabs.on_tab_changed(move |changed| {
            state.borrow_mut().window(player).selected_tab = changed.selected_tab.clone();
        });

        let window = Rc::new(Self {
            ctx: ctx.clone(),
            player,
            frame,
            tabs,
            electricity,
            fluid,
            tab_listener,
        });

        let closing = ctx.clone();
        let on_closed = Callback::new(move |_: &GuiClosedEvent| {
            Self::close(&closing, player);
            HandlerResult::Remove
        });
        let mut predicates = window.predicates::<GuiClosedEvent>();
        predicates.push(Predicate::check(move |event: &GuiClosedEvent| {
            event.element == Some(frame)
        }));
        ctx.ui.events.subscribe::<OnGuiClosed>(&on_closed, predicates);

        Ok(window)
    }

    /// Window-scoped guard: stale once the frame is gone, and only this
    /// window's player passes.
    pub fn predicates<P: PlayerEvent + 'static>(&self) -> Vec<Predicate<P>> {
        let player = self.player;
        vec![
            validity(&self.ctx.ui.gui, self.frame),
            Predicate::check(move |event: &P| event.player() == player),
        ]
    }

    /// Close and forget the player's window. Returns whether one was open.
    pub fn close(ctx: &OverlayContext, player: PlayerId) -> bool {
        let window = ctx.windows.borrow_mut().remove(&player);
        match window {
            Some(window) => {
                window.dispose();
                true
            }
            None => false,
        }
    }

    fn dispose(&self) {
        self.ctx
            .ui
            .events
            .unsubscribe::<OnGuiTabChanged>(&self.tab_listener);
        let destroyed = self.ctx.ui.gui.borrow_mut().destroy(self.frame);
        if let Err(err) = destroyed {
            tracing::warn!(player = ?self.player, %err, "main window frame already gone");
        }
        tracing::debug!(player = ?self.player, "main window closed");
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn frame(&self) -> ElementId {
        self.frame
    }

    pub fn tabs(&self) -> &TabPane {
        &self.tabs
    }

    pub fn electricity(&self) -> &Rc<ElectricityTab> {
        &self.electricity
    }

    pub fn fluid(&self) -> &Rc<FluidTab> {
        &self.fluid
    }
}
