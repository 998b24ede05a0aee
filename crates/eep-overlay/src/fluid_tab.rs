//! Fluid tab: pick a fluid and a flow direction, price it per litre.
//!
//! Besides the refresh button, the tab refreshes itself on a tick interval
//! while its auto-update checkbox is ticked.

use std::cell::RefCell;
use std::rc::Rc;

use eep_core::channel::TickEvent;
use eep_core::channel::channels::OnTick;
use eep_core::gui::{ElementKind, ElementSpec};
use eep_core::id::{ElementId, PlayerId};
use eep_core::registration::{Callback, Predicate};
use eep_core::widgets::{Button, Checkbox, ChooseElemButton, Dropdown, TextField, validity};

use crate::context::OverlayContext;
use crate::error::OverlayError;
use crate::pricing::{fluid_estimate, format_amount, parse_price};
use crate::stats::FlowDirection;
use crate::table::PriceTable;
use crate::warn_on_error;

pub const FLUID_TAB_NAME: &str = "eep.main-window.tabs.fluid";
const PRICES_TABLE_NAME: &str = "eep.main-window.tabs.fluid.prices";

#[derive(Debug)]
pub struct FluidTab {
    ctx: OverlayContext,
    player: PlayerId,
    direction: Dropdown,
    chooser: ChooseElemButton,
    price_field: TextField,
    refresh: Button,
    auto_update: Checkbox,
    table: PriceTable,
    fluid: RefCell<String>,
}

impl FluidTab {
    pub fn new(
        ctx: &OverlayContext,
        player: PlayerId,
        content: ElementId,
    ) -> Result<Rc<Self>, OverlayError> {
        let ui = &ctx.ui;
        let default_fluid = ctx.config.default_fluid.clone();
        let (initial_price, auto_update) = {
            let mut state = ctx.state.borrow_mut();
            let fluid = state.fluid(player);
            (fluid.price(&default_fluid), fluid.auto_update)
        };

        let top = ui
            .gui
            .borrow_mut()
            .add(content, ElementSpec::new(ElementKind::Flow))?;
        let direction = Dropdown::new(
            ui,
            top,
            ElementSpec::new(ElementKind::DropDown)
                .items(FlowDirection::ALL.map(FlowDirection::label))
                .selected_index(1),
        )?;
        let chooser = ChooseElemButton::new(
            ui,
            top,
            ElementSpec::new(ElementKind::ChooseElemButton),
            Some(&default_fluid),
        )?;
        let price_field = TextField::new(
            ui,
            top,
            ElementSpec::new(ElementKind::TextField)
                .text(initial_price.to_string())
                .numeric(),
        )?;
        let refresh = Button::new(
            ui,
            top,
            ElementSpec::new(ElementKind::Button).caption("Refresh data"),
        )?;
        let auto_update = Checkbox::new(
            ui,
            top,
            ElementSpec::new(ElementKind::Checkbox)
                .caption("Auto update")
                .state(auto_update),
        )?;
        let table = PriceTable::new(&ui.gui, content, PRICES_TABLE_NAME, &ctx.config.timescales)?;

        let tab = Rc::new(Self {
            ctx: ctx.clone(),
            player,
            direction,
            chooser,
            price_field,
            refresh,
            auto_update,
            table,
            fluid: RefCell::new(default_fluid),
        });
        tab.listen(content);

        let (last_fluid, last_direction) = {
            let mut state = ctx.state.borrow_mut();
            let fluid = state.fluid(player);
            (fluid.last_selected_fluid.clone(), fluid.last_direction)
        };
        tab.change_fluid(last_fluid.as_deref())?;
        tab.direction
            .set_selected_value(Some(last_direction.label()))?;
        tab.update()?;
        Ok(tab)
    }

    fn listen(self: &Rc<Self>, content: ElementId) {
        let this = Rc::downgrade(self);
        self.direction.on_selection_changed(move |changed| {
            if let Some(tab) = this.upgrade() {
                let direction = changed
                    .selected_value
                    .as_deref()
                    .and_then(FlowDirection::from_label)
                    .unwrap_or_default();
                warn_on_error(tab.player, "change direction", tab.set_direction(direction));
            }
        });

        let this = Rc::downgrade(self);
        self.chooser.on_elem_changed(move |changed| {
            if let Some(tab) = this.upgrade() {
                warn_on_error(
                    tab.player,
                    "change fluid",
                    tab.change_fluid(changed.value.as_deref()),
                );
            }
        });

        let this = Rc::downgrade(self);
        self.price_field.on_text_changed(move |event| {
            if let Some(tab) = this.upgrade() {
                warn_on_error(tab.player, "set fluid price", tab.set_price(&event.text));
            }
        });

        let this = Rc::downgrade(self);
        self.refresh.on_click(move |_| {
            if let Some(tab) = this.upgrade() {
                warn_on_error(tab.player, "refresh fluids", tab.update());
            }
        });

        let state = Rc::clone(&self.ctx.state);
        let player = self.player;
        self.auto_update.on_changed(move |changed| {
            state.borrow_mut().fluid(player).auto_update = changed.state;
        });

        // Periodic refresh, retired together with the tab's content.
        let this = Rc::downgrade(self);
        let on_tick = Callback::persistent(move |_: &TickEvent| {
            if let Some(tab) = this.upgrade() {
                warn_on_error(tab.player, "auto-update fluids", tab.update());
            }
        });
        let state = Rc::clone(&self.ctx.state);
        let interval = self.ctx.config.auto_update_interval;
        let due = Predicate::check(move |event: &TickEvent| {
            let enabled = state
                .borrow()
                .fluid
                .get(&player)
                .is_none_or(|fluid| fluid.auto_update);
            enabled && event.tick % interval == 0
        });
        self.ctx
            .ui
            .events
            .subscribe::<OnTick>(&on_tick, vec![validity(&self.ctx.ui.gui, content), due]);
    }

    pub fn fluid(&self) -> String {
        self.fluid.borrow().clone()
    }

    /// Switch to `fluid`, or the configured default when `None`.
    pub fn change_fluid(&self, fluid: Option<&str>) -> Result<(), OverlayError> {
        let fluid = fluid.unwrap_or(&self.ctx.config.default_fluid).to_string();
        let price = {
            let mut state = self.ctx.state.borrow_mut();
            let state = state.fluid(self.player);
            state.last_selected_fluid = Some(fluid.clone());
            state.price(&fluid)
        };
        self.chooser.set_elem_value(Some(&fluid))?;
        self.price_field.set_text(price.to_string())?;
        *self.fluid.borrow_mut() = fluid;
        self.update()
    }

    pub fn set_direction(&self, direction: FlowDirection) -> Result<(), OverlayError> {
        self.ctx.state.borrow_mut().fluid(self.player).last_direction = direction;
        self.update()
    }

    /// Store the price per litre of the current fluid. Invalid text is
    /// ignored.
    pub fn set_price(&self, text: &str) -> Result<(), OverlayError> {
        let Some(price) = parse_price(text) else {
            return Ok(());
        };
        let fluid = self.fluid();
        self.ctx
            .state
            .borrow_mut()
            .fluid(self.player)
            .fluid_prices
            .insert(fluid, price);
        self.update()
    }

    /// Recompute every row from the current statistics.
    pub fn update(&self) -> Result<(), OverlayError> {
        let direction = self
            .direction
            .selected_value()
            .as_deref()
            .and_then(FlowDirection::from_label)
            .unwrap_or_default();
        let fluid = self.fluid();
        let price = self
            .ctx
            .state
            .borrow_mut()
            .fluid(self.player)
            .price(&fluid);
        let (currency, units_per_litre) = {
            let settings = self.ctx.settings.borrow();
            (
                settings.custom_currency(self.player),
                settings.units_per_litre(self.player),
            )
        };

        let stats = &self.ctx.stats;
        self.table.update(|timescale| {
            let flow = stats
                .fluid_flow(self.player, &fluid, direction, timescale.precision_index)
                .unwrap_or(0.0);
            let estimate = fluid_estimate(flow, timescale, price, units_per_litre);
            (
                format_amount(estimate.litres, "L"),
                format_amount(estimate.cost, &currency),
            )
        })?;
        Ok(())
    }

    pub fn direction_dropdown(&self) -> &Dropdown {
        &self.direction
    }

    pub fn fluid_chooser(&self) -> &ChooseElemButton {
        &self.chooser
    }

    pub fn price_field(&self) -> &TextField {
        &self.price_field
    }

    pub fn refresh_button(&self) -> &Button {
        &self.refresh
    }

    pub fn auto_update_checkbox(&self) -> &Checkbox {
        &self.auto_update
    }

    /// `(timescale, amount, price)` captions of every row.
    pub fn price_rows(&self) -> Vec<(String, String, String)> {
        self.table.captions()
    }
}
