//! Electricity tab: country price picker and the cost table.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use eep_core::gui::{ElementKind, ElementSpec};
use eep_core::id::{ElementId, PlayerId};
use eep_core::widgets::{Button, Dropdown, TextField};
use eep_data::{CUSTOM_COUNTRY, Country};

use crate::context::OverlayContext;
use crate::error::OverlayError;
use crate::pricing::{electricity_estimate, format_amount, parse_price};
use crate::table::PriceTable;
use crate::warn_on_error;

pub const ELECTRICITY_TAB_NAME: &str = "eep.main-window.tabs.electricity";
const PRICES_TABLE_NAME: &str = "eep.main-window.tabs.electricity.prices";
const CUSTOM_PRICE_NAME: &str = "eep.main-window.tabs.electricity.custom-price";

#[derive(Debug)]
pub struct ElectricityTab {
    ctx: OverlayContext,
    player: PlayerId,
    country: Dropdown,
    price_field: TextField,
    refresh: Button,
    table: PriceTable,
    /// Watts per tick by precision index, sampled on open and on refresh.
    flow: RefCell<BTreeMap<u8, f64>>,
}

impl ElectricityTab {
    pub fn new(
        ctx: &OverlayContext,
        player: PlayerId,
        content: ElementId,
    ) -> Result<Rc<Self>, OverlayError> {
        let ui = &ctx.ui;
        let top = ui
            .gui
            .borrow_mut()
            .add(content, ElementSpec::new(ElementKind::Flow))?;
        let country = Dropdown::new(
            ui,
            top,
            ElementSpec::new(ElementKind::DropDown).items(ctx.config.country_names()),
        )?;
        let price_field = TextField::new(
            ui,
            top,
            ElementSpec::new(ElementKind::TextField)
                .name(CUSTOM_PRICE_NAME)
                .numeric(),
        )?;
        let refresh = Button::new(
            ui,
            top,
            ElementSpec::new(ElementKind::Button).caption("Refresh data"),
        )?;

        let body = ui
            .gui
            .borrow_mut()
            .add(content, ElementSpec::new(ElementKind::Flow))?;
        let table = PriceTable::new(&ui.gui, body, PRICES_TABLE_NAME, &ctx.config.timescales)?;

        let tab = Rc::new(Self {
            ctx: ctx.clone(),
            player,
            country,
            price_field,
            refresh,
            table,
            flow: RefCell::new(BTreeMap::new()),
        });
        tab.sample_flow();
        tab.listen();

        let selected = ctx
            .state
            .borrow_mut()
            .electricity(player)
            .selected_country
            .clone();
        tab.select_country(&selected)?;
        Ok(tab)
    }

    fn listen(self: &Rc<Self>) {
        let this = Rc::downgrade(self);
        self.country.on_selection_changed(move |changed| {
            if let Some(tab) = this.upgrade()
                && let Some(name) = &changed.selected_value
            {
                warn_on_error(tab.player, "select country", tab.select_country(name));
            }
        });

        let this = Rc::downgrade(self);
        self.refresh.on_click(move |_| {
            if let Some(tab) = this.upgrade() {
                warn_on_error(tab.player, "refresh electricity", tab.refresh());
            }
        });

        let this = Rc::downgrade(self);
        self.price_field.on_text_changed(move |event| {
            if let Some(tab) = this.upgrade() {
                warn_on_error(
                    tab.player,
                    "set custom price",
                    tab.set_custom_price(&event.text),
                );
            }
        });
    }

    /// The selected country, falling back to the custom one when the saved
    /// name no longer exists in the configuration.
    pub fn selected_country(&self) -> Option<Country> {
        let name = self
            .ctx
            .state
            .borrow_mut()
            .electricity(self.player)
            .selected_country
            .clone();
        let config = &self.ctx.config;
        config
            .country(&name)
            .or_else(|| config.custom_country())
            .cloned()
    }

    pub fn select_country(&self, name: &str) -> Result<(), OverlayError> {
        let config = &self.ctx.config;
        let Some(country) = config.country(name).or_else(|| config.custom_country()) else {
            return Ok(());
        };

        let price = {
            let mut state = self.ctx.state.borrow_mut();
            let electricity = state.electricity(self.player);
            electricity.selected_country = country.name.clone();
            if country.is_custom() {
                electricity.custom_price
            } else {
                country.price_per_kwh
            }
        };
        self.price_field.set_text(price.to_string())?;
        self.country.set_selected_value(Some(&country.name))?;
        self.update_rows()
    }

    /// Typing a price switches to the custom country. Text that is not a
    /// valid price is ignored.
    pub fn set_custom_price(&self, text: &str) -> Result<(), OverlayError> {
        let Some(price) = parse_price(text) else {
            return Ok(());
        };

        if !self.selected_country().is_some_and(|c| c.is_custom()) {
            self.select_country(CUSTOM_COUNTRY)?;
            self.price_field.set_text(text)?;
        }

        self.ctx
            .state
            .borrow_mut()
            .electricity(self.player)
            .custom_price = price;
        self.update_rows()
    }

    pub fn refresh(&self) -> Result<(), OverlayError> {
        self.sample_flow();
        self.update_rows()
    }

    fn sample_flow(&self) {
        let flow = self
            .ctx
            .config
            .timescales
            .iter()
            .map(|ts| {
                let index = ts.precision_index;
                (index, self.ctx.stats.electric_flow(self.player, index))
            })
            .collect();
        *self.flow.borrow_mut() = flow;
    }

    fn update_rows(&self) -> Result<(), OverlayError> {
        let Some(country) = self.selected_country() else {
            return Ok(());
        };
        let price = if country.is_custom() {
            self.ctx
                .state
                .borrow_mut()
                .electricity(self.player)
                .custom_price
        } else {
            country.price_per_kwh
        };
        let custom_currency = self.ctx.settings.borrow().custom_currency(self.player);
        let currency = country.currency_or(&custom_currency);

        let flow = self.flow.borrow();
        self.table.update(|timescale| {
            let watts = flow.get(&timescale.precision_index).copied().unwrap_or(0.0);
            let estimate = electricity_estimate(watts, timescale, price);
            (
                format_amount(estimate.watt_hours, "Wh"),
                format_amount(estimate.cost, currency),
            )
        })?;
        Ok(())
    }

    pub fn country_dropdown(&self) -> &Dropdown {
        &self.country
    }

    pub fn price_field(&self) -> &TextField {
        &self.price_field
    }

    pub fn refresh_button(&self) -> &Button {
        &self.refresh
    }

    /// `(timescale, amount, price)` captions of every row.
    pub fn price_rows(&self) -> Vec<(String, String, String)> {
        self.table.captions()
    }
}
