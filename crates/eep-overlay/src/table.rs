//! The three-column "Timeframe / Amount / Price" table both tabs show.

use eep_core::gui::{ElementKind, ElementSpec, GuiError, SharedGui};
use eep_core::id::ElementId;
use eep_data::Timescale;

const HEADERS: [&str; 3] = ["Timeframe", "Amount", "Price"];

#[derive(Debug, Clone)]
pub struct PriceRow {
    pub timescale: Timescale,
    pub amount: ElementId,
    pub price: ElementId,
}

#[derive(Debug, Clone)]
pub struct PriceTable {
    gui: SharedGui,
    pub element: ElementId,
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new(
        gui: &SharedGui,
        parent: ElementId,
        name: &str,
        timescales: &[Timescale],
    ) -> Result<Self, GuiError> {
        let mut g = gui.borrow_mut();
        let element = g.add(
            parent,
            ElementSpec::new(ElementKind::Table)
                .name(name)
                .column_count(HEADERS.len() as u32),
        )?;
        for header in HEADERS {
            g.add(element, ElementSpec::new(ElementKind::Label).caption(header))?;
        }

        let mut rows = Vec::with_capacity(timescales.len());
        for timescale in timescales {
            g.add(
                element,
                ElementSpec::new(ElementKind::Label).caption(&timescale.name),
            )?;
            let amount = g.add(element, ElementSpec::new(ElementKind::Label))?;
            let price = g.add(element, ElementSpec::new(ElementKind::Label))?;
            rows.push(PriceRow {
                timescale: timescale.clone(),
                amount,
                price,
            });
        }
        drop(g);

        Ok(Self {
            gui: gui.clone(),
            element,
            rows,
        })
    }

    /// Rewrite every row's captions from `(amount, price)` pairs.
    pub fn update<F>(&self, mut captions: F) -> Result<(), GuiError>
    where
        F: FnMut(&Timescale) -> (String, String),
    {
        for row in &self.rows {
            let (amount, price) = captions(&row.timescale);
            let mut gui = self.gui.borrow_mut();
            gui.expect_kind_mut(row.amount, ElementKind::Label)?.caption = amount;
            gui.expect_kind_mut(row.price, ElementKind::Label)?.caption = price;
        }
        Ok(())
    }

    /// Current `(timescale, amount, price)` captions, for inspection.
    pub fn captions(&self) -> Vec<(String, String, String)> {
        let gui = self.gui.borrow();
        let caption = |id| gui.get(id).map(|e| e.caption.clone()).unwrap_or_default();
        self.rows
            .iter()
            .map(|row| {
                (
                    row.timescale.name.clone(),
                    caption(row.amount),
                    caption(row.price),
                )
            })
            .collect()
    }
}
