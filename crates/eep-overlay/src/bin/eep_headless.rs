//! Headless overlay session.
//!
//! Runs the overlay against a scripted host with fixed statistics, opens the
//! main window for one player and prints both tabs' tables.
//!
//! Usage: `eep-headless [DATA_DIR]`. Logging follows `RUST_LOG`.

use std::path::Path;
use std::rc::Rc;

use eep_core::channel::GuiClickEvent;
use eep_core::engine::EventEngine;
use eep_core::gui::Gui;
use eep_core::host::ScriptHost;
use eep_core::id::PlayerId;
use eep_core::widgets::UiContext;
use eep_data::{OverlayConfig, load_overlay_config};
use eep_overlay::control::open_button;
use eep_overlay::stats::{FlowDirection, RecordedStatistics};
use eep_overlay::{Overlay, OverlayContext};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(dir) => load_overlay_config(Path::new(&dir))?,
        None => OverlayConfig::default(),
    };

    let player = PlayerId(1);
    let stats = Rc::new(RecordedStatistics::new());
    for timescale in &config.timescales {
        stats.record_electric(player, timescale.precision_index, 25_000.0);
        stats.record_fluid(
            player,
            &config.default_fluid,
            FlowDirection::Production,
            timescale.precision_index,
            600.0,
        );
    }

    let host = Rc::new(ScriptHost::new());
    let ui = UiContext::new(Gui::shared(), EventEngine::new());
    let ctx = OverlayContext::new(ui, host.clone(), config, stats);
    ctx.add_player(player);
    let overlay = Overlay::init(ctx);

    host.advance();
    let button = open_button(overlay.context(), player).ok_or("open button missing")?;
    host.fire(GuiClickEvent {
        player,
        element: Some(button),
        tick: host.tick(),
    });

    let window = overlay
        .context()
        .window(player)
        .ok_or("main window did not open")?;

    println!("Electricity");
    for (timescale, amount, price) in window.electricity().price_rows() {
        println!("  {timescale:>6}  {amount:>20}  {price:>16}");
    }
    println!("Fluid ({})", window.fluid().fluid());
    for (timescale, amount, price) in window.fluid().price_rows() {
        println!("  {timescale:>6}  {amount:>20}  {price:>16}");
    }
    Ok(())
}
