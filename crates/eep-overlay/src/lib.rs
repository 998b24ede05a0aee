//! Energy estimation overlay.
//!
//! Adds an "EEP" button to every player's top bar. It opens a window with two
//! tabs that estimate what the factory's electricity use and fluid flow cost
//! over a range of timescales.
//!
//! All interaction runs through the [`eep_core`] event engine. Each listener
//! is guarded by predicates tied to the widget or window it serves, so
//! destroying a window automatically retires its listeners.

pub mod context;
pub mod control;
pub mod electricity_tab;
pub mod error;
pub mod fluid_tab;
pub mod pricing;
pub mod state;
pub mod stats;
pub mod table;
pub mod window;

pub use context::OverlayContext;
pub use control::Overlay;
pub use error::OverlayError;
pub use window::MainWindow;

use eep_core::id::PlayerId;

/// Log a failed listener action. Failures never surface to the player.
pub(crate) fn warn_on_error<T, E>(
    player: PlayerId,
    action: &'static str,
    result: Result<T, E>,
) -> Option<T>
where
    E: Into<OverlayError>,
{
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            let err: OverlayError = err.into();
            tracing::warn!(?player, action, %err, "overlay listener failed");
            None
        }
    }
}
