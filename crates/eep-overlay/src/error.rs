use eep_core::gui::GuiError;
use eep_data::{DataLoadError, SettingsError};

use crate::state::StateError;

/// Errors raised while building or updating the overlay.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error(transparent)]
    Gui(#[from] GuiError),
    #[error(transparent)]
    Data(#[from] DataLoadError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    State(#[from] StateError),
}
