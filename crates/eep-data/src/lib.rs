//! Data-driven configuration for the energy estimation overlay.
//!
//! Country price tables, timescales and overlay defaults are read from RON,
//! TOML or JSON files. Per-player runtime settings live in [`settings`].

pub mod config;
pub mod loader;
pub mod schema;
pub mod settings;

pub use config::{CUSTOM_COUNTRY, Country, OverlayConfig, Timescale, load_overlay_config};
pub use loader::DataLoadError;
pub use settings::{SettingName, SettingValue, SettingsError, SettingsStore};
