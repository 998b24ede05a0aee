//! Serde structs for the on-disk overlay data file.
//!
//! Everything except the country list is optional; missing sections fall back
//! to the built-in defaults when the file is resolved into an
//! [`OverlayConfig`](crate::config::OverlayConfig).

use serde::Deserialize;

/// Root of `overlay.{ron,toml,json}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlayData {
    #[serde(default)]
    pub countries: Vec<CountryData>,
    /// Replaces the standard timescales when present.
    #[serde(default)]
    pub timescales: Option<Vec<TimescaleData>>,
    #[serde(default)]
    pub settings: SettingDefaultsData,
    #[serde(default)]
    pub default_fluid: Option<String>,
    /// Ticks between auto-updates of the fluid tab.
    #[serde(default)]
    pub auto_update_interval: Option<u64>,
}

/// A country with a fixed electricity price.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryData {
    pub name: String,
    /// Price per kWh.
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimescaleData {
    pub name: String,
    pub ticks: u64,
    /// Flow statistics bucket used for this timescale.
    pub precision_index: u8,
}

/// Overrides for the default values of the per-player settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingDefaultsData {
    #[serde(default)]
    pub custom_currency: Option<String>,
    #[serde(default)]
    pub units_per_litre: Option<f64>,
}
