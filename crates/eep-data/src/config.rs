//! Resolved overlay configuration.
//!
//! [`OverlayConfig`] is what the overlay actually reads. It is built either
//! from [`OverlayConfig::default`] or from an `overlay` data file via
//! [`load_overlay_config`], which validates names and ranges.

use std::collections::HashSet;
use std::path::Path;

use crate::loader::{DataLoadError, deserialize_file, require_data_file};
use crate::schema::{CountryData, OverlayData, TimescaleData};
use crate::settings::{SettingDefaults, SettingsStore, UNITS_PER_LITRE_MINIMUM};

/// Name of the always-present country whose price the player types in.
pub const CUSTOM_COUNTRY: &str = "Custom";
pub const DEFAULT_FLUID: &str = "crude-oil";
pub const DEFAULT_AUTO_UPDATE_INTERVAL: u64 = 60;
pub const TICKS_PER_SECOND: u64 = 60;
/// Number of flow statistics buckets the game keeps.
pub const PRECISION_INDEX_COUNT: u8 = 8;
/// Base name of the data file inside the data directory.
pub const DATA_FILE: &str = "overlay";

// ===========================================================================
// Country / Timescale
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub price_per_kwh: f64,
    /// `None` for the custom country, whose currency is a player setting.
    pub currency: Option<String>,
}

impl Country {
    fn custom() -> Self {
        Self {
            name: CUSTOM_COUNTRY.to_string(),
            price_per_kwh: 0.0,
            currency: None,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.name == CUSTOM_COUNTRY
    }

    /// The currency to display, falling back to the player's custom currency.
    pub fn currency_or<'a>(&'a self, custom: &'a str) -> &'a str {
        self.currency.as_deref().unwrap_or(custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timescale {
    pub name: String,
    pub ticks: u64,
    pub precision_index: u8,
}

impl Timescale {
    fn new(name: &str, ticks: u64, precision_index: u8) -> Self {
        Self {
            name: name.to_string(),
            ticks,
            precision_index,
        }
    }

    /// 5s, 1m, 10m, 1h, 10h, 50h, 250h and 1000h.
    pub fn standard() -> Vec<Timescale> {
        const MINUTE: u64 = TICKS_PER_SECOND * 60;
        const HOUR: u64 = MINUTE * 60;
        vec![
            Timescale::new("5s", TICKS_PER_SECOND * 5, 0),
            Timescale::new("1m", MINUTE, 1),
            Timescale::new("10m", MINUTE * 10, 2),
            Timescale::new("1h", HOUR, 3),
            Timescale::new("10h", HOUR * 10, 4),
            Timescale::new("50h", HOUR * 50, 5),
            Timescale::new("250h", HOUR * 250, 6),
            Timescale::new("1000h", HOUR * 1000, 7),
        ]
    }

    pub fn hours(&self) -> f64 {
        self.ticks as f64 / (TICKS_PER_SECOND * 60 * 60) as f64
    }

    pub fn minutes(&self) -> f64 {
        self.ticks as f64 / (TICKS_PER_SECOND * 60) as f64
    }
}

// ===========================================================================
// OverlayConfig
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    /// Custom first, then the data file's countries in file order.
    pub countries: Vec<Country>,
    pub timescales: Vec<Timescale>,
    pub default_fluid: String,
    pub auto_update_interval: u64,
    pub settings: SettingDefaults,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            countries: vec![Country::custom()],
            timescales: Timescale::standard(),
            default_fluid: DEFAULT_FLUID.to_string(),
            auto_update_interval: DEFAULT_AUTO_UPDATE_INTERVAL,
            settings: SettingDefaults::default(),
        }
    }
}

impl OverlayConfig {
    /// Validate and resolve raw data. `origin` names the source in errors.
    pub fn from_data(data: OverlayData, origin: &Path) -> Result<Self, DataLoadError> {
        let invalid = |name: &str, field: &'static str, detail: String| {
            DataLoadError::InvalidValue {
                file: origin.to_path_buf(),
                name: name.to_string(),
                field,
                detail,
            }
        };

        let mut config = OverlayConfig::default();

        let mut seen: HashSet<String> = HashSet::from([CUSTOM_COUNTRY.to_string()]);
        for CountryData {
            name,
            price,
            currency,
        } in data.countries
        {
            if !seen.insert(name.clone()) {
                return Err(DataLoadError::DuplicateName {
                    file: origin.to_path_buf(),
                    kind: "country",
                    name,
                });
            }
            if !price.is_finite() || price < 0.0 {
                return Err(invalid(&name, "price", format!("{price} is not a valid price")));
            }
            config.countries.push(Country {
                name,
                price_per_kwh: price,
                currency: Some(currency),
            });
        }

        if let Some(timescales) = data.timescales {
            if timescales.is_empty() {
                return Err(invalid("timescales", "timescales", "list is empty".into()));
            }
            let mut seen = HashSet::new();
            config.timescales = Vec::with_capacity(timescales.len());
            for TimescaleData {
                name,
                ticks,
                precision_index,
            } in timescales
            {
                if !seen.insert(name.clone()) {
                    return Err(DataLoadError::DuplicateName {
                        file: origin.to_path_buf(),
                        kind: "timescale",
                        name,
                    });
                }
                if ticks == 0 {
                    return Err(invalid(&name, "ticks", "must be positive".into()));
                }
                if precision_index >= PRECISION_INDEX_COUNT {
                    return Err(invalid(
                        &name,
                        "precision_index",
                        format!("must be below {PRECISION_INDEX_COUNT}"),
                    ));
                }
                config.timescales.push(Timescale {
                    name,
                    ticks,
                    precision_index,
                });
            }
        }

        if let Some(fluid) = data.default_fluid {
            config.default_fluid = fluid;
        }

        if let Some(interval) = data.auto_update_interval {
            if interval == 0 {
                return Err(invalid(
                    "auto_update_interval",
                    "auto_update_interval",
                    "must be positive".into(),
                ));
            }
            config.auto_update_interval = interval;
        }

        if let Some(currency) = data.settings.custom_currency {
            config.settings.custom_currency = currency;
        }
        if let Some(units) = data.settings.units_per_litre {
            if units.is_nan() || units < UNITS_PER_LITRE_MINIMUM {
                return Err(invalid(
                    "units_per_litre",
                    "units_per_litre",
                    format!("must be at least {UNITS_PER_LITRE_MINIMUM}"),
                ));
            }
            config.settings.units_per_litre = units;
        }

        Ok(config)
    }

    pub fn country(&self, name: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.name == name)
    }

    pub fn custom_country(&self) -> Option<&Country> {
        self.country(CUSTOM_COUNTRY)
    }

    /// Country names in display order.
    pub fn country_names(&self) -> Vec<String> {
        self.countries.iter().map(|c| c.name.clone()).collect()
    }

    pub fn timescale(&self, name: &str) -> Option<&Timescale> {
        self.timescales.iter().find(|t| t.name == name)
    }

    /// A fresh settings store seeded with this configuration's defaults.
    pub fn settings_store(&self) -> SettingsStore {
        SettingsStore::new(self.settings.clone())
    }
}

/// Load `overlay.{ron,toml,json}` from `dir`.
pub fn load_overlay_config(dir: &Path) -> Result<OverlayConfig, DataLoadError> {
    let path = require_data_file(dir, DATA_FILE)?;
    let data: OverlayData = deserialize_file(&path)?;
    let config = OverlayConfig::from_data(data, &path)?;
    tracing::info!(
        file = %path.display(),
        countries = config.countries.len(),
        timescales = config.timescales.len(),
        "loaded overlay config"
    );
    Ok(config)
}
