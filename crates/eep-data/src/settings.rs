//! Runtime per-player settings.
//!
//! Two settings exist: the currency shown for the custom country and how many
//! fluid units make up one litre. Players override the defaults individually.

use std::collections::HashMap;
use std::fmt;

use eep_core::id::PlayerId;

/// Smallest accepted `units-per-litre` value.
pub const UNITS_PER_LITRE_MINIMUM: f64 = 0.0001;

// ===========================================================================
// Names and values
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingName {
    CustomCurrency,
    UnitsPerLitre,
}

impl SettingName {
    pub const ALL: [SettingName; 2] = [SettingName::CustomCurrency, SettingName::UnitsPerLitre];

    /// The key the game uses for this setting.
    pub fn key(self) -> &'static str {
        match self {
            SettingName::CustomCurrency => "ekranos:eep:custom-currency",
            SettingName::UnitsPerLitre => "ekranos:eep:units-per-litre",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.key() == key)
    }
}

impl fmt::Display for SettingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    String(String),
    Double(f64),
}

impl SettingValue {
    fn type_name(&self) -> &'static str {
        match self {
            SettingValue::String(_) => "string",
            SettingValue::Double(_) => "double",
        }
    }
}

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("setting {setting} expects a {expected} value, got {found}")]
    WrongType {
        setting: SettingName,
        expected: &'static str,
        found: &'static str,
    },

    #[error("setting {setting} must be at least {minimum}, got {value}")]
    BelowMinimum {
        setting: SettingName,
        value: f64,
        minimum: f64,
    },

    #[error("unknown setting '{0}'")]
    Unknown(String),
}

// ===========================================================================
// Defaults
// ===========================================================================

/// Values used for players who have not changed a setting.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingDefaults {
    pub custom_currency: String,
    pub units_per_litre: f64,
}

impl Default for SettingDefaults {
    fn default() -> Self {
        Self {
            custom_currency: "€".to_string(),
            units_per_litre: 3.0,
        }
    }
}

// ===========================================================================
// Store
// ===========================================================================

/// Per-player setting values layered over shared defaults.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    defaults: SettingDefaults,
    overrides: HashMap<(PlayerId, SettingName), SettingValue>,
}

impl SettingsStore {
    pub fn new(defaults: SettingDefaults) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    pub fn defaults(&self) -> &SettingDefaults {
        &self.defaults
    }

    /// The effective value of `name` for `player`.
    pub fn get(&self, player: PlayerId, name: SettingName) -> SettingValue {
        if let Some(value) = self.overrides.get(&(player, name)) {
            return value.clone();
        }
        match name {
            SettingName::CustomCurrency => {
                SettingValue::String(self.defaults.custom_currency.clone())
            }
            SettingName::UnitsPerLitre => SettingValue::Double(self.defaults.units_per_litre),
        }
    }

    /// Override `name` for `player` after checking the value's type and range.
    pub fn set(
        &mut self,
        player: PlayerId,
        name: SettingName,
        value: SettingValue,
    ) -> Result<(), SettingsError> {
        match (name, &value) {
            (SettingName::CustomCurrency, SettingValue::String(_)) => {}
            (SettingName::UnitsPerLitre, SettingValue::Double(v)) => {
                if v.is_nan() || *v < UNITS_PER_LITRE_MINIMUM {
                    return Err(SettingsError::BelowMinimum {
                        setting: name,
                        value: *v,
                        minimum: UNITS_PER_LITRE_MINIMUM,
                    });
                }
            }
            (_, other) => {
                return Err(SettingsError::WrongType {
                    setting: name,
                    expected: match name {
                        SettingName::CustomCurrency => "string",
                        SettingName::UnitsPerLitre => "double",
                    },
                    found: other.type_name(),
                });
            }
        }

        tracing::debug!(?player, setting = %name, ?value, "player setting changed");
        self.overrides.insert((player, name), value);
        Ok(())
    }

    /// Set a setting addressed by its game key.
    pub fn set_by_key(
        &mut self,
        player: PlayerId,
        key: &str,
        value: SettingValue,
    ) -> Result<(), SettingsError> {
        let name = SettingName::from_key(key).ok_or_else(|| SettingsError::Unknown(key.into()))?;
        self.set(player, name, value)
    }

    /// Drop the player's override so the default applies again.
    pub fn reset(&mut self, player: PlayerId, name: SettingName) {
        self.overrides.remove(&(player, name));
    }

    pub fn custom_currency(&self, player: PlayerId) -> String {
        match self.get(player, SettingName::CustomCurrency) {
            SettingValue::String(currency) => currency,
            SettingValue::Double(_) => self.defaults.custom_currency.clone(),
        }
    }

    pub fn units_per_litre(&self, player: PlayerId) -> f64 {
        match self.get(player, SettingName::UnitsPerLitre) {
            SettingValue::Double(units) => units,
            SettingValue::String(_) => self.defaults.units_per_litre,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P1: PlayerId = PlayerId(1);
    const P2: PlayerId = PlayerId(2);

    #[test]
    fn keys_round_trip() {
        for name in SettingName::ALL {
            assert_eq!(SettingName::from_key(name.key()), Some(name));
        }
        assert_eq!(SettingName::from_key("ekranos:eep:nope"), None);
    }

    #[test]
    fn defaults_apply_until_overridden() {
        let mut store = SettingsStore::default();
        assert_eq!(store.custom_currency(P1), "€");
        assert_eq!(store.units_per_litre(P1), 3.0);

        store
            .set(P1, SettingName::CustomCurrency, SettingValue::String("$".into()))
            .unwrap();
        assert_eq!(store.custom_currency(P1), "$");
        assert_eq!(store.custom_currency(P2), "€");

        store.reset(P1, SettingName::CustomCurrency);
        assert_eq!(store.custom_currency(P1), "€");
    }

    #[test]
    fn units_per_litre_has_a_minimum() {
        let mut store = SettingsStore::default();
        let err = store
            .set(P1, SettingName::UnitsPerLitre, SettingValue::Double(0.0))
            .unwrap_err();
        assert!(matches!(err, SettingsError::BelowMinimum { .. }));
        assert!(
            store
                .set(P1, SettingName::UnitsPerLitre, SettingValue::Double(f64::NAN))
                .is_err()
        );

        store
            .set(
                P1,
                SettingName::UnitsPerLitre,
                SettingValue::Double(UNITS_PER_LITRE_MINIMUM),
            )
            .unwrap();
        assert_eq!(store.units_per_litre(P1), UNITS_PER_LITRE_MINIMUM);
    }

    #[test]
    fn wrong_type_is_rejected() {
        let mut store = SettingsStore::default();
        let err = store
            .set(P1, SettingName::UnitsPerLitre, SettingValue::String("3".into()))
            .unwrap_err();
        assert_eq!(
            err,
            SettingsError::WrongType {
                setting: SettingName::UnitsPerLitre,
                expected: "double",
                found: "string",
            }
        );
    }

    #[test]
    fn set_by_key() {
        let mut store = SettingsStore::default();
        store
            .set_by_key(P1, "ekranos:eep:units-per-litre", SettingValue::Double(1.5))
            .unwrap();
        assert_eq!(store.units_per_litre(P1), 1.5);
        assert!(matches!(
            store.set_by_key(P1, "other", SettingValue::Double(1.0)),
            Err(SettingsError::Unknown(_))
        ));
    }
}
