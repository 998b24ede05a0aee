//! Per-player overlay state that survives saves and reloads.
//!
//! Snapshots are `bitcode` bytes with a magic/version header, checked before
//! the state is accepted.

use std::collections::BTreeMap;

use eep_core::id::{PlayerId, Tick};
use eep_data::CUSTOM_COUNTRY;
use serde::{Deserialize, Serialize};

use crate::stats::FlowDirection;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying an overlay state snapshot.
pub const STATE_MAGIC: u32 = 0xEE50_0001;

/// Current format version. Increment when breaking the wire format.
pub const STATE_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", STATE_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported state version: expected {}, got {}", STATE_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("state from future version {0} (this build supports up to {STATE_VERSION})")]
    FutureVersion(u32),
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricityState {
    pub selected_country: String,
    pub custom_price: f64,
}

impl Default for ElectricityState {
    fn default() -> Self {
        Self {
            selected_country: CUSTOM_COUNTRY.to_string(),
            custom_price: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidState {
    /// Price per litre, keyed by fluid name.
    pub fluid_prices: BTreeMap<String, f64>,
    pub last_selected_fluid: Option<String>,
    pub last_direction: FlowDirection,
    pub auto_update: bool,
}

impl Default for FluidState {
    fn default() -> Self {
        Self {
            fluid_prices: BTreeMap::new(),
            last_selected_fluid: None,
            last_direction: FlowDirection::Production,
            auto_update: true,
        }
    }
}

impl FluidState {
    pub fn price(&self, fluid: &str) -> f64 {
        self.fluid_prices.get(fluid).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowState {
    /// Name of the tab shown when the window was last used.
    pub selected_tab: Option<String>,
}

/// Everything the overlay remembers, per player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    pub electricity: BTreeMap<PlayerId, ElectricityState>,
    pub fluid: BTreeMap<PlayerId, FluidState>,
    pub window: BTreeMap<PlayerId, WindowState>,
}

impl GlobalState {
    pub fn electricity(&mut self, player: PlayerId) -> &mut ElectricityState {
        self.electricity.entry(player).or_default()
    }

    pub fn fluid(&mut self, player: PlayerId) -> &mut FluidState {
        self.fluid.entry(player).or_default()
    }

    pub fn window(&mut self, player: PlayerId) -> &mut WindowState {
        self.window.entry(player).or_default()
    }

    /// Serialize with a versioned header.
    pub fn save(&self, tick: Tick) -> Result<Vec<u8>, StateError> {
        let snapshot = StateSnapshot {
            header: StateHeader::new(tick),
            state: self.clone(),
        };
        bitcode::serialize(&snapshot).map_err(|e| StateError::Encode(e.to_string()))
    }

    /// Decode a snapshot produced by [`save`](Self::save). Returns the state
    /// and the tick it was saved at.
    pub fn load(data: &[u8]) -> Result<(Self, Tick), StateError> {
        let snapshot: StateSnapshot =
            bitcode::deserialize(data).map_err(|e| StateError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        Ok((snapshot.state, snapshot.header.tick))
    }
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateHeader {
    magic: u32,
    version: u32,
    tick: Tick,
}

impl StateHeader {
    fn new(tick: Tick) -> Self {
        Self {
            magic: STATE_MAGIC,
            version: STATE_VERSION,
            tick,
        }
    }

    fn validate(&self) -> Result<(), StateError> {
        if self.magic != STATE_MAGIC {
            return Err(StateError::InvalidMagic(self.magic));
        }
        if self.version > STATE_VERSION {
            return Err(StateError::FutureVersion(self.version));
        }
        if self.version < STATE_VERSION {
            return Err(StateError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StateSnapshot {
    header: StateHeader,
    state: GlobalState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GlobalState {
        let mut state = GlobalState::default();
        let p = PlayerId(1);
        state.electricity(p).selected_country = "Germany".into();
        state.electricity(p).custom_price = 0.25;
        state.fluid(p).fluid_prices.insert("water".into(), 0.01);
        state.fluid(p).last_direction = FlowDirection::Consumption;
        state.fluid(p).auto_update = false;
        state.window(p).selected_tab = Some("fluid".into());
        state
    }

    #[test]
    fn defaults_match_a_fresh_player() {
        let mut state = GlobalState::default();
        let p = PlayerId(7);
        assert_eq!(state.electricity(p).selected_country, CUSTOM_COUNTRY);
        assert_eq!(state.electricity(p).custom_price, 0.0);
        assert!(state.fluid(p).auto_update);
        assert_eq!(state.fluid(p).price("water"), 0.0);
        assert_eq!(state.window(p).selected_tab, None);
    }

    #[test]
    fn save_and_load_preserve_state_and_tick() {
        let state = sample();
        let bytes = state.save(1234).unwrap();
        let (loaded, tick) = GlobalState::load(&bytes).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(tick, 1234);
    }

    #[test]
    fn header_is_checked() {
        let bad = StateSnapshot {
            header: StateHeader {
                magic: 0xDEAD_BEEF,
                version: STATE_VERSION,
                tick: 0,
            },
            state: GlobalState::default(),
        };
        let bytes = bitcode::serialize(&bad).unwrap();
        assert!(matches!(
            GlobalState::load(&bytes),
            Err(StateError::InvalidMagic(0xDEAD_BEEF))
        ));

        let future = StateSnapshot {
            header: StateHeader {
                magic: STATE_MAGIC,
                version: STATE_VERSION + 1,
                tick: 0,
            },
            state: GlobalState::default(),
        };
        let bytes = bitcode::serialize(&future).unwrap();
        assert!(matches!(
            GlobalState::load(&bytes),
            Err(StateError::FutureVersion(_))
        ));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            GlobalState::load(&[1, 2, 3]),
            Err(StateError::Decode(_))
        ));
    }
}
