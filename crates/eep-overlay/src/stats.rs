//! Production statistics the estimates are computed from.
//!
//! The game exposes flow counts per statistics bucket ("precision index").
//! [`FlowStatistics`] is the seam the tabs read through; [`RecordedStatistics`]
//! is an in-memory implementation fed by tests and the headless binary.

use std::cell::RefCell;
use std::collections::HashMap;

use eep_core::id::PlayerId;
use serde::{Deserialize, Serialize};

/// Which side of the fluid statistics to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FlowDirection {
    #[default]
    Production,
    Consumption,
}

impl FlowDirection {
    pub const ALL: [FlowDirection; 2] = [FlowDirection::Production, FlowDirection::Consumption];

    pub fn label(self) -> &'static str {
        match self {
            FlowDirection::Production => "Production",
            FlowDirection::Consumption => "Consumption",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

pub trait FlowStatistics {
    /// Electricity drawn by the player's networks, in watts per tick, averaged
    /// over the bucket `precision_index`.
    fn electric_flow(&self, player: PlayerId, precision_index: u8) -> f64;

    /// Fluid flow in units per minute for the bucket `precision_index`.
    /// `None` when the fluid has never been produced or consumed.
    fn fluid_flow(
        &self,
        player: PlayerId,
        fluid: &str,
        direction: FlowDirection,
        precision_index: u8,
    ) -> Option<f64>;
}

// ---------------------------------------------------------------------------
// RecordedStatistics
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecordedStatistics {
    electric: RefCell<HashMap<(PlayerId, u8), f64>>,
    fluid: RefCell<HashMap<(PlayerId, String, FlowDirection, u8), f64>>,
}

impl RecordedStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_electric(&self, player: PlayerId, precision_index: u8, watts_per_tick: f64) {
        self.electric
            .borrow_mut()
            .insert((player, precision_index), watts_per_tick);
    }

    pub fn record_fluid(
        &self,
        player: PlayerId,
        fluid: &str,
        direction: FlowDirection,
        precision_index: u8,
        units_per_minute: f64,
    ) {
        self.fluid.borrow_mut().insert(
            (player, fluid.to_string(), direction, precision_index),
            units_per_minute,
        );
    }
}

impl FlowStatistics for RecordedStatistics {
    fn electric_flow(&self, player: PlayerId, precision_index: u8) -> f64 {
        self.electric
            .borrow()
            .get(&(player, precision_index))
            .copied()
            .unwrap_or(0.0)
    }

    fn fluid_flow(
        &self,
        player: PlayerId,
        fluid: &str,
        direction: FlowDirection,
        precision_index: u8,
    ) -> Option<f64> {
        self.fluid
            .borrow()
            .get(&(player, fluid.to_string(), direction, precision_index))
            .copied()
    }
}
