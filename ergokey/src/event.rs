use embassy_time::Instant;

use crate::types::position::KeyPosition;

/// Direction of a debounced key change
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Pressed,
    Released,
}

impl From<bool> for Edge {
    fn from(pressed: bool) -> Self {
        if pressed { Edge::Pressed } else { Edge::Released }
    }
}

/// A debounced physical key change, produced once per edge by the matrix.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub pos: KeyPosition,
    pub edge: Edge,
    pub timestamp: Instant,
}

impl Transition {
    pub fn new(pos: KeyPosition, edge: Edge, timestamp: Instant) -> Self {
        Self { pos, edge, timestamp }
    }

    /// Transition stamped with the current time
    pub fn now(row: u8, col: u8, pressed: bool) -> Self {
        Self::new(KeyPosition::new(row, col), pressed.into(), Instant::now())
    }
}
