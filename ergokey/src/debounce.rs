use crate::matrix::KeyState;

pub mod default_debouncer;
pub mod fast_debouncer;

/// Debounce rule of the matrix.
///
/// Called once per key per scan with the raw pin sample.
pub trait DebouncerTrait {
    fn detect_change_with_debounce(
        &mut self,
        in_idx: usize,
        out_idx: usize,
        pin_state: bool,
        key_state: &KeyState,
    ) -> DebounceState;
}

/// Debounce state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    /// The sample is a confirmed change, toggle the key
    Debounced,
    /// The sample differs, but isn't confirmed yet
    InProgress,
    /// Nothing to do
    Ignored,
}
