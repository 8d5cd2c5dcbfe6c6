use super::{DebounceState, DebouncerTrait};
use crate::config::MatrixConfig;
use crate::matrix::KeyState;

/// Per-key counter of consecutive samples disagreeing with the registered state.
///
/// The change is accepted once `samples` consecutive samples disagree, any agreeing
/// sample resets the counter.
pub struct DefaultDebouncer<const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize> {
    counters: [[u8; INPUT_PIN_NUM]; OUTPUT_PIN_NUM],
    samples: u8,
}

impl<const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize> Default for DefaultDebouncer<INPUT_PIN_NUM, OUTPUT_PIN_NUM> {
    fn default() -> Self {
        Self::from_config(&MatrixConfig::default())
    }
}

impl<const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize> DefaultDebouncer<INPUT_PIN_NUM, OUTPUT_PIN_NUM> {
    /// Create a debouncer accepting a change after `samples` consecutive samples, at least 1
    pub fn new(samples: u8) -> Self {
        DefaultDebouncer {
            counters: [[0; INPUT_PIN_NUM]; OUTPUT_PIN_NUM],
            samples: samples.max(1),
        }
    }

    pub fn from_config(config: &MatrixConfig) -> Self {
        Self::new(config.debounce_samples)
    }
}

impl<const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize> DebouncerTrait
    for DefaultDebouncer<INPUT_PIN_NUM, OUTPUT_PIN_NUM>
{
    fn detect_change_with_debounce(
        &mut self,
        in_idx: usize,
        out_idx: usize,
        pin_state: bool,
        key_state: &KeyState,
    ) -> DebounceState {
        let counter = &mut self.counters[out_idx][in_idx];

        // Stable, no debouncing is needed
        if key_state.pressed == pin_state {
            *counter = 0;
            return DebounceState::Ignored;
        }

        *counter = counter.saturating_add(1);
        if *counter >= self.samples {
            *counter = 0;
            DebounceState::Debounced
        } else {
            DebounceState::InProgress
        }
    }
}
