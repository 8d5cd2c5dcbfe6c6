use super::{DebounceState, DebouncerTrait};
use crate::config::MatrixConfig;
use crate::matrix::KeyState;

/// Fast per-key debouncer.
///
/// A change is reported on the first differing sample, then the key is locked for
/// `samples` scans so the bounce that follows is ignored.
pub struct FastDebouncer<const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize> {
    lockout: [[u8; INPUT_PIN_NUM]; OUTPUT_PIN_NUM],
    samples: u8,
}

impl<const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize> Default for FastDebouncer<INPUT_PIN_NUM, OUTPUT_PIN_NUM> {
    fn default() -> Self {
        Self::from_config(&MatrixConfig::default())
    }
}

impl<const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize> FastDebouncer<INPUT_PIN_NUM, OUTPUT_PIN_NUM> {
    /// Create a fast debouncer
    pub fn new(samples: u8) -> Self {
        FastDebouncer {
            lockout: [[0; INPUT_PIN_NUM]; OUTPUT_PIN_NUM],
            samples,
        }
    }

    pub fn from_config(config: &MatrixConfig) -> Self {
        Self::new(config.debounce_samples)
    }
}

impl<const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize> DebouncerTrait
    for FastDebouncer<INPUT_PIN_NUM, OUTPUT_PIN_NUM>
{
    fn detect_change_with_debounce(
        &mut self,
        in_idx: usize,
        out_idx: usize,
        pin_state: bool,
        key_state: &KeyState,
    ) -> DebounceState {
        let lockout = &mut self.lockout[out_idx][in_idx];
        if *lockout > 0 {
            // Still in a debouncing progress
            *lockout -= 1;
            DebounceState::InProgress
        } else if key_state.pressed != pin_state {
            // Trigger the key immediately and start the lockout
            *lockout = self.samples;
            DebounceState::Debounced
        } else {
            DebounceState::Ignored
        }
    }
}
