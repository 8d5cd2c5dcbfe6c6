use crate::layer::LayerDiscipline;
use crate::types::mode::Mode;

/// Holds the single active [`Mode`].
///
/// Only the keyboard changes the mode, as the effect of a mode switch binding.
#[derive(Debug, Default)]
pub struct ModeController {
    mode: Mode,
}

impl ModeController {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn current(&self) -> Mode {
        self.mode
    }

    pub(crate) fn set(&mut self, mode: Mode) {
        if self.mode != mode {
            info!("Switch mode: {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    /// Layer discipline of the current mode
    pub fn discipline(&self) -> LayerDiscipline {
        LayerDiscipline::for_mode(self.mode)
    }

    /// Rep-Key only runs in typing mode
    pub fn rep_key_enabled(&self) -> bool {
        self.mode == Mode::Typing
    }
}
