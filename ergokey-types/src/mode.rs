use serde::{Deserialize, Serialize};

/// Operating mode of the keyboard.
///
/// The mode selects the keymap and the layer discipline. Rep-Key only runs in
/// [`Mode::Typing`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Gaming,
    #[default]
    Typing,
}
