use crate::action::{Binding, LayerId};
use crate::layer::{LayerDiscipline, LayerStack};
use crate::types::mode::Mode;
use crate::types::position::KeyPosition;

/// Static binding table, one stack of layers per mode.
///
/// Keymap should be binded to the actual pcb matrix definition. A key stroke uses
/// `(mode, layer, row, col)` to retrieve its binding.
pub struct KeyMap<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Layers used in [`Mode::Gaming`]
    gaming: &'a [[[Binding; COL]; ROW]; NUM_LAYER],
    /// Layers used in [`Mode::Typing`]
    typing: &'a [[[Binding; COL]; ROW]; NUM_LAYER],
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> KeyMap<'a, ROW, COL, NUM_LAYER> {
    pub fn new(gaming: &'a [[[Binding; COL]; ROW]; NUM_LAYER], typing: &'a [[[Binding; COL]; ROW]; NUM_LAYER]) -> Self {
        Self { gaming, typing }
    }

    /// Use the same table for both modes
    pub fn single(layers: &'a [[[Binding; COL]; ROW]; NUM_LAYER]) -> Self {
        Self::new(layers, layers)
    }

    /// `(ROW, COL, NUM_LAYER)` of the table
    pub fn get_keymap_config(&self) -> (usize, usize, usize) {
        (ROW, COL, NUM_LAYER)
    }

    fn layers(&self, mode: Mode) -> &'a [[[Binding; COL]; ROW]; NUM_LAYER] {
        match mode {
            Mode::Gaming => self.gaming,
            Mode::Typing => self.typing,
        }
    }

    /// Fetch the binding at a single layer. Anything outside the table is [`Binding::No`].
    pub fn get_binding_at(&self, mode: Mode, layer: LayerId, pos: KeyPosition) -> Binding {
        self.layers(mode)
            .get(layer as usize)
            .and_then(|l| l.get(pos.row as usize))
            .and_then(|r| r.get(pos.col as usize))
            .copied()
            .unwrap_or(Binding::No)
    }

    /// Resolve the binding of a key through the active layers, skipping transparent entries.
    ///
    /// Returns the layer the binding was found in.
    pub fn resolve(&self, mode: Mode, stack: &LayerStack, pos: KeyPosition) -> (LayerId, Binding) {
        stack.resolve(LayerDiscipline::for_mode(mode), |layer| {
            self.get_binding_at(mode, layer, pos)
        })
    }
}
