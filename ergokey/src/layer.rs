use embassy_time::Instant;
use heapless::Vec;

use crate::LAYER_STACK_SIZE;
use crate::action::{Binding, LayerId};
use crate::types::mode::Mode;
use crate::types::position::KeyPosition;

/// The base layer, always active at the bottom of the stack
pub const BASE_LAYER: LayerId = 0;

/// Kind of the layer key which created an activation
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerKind {
    Hold,
    Tap,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerActivation {
    /// Position of the layer key, held as long as the activation lives
    pub trigger: KeyPosition,
    pub layer: LayerId,
    pub kind: LayerKind,
    pub pressed_at: Instant,
}

impl LayerActivation {
    pub fn new(trigger: KeyPosition, layer: LayerId, kind: LayerKind, pressed_at: Instant) -> Self {
        Self {
            trigger,
            layer,
            kind,
            pressed_at,
        }
    }
}

/// How active layers take precedence over each other.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerDiscipline {
    /// Activations form a stack, the most recently pushed one wins.
    /// Releasing a key in the middle of the stack only removes its own entry.
    Ordered,
    /// Active layer ids form a flat set, the highest id wins.
    /// Releasing a layer key drops its layer id from the set.
    Unordered,
}

impl LayerDiscipline {
    /// Mode is the only selector of the discipline
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Gaming => LayerDiscipline::Unordered,
            Mode::Typing => LayerDiscipline::Ordered,
        }
    }
}

/// Active layer activations, in push order.
#[derive(Debug, Default)]
pub struct LayerStack {
    activations: Vec<LayerActivation, LAYER_STACK_SIZE>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self { activations: Vec::new() }
    }

    /// Push a new activation on top. Returns false when the stack is full, the activation is then dropped.
    pub fn push(&mut self, activation: LayerActivation) -> bool {
        match self.activations.push(activation) {
            Ok(()) => true,
            Err(a) => {
                warn!("Layer stack is full, ignore layer {} from {:?}", a.layer, a.trigger);
                false
            }
        }
    }

    /// Remove the activation owned by `trigger`.
    ///
    /// In [`LayerDiscipline::Unordered`], every activation of the same layer id is removed as well.
    pub fn remove(&mut self, trigger: KeyPosition, discipline: LayerDiscipline) -> Option<LayerActivation> {
        let idx = self.activations.iter().position(|a| a.trigger == trigger)?;
        let removed = self.activations.remove(idx);
        if discipline == LayerDiscipline::Unordered {
            self.activations.retain(|a| a.layer != removed.layer);
        }
        Some(removed)
    }

    /// Drop every activation, only the base layer remains
    pub fn clear(&mut self) {
        self.activations.clear();
    }

    pub fn activation(&self, trigger: KeyPosition) -> Option<&LayerActivation> {
        self.activations.iter().find(|a| a.trigger == trigger)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerActivation> {
        self.activations.iter()
    }

    pub fn len(&self) -> usize {
        self.activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activations.is_empty()
    }

    /// Whether the layer is active, the base layer always is
    pub fn is_active(&self, layer: LayerId) -> bool {
        layer == BASE_LAYER || self.activations.iter().any(|a| a.layer == layer)
    }

    /// Layer which currently has the highest precedence
    pub fn current_layer(&self, discipline: LayerDiscipline) -> LayerId {
        match discipline {
            LayerDiscipline::Ordered => self.activations.last().map(|a| a.layer),
            LayerDiscipline::Unordered => self.activations.iter().map(|a| a.layer).max(),
        }
        .unwrap_or(BASE_LAYER)
    }

    /// Active layer ids in precedence order, the base layer last.
    fn candidates(&self, discipline: LayerDiscipline) -> Vec<LayerId, { LAYER_STACK_SIZE + 1 }> {
        let mut layers: Vec<LayerId, { LAYER_STACK_SIZE + 1 }> = Vec::new();
        match discipline {
            LayerDiscipline::Ordered => {
                for a in self.activations.iter().rev() {
                    // Capacity covers every activation plus the base layer
                    let _ = layers.push(a.layer);
                }
            }
            LayerDiscipline::Unordered => {
                for a in self.activations.iter() {
                    if !layers.contains(&a.layer) {
                        let _ = layers.push(a.layer);
                    }
                }
                layers.sort_unstable_by(|a, b| b.cmp(a));
            }
        }
        let _ = layers.push(BASE_LAYER);
        layers
    }

    /// Walk the active layers in precedence order and return the first binding which is not transparent.
    ///
    /// If every layer is transparent at this key, [`Binding::No`] at the base layer is returned.
    pub fn resolve<F: Fn(LayerId) -> Binding>(&self, discipline: LayerDiscipline, lookup: F) -> (LayerId, Binding) {
        for layer in self.candidates(discipline) {
            let binding = lookup(layer);
            if !binding.is_transparent() {
                return (layer, binding);
            }
        }
        (BASE_LAYER, Binding::No)
    }
}
