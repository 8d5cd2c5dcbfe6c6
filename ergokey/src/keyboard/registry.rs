//! Bindings of the keys which are currently held.

use heapless::Vec;

use crate::MAX_HELD_KEYS;
use crate::action::{Binding, FunctionFn, LayerId};
use crate::types::position::KeyPosition;

/// Work to do when a held key is released, captured when the key was pressed.
#[derive(Copy, Clone)]
pub enum ReleaseHandler {
    /// Nothing to undo
    Nothing,
    /// Remove the key from the report and stop its repeat
    ReleaseKey,
    /// Remove the modifiers from the report
    ReleaseModifier,
    /// Remove the layer activation owned by the key
    PopLayer(LayerId),
    /// Remove the layer activation, or clear every layer if the key was tapped
    EndLayerTap(LayerId),
    /// Call the release function of a function binding
    Function(FunctionFn),
}

impl ReleaseHandler {
    /// Handler matching a freshly pressed binding
    pub fn for_binding(binding: &Binding) -> Self {
        match binding {
            Binding::SendKey(_, _) => ReleaseHandler::ReleaseKey,
            Binding::Modifier(_) => ReleaseHandler::ReleaseModifier,
            Binding::LayerHold(layer) => ReleaseHandler::PopLayer(*layer),
            Binding::LayerTap(layer) => ReleaseHandler::EndLayerTap(*layer),
            Binding::Function(f) => match f.release {
                Some(release) => ReleaseHandler::Function(release),
                None => ReleaseHandler::Nothing,
            },
            Binding::No | Binding::Transparent | Binding::ModeSwitch(_) => ReleaseHandler::Nothing,
        }
    }
}

impl core::fmt::Debug for ReleaseHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReleaseHandler::Nothing => write!(f, "Nothing"),
            ReleaseHandler::ReleaseKey => write!(f, "ReleaseKey"),
            ReleaseHandler::ReleaseModifier => write!(f, "ReleaseModifier"),
            ReleaseHandler::PopLayer(l) => write!(f, "PopLayer({})", l),
            ReleaseHandler::EndLayerTap(l) => write!(f, "EndLayerTap({})", l),
            ReleaseHandler::Function(func) => write!(f, "Function({:p})", *func as *const ()),
        }
    }
}

impl PartialEq for ReleaseHandler {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReleaseHandler::Nothing, ReleaseHandler::Nothing)
            | (ReleaseHandler::ReleaseKey, ReleaseHandler::ReleaseKey)
            | (ReleaseHandler::ReleaseModifier, ReleaseHandler::ReleaseModifier) => true,
            (ReleaseHandler::PopLayer(a), ReleaseHandler::PopLayer(b))
            | (ReleaseHandler::EndLayerTap(a), ReleaseHandler::EndLayerTap(b)) => a == b,
            (ReleaseHandler::Function(a), ReleaseHandler::Function(b)) => core::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for ReleaseHandler {}

#[cfg(feature = "defmt")]
impl defmt::Format for ReleaseHandler {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ReleaseHandler::Nothing => defmt::write!(f, "Nothing"),
            ReleaseHandler::ReleaseKey => defmt::write!(f, "ReleaseKey"),
            ReleaseHandler::ReleaseModifier => defmt::write!(f, "ReleaseModifier"),
            ReleaseHandler::PopLayer(l) => defmt::write!(f, "PopLayer({})", l),
            ReleaseHandler::EndLayerTap(l) => defmt::write!(f, "EndLayerTap({})", l),
            ReleaseHandler::Function(_) => defmt::write!(f, "Function"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistryEntry {
    pub pos: KeyPosition,
    /// Binding resolved when the key was pressed
    pub binding: Binding,
    pub handler: ReleaseHandler,
}

/// Map from held key position to its pressed binding, kept in press order.
///
/// A position has at most one entry.
#[derive(Debug, Default)]
pub struct ActiveBindingRegistry {
    entries: Vec<RegistryEntry, MAX_HELD_KEYS>,
}

impl ActiveBindingRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a pressed key. Returns the entry back if the position is taken or the registry is full.
    pub fn insert(&mut self, entry: RegistryEntry) -> Result<(), RegistryEntry> {
        if self.contains(entry.pos) {
            return Err(entry);
        }
        self.entries.push(entry)
    }

    /// Remove the entry of a released key
    pub fn take(&mut self, pos: KeyPosition) -> Option<RegistryEntry> {
        let idx = self.entries.iter().position(|e| e.pos == pos)?;
        Some(self.entries.remove(idx))
    }

    pub fn get(&self, pos: KeyPosition) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.pos == pos)
    }

    pub fn contains(&self, pos: KeyPosition) -> bool {
        self.get(pos).is_some()
    }

    /// Entries in press order
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    /// Remove every entry, returning them in press order
    pub fn drain(&mut self) -> Vec<RegistryEntry, MAX_HELD_KEYS> {
        core::mem::take(&mut self.entries)
    }
}
