//! Assemble the keyboard report from the held bindings.

use heapless::Vec;

use crate::MAX_HELD_KEYS;
use crate::action::Binding;
use crate::descriptor::KeyboardReport;
use crate::keyboard::registry::ActiveBindingRegistry;
use crate::types::keycode::HidKeyCode;
use crate::types::modifier::HidModifiers;
use crate::types::position::KeyPosition;

/// Number of key slots in a boot keyboard report
pub const REPORT_KEY_SLOTS: usize = 6;

/// Union of every modifier held through the registry
pub fn held_modifiers(registry: &ActiveBindingRegistry) -> HidModifiers {
    let mut modifiers = HidModifiers::new();
    for entry in registry.iter() {
        match entry.binding {
            Binding::SendKey(keycode, m) => {
                modifiers |= m | keycode.to_hid_modifiers();
            }
            Binding::Modifier(m) => modifiers |= m,
            _ => {}
        }
    }
    modifiers
}

/// Build the report describing the held keys.
///
/// Keys fill the slots in press order. With more than 6 keys held, every slot is
/// [`HidKeyCode::ErrorRollover`] and the modifier byte is kept. The key at `suppressed`
/// is left out of the key array, its modifiers still count.
pub fn build_report(registry: &ActiveBindingRegistry, suppressed: Option<KeyPosition>) -> KeyboardReport {
    let modifiers = held_modifiers(registry);
    let mut keys: Vec<u8, MAX_HELD_KEYS> = Vec::new();
    for entry in registry.iter() {
        if Some(entry.pos) == suppressed {
            continue;
        }
        if let Binding::SendKey(keycode, _) = entry.binding {
            if keycode.is_modifier() || keycode == HidKeyCode::No {
                continue;
            }
            let code = keycode as u8;
            // Two positions may send the same keycode, the host only needs it once
            if !keys.contains(&code) {
                let _ = keys.push(code);
            }
        }
    }

    let mut keycodes = [0; REPORT_KEY_SLOTS];
    if keys.len() > REPORT_KEY_SLOTS {
        debug!("{} keys held, send rollover report", keys.len());
        keycodes = [HidKeyCode::ErrorRollover as u8; REPORT_KEY_SLOTS];
    } else {
        keycodes[..keys.len()].copy_from_slice(&keys);
    }
    KeyboardReport::new(modifiers.into_bits(), keycodes)
}
