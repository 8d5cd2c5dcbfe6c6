use heapless::Vec;

use crate::FUNCTION_EFFECT_MAX_NUM;
use crate::types::keycode::HidKeyCode;
use crate::types::mode::Mode;
use crate::types::modifier::HidModifiers;
use crate::types::position::KeyPosition;

/// Identifier of a layer in the binding table, 0 is the base layer
pub type LayerId = u8;

/// A Binding is the action at a keyboard position under a given mode and layer, stored in keymap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Binding {
    /// No action, the key produces no output.
    #[default]
    No,
    /// Transparent action, next active layer will be checked.
    Transparent,
    /// A key stroke, with the modifiers held together with the key.
    SendKey(HidKeyCode, HidModifiers),
    /// Hold modifiers while the key is held.
    Modifier(HidModifiers),
    /// Activate a layer while the key is held.
    LayerHold(LayerId),
    /// Activate a layer, a quick tap clears every stacked layer on release.
    ///
    /// The tap clears this layer too. Whether a tap should instead leave the tapped
    /// layer active is still an open question.
    LayerTap(LayerId),
    /// Release everything and switch to the mode.
    ModeSwitch(Mode),
    /// User function, called on press and optionally on release.
    Function(KeyFunction),
}

impl Binding {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Binding::Transparent)
    }

    /// Key stroke without modifiers
    pub const fn key(keycode: HidKeyCode) -> Self {
        Binding::SendKey(keycode, HidModifiers::new())
    }
}

/// Signature of the functions of a [`Binding::Function`]
pub type FunctionFn = fn(&mut FunctionContext);

/// Pair of user functions bound to a key.
#[derive(Copy, Clone)]
pub struct KeyFunction {
    pub press: FunctionFn,
    pub release: Option<FunctionFn>,
}

impl KeyFunction {
    pub const fn new(press: FunctionFn, release: Option<FunctionFn>) -> Self {
        Self { press, release }
    }
}

impl core::fmt::Debug for KeyFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyFunction")
            .field("press", &(self.press as *const ()))
            .field("release", &self.release.map(|r| r as *const ()))
            .finish()
    }
}

impl PartialEq for KeyFunction {
    fn eq(&self, other: &Self) -> bool {
        let release_eq = match (self.release, other.release) {
            (Some(a), Some(b)) => core::ptr::fn_addr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        core::ptr::fn_addr_eq(self.press, other.press) && release_eq
    }
}

impl Eq for KeyFunction {}

#[cfg(feature = "defmt")]
impl defmt::Format for KeyFunction {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "KeyFunction(release: {})", self.release.is_some())
    }
}

/// Output requested by a user function, executed after the function returns.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    /// Type a character, non-ASCII characters use the configured unicode input method
    TypeChar(char),
    /// Type every character of the string
    TypeStr(&'static str),
    /// Press and release a key with modifiers
    Tap(HidKeyCode, HidModifiers),
    /// Release everything and switch mode
    SwitchMode(Mode),
}

/// What a user function sees of the keyboard, and where it queues its effects.
#[derive(Debug)]
pub struct FunctionContext {
    /// Current mode
    pub mode: Mode,
    /// Effective layer when the function is called
    pub layer: LayerId,
    /// Position of the key which triggered the function
    pub pos: KeyPosition,
    effects: Vec<Effect, FUNCTION_EFFECT_MAX_NUM>,
}

impl FunctionContext {
    pub fn new(mode: Mode, layer: LayerId, pos: KeyPosition) -> Self {
        Self {
            mode,
            layer,
            pos,
            effects: Vec::new(),
        }
    }

    pub fn type_char(&mut self, c: char) {
        self.push(Effect::TypeChar(c));
    }

    pub fn type_str(&mut self, s: &'static str) {
        self.push(Effect::TypeStr(s));
    }

    pub fn tap(&mut self, keycode: HidKeyCode, modifiers: HidModifiers) {
        self.push(Effect::Tap(keycode, modifiers));
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        self.push(Effect::SwitchMode(mode));
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub(crate) fn into_effects(self) -> Vec<Effect, FUNCTION_EFFECT_MAX_NUM> {
        self.effects
    }

    fn push(&mut self, effect: Effect) {
        if self.effects.push(effect).is_err() {
            warn!("Function effect list is full, dropping {:?}", effect);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn greet(ctx: &mut FunctionContext) {
        ctx.type_str("hi");
        ctx.tap(HidKeyCode::Enter, HidModifiers::new());
    }

    fn flood(ctx: &mut FunctionContext) {
        for _ in 0..FUNCTION_EFFECT_MAX_NUM + 3 {
            ctx.type_char('x');
        }
    }

    #[test]
    fn test_function_context_effects() {
        let mut ctx = FunctionContext::new(Mode::Typing, 0, KeyPosition::new(1, 2));
        greet(&mut ctx);
        assert_eq!(
            ctx.effects(),
            &[Effect::TypeStr("hi"), Effect::Tap(HidKeyCode::Enter, HidModifiers::new())]
        );
    }

    #[test]
    fn test_function_context_overflow() {
        let mut ctx = FunctionContext::new(Mode::Gaming, 0, KeyPosition::new(0, 0));
        flood(&mut ctx);
        assert_eq!(ctx.into_effects().len(), FUNCTION_EFFECT_MAX_NUM);
    }

    #[test]
    fn test_key_function_eq() {
        let a = KeyFunction::new(greet, None);
        assert_eq!(a, KeyFunction::new(greet, None));
        assert_ne!(a, KeyFunction::new(greet, Some(flood)));
        assert_ne!(Binding::Function(a), Binding::Function(KeyFunction::new(flood, None)));
    }
}
