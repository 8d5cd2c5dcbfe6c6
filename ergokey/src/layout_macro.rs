//! Macros to write binding tables.

/// Create a layer in keymap
#[macro_export]
macro_rules! layer {
    ([$([$($x: expr), +]), +]) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `Binding::SendKey(HidKeyCode::A, HidModifiers::new())`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::action::Binding::SendKey(
            $crate::types::keycode::HidKeyCode::$k,
            $crate::types::modifier::HidModifiers::new(),
        )
    };
}

/// Create a key with modifiers, e.g. `wm!(C, LCTRL, LSHIFT)`
#[macro_export]
macro_rules! wm {
    ($k: ident, $($m: ident),+) => {
        $crate::action::Binding::SendKey(
            $crate::types::keycode::HidKeyCode::$k,
            $crate::types::modifier::HidModifiers::new()$(.union($crate::types::modifier::HidModifiers::$m))+,
        )
    };
}

/// Create a shifted key, `ks!(A)` types `A`
#[macro_export]
macro_rules! ks {
    ($k: ident) => {
        $crate::wm!($k, LSHIFT)
    };
}

/// Create a modifier key, e.g. `md!(LCTRL, LALT)`
#[macro_export]
macro_rules! md {
    ($($m: ident),+) => {
        $crate::action::Binding::Modifier(
            $crate::types::modifier::HidModifiers::new()$(.union($crate::types::modifier::HidModifiers::$m))+,
        )
    };
}

/// Create a normal action: `Binding`
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::action::Binding::$a
    };
}

/// Create a layer activate action. For example, `mo!(1)` activates layer 1 while held.
#[macro_export]
macro_rules! mo {
    ($x: literal) => {
        $crate::action::Binding::LayerHold($x)
    };
}

/// Create a layer tap action, a quick tap clears every active layer
#[macro_export]
macro_rules! lt {
    ($x: literal) => {
        $crate::action::Binding::LayerTap($x)
    };
}

/// Create a mode switch action, e.g. `mode!(Gaming)`
#[macro_export]
macro_rules! mode {
    ($m: ident) => {
        $crate::action::Binding::ModeSwitch($crate::types::mode::Mode::$m)
    };
}

/// Create a function action from a press function and an optional release function
#[macro_export]
macro_rules! func {
    ($press: expr) => {
        $crate::action::Binding::Function($crate::action::KeyFunction::new($press, None))
    };
    ($press: expr, $release: expr) => {
        $crate::action::Binding::Function($crate::action::KeyFunction::new($press, Some($release)))
    };
}
