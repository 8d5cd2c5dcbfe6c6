//! US layout conversion between ASCII and HID keycodes.

use crate::keycode::HidKeyCode;
use crate::modifier::HidModifiers;

/// Keycode plus the modifiers needed to produce an ASCII character.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AsciiToHidEntry {
    pub keycode: HidKeyCode,
    pub modifiers: HidModifiers,
}

impl AsciiToHidEntry {
    pub const NONE: Self = Self {
        keycode: HidKeyCode::No,
        modifiers: HidModifiers::new(),
    };

    const fn plain(keycode: HidKeyCode) -> Self {
        Self {
            keycode,
            modifiers: HidModifiers::new(),
        }
    }

    const fn shifted(keycode: HidKeyCode) -> Self {
        Self {
            keycode,
            modifiers: HidModifiers::LSHIFT,
        }
    }

    pub fn is_none(&self) -> bool {
        self.keycode == HidKeyCode::No
    }
}

const fn entry(c: u8) -> AsciiToHidEntry {
    use HidKeyCode::*;
    match c {
        0x08 => AsciiToHidEntry::plain(Backspace),
        b'\t' => AsciiToHidEntry::plain(Tab),
        b'\n' => AsciiToHidEntry::plain(Enter),
        0x1B => AsciiToHidEntry::plain(Escape),
        b' ' => AsciiToHidEntry::plain(Space),
        b'!' => AsciiToHidEntry::shifted(Kc1),
        b'"' => AsciiToHidEntry::shifted(Quote),
        b'#' => AsciiToHidEntry::shifted(Kc3),
        b'$' => AsciiToHidEntry::shifted(Kc4),
        b'%' => AsciiToHidEntry::shifted(Kc5),
        b'&' => AsciiToHidEntry::shifted(Kc7),
        b'\'' => AsciiToHidEntry::plain(Quote),
        b'(' => AsciiToHidEntry::shifted(Kc9),
        b')' => AsciiToHidEntry::shifted(Kc0),
        b'*' => AsciiToHidEntry::shifted(Kc8),
        b'+' => AsciiToHidEntry::shifted(Equal),
        b',' => AsciiToHidEntry::plain(Comma),
        b'-' => AsciiToHidEntry::plain(Minus),
        b'.' => AsciiToHidEntry::plain(Dot),
        b'/' => AsciiToHidEntry::plain(Slash),
        b'0' => AsciiToHidEntry::plain(Kc0),
        b'1'..=b'9' => match HidKeyCode::from_repr(HidKeyCode::Kc1 as u8 + (c - b'1')) {
            Some(k) => AsciiToHidEntry::plain(k),
            None => AsciiToHidEntry::NONE,
        },
        b':' => AsciiToHidEntry::shifted(Semicolon),
        b';' => AsciiToHidEntry::plain(Semicolon),
        b'<' => AsciiToHidEntry::shifted(Comma),
        b'=' => AsciiToHidEntry::plain(Equal),
        b'>' => AsciiToHidEntry::shifted(Dot),
        b'?' => AsciiToHidEntry::shifted(Slash),
        b'@' => AsciiToHidEntry::shifted(Kc2),
        b'A'..=b'Z' => match HidKeyCode::from_repr(HidKeyCode::A as u8 + (c - b'A')) {
            Some(k) => AsciiToHidEntry::shifted(k),
            None => AsciiToHidEntry::NONE,
        },
        b'[' => AsciiToHidEntry::plain(LeftBracket),
        b'\\' => AsciiToHidEntry::plain(Backslash),
        b']' => AsciiToHidEntry::plain(RightBracket),
        b'^' => AsciiToHidEntry::shifted(Kc6),
        b'_' => AsciiToHidEntry::shifted(Minus),
        b'`' => AsciiToHidEntry::plain(Grave),
        b'a'..=b'z' => match HidKeyCode::from_repr(HidKeyCode::A as u8 + (c - b'a')) {
            Some(k) => AsciiToHidEntry::plain(k),
            None => AsciiToHidEntry::NONE,
        },
        b'{' => AsciiToHidEntry::shifted(LeftBracket),
        b'|' => AsciiToHidEntry::shifted(Backslash),
        b'}' => AsciiToHidEntry::shifted(RightBracket),
        b'~' => AsciiToHidEntry::shifted(Grave),
        0x7F => AsciiToHidEntry::plain(Delete),
        _ => AsciiToHidEntry::NONE,
    }
}

const fn build_table() -> [AsciiToHidEntry; 128] {
    let mut table = [AsciiToHidEntry::NONE; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = entry(i as u8);
        i += 1;
    }
    table
}

/// Indexed by ASCII code. Unmapped control characters hold [`AsciiToHidEntry::NONE`].
pub const ASCII_TO_HID: [AsciiToHidEntry; 128] = build_table();

/// Look up the key stroke producing `c`, `None` for non-ASCII or unmapped characters.
pub fn ascii_to_hid(c: char) -> Option<AsciiToHidEntry> {
    if !c.is_ascii() {
        return None;
    }
    let entry = ASCII_TO_HID[c as usize];
    if entry.is_none() { None } else { Some(entry) }
}

// HID usages from `A` through `Slash`, one row per shift state. Zero marks a key with no ASCII output.
const FIRST_USAGE: u8 = HidKeyCode::A as u8;
const UNSHIFTED: &[u8; 53] = b"abcdefghijklmnopqrstuvwxyz1234567890\n\x1b\x08\t -=[]\\\0;'`,./";
const SHIFTED: &[u8; 53] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ!@#$%^&*()\0\0\0\0\0_+{}|\0:\"~<>?";

/// Decode a key stroke back to ASCII on a US layout.
///
/// Either shift key counts as shifted, other modifiers make the stroke non-ASCII.
pub fn hid_to_ascii(keycode: HidKeyCode, modifiers: HidModifiers) -> Option<u8> {
    let shift = modifiers.left_shift() || modifiers.right_shift();
    let others = modifiers & !(HidModifiers::LSHIFT | HidModifiers::RSHIFT);
    if !others.is_empty() {
        return None;
    }
    if keycode == HidKeyCode::Delete {
        return if shift { None } else { Some(0x7F) };
    }
    let index = (keycode as u8).checked_sub(FIRST_USAGE)? as usize;
    let row = if shift { SHIFTED } else { UNSHIFTED };
    match row.get(index) {
        Some(&0) | None => None,
        Some(&c) => Some(c),
    }
}
