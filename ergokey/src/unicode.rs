//! Typing characters as sequences of keyboard reports.
//!
//! ASCII characters map to a single key stroke. Everything else goes through the
//! unicode input method of the host OS, typing the code point in hex.

use heapless::Vec;

use crate::descriptor::KeyboardReport;
use crate::types::ascii::ascii_to_hid;
use crate::types::keycode::HidKeyCode;
use crate::types::modifier::HidModifiers;

/// Max number of reports needed for one character
pub const CHAR_REPORT_MAX: usize = 24;

pub type CharReports = Vec<KeyboardReport, CHAR_REPORT_MAX>;

/// Unicode input method of the host
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnicodeMode {
    /// IBus: `Ctrl+Shift+U`, hex code point, `Space`
    #[default]
    Linux,
    /// "Unicode Hex Input" source: hold `Alt` and type four hex digits per UTF-16 unit
    MacOs,
    /// WinCompose: `RAlt`, `u`, hex code point, `Enter`
    WinCompose,
}

struct Sequence {
    reports: CharReports,
}

impl Sequence {
    fn new() -> Self {
        Self { reports: Vec::new() }
    }

    fn push(&mut self, report: KeyboardReport) {
        // Capacity covers the longest sequence, a surrogate pair on macOS
        let _ = self.reports.push(report);
    }

    /// Press and release `keycode`, with `hold` kept down across both reports
    fn tap(&mut self, keycode: HidKeyCode, modifiers: HidModifiers, hold: HidModifiers) {
        let mut keycodes = [0; 6];
        if !keycode.is_modifier() {
            keycodes[0] = keycode as u8;
        }
        let down = modifiers | hold | keycode.to_hid_modifiers();
        self.push(KeyboardReport::new(down.into_bits(), keycodes));
        self.push(KeyboardReport::new(hold.into_bits(), [0; 6]));
    }

    fn tap_ascii(&mut self, c: u8, hold: HidModifiers) {
        match ascii_to_hid(c as char) {
            Some(entry) => self.tap(entry.keycode, entry.modifiers, hold),
            None => warn!("No key for ascii {}, skip it", c),
        }
    }

    fn type_hex(&mut self, value: u32, min_digits: usize, hold: HidModifiers) {
        let mut digits: Vec<u8, 8> = Vec::new();
        let mut v = value;
        loop {
            let _ = digits.push(HEX_DIGITS[(v & 0xF) as usize]);
            v >>= 4;
            if v == 0 && digits.len() >= min_digits {
                break;
            }
        }
        for d in digits.iter().rev() {
            self.tap_ascii(*d, hold);
        }
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Reports which type `c` on a host using `mode`.
///
/// The sequence starts and ends with no key held, held modifiers are not part of it.
pub fn char_reports(c: char, mode: UnicodeMode) -> CharReports {
    let mut seq = Sequence::new();
    let none = HidModifiers::new();
    if c.is_ascii() {
        seq.tap_ascii(c as u8, none);
        return seq.reports;
    }

    match mode {
        UnicodeMode::Linux => {
            seq.tap(HidKeyCode::U, HidModifiers::LCTRL | HidModifiers::LSHIFT, none);
            seq.type_hex(c as u32, 1, none);
            seq.tap(HidKeyCode::Space, none, none);
        }
        UnicodeMode::MacOs => {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units).iter() {
                seq.type_hex(*unit as u32, 4, HidModifiers::LALT);
            }
            seq.push(KeyboardReport::default());
        }
        UnicodeMode::WinCompose => {
            seq.tap(HidKeyCode::RAlt, none, none);
            seq.tap(HidKeyCode::U, none, none);
            seq.type_hex(c as u32, 1, none);
            seq.tap(HidKeyCode::Enter, none, none);
        }
    }
    seq.reports
}
