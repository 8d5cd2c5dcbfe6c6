use embassy_time::Duration;

use crate::types::mode::Mode;
use crate::unicode::UnicodeMode;

/// The config struct for an ergokey keyboard.
///
/// The binding tables are not part of the config, they are passed to
/// [`KeyMap::new`](crate::keymap::KeyMap::new) directly.
#[derive(Clone, Debug, Default)]
pub struct KeyboardConfig<'a> {
    pub behavior: BehaviorConfig,
    pub matrix: MatrixConfig,
    pub usb: KeyboardUsbConfig<'a>,
}

/// Config for configurable action behavior
#[derive(Clone, Copy, Debug, Default)]
pub struct BehaviorConfig {
    /// Mode used at start-up
    pub default_mode: Mode,
    pub rep_key: RepKeyConfig,
    pub layer_tap: LayerTapConfig,
    pub unicode: UnicodeConfig,
    pub report: ReportConfig,
}

/// Timing of the software key repeat
#[derive(Clone, Copy, Debug)]
pub struct RepKeyConfig {
    /// Delay between the key-down and the first repeat
    pub initial_wait_time: Duration,
    /// Interval between two repeats
    pub keypress_frequency: Duration,
}

impl Default for RepKeyConfig {
    fn default() -> Self {
        Self {
            initial_wait_time: Duration::from_millis(500),
            keypress_frequency: Duration::from_millis(33),
        }
    }
}

/// Config for layer tap keys
#[derive(Clone, Copy, Debug)]
pub struct LayerTapConfig {
    /// A press and release within this window is a tap, which clears the whole layer stack
    pub tap_timeout: Duration,
}

impl Default for LayerTapConfig {
    fn default() -> Self {
        Self {
            tap_timeout: Duration::from_millis(200),
        }
    }
}

/// Config for typing characters without a direct keycode
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeConfig {
    pub mode: UnicodeMode,
}

/// Config for the report channel
#[derive(Clone, Copy, Debug)]
pub struct ReportConfig {
    /// Wait time before retrying a report the channel or the transport refused
    pub retry_backoff: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            retry_backoff: Duration::from_millis(1),
        }
    }
}

/// Config for matrix scanning
#[derive(Clone, Copy, Debug)]
pub struct MatrixConfig {
    /// Number of consecutive agreeing samples before an edge is accepted
    pub debounce_samples: u8,
    /// Period of a full matrix scan
    pub scan_interval: Duration,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            debounce_samples: 5,
            scan_interval: Duration::from_millis(1),
        }
    }
}

/// USB device identity
#[derive(Clone, Copy, Debug)]
pub struct KeyboardUsbConfig<'a> {
    /// Vendor id
    pub vid: u16,
    /// Product id
    pub pid: u16,
    pub manufacturer: &'a str,
    pub product_name: &'a str,
    pub serial_number: &'a str,
}

impl Default for KeyboardUsbConfig<'_> {
    fn default() -> Self {
        Self {
            vid: 0x4c4b,
            pid: 0x4643,
            manufacturer: "ergokey",
            product_name: "ergokey keyboard",
            serial_number: "00000001",
        }
    }
}
