pub mod common;

use ergokey::action::Binding;
use ergokey::config::BehaviorConfig;
use ergokey::keyboard::Keyboard;
use ergokey::keymap::KeyMap;
use ergokey::types::mode::Mode;
use ergokey::{k, layer, md};

use crate::common::{KC_LSHIFT, TestChannels, create_keyboard};

#[rustfmt::skip]
static LAYERS: [[[Binding; 8]; 1]; 1] = [
    layer!([[k!(A), k!(B), k!(C), k!(D), k!(E), k!(F), k!(G), md!(LSHIFT)]]),
];

fn create_overflow_keyboard(channels: TestChannels) -> Keyboard<'static, 1, 8, 1> {
    let behavior = BehaviorConfig {
        default_mode: Mode::Gaming,
        ..Default::default()
    };
    create_keyboard(KeyMap::single(&LAYERS), behavior, channels)
}

#[test]
fn test_seven_keys_report_rollover() {
    let channels = TestChannels::new();
    let keyboard = create_overflow_keyboard(channels);
    let keyboard = key_sequence_test!(
        keyboard: keyboard,
        channels: channels,
        sequence: [
            [0, 7, true, 10],
            [0, 0, true, 10],
            [0, 1, true, 10],
            [0, 2, true, 10],
            [0, 3, true, 10],
            [0, 4, true, 10],
            [0, 5, true, 10],
            [0, 6, true, 10],
            [0, 6, false, 10],
            [0, 0, false, 10],
        ],
        expected_reports: [
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(A), 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(A), kc8!(B), 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(A), kc8!(B), kc8!(C), 0, 0, 0]],
            [KC_LSHIFT, [kc8!(A), kc8!(B), kc8!(C), kc8!(D), 0, 0]],
            [KC_LSHIFT, [kc8!(A), kc8!(B), kc8!(C), kc8!(D), kc8!(E), 0]],
            [KC_LSHIFT, [kc8!(A), kc8!(B), kc8!(C), kc8!(D), kc8!(E), kc8!(F)]],
            // Seventh key
            [KC_LSHIFT, [kc8!(ErrorRollover); 6]],
            // Back to six keys
            [KC_LSHIFT, [kc8!(A), kc8!(B), kc8!(C), kc8!(D), kc8!(E), kc8!(F)]],
            [KC_LSHIFT, [kc8!(B), kc8!(C), kc8!(D), kc8!(E), kc8!(F), 0]],
        ]
    );
    assert_eq!(keyboard.registry().len(), 6);
}
