pub mod common;

use ergokey::action::{Binding, FunctionContext};
use ergokey::config::BehaviorConfig;
use ergokey::keyboard::Keyboard;
use ergokey::keymap::KeyMap;
use ergokey::types::mode::Mode;
use ergokey::{a, func, k, layer, md, mo, mode};

use crate::common::{KC_LSHIFT, TestChannels, create_keyboard};

#[rustfmt::skip]
static TYPING: [[[Binding; 5]; 1]; 2] = [
    layer!([[k!(A), md!(LSHIFT), mo!(1), mode!(Gaming), func!(to_gaming)]]),
    layer!([[k!(B), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]]),
];

#[rustfmt::skip]
static GAMING: [[[Binding; 5]; 1]; 2] = [
    layer!([[k!(W), md!(LSHIFT), mo!(1), mode!(Typing), mode!(Gaming)]]),
    layer!([[k!(S), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]]),
];

fn to_gaming(ctx: &mut FunctionContext) {
    ctx.switch_mode(Mode::Gaming);
}

fn create_mode_keyboard(channels: TestChannels) -> Keyboard<'static, 1, 5, 2> {
    create_keyboard(KeyMap::new(&GAMING, &TYPING), BehaviorConfig::default(), channels)
}

#[test]
fn test_mode_selects_binding_table() {
    let channels = TestChannels::new();
    let keyboard = create_mode_keyboard(channels);
    let keyboard = key_sequence_test!(
        keyboard: keyboard,
        channels: channels,
        sequence: [
            [0, 0, true, 10],
            [0, 0, false, 10],
            [0, 3, true, 10],
            [0, 3, false, 10],
            [0, 0, true, 10],
            [0, 0, false, 10],
        ],
        expected_reports: [
            [0, [kc8!(A), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            // Mode switch flushes the held state
            [0, [0, 0, 0, 0, 0, 0]],
            [0, [kc8!(W), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
    assert_eq!(keyboard.mode(), Mode::Gaming);
}

#[test]
fn test_mode_switch_releases_held_keys() {
    let channels = TestChannels::new();
    let keyboard = create_mode_keyboard(channels);
    let keyboard = key_sequence_test!(
        keyboard: keyboard,
        channels: channels,
        sequence: [
            [0, 1, true, 10],
            [0, 2, true, 10],
            [0, 0, true, 10],
            [0, 3, true, 10],
            // Releases of keys held across the switch are no-ops
            [0, 0, false, 10],
            [0, 1, false, 10],
            [0, 2, false, 10],
            [0, 3, false, 10],
            [0, 0, true, 10],
            [0, 0, false, 10],
        ],
        expected_reports: [
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(B), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [0, [kc8!(W), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
    assert!(keyboard.layer_stack().is_empty());
    assert!(keyboard.registry().is_empty());
}

#[test]
fn test_mode_switch_from_function() {
    let channels = TestChannels::new();
    let keyboard = create_mode_keyboard(channels);
    let keyboard = key_sequence_test!(
        keyboard: keyboard,
        channels: channels,
        sequence: [
            [0, 1, true, 10],
            [0, 4, true, 10],
            [0, 4, false, 10],
            [0, 1, false, 10],
            [0, 1, true, 10],
        ],
        expected_reports: [
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
        ]
    );
    assert_eq!(keyboard.mode(), Mode::Gaming);
}

#[test]
fn test_switch_to_active_mode_releases_everything() {
    let channels = TestChannels::new();
    let behavior = BehaviorConfig {
        default_mode: Mode::Gaming,
        ..Default::default()
    };
    let keyboard = create_keyboard(KeyMap::new(&GAMING, &TYPING), behavior, channels);
    let keyboard = key_sequence_test!(
        keyboard: keyboard,
        channels: channels,
        sequence: [
            [0, 2, true, 10],
            [0, 0, true, 10],
            [0, 4, true, 10],
        ],
        expected_reports: [
            [0, [kc8!(S), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    );
    assert_eq!(keyboard.mode(), Mode::Gaming);
    assert!(keyboard.layer_stack().is_empty());
    assert!(keyboard.registry().is_empty());
}
