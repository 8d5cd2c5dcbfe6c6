extern crate ergokey;

#[macro_export]
macro_rules! key_sequence_test {
    (keyboard: $keyboard:expr, channels: $channels:expr, sequence: [$([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?], expected_reports: [$([$modifier:expr, $keys:expr]),* $(,)?]) => {
        embassy_futures::block_on(async {
            let mut keyboard = $keyboard;
            let sequence = $crate::key_sequence![$([$row, $col, $pressed, $delay]),*];
            let expected_reports = $crate::key_report![$([$modifier, $keys]),*];

            $crate::common::run_key_sequence_test(&mut keyboard, $channels, &sequence, &expected_reports).await;
            keyboard
        })
    };
}

// Map a key name to its HID usage id
#[macro_export]
macro_rules! kc8 {
    ($key: ident) => {
        ergokey::types::keycode::HidKeyCode::$key as u8
    };
}

// Create a key sequence to simulate key presses
#[macro_export]
macro_rules! key_sequence {
    ($([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?) => {
        vec![
            $(
                $crate::common::TestKeyPress {
                    row: $row,
                    col: $col,
                    pressed: $pressed,
                    delay: $delay,
                },
            )*
        ]
    };
}

// Create the reports expected from the keyboard
#[macro_export]
macro_rules! key_report {
    ($([$modifier:expr, $keys:expr]),* $(,)?) => {
        vec![
            $(
                ergokey::descriptor::KeyboardReport::new($modifier, $keys),
            )*
        ]
    };
}
