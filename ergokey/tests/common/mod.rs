pub mod fake_board;
pub mod test_macro;

use core::cell::{Cell, RefCell};

use embassy_futures::select::{Either, select};
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Timer};
use ergokey::Runnable;
use ergokey::channel::{ReportChannel, TransitionChannel, push_transition};
use ergokey::config::BehaviorConfig;
use ergokey::descriptor::KeyboardReport;
use ergokey::event::Transition;
use ergokey::keyboard::Keyboard;
use ergokey::keymap::KeyMap;
use futures::{FutureExt, join};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub(crate) const KC_LSHIFT: u8 = 1 << 1;

#[derive(Debug, Clone)]
pub struct TestKeyPress {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
    pub delay: u64, // Delay before this key event in milliseconds
}

/// Channels of a single test, so that tests can run in parallel
#[derive(Clone, Copy)]
pub struct TestChannels {
    pub transitions: &'static TransitionChannel,
    pub reports: &'static ReportChannel,
}

impl TestChannels {
    pub fn new() -> Self {
        Self {
            transitions: Box::leak(Box::new(Channel::new())),
            reports: Box::leak(Box::new(Channel::new())),
        }
    }

    /// Take every report left in the channel
    pub fn drain_reports(&self) -> Vec<KeyboardReport> {
        let mut reports = Vec::new();
        while let Ok(r) = self.reports.try_receive() {
            reports.push(r);
        }
        reports
    }
}

pub fn create_keyboard<const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    keymap: KeyMap<'static, ROW, COL, NUM_LAYER>,
    behavior: BehaviorConfig,
    channels: TestChannels,
) -> Keyboard<'static, ROW, COL, NUM_LAYER> {
    Keyboard::with_channels(keymap, behavior, channels.transitions, channels.reports)
}

// Run a keyboard test: input is a sequence of key presses with delays, the expected reports are verified in order.
// The keyboard stops only after every key press is sent and processed, so its state can be checked afterwards
pub async fn run_key_sequence_test<const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    keyboard: &mut Keyboard<'static, ROW, COL, NUM_LAYER>,
    channels: TestChannels,
    key_sequence: &[TestKeyPress],
    expected_reports: &[KeyboardReport],
) {
    const MAX_TEST_TIMEOUT: Duration = Duration::from_secs(5);
    let reports_done = Cell::new(false);
    let sequence_done = Cell::new(false);

    join!(
        // Run keyboard until all reports are received and all key presses are processed
        async {
            select(keyboard.run(), async {
                select(
                    Timer::after(MAX_TEST_TIMEOUT).then(|_| async {
                        panic!("Test timeout reached");
                    }),
                    async {
                        while !(reports_done.get() && sequence_done.get() && channels.transitions.is_empty()) {
                            Timer::after(Duration::from_millis(10)).await;
                        }
                        // Let the keyboard finish the last transition it took
                        Timer::after(Duration::from_millis(10)).await;
                    },
                )
                .await;
            })
            .await;
        },
        // Send all key presses with delays
        async {
            for key in key_sequence {
                Timer::after(Duration::from_millis(key.delay)).await;
                push_transition(channels.transitions, Transition::now(key.row, key.col, key.pressed));
            }
            sequence_done.set(true);
        },
        // Verify reports
        async {
            for (index, expected) in expected_reports.iter().enumerate() {
                match select(Timer::after(Duration::from_secs(1)), channels.reports.receive()).await {
                    Either::First(_) => panic!("report wait timeout reached, #{} report is missing", index),
                    Either::Second(report) => {
                        assert_eq!(
                            *expected, report,
                            "on #{} reports, expected left but actually right",
                            index
                        );
                    }
                }
            }
            reports_done.set(true);
        }
    );
}

// Run a keyboard for `duration` while sending the key sequence, returns every report in order.
// Used where the number of reports depends on timing, e.g. Rep-Key
pub async fn run_key_sequence_for<const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    keyboard: &mut Keyboard<'static, ROW, COL, NUM_LAYER>,
    channels: TestChannels,
    key_sequence: &[TestKeyPress],
    duration: Duration,
) -> Vec<KeyboardReport> {
    let received = RefCell::new(Vec::new());
    select(
        keyboard.run(),
        select(
            async {
                loop {
                    let report = channels.reports.receive().await;
                    received.borrow_mut().push(report);
                }
            },
            async {
                for key in key_sequence {
                    Timer::after(Duration::from_millis(key.delay)).await;
                    push_transition(channels.transitions, Transition::now(key.row, key.col, key.pressed));
                }
                Timer::after(duration).await;
            },
        ),
    )
    .await;
    let mut received = received.into_inner();
    received.extend(channels.drain_reports());
    received
}
