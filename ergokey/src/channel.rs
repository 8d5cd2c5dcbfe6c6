//! Exposed channels which connect the matrix, the keyboard and the reporter

use embassy_sync::channel::{Channel, TrySendError};
pub use embassy_sync::{blocking_mutex, channel};
use embassy_time::{Duration, Timer};

use crate::descriptor::KeyboardReport;
use crate::event::Transition;
use crate::{REPORT_CHANNEL_SIZE, RawMutex, TRANSITION_CHANNEL_SIZE};

pub type TransitionChannel = Channel<RawMutex, Transition, TRANSITION_CHANNEL_SIZE>;
pub type ReportChannel = Channel<RawMutex, KeyboardReport, REPORT_CHANNEL_SIZE>;

/// Channel for debounced key transitions, from the matrix to the keyboard
pub static TRANSITION_CHANNEL: TransitionChannel = Channel::new();
/// Channel for keyboard reports, from the keyboard to the hid reporter
pub static KEYBOARD_REPORT_CHANNEL: ReportChannel = Channel::new();

/// Push a transition without ever blocking, safe to call from interrupt context.
///
/// When the channel is full the oldest unread transition is dropped to make room.
/// Returns the number of dropped transitions.
pub fn push_transition(channel: &TransitionChannel, transition: Transition) -> usize {
    let mut dropped = 0;
    let mut pending = transition;
    loop {
        match channel.try_send(pending) {
            Ok(()) => return dropped,
            Err(TrySendError::Full(t)) => {
                pending = t;
                if let Ok(old) = channel.try_receive() {
                    dropped += 1;
                    warn!("Transition channel saturated, dropping {:?}", old);
                }
            }
        }
    }
}

/// Send a report, backing off and retrying while the channel is full. Reports are never dropped.
pub async fn send_report(channel: &ReportChannel, report: KeyboardReport, retry_backoff: Duration) {
    let mut pending = report;
    loop {
        match channel.try_send(pending) {
            Ok(()) => return,
            Err(TrySendError::Full(r)) => {
                warn!("Report channel full, retry in {}ms", retry_backoff.as_millis());
                pending = r;
                Timer::after(retry_backoff).await;
            }
        }
    }
}
