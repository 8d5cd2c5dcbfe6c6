//! Key-event processing core of a programmable keyboard firmware.
//!
//! The crate is split into three concurrent stages, connected by bounded channels:
//!
//! - [`matrix::Matrix`] scans the switch matrix and pushes debounced [`event::Transition`]s
//! - [`keyboard::Keyboard`] resolves bindings, maintains layers, modes and Rep-Key, and emits [`descriptor::KeyboardReport`]s
//! - a [`hid::HidReporter`] writes the reports to the host
//!
//! [`run_keyboard`] drives all of them on a single executor task.
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub use embassy_futures;
use embassy_futures::join::join3;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
pub use ergokey_types as types;
pub use heapless;

use crate::channel::ReportChannel;
use crate::hid::HidReporter;

pub mod action;
pub mod channel;
pub mod config;
pub mod debounce;
pub mod descriptor;
pub mod event;
pub mod hid;
pub mod hid_state;
pub mod keyboard;
pub mod keymap;
pub mod layer;
pub mod layout_macro;
pub mod matrix;
pub mod mode;
pub mod rep_key;
pub mod state;
pub mod unicode;
pub mod usb;

/// Mutex used by every channel of the crate, safe to use from interrupt context
pub type RawMutex = CriticalSectionRawMutex;

/// Capacity of the transition channel between the matrix and the keyboard
pub const TRANSITION_CHANNEL_SIZE: usize = 128;
/// Capacity of the report channel between the keyboard and the reporter
pub const REPORT_CHANNEL_SIZE: usize = 16;
/// Max number of simultaneous layer activations
pub const LAYER_STACK_SIZE: usize = 8;
/// Max number of keys holding a registered binding
pub const MAX_HELD_KEYS: usize = 16;
/// Max number of keys repeated by Rep-Key at the same time
pub const REP_KEY_MAX_NUM: usize = 8;
/// Max number of effects a single function binding can queue
pub const FUNCTION_EFFECT_MAX_NUM: usize = 8;

/// Long running task of a stage
pub trait Runnable {
    async fn run(&mut self);
}

/// Run the matrix scanner, the keyboard and the reporter concurrently.
///
/// `reports` must be the channel the keyboard writes to. The future never returns.
pub async fn run_keyboard<M: Runnable, K: Runnable, R: HidReporter>(
    matrix: &mut M,
    keyboard: &mut K,
    reporter: &mut R,
    reports: &ReportChannel,
    retry_backoff: embassy_time::Duration,
) {
    info!("Start ergokey");
    join3(matrix.run(), keyboard.run(), reporter.run_reporter(reports, retry_backoff)).await;
}
