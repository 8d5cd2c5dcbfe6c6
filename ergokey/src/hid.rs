//! Traits and types for sending keyboard reports to the host.

use core::future::Future;

use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Timer};
use embassy_usb::driver::EndpointError;

use crate::channel::ReportChannel;
use crate::descriptor::KeyboardReport;
use crate::state::ConnectionState;

#[derive(PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError {
    /// The host is not listening
    Disconnected,
    /// The report doesn't fit the transport's buffer
    BufferOverflow,
    UsbEndpointError(EndpointError),
}

impl From<EndpointError> for HidError {
    fn from(e: EndpointError) -> Self {
        match e {
            EndpointError::Disabled => HidError::Disconnected,
            e => HidError::UsbEndpointError(e),
        }
    }
}

/// HidReporter trait is used for reporting keyboard reports to the host, via USB, BLE, etc.
///
/// The transport only writes single reports, [`HidReporter::run_reporter`] takes care of
/// the ordering, retries and the connection state.
pub trait HidReporter {
    /// Whether the host currently accepts reports
    fn is_connected(&self) -> bool;

    /// Wait until the host accepts reports
    fn wait_connected(&mut self) -> impl Future<Output = ()> {
        async move {
            while !self.is_connected() {
                Timer::after_millis(100).await;
            }
        }
    }

    /// Wait until the host stops accepting reports
    fn wait_disconnected(&mut self) -> impl Future<Output = ()> {
        async move {
            while self.is_connected() {
                Timer::after_millis(100).await;
            }
        }
    }

    /// Write a report to the host
    fn write_report(&mut self, report: &KeyboardReport) -> impl Future<Output = Result<(), HidError>>;

    /// Run the reporter task.
    ///
    /// Reports are taken from the channel in order, only while connected, so they queue
    /// up while the host is away. A failed write is retried after `retry_backoff` until it
    /// succeeds. The connection is watched while waiting for reports too: after a
    /// reconnection, the last written report is sent again so that the host learns the
    /// held keys.
    fn run_reporter(&mut self, reports: &ReportChannel, retry_backoff: Duration) -> impl Future<Output = ()> {
        async move {
            let mut state = ConnectionState::Disconnected;
            let mut last: Option<KeyboardReport> = None;
            loop {
                if !self.is_connected() {
                    mark_disconnected(&mut state);
                    self.wait_connected().await;
                }
                if mark_connected(&mut state) {
                    if let Some(report) = last {
                        debug!("Replay last report {:?}", report);
                        write_with_retry(self, &report, retry_backoff, &mut state).await;
                    }
                }

                match select(reports.receive(), self.wait_disconnected()).await {
                    Either::First(report) => {
                        write_with_retry(self, &report, retry_backoff, &mut state).await;
                        last = Some(report);
                    }
                    // Back to the top, which waits for the host and replays `last`
                    Either::Second(()) => mark_disconnected(&mut state),
                }
            }
        }
    }
}

fn mark_disconnected(state: &mut ConnectionState) {
    if *state == ConnectionState::Connected {
        warn!("Host disconnected, reports are queued");
        *state = ConnectionState::Disconnected;
    }
}

/// Returns whether the connection is new
fn mark_connected(state: &mut ConnectionState) -> bool {
    if *state == ConnectionState::Disconnected {
        info!("Host connected");
        *state = ConnectionState::Connected;
        return true;
    }
    false
}

async fn write_with_retry<R: HidReporter + ?Sized>(
    reporter: &mut R,
    report: &KeyboardReport,
    retry_backoff: Duration,
    state: &mut ConnectionState,
) {
    loop {
        match reporter.write_report(report).await {
            Ok(()) => return,
            Err(e) => {
                error!("Failed to write report: {:?}", e);
                if reporter.is_connected() {
                    Timer::after(retry_backoff).await;
                } else {
                    mark_disconnected(state);
                    reporter.wait_connected().await;
                    mark_connected(state);
                }
            }
        }
    }
}
