use core::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

impl From<bool> for ConnectionState {
    fn from(connected: bool) -> Self {
        if connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }
}

impl From<ConnectionState> for bool {
    fn from(state: ConnectionState) -> Self {
        state == ConnectionState::Connected
    }
}

/// Connection state of a transport, shared between the side which observes the host
/// (e.g. a USB device handler) and the reporter which writes to it.
///
/// It is owned by the firmware and lent to both sides.
#[derive(Debug, Default)]
pub struct ConnectionFlag {
    connected: AtomicBool,
}

impl ConnectionFlag {
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
        }
    }

    pub fn get(&self) -> ConnectionState {
        self.connected.load(Ordering::Acquire).into()
    }

    pub fn set(&self, state: ConnectionState) {
        self.connected.store(state.into(), Ordering::Release);
    }
}
