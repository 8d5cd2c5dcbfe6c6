//! Report writer on top of an embassy-usb HID endpoint.
//!
//! Building the USB device is left to the firmware: create a `HidWriter<'d, D, 8>` with
//! [`KeyboardReport::desc()`](usbd_hid::descriptor::SerializedDescriptor::desc) as report
//! descriptor, register a [`UsbDeviceHandler`] on the builder and wrap the writer in a
//! [`UsbKeyboardReporter`]. Both share one [`ConnectionFlag`]. [`usb_config`] turns a
//! [`KeyboardUsbConfig`] into the device config of the builder.

use embassy_time::Timer;
use embassy_usb::Handler;
use embassy_usb::class::hid::HidWriter;
use embassy_usb::driver::Driver;

use crate::config::KeyboardUsbConfig;
use crate::descriptor::KeyboardReport;
use crate::hid::{HidError, HidReporter};
use crate::state::{ConnectionFlag, ConnectionState};

/// Device config of a bus-powered composite keyboard with remote wakeup
pub fn usb_config<'a>(keyboard_config: &KeyboardUsbConfig<'a>) -> embassy_usb::Config<'a> {
    let mut usb_config = embassy_usb::Config::new(keyboard_config.vid, keyboard_config.pid);
    usb_config.manufacturer = Some(keyboard_config.manufacturer);
    usb_config.product = Some(keyboard_config.product_name);
    usb_config.serial_number = Some(keyboard_config.serial_number);
    usb_config.max_power = 450;
    usb_config.supports_remote_wakeup = true;
    usb_config.max_packet_size_0 = 64;
    usb_config.device_class = 0xEF;
    usb_config.device_sub_class = 0x02;
    usb_config.device_protocol = 0x01;
    usb_config.composite_with_iads = true;
    usb_config
}

pub struct UsbKeyboardReporter<'d, D: Driver<'d>> {
    writer: HidWriter<'d, D, 8>,
    /// Configured by the host and not suspended
    connection: &'d ConnectionFlag,
}

impl<'d, D: Driver<'d>> UsbKeyboardReporter<'d, D> {
    pub fn new(writer: HidWriter<'d, D, 8>, connection: &'d ConnectionFlag) -> Self {
        Self { writer, connection }
    }
}

impl<'d, D: Driver<'d>> HidReporter for UsbKeyboardReporter<'d, D> {
    fn is_connected(&self) -> bool {
        self.connection.get().into()
    }

    async fn wait_connected(&mut self) {
        self.writer.ready().await;
        while !self.is_connected() {
            Timer::after_millis(100).await;
        }
    }

    async fn write_report(&mut self, report: &KeyboardReport) -> Result<(), HidError> {
        self.writer.write_serialize(report).await.map_err(|e| {
            let e = HidError::from(e);
            if matches!(e, HidError::Disconnected) {
                self.connection.set(ConnectionState::Disconnected);
            }
            e
        })
    }
}

/// Device state handler, tracks whether the host is listening
pub struct UsbDeviceHandler<'d> {
    connection: &'d ConnectionFlag,
    configured: bool,
}

impl<'d> UsbDeviceHandler<'d> {
    pub fn new(connection: &'d ConnectionFlag) -> Self {
        UsbDeviceHandler {
            connection,
            configured: false,
        }
    }
}

impl Handler for UsbDeviceHandler<'_> {
    fn enabled(&mut self, enabled: bool) {
        if enabled {
            info!("Device enabled");
        } else {
            info!("Device disabled");
            self.configured = false;
            self.connection.set(ConnectionState::Disconnected);
        }
    }

    fn reset(&mut self) {
        info!("Bus reset");
        self.configured = false;
        self.connection.set(ConnectionState::Disconnected);
    }

    fn configured(&mut self, configured: bool) {
        info!("Device configured: {}", configured);
        self.configured = configured;
        self.connection.set(configured.into());
    }

    fn suspended(&mut self, suspended: bool) {
        info!("Device suspended: {}", suspended);
        // A resumed device is back to its configured state
        let connected = self.configured && !suspended;
        self.connection.set(connected.into());
    }
}
