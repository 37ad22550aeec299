use std::time::Duration;

use rusb::{Context, Device, DeviceHandle, Direction, Recipient, RequestType, UsbContext};
use tracing::{debug, info, trace, warn};
use yubikey_hid_protocol::{Report, Transport, TransportError, FEATURE_REPORT_LEN};

use crate::config::UsbConfig;
use crate::discovery::find_yubikey;
use crate::error::UsbError;
use crate::{HID_GET_REPORT, HID_SET_REPORT, REPORT_TYPE_FEATURE};

/// An opened YubiKey with its HID interface claimed.
///
/// The interface is released, and the kernel driver re-attached if it had to be detached, when
/// the handle is dropped.
pub struct YubikeyHandle<T: UsbContext> {
    handle: DeviceHandle<T>,
    interface: u8,
    timeout: Duration,
    reattach_kernel_driver: bool,
}

impl YubikeyHandle<Context> {
    /// Opens the first YubiKey matching `config` using a new libusb context.
    pub fn open_first(config: &UsbConfig) -> Result<Self, UsbError> {
        let context = Context::new()?;
        let device = find_yubikey(&context, config)?.ok_or(UsbError::DeviceNotFound)?;
        YubikeyHandle::open(&device, config)
    }
}

impl<T: UsbContext> YubikeyHandle<T> {
    pub fn open(device: &Device<T>, config: &UsbConfig) -> Result<Self, UsbError> {
        let mut handle = device.open()?;
        let interface = config.interface;

        let attached = match handle.kernel_driver_active(interface) {
            Ok(active) => active,
            Err(rusb::Error::NotSupported) => false,
            Err(err) => return Err(err.into()),
        };

        // Detaching fails when no driver is bound or the platform cannot do it, both are fine
        let mut reattach_kernel_driver = false;
        if attached {
            match handle.detach_kernel_driver(interface) {
                Ok(()) => reattach_kernel_driver = true,
                Err(rusb::Error::NotSupported) | Err(rusb::Error::NotFound) => {}
                Err(err) => return Err(err.into()),
            }
        }

        handle.claim_interface(interface)?;
        info!(
            bus = device.bus_number(),
            address = device.address(),
            interface,
            "Claimed YubiKey interface"
        );

        Ok(YubikeyHandle {
            handle,
            interface,
            timeout: config.timeout(),
            reattach_kernel_driver,
        })
    }

    pub fn interface(&self) -> u8 {
        self.interface
    }

    fn report_index(&self) -> u16 {
        u16::from(self.interface)
    }
}

impl<T: UsbContext> Transport for YubikeyHandle<T> {
    fn write_feature_report(&mut self, report: &Report) -> Result<(), TransportError> {
        let request_type = rusb::request_type(Direction::Out, RequestType::Class, Recipient::Interface);
        let transferred = self
            .handle
            .write_control(
                request_type,
                HID_SET_REPORT,
                REPORT_TYPE_FEATURE << 8,
                self.report_index(),
                report.as_bytes(),
                self.timeout,
            )
            .map_err(UsbError::from)?;

        if transferred != FEATURE_REPORT_LEN {
            return Err(TransportError::ShortWrite {
                expected_len: FEATURE_REPORT_LEN,
                actual_len: transferred,
            });
        }

        trace!(?report, "Data sent to device");
        Ok(())
    }

    fn read_feature_report(&mut self) -> Result<Report, TransportError> {
        let request_type = rusb::request_type(Direction::In, RequestType::Class, Recipient::Interface);
        let mut buffer = [0u8; FEATURE_REPORT_LEN];
        let transferred = self
            .handle
            .read_control(
                request_type,
                HID_GET_REPORT,
                REPORT_TYPE_FEATURE << 8,
                self.report_index(),
                &mut buffer,
                self.timeout,
            )
            .map_err(UsbError::from)?;

        let report = Report::from_bytes(&buffer[..transferred]).ok_or(TransportError::ShortRead {
            expected_len: FEATURE_REPORT_LEN,
            actual_len: transferred,
        })?;

        trace!(?report, "Data received from device");
        Ok(report)
    }
}

impl<T: UsbContext> Drop for YubikeyHandle<T> {
    fn drop(&mut self) {
        if let Err(err) = self.handle.release_interface(self.interface) {
            warn!(interface = self.interface, "Unable to release interface: {}", err);
        }
        if self.reattach_kernel_driver {
            if let Err(err) = self.handle.attach_kernel_driver(self.interface) {
                warn!(interface = self.interface, "Unable to re-attach kernel driver: {}", err);
            }
        }
        debug!(interface = self.interface, "Closed YubiKey");
    }
}
