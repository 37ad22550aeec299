use thiserror::Error;
use yubikey_hid_protocol::TransportError;

#[derive(Debug, Error)]
pub enum UsbError {
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("No YubiKey found")]
    DeviceNotFound,
}

impl From<UsbError> for TransportError {
    fn from(err: UsbError) -> TransportError {
        TransportError::device(err)
    }
}
