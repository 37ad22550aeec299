use rusb::{Device, UsbContext};
use tracing::{debug, info};

use crate::config::UsbConfig;
use crate::error::UsbError;

pub fn is_yubikey(vendor_id: u16, product_id: u16, config: &UsbConfig) -> bool {
    vendor_id == config.vendor_id && config.product_ids.contains(&product_id)
}

/// Returns the first device on the bus matching `config`. If there are multiple YubiKeys
/// attached the others are ignored.
pub fn find_yubikey<T: UsbContext>(
    context: &T,
    config: &UsbConfig,
) -> Result<Option<Device<T>>, UsbError> {
    for device in context.devices()?.iter() {
        let descriptor = device.device_descriptor()?;
        debug!(
            bus = device.bus_number(),
            address = device.address(),
            "Device {:04x}:{:04x}",
            descriptor.vendor_id(),
            descriptor.product_id()
        );

        if is_yubikey(descriptor.vendor_id(), descriptor.product_id(), config) {
            info!(
                bus = device.bus_number(),
                address = device.address(),
                product_id = descriptor.product_id(),
                "Found YubiKey"
            );
            return Ok(Some(device));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_configured_products() {
        let config = UsbConfig::default();
        assert!(is_yubikey(0x1050, 0x0111, &config));
        assert!(is_yubikey(0x1050, 0x0114, &config));
        assert!(!is_yubikey(0x1050, 0x0407, &config));
        assert!(!is_yubikey(0x20a0, 0x0111, &config));
    }

    #[test]
    fn no_products_matches_nothing() {
        let config = UsbConfig {
            product_ids: vec![],
            ..UsbConfig::default()
        };
        assert!(!is_yubikey(0x1050, 0x0111, &config));
    }
}
