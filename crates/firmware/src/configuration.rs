//! The static identity the device presents to the host during enumeration.
//!
//! Everything here is consumed exactly once, at startup, when the USB stack builds its descriptors. The
//! sampling pipeline never reads any of it.

/// Immutable description of the device as the host sees it.
pub struct DeviceIdentity {
    /// USB vendor id.
    pub vendor_id: u16,
    /// USB product id.
    pub product_id: u16,
    /// Manufacturer string descriptor.
    pub manufacturer: &'static str,
    /// Product string descriptor.
    pub product: &'static str,
    /// Serial number string descriptor.
    pub serial_number: &'static str,
}

/// The identity baked into this firmware.
pub const DEVICE_IDENTITY: DeviceIdentity = DeviceIdentity {
    // per https://pid.codes, FOSS projects can apply to be listed under the vendor ID owned by InterBiometrics
    vendor_id: 0x1209,
    // three knobs
    product_id: 0x0333,
    manufacturer: "Triknob Project",
    product: "Triknob MIDI Controller",
    serial_number: "123456789",
};

impl DeviceIdentity {
    /// Build the enumeration-time configuration the USB stack consumes.
    pub fn usb_config(&self) -> embassy_usb::Config<'static> {
        let mut config = embassy_usb::Config::new(self.vendor_id, self.product_id);
        config.manufacturer = Some(self.manufacturer);
        config.product = Some(self.product);
        config.serial_number = Some(self.serial_number);
        // bus-powered; the pots and the MCU draw well under the 100 mA requested here
        config.max_power = 100;
        config
    }
}
