//! Device catalogue
//!
//! Read-only list of lendable devices. Availability figures are owned here;
//! the loan ledger never adjusts them.

mod model;

pub use model::{Device, DevicesResponse};

/// Static catalogue of campus devices
#[derive(Debug, Clone)]
pub struct Catalogue {
    devices: Vec<Device>,
}

impl Catalogue {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// The devices offered by the campus lending desk
    pub fn campus() -> Self {
        Self::new(vec![
            Device::new("lap-001", "Dell", "Latitude 5420", "Laptop", 60, 6),
            Device::new("tab-001", "Apple", "iPad 9th Gen", "Tablet", 8, 2),
            Device::new("cam-001", "Canon", "EOS 250D", "Camera", 4, 1),
        ])
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::campus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_campus_devices_have_valid_counts() {
        let catalogue = Catalogue::campus();
        assert_eq!(catalogue.devices().len(), 3);

        for device in catalogue.devices() {
            assert!(!device.id.is_empty());
            assert!(device.available_count <= device.total_count);
        }
    }

    #[test]
    fn test_device_wire_shape() {
        let catalogue = Catalogue::campus();
        let value = serde_json::to_value(&catalogue.devices()[0]).unwrap();
        assert_eq!(value["id"], "lap-001");
        assert_eq!(value["totalCount"], 60);
        assert_eq!(value["availableCount"], 6);
    }
}
