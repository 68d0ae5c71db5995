//! Per-device reservation guard
//!
//! A presence set of device IDs with a reservation in flight. Acquisition
//! never waits: if the device is already held the caller gets `None` and is
//! expected to retry. The returned [`DeviceGuard`] removes the device from
//! the set when dropped, so every exit path releases it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct ReservationGuards {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ReservationGuards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to mark `device_id` as mid-reservation
    pub fn try_acquire(&self, device_id: &str) -> Option<DeviceGuard> {
        let mut in_flight = self.lock();
        if !in_flight.insert(device_id.to_string()) {
            return None;
        }

        Some(DeviceGuard {
            device_id: device_id.to_string(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    #[cfg(test)]
    pub(crate) fn is_held(&self, device_id: &str) -> bool {
        self.lock().contains(device_id)
    }

    #[cfg(test)]
    pub(crate) fn held_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Scoped hold on one device; released on drop
#[derive(Debug)]
pub struct DeviceGuard {
    device_id: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl DeviceGuard {
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.remove(&self.device_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_fast() {
        let guards = ReservationGuards::new();

        let held = guards.try_acquire("lap-001").unwrap();
        assert_eq!(held.device_id(), "lap-001");
        assert!(guards.try_acquire("lap-001").is_none());
        assert!(guards.is_held("lap-001"));
    }

    #[test]
    fn test_release_on_drop() {
        let guards = ReservationGuards::new();

        {
            let _held = guards.try_acquire("lap-001").unwrap();
            assert_eq!(guards.held_count(), 1);
        }

        assert_eq!(guards.held_count(), 0);
        assert!(guards.try_acquire("lap-001").is_some());
    }

    #[test]
    fn test_devices_are_independent() {
        let guards = ReservationGuards::new();

        let _a = guards.try_acquire("lap-001").unwrap();
        let _b = guards.try_acquire("tab-001").unwrap();
        assert_eq!(guards.held_count(), 2);
    }

    #[test]
    fn test_release_on_error_path() {
        fn fails_while_holding(guards: &ReservationGuards) -> Result<(), String> {
            let _held = guards.try_acquire("cam-001").ok_or("busy")?;
            Err("boom".to_string())
        }

        let guards = ReservationGuards::new();
        assert!(fails_while_holding(&guards).is_err());
        assert!(!guards.is_held("cam-001"));
    }
}
