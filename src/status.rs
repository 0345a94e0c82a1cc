/* Debounced per-device connection/battery state.
 *
 * One tracker exists per device class (mouse, headset) and is mutated
 * exclusively from the monitor task; everything else sees immutable
 * snapshot copies. A device flips to disconnected only after
 * FAIL_THRESHOLD consecutive missed polls, so a single dropped radio
 * exchange never flickers the displayed state. */

use serde::Serialize;

/* Consecutive missed polls before a device is declared gone. */
pub const FAIL_THRESHOLD: u32 = 3;

/* Last reconciled view of one device class. */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub name: String,
    pub battery_level: Option<u8>,
    /* Mouse only; the headset protocol does not expose charging. */
    pub is_charging: Option<bool>,
    pub is_connected: bool,
}

impl DeviceStatus {
    pub fn disconnected(label: &str) -> Self {
        Self {
            name: label.to_string(),
            battery_level: None,
            is_charging: None,
            is_connected: false,
        }
    }
}

/* Snapshot handed to the presentation boundary after each pass. */
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub mouse: DeviceStatus,
    pub headset: DeviceStatus,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            mouse: DeviceStatus::disconnected(MOUSE_LABEL),
            headset: DeviceStatus::disconnected(HEADSET_LABEL),
        }
    }
}

pub const MOUSE_LABEL: &str = "Mouse";
pub const HEADSET_LABEL: &str = "Headphones";

/* Failure-count hysteresis for one device class.
 *
 * A successful read immediately reconnects and resets the counter,
 * overriding any pending disconnect. A failed read leaves the last
 * known good status in place until the counter hits FAIL_THRESHOLD. */
#[derive(Debug)]
pub struct DeviceTracker {
    label: &'static str,
    status: DeviceStatus,
    fail_count: u32,
}

impl DeviceTracker {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            status: DeviceStatus::disconnected(label),
            fail_count: 0,
        }
    }

    pub fn record_success(&mut self, name: String, level: u8, is_charging: Option<bool>) {
        self.fail_count = 0;
        self.status = DeviceStatus {
            name,
            battery_level: Some(level),
            is_charging,
            is_connected: true,
        };
    }

    pub fn record_failure(&mut self) {
        self.fail_count += 1;
        if self.fail_count >= FAIL_THRESHOLD {
            self.status = DeviceStatus::disconnected(self.label);
        }
    }

    pub fn status(&self) -> &DeviceStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_tracker(level: u8) -> DeviceTracker {
        let mut tracker = DeviceTracker::new(MOUSE_LABEL);
        tracker.record_success("Aerox 3 Wireless".to_string(), level, Some(false));
        tracker
    }

    #[test]
    fn test_two_failures_stay_sticky() {
        let mut tracker = connected_tracker(80);
        tracker.record_failure();
        tracker.record_failure();
        assert!(tracker.status().is_connected);
        assert_eq!(tracker.status().battery_level, Some(80));
        assert_eq!(tracker.status().name, "Aerox 3 Wireless");
    }

    #[test]
    fn test_third_failure_disconnects_and_clears() {
        let mut tracker = connected_tracker(80);
        for _ in 0..3 {
            tracker.record_failure();
        }
        assert!(!tracker.status().is_connected);
        assert_eq!(tracker.status().battery_level, None);
        assert_eq!(tracker.status().is_charging, None);
        /* identity reverts to the generic class label */
        assert_eq!(tracker.status().name, MOUSE_LABEL);
    }

    #[test]
    fn test_success_resets_the_counter() {
        let mut tracker = connected_tracker(80);
        tracker.record_failure();
        tracker.record_success("Aerox 3 Wireless".to_string(), 79, Some(true));
        /* a single failure after the reset must not disconnect */
        tracker.record_failure();
        assert!(tracker.status().is_connected);
        assert_eq!(tracker.status().battery_level, Some(79));
        assert_eq!(tracker.status().is_charging, Some(true));
    }

    #[test]
    fn test_counters_are_independent_per_class() {
        let mut mouse = connected_tracker(60);
        let mut headset = DeviceTracker::new(HEADSET_LABEL);
        headset.record_success("Arctis 9".to_string(), 50, None);

        for _ in 0..3 {
            mouse.record_failure();
        }
        assert!(!mouse.status().is_connected);
        assert!(headset.status().is_connected);
    }

    #[test]
    fn test_tracker_starts_disconnected() {
        let tracker = DeviceTracker::new(HEADSET_LABEL);
        assert!(!tracker.status().is_connected);
        assert_eq!(tracker.status().name, HEADSET_LABEL);
    }
}
