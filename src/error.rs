/* Shared battmond error definitions: MonitorError aggregates transport/config/system
 * failures for callers that need a single error type. */
use thiserror::Error;

/* Errors that may occur in battmond-rs.
 *
 * Per-poll failures (device absent, timed-out exchange) never leave the
 * component that observed them; they are converted into the failure-counter
 * mechanism instead. These variants cover the remaining typed failures. */
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum MonitorError {
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    #[error("Configuration unreadable: {0}")]
    ConfigCorrupt(String),

    #[error("No known device found")]
    NoKnownDeviceFound,

    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error("System error: {0}")]
    System(#[from] std::io::Error),
}
