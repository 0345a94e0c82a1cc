/* HID transport adapter.
 *
 * All hardware access goes through the `Transport` trait so the monitor
 * never touches hidapi directly and tests can substitute a scripted
 * transport. The blocking hidapi calls run inside `spawn_blocking`; a
 * failed or absent exchange is reported as `Ok(None)` / an empty list,
 * while `Err` is reserved for faults that should not occur in normal
 * operation (a panicked blocking task). */

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use hidapi::HidApi;
use parking_lot::Mutex;
use tokio::task;
use tracing::debug;

use crate::error::MonitorError;
use crate::profile::{HeadsetProfile, STEELSERIES_VID};

/* Per-exchange read timeout. */
const READ_TIMEOUT_MS: i32 = 200;

/* Product strings accepted as a supported mouse (case-insensitive substrings). */
const MOUSE_NAME_WHITELIST: &[&str] = &["aerox", "prime"];

/* Aerox/Prime battery request opcode and its flag bits. The wireless
 * dongle wants the request tagged with the wireless bit; the response
 * carries the charge in the low bits and the charger state in the top bit. */
const MOUSE_BATTERY_REQUEST: u8 = 0x92;
const MOUSE_WIRELESS_FLAG: u8 = 0x40;
const MOUSE_CHARGING_FLAG: u8 = 0x80;
const MOUSE_RESPONSE_LEN: usize = 2;

/* Identity of a discovered mouse, enough to re-open it for a battery query. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseId {
    pub name: String,
    pub product_id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseBattery {
    pub level: u8,
    pub is_charging: bool,
}

/* Request/response exchange and discovery capability over the vendor bus. */
#[async_trait]
pub trait Transport: Send + Sync {
    /* Product ids currently attached for the known vendor. Empty on
     * enumeration failure; never an error to the caller. */
    async fn discover_headset(&self) -> Result<Vec<u16>>;

    /* One write-then-read exchange against a headset profile. None on any
     * open/write/read/timeout failure, and also when the profile's flag
     * byte says no headset is attached to a responding base station. */
    async fn query_headset(&self, profile: &HeadsetProfile) -> Result<Option<Vec<u8>>>;

    /* One enumeration attempt for a whitelisted mouse. */
    async fn discover_mouse(&self) -> Result<Option<MouseId>>;

    /* One battery query attempt against a previously discovered mouse. */
    async fn query_mouse(&self, mouse: &MouseId) -> Result<Option<MouseBattery>>;
}

/* Production transport over hidapi. */
pub struct HidTransport {
    api: Arc<Mutex<HidApi>>,
}

impl HidTransport {
    pub fn new() -> Result<Self, MonitorError> {
        let api = HidApi::new()?;
        Ok(Self {
            api: Arc::new(Mutex::new(api)),
        })
    }
}

/* Open by product id, write the request verbatim, read up to
 * `response_len` bytes. The handle is released when `device` drops,
 * success or not. */
fn exchange(
    api: &HidApi,
    product_id: u16,
    request: &[u8],
    response_len: usize,
) -> Result<Vec<u8>, MonitorError> {
    let device = api.open(STEELSERIES_VID, product_id)?;
    device.write(request)?;
    let mut buf = vec![0u8; response_len];
    let n = device.read_timeout(&mut buf, READ_TIMEOUT_MS)?;
    if n == 0 {
        return Err(MonitorError::TransportUnavailable(
            "no response before timeout".to_string(),
        ));
    }
    buf.truncate(n);
    debug!("RX {} bytes from {:04x}: {:02x?}", n, product_id, buf);
    Ok(buf)
}

/* Aerox/Prime dongles report charge as 1..=21 in 5 % steps. Zero means
 * the mouse is asleep and did not answer; values past the top step are
 * the dongle's own "no data" sentinels. */
fn decode_mouse_battery(raw: u8) -> Option<MouseBattery> {
    let is_charging = raw & MOUSE_CHARGING_FLAG != 0;
    let steps = (raw & !MOUSE_CHARGING_FLAG).checked_sub(1)?;
    let level = u16::from(steps) * 5;
    if level > 100 {
        return None;
    }
    Some(MouseBattery {
        level: level as u8,
        is_charging,
    })
}

#[async_trait]
impl Transport for HidTransport {
    async fn discover_headset(&self) -> Result<Vec<u16>> {
        let api = Arc::clone(&self.api);
        let products: Vec<u16> = task::spawn_blocking(move || {
            let mut api = api.lock();
            if let Err(e) = api.refresh_devices() {
                debug!("HID enumeration failed: {e}");
                return Vec::new();
            }
            api.device_list()
                .filter(|d| d.vendor_id() == STEELSERIES_VID)
                .map(|d| d.product_id())
                .collect()
        })
        .await
        .context("HID enumeration task panicked")?;

        debug!("Enumerated {} SteelSeries interfaces", products.len());
        Ok(products)
    }

    async fn query_headset(&self, profile: &HeadsetProfile) -> Result<Option<Vec<u8>>> {
        let api = Arc::clone(&self.api);
        let profile = *profile;
        let response = task::spawn_blocking(move || {
            let api = api.lock();
            match exchange(&api, profile.product_id, profile.request, profile.response_len) {
                Ok(resp) => Some(resp),
                Err(e) => {
                    debug!("{}: battery exchange failed: {e}", profile.name);
                    None
                }
            }
        })
        .await
        .context("HID exchange task panicked")?;

        let Some(resp) = response else {
            return Ok(None);
        };

        /* A powered base station answers even with no headset docked. */
        if let Some(idx) = profile.connected_idx
            && resp.get(idx).copied().unwrap_or(0) == 0
        {
            debug!("{}: transmitter reports no headset attached", profile.name);
            return Ok(None);
        }

        Ok(Some(resp))
    }

    async fn discover_mouse(&self) -> Result<Option<MouseId>> {
        let api = Arc::clone(&self.api);
        let found = task::spawn_blocking(move || {
            let mut api = api.lock();
            if let Err(e) = api.refresh_devices() {
                debug!("HID enumeration failed: {e}");
                return None;
            }
            api.device_list()
                .filter(|d| d.vendor_id() == STEELSERIES_VID)
                .find_map(|d| {
                    let name = d.product_string()?;
                    let lowered = name.to_lowercase();
                    MOUSE_NAME_WHITELIST
                        .iter()
                        .any(|accepted| lowered.contains(accepted))
                        .then(|| MouseId {
                            name: name.to_string(),
                            product_id: d.product_id(),
                        })
                })
        })
        .await
        .context("mouse discovery task panicked")?;

        if let Some(mouse) = &found {
            debug!("Found mouse: {} ({:04x})", mouse.name, mouse.product_id);
        }
        Ok(found)
    }

    async fn query_mouse(&self, mouse: &MouseId) -> Result<Option<MouseBattery>> {
        let api = Arc::clone(&self.api);
        let product_id = mouse.product_id;
        let name = mouse.name.clone();
        let raw = task::spawn_blocking(move || {
            let api = api.lock();
            let request = [0x00, MOUSE_BATTERY_REQUEST | MOUSE_WIRELESS_FLAG];
            match exchange(&api, product_id, &request, MOUSE_RESPONSE_LEN) {
                Ok(resp) => resp.get(1).copied(),
                Err(e) => {
                    debug!("{name}: battery exchange failed: {e}");
                    None
                }
            }
        })
        .await
        .context("mouse battery task panicked")?;

        Ok(raw.and_then(decode_mouse_battery))
    }
}
