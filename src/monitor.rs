/* Battery Monitor task — owns all device I/O and status mutation.
 *
 * One monitor task runs for the lifetime of the process (the single
 * writer of both device trackers). The presentation boundary talks to it
 * only through an `mpsc` control channel and reads results from a
 * `watch` snapshot channel, mirroring the usual actor shape: nothing
 * else ever touches the transport or the trackers. */

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::time;
use tracing::{debug, info, warn};

use crate::battery;
use crate::config::MonitorConfig;
use crate::profile;
use crate::status::{DeviceTracker, StatusSnapshot, HEADSET_LABEL, MOUSE_LABEL};
use crate::transport::{MouseBattery, Transport};

/* Mouse discovery is retried a few times before the pass counts as a
 * miss; the battery query gets a larger budget because a freshly woken
 * dongle takes a moment to answer. */
const MOUSE_DISCOVERY_ATTEMPTS: u32 = 3;
const MOUSE_QUERY_ATTEMPTS: u32 = 6;
const RETRY_DELAY: Duration = Duration::from_millis(200);

/* Forced refresh runs several back-to-back passes to cover radio wake-up
 * latency before anything is published. Empirically chosen spacing. */
const FORCE_REFRESH_PASSES: u32 = 6;
const FORCE_REFRESH_SPACING: Duration = Duration::from_millis(100);

/* Back-off after a fault escapes a pass. The loop never terminates on
 * faults, only on an explicit shutdown. */
const PASS_BACKOFF: Duration = Duration::from_secs(5);

/* Commands the presentation boundary can send to the monitor task. */
#[derive(Debug)]
pub enum ControlMessage {
    /* Wake the wait early and run the forced-refresh fast path. */
    Refresh,
    /* Replace the live configuration, persist it, then force-refresh. */
    SetConfig(MonitorConfig),
    /* Exit the loop at the next checkpoint. */
    Shutdown,
}

/* Handle used by the DBus layer to send commands to the monitor task. */
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<ControlMessage>,
}

impl MonitorHandle {
    pub async fn refresh(&self) {
        let _ = self.tx.send(ControlMessage::Refresh).await;
    }

    pub async fn set_config(&self, config: MonitorConfig) {
        let _ = self.tx.send(ControlMessage::SetConfig(config)).await;
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(ControlMessage::Shutdown).await;
    }
}

/* The monitor itself. Owns the transport and both device trackers. */
pub struct Monitor {
    transport: Box<dyn Transport>,
    config: MonitorConfig,
    config_path: PathBuf,
    mouse: DeviceTracker,
    headset: DeviceTracker,
    snapshot_tx: watch::Sender<StatusSnapshot>,
    rx: mpsc::Receiver<ControlMessage>,
}

/* Spawn the monitor task and return the control handle plus the snapshot
 * channel the publisher listens on. */
pub fn spawn(
    transport: Box<dyn Transport>,
    config: MonitorConfig,
    config_path: PathBuf,
) -> (MonitorHandle, watch::Receiver<StatusSnapshot>) {
    let (monitor, handle, snapshot_rx) = Monitor::new(transport, config, config_path);
    tokio::spawn(monitor.run());
    (handle, snapshot_rx)
}

impl Monitor {
    pub fn new(
        transport: Box<dyn Transport>,
        config: MonitorConfig,
        config_path: PathBuf,
    ) -> (Self, MonitorHandle, watch::Receiver<StatusSnapshot>) {
        let (tx, rx) = mpsc::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(StatusSnapshot::default());

        let monitor = Self {
            transport,
            config,
            config_path,
            mouse: DeviceTracker::new(MOUSE_LABEL),
            headset: DeviceTracker::new(HEADSET_LABEL),
            snapshot_tx,
            rx,
        };

        (monitor, MonitorHandle { tx }, snapshot_rx)
    }

    /* Main loop: pass, publish, then wait for the interval or an early
     * control message, whichever comes first. */
    pub async fn run(mut self) {
        info!(
            "Battery monitor started (interval {}s)",
            self.config.update_interval
        );

        loop {
            match self.run_pass().await {
                Ok(()) => self.publish(),
                Err(e) => {
                    warn!("Fault escaped a poll pass: {e:#}; backing off");
                    time::sleep(PASS_BACKOFF).await;
                    continue;
                }
            }

            let interval = Duration::from_secs(self.config.update_interval.max(1));
            tokio::select! {
                _ = time::sleep(interval) => {}
                msg = self.rx.recv() => match msg {
                    Some(ControlMessage::Refresh) => self.force_refresh().await,
                    Some(ControlMessage::SetConfig(config)) => self.apply_config(config).await,
                    Some(ControlMessage::Shutdown) | None => break,
                },
            }
        }

        info!("Battery monitor shut down");
    }

    /* One full pass: mouse branch, then headset branch. */
    async fn run_pass(&mut self) -> Result<()> {
        self.poll_mouse().await?;
        self.poll_headset().await?;
        Ok(())
    }

    /* Fast path after a refresh request: several immediate passes to let
     * just-woken radios answer, publishing only once at the end. Per-pass
     * faults are logged but never cut the sequence short. */
    async fn force_refresh(&mut self) {
        for pass in 1..=FORCE_REFRESH_PASSES {
            if let Err(e) = self.run_pass().await {
                warn!("Fault during forced refresh pass {pass}: {e:#}");
            }
            time::sleep(FORCE_REFRESH_SPACING).await;
        }
        self.publish();
    }

    async fn apply_config(&mut self, config: MonitorConfig) {
        if let Err(e) = config.save(&self.config_path) {
            warn!("Failed to persist configuration: {e}");
        }
        info!("Configuration applied (interval {}s)", config.update_interval);
        self.config = config;
        self.force_refresh().await;
    }

    fn publish(&self) {
        let snapshot = StatusSnapshot {
            mouse: self.mouse.status().clone(),
            headset: self.headset.status().clone(),
        };
        self.snapshot_tx.send_replace(snapshot);
    }

    async fn poll_mouse(&mut self) -> Result<()> {
        match self.discover_and_query_mouse().await? {
            Some((name, battery)) => {
                debug!(
                    "Mouse {}: {}%{}",
                    name,
                    battery.level,
                    if battery.is_charging { " (charging)" } else { "" }
                );
                self.mouse
                    .record_success(name, battery.level, Some(battery.is_charging));
            }
            None => self.mouse.record_failure(),
        }
        Ok(())
    }

    /* Bounded-retry wrapper around the transport's single-shot mouse
     * operations: a short outer budget to find the mouse at all, then a
     * longer inner budget for the battery value itself. */
    async fn discover_and_query_mouse(&self) -> Result<Option<(String, MouseBattery)>> {
        let mut mouse = None;
        for attempt in 1..=MOUSE_DISCOVERY_ATTEMPTS {
            mouse = self.transport.discover_mouse().await?;
            if mouse.is_some() {
                break;
            }
            debug!("No known mouse (attempt {attempt}/{MOUSE_DISCOVERY_ATTEMPTS})");
            time::sleep(RETRY_DELAY).await;
        }
        let Some(mouse) = mouse else {
            return Ok(None);
        };

        for attempt in 1..=MOUSE_QUERY_ATTEMPTS {
            if let Some(battery) = self.transport.query_mouse(&mouse).await? {
                return Ok(Some((mouse.name, battery)));
            }
            debug!("Mouse battery read failed (attempt {attempt}/{MOUSE_QUERY_ATTEMPTS})");
            time::sleep(RETRY_DELAY).await;
        }
        Ok(None)
    }

    async fn poll_headset(&mut self) -> Result<()> {
        let candidates = self.transport.discover_headset().await?;
        let Some(profile) = profile::find_profile(&candidates) else {
            self.headset.record_failure();
            return Ok(());
        };

        let Some(resp) = self.transport.query_headset(profile).await? else {
            self.headset.record_failure();
            return Ok(());
        };

        match resp.get(profile.battery_idx) {
            Some(&raw) => {
                let level = battery::decode(raw, profile.range);
                debug!("Headset {}: raw {raw:#04x} -> {level}%", profile.name);
                self.headset
                    .record_success(profile.name.to_string(), level, None);
            }
            None => {
                warn!(
                    "{}: short response ({} of {} bytes)",
                    profile.name,
                    resp.len(),
                    profile.response_len
                );
                self.headset.record_failure();
            }
        }
        Ok(())
    }
}
