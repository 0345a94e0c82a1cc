/* DBus presentation boundary.
 *
 * Publishes the reconciled device status on the session bus for tray
 * front-ends and forwards their two control signals (refresh, shutdown)
 * plus configuration changes back to the monitor task. The front-end
 * never mutates monitor state directly. */

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};
use zbus::connection::Builder;
use zbus::interface;

use crate::config::MonitorConfig;
use crate::monitor::MonitorHandle;
use crate::status::StatusSnapshot;

pub const BUS_NAME: &str = "io.github.battmond";
pub const OBJECT_PATH: &str = "/io/github/battmond";

pub struct MonitorInterface {
    handle: MonitorHandle,
    snapshot_rx: watch::Receiver<StatusSnapshot>,
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!("Status serialization failed: {e}");
        String::new()
    })
}

#[interface(name = "io.github.battmond.Monitor1")]
impl MonitorInterface {
    /* JSON-serialized DeviceStatus for each device class. */
    #[zbus(property)]
    async fn mouse_status(&self) -> String {
        to_json(&self.snapshot_rx.borrow().mouse)
    }

    #[zbus(property)]
    async fn headset_status(&self) -> String {
        to_json(&self.snapshot_rx.borrow().headset)
    }

    /* Current snapshot of both device classes. */
    async fn status(&self) -> (String, String) {
        let snapshot = self.snapshot_rx.borrow().clone();
        (to_json(&snapshot.mouse), to_json(&snapshot.headset))
    }

    /* Wake the monitor and run the forced-refresh fast path. */
    async fn refresh(&self) {
        self.handle.refresh().await;
    }

    /* Replace the configuration from a JSON document; the monitor
     * persists it and refreshes immediately. */
    async fn set_config(&self, json: String) -> zbus::fdo::Result<()> {
        let config: MonitorConfig = serde_json::from_str(&json)
            .map_err(|e| zbus::fdo::Error::InvalidArgs(format!("Bad config document: {e}")))?;
        self.handle.set_config(config).await;
        Ok(())
    }

    async fn quit(&self) {
        self.handle.shutdown().await;
    }
}

/* Serve the interface and forward every published snapshot as a
 * PropertiesChanged signal. Blocks until the monitor task goes away. */
pub async fn run_server(
    handle: MonitorHandle,
    mut snapshot_rx: watch::Receiver<StatusSnapshot>,
) -> Result<()> {
    let iface = MonitorInterface {
        handle,
        snapshot_rx: snapshot_rx.clone(),
    };

    let conn = Builder::session()?
        .name(BUS_NAME)?
        .serve_at(OBJECT_PATH, iface)?
        .build()
        .await?;

    info!("DBus publisher ready on {BUS_NAME}");

    loop {
        if snapshot_rx.changed().await.is_err() {
            /* monitor task exited and dropped its sender */
            break;
        }

        let iface_ref = conn
            .object_server()
            .interface::<_, MonitorInterface>(OBJECT_PATH)
            .await?;
        let iface = iface_ref.get().await;
        iface.mouse_status_changed(iface_ref.signal_emitter()).await?;
        iface
            .headset_status_changed(iface_ref.signal_emitter())
            .await?;
    }

    info!("Monitor channel closed, shutting down");
    Ok(())
}
