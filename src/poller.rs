use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{PingConfig, SnmpConfig};
use crate::error::AppError;
use crate::models::TrafficSample;
use crate::registry::{Device, EquipmentRegistry};
use crate::snmp::SnmpSampler;
use crate::status::{DeviceStatus, StatusChecker};
use crate::store::TrafficStore;

/// SNMP identity of a device, for the equipment detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub uptime: String,
}

/// Drives one polling pass: resolve a device in the registry, read its
/// interface counters over SNMP and append the resulting sample to the
/// traffic log.
///
/// Counter read failures are recorded as absent values, never as errors;
/// only storage failures and unknown equipment ids surface to the caller.
pub struct TrafficPoller {
    registry: EquipmentRegistry,
    store: Arc<dyn TrafficStore>,
    snmp: SnmpConfig,
    ping: PingConfig,
}

impl TrafficPoller {
    pub fn new(
        registry: EquipmentRegistry,
        store: Arc<dyn TrafficStore>,
        snmp: SnmpConfig,
        ping: PingConfig,
    ) -> Self {
        Self {
            registry,
            store,
            snmp,
            ping,
        }
    }

    /// Polls one device and appends the sample.
    pub async fn poll_device(&self, id: i32) -> Result<TrafficSample, AppError> {
        let device = self.lookup(id).await?;
        let sample = self.sample(&device).await;
        self.store.append(&sample).await?;
        info!(
            equipment_id = id,
            in_octets = ?sample.in_octets,
            out_octets = ?sample.out_octets,
            "Recorded traffic sample"
        );
        Ok(sample)
    }

    /// Polls every registered device, one sample each. A device whose poll
    /// cannot be stored is logged and skipped so a single bad disk write
    /// does not end the sweep.
    pub async fn poll_all(&self) -> Result<Vec<TrafficSample>, AppError> {
        let devices = self.registry.load_all().await?;
        let mut samples = Vec::with_capacity(devices.len());
        for device in devices {
            match self.poll_device(device.id).await {
                Ok(sample) => samples.push(sample),
                Err(e) => warn!(equipment_id = device.id, error = %e, "Poll failed"),
            }
        }
        Ok(samples)
    }

    /// Reads the device's sysName and sysUpTime, degraded to "Unknown"
    /// where the device did not answer.
    pub async fn device_info(&self, id: i32) -> Result<DeviceInfo, AppError> {
        let device = self.lookup(id).await?;
        let sampler = self.sampler(&device);
        Ok(DeviceInfo {
            name: sampler.sys_name().await.unwrap_or_unknown(),
            uptime: sampler.sys_uptime().await.unwrap_or_unknown(),
        })
    }

    /// Reachability check for one registered device.
    pub async fn check_device(&self, id: i32) -> Result<DeviceStatus, AppError> {
        let device = self.lookup(id).await?;
        Ok(self.check_address(&device.address).await)
    }

    /// Reachability of every registered device, for the equipment listing.
    pub async fn status_all(&self) -> Result<Vec<(Device, DeviceStatus)>, AppError> {
        let devices = self.registry.load_all().await?;
        let mut rows = Vec::with_capacity(devices.len());
        for device in devices {
            let status = self.check_address(&device.address).await;
            rows.push((device, status));
        }
        Ok(rows)
    }

    /// Reachability check for an arbitrary address.
    pub async fn check_address(&self, address: &str) -> DeviceStatus {
        StatusChecker::new(self.ping.timeout())
            .check_status(address)
            .await
    }

    async fn lookup(&self, id: i32) -> Result<Device, AppError> {
        self.registry
            .get_device(id)
            .await?
            .ok_or(AppError::EquipmentNotFound(id))
    }

    fn sampler(&self, device: &Device) -> SnmpSampler {
        SnmpSampler::new(
            &device.address,
            &self.snmp.community,
            self.snmp.port,
            self.snmp.timeout(),
        )
    }

    async fn sample(&self, device: &Device) -> TrafficSample {
        let sampler = self.sampler(device);
        TrafficSample {
            timestamp: Utc::now(),
            equipment_id: device.id,
            in_octets: sampler.in_octets().await.counter(),
            out_octets: sampler.out_octets().await.counter(),
        }
    }
}
