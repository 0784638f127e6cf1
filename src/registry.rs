use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A monitored piece of network equipment.
///
/// The registry owns this record; the polling side only consumes the
/// `id`/`address` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: i32,
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Read-only view over the JSON equipment file (a single array of devices).
///
/// Mutation of the registry happens elsewhere; this side only needs to
/// resolve an id to an address before polling.
pub struct EquipmentRegistry {
    path: PathBuf,
}

impl EquipmentRegistry {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Every registered device. A missing file yields an empty list.
    pub async fn load_all(&self) -> Result<Vec<Device>, AppError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    /// Looks up one device by id. A miss is `None`, not an error.
    pub async fn get_device(&self, id: i32) -> Result<Option<Device>, AppError> {
        let devices = self.load_all().await?;
        Ok(devices.into_iter().find(|d| d.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn registry_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "name": "core-switch", "address": "10.0.0.1"}},
                {{"id": 2, "name": "edge-router", "address": "10.0.0.254", "description": "uplink"}}
            ]"#
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn loads_devices_from_file() {
        let file = registry_file();
        let registry = EquipmentRegistry::new(file.path());

        let devices = registry.load_all().await.unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "core-switch");
        assert_eq!(devices[1].description.as_deref(), Some("uplink"));
    }

    #[tokio::test]
    async fn get_device_finds_by_id() {
        let file = registry_file();
        let registry = EquipmentRegistry::new(file.path());

        let device = registry.get_device(2).await.unwrap().unwrap();
        assert_eq!(device.address, "10.0.0.254");
    }

    #[tokio::test]
    async fn get_device_miss_is_none() {
        let file = registry_file();
        let registry = EquipmentRegistry::new(file.path());

        assert!(registry.get_device(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_file_is_empty_registry() {
        let registry = EquipmentRegistry::new("/nonexistent/equipment.json");
        assert!(registry.load_all().await.unwrap().is_empty());
    }
}
