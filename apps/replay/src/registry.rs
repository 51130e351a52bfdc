//! Registry file loading.

use jalsetu::domain::{SensorId, Ward, WardId};
use jalsetu::kernel::KernelError;
use jalsetu::kernel::memory::InMemoryRegistry;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SensorMapping {
    pub sensor_id: SensorId,
    pub ward_id: WardId,
}

/// Contents of the `--registry` file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryFile {
    pub wards: Vec<Ward>,
    #[serde(default)]
    pub sensors: Vec<SensorMapping>,
}

impl RegistryFile {
    /// # Errors
    /// Returns [`KernelError::UnknownWard`] when a sensor maps to a ward
    /// that is not listed.
    pub fn into_registry(self) -> Result<InMemoryRegistry, KernelError> {
        let registry = InMemoryRegistry::with_wards(self.wards);
        for mapping in self.sensors {
            registry.map_sensor(mapping.sensor_id, mapping.ward_id)?;
        }
        Ok(registry)
    }
}
