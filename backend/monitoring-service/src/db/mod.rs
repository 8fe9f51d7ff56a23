mod consumption;
mod synced_devices;

pub use consumption::ConsumptionRepo;
pub use synced_devices::SyncedDeviceRepo;
