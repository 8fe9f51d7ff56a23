mod devices;
mod synced_users;

pub use devices::DeviceRepo;
pub use synced_users::SyncedUserRepo;
