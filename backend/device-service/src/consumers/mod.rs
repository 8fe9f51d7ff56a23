mod user_events;

pub use user_events::{DeviceFabricRole, UserProjection, SYNC_QUEUE};
