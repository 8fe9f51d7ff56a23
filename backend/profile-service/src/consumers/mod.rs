mod user_events;

pub use user_events::{ProfileFabricRole, ProfileProjection, SYNC_QUEUE};
