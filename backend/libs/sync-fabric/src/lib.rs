//! Event synchronization fabric.
//!
//! The replication backbone of GridPulse: services publish domain events
//! describing their authoritative writes to a durable fanout exchange, and
//! every dependent service consumes them through a private durable queue,
//! applying idempotent projections to its own database. Delivery is
//! at-least-once; consumers acknowledge only after their local write has
//! been persisted.
//!
//! The pieces:
//! - [`supervisor`] owns the broker connection lifecycle and reconnects on
//!   a fixed delay, forever.
//! - [`topology`] declares the durable exchange/queue/binding layout.
//! - [`publisher`] is the best-effort, fire-and-forget publish side.
//! - [`consumer`] runs deliveries through a handler and translates its
//!   verdict into ack or nack-with-requeue.

pub mod consumer;
pub mod error;
pub mod publisher;
pub mod supervisor;
pub mod topology;

mod handle;

pub use consumer::{run_consumer, Disposition, QueueHandler, SyncProjection, SyncProjector};
pub use error::{is_integrity_violation, FabricError, ProjectionError};
pub use handle::ChannelHandle;
pub use publisher::{MeasurementPublisher, SyncPublisher};
pub use supervisor::{supervise, FabricConfig, FabricRole};
