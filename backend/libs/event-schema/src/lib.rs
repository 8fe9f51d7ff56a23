//! Event schemas shared by all GridPulse services.
//!
//! Defines the closed set of synchronization events exchanged over the
//! fabric, the wire envelope they travel in, and the raw measurement
//! payload consumed by the monitoring service. The JSON shapes here are
//! the wire contract; renaming a field is a breaking change for every
//! deployed service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A synchronization event, tagged by its wire `type`.
///
/// Events are immutable once published and carry no sequence numbers;
/// ordering between events for the same entity is whatever the broker's
/// per-queue FIFO delivery provides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    #[serde(rename = "USER_CREATED")]
    UserCreated(UserPayload),
    #[serde(rename = "USER_UPDATED")]
    UserUpdated(UserPayload),
    #[serde(rename = "USER_DELETED")]
    UserDeleted(EntityRef),
    #[serde(rename = "DEVICE_CREATED")]
    DeviceCreated(DevicePayload),
    #[serde(rename = "DEVICE_DELETED")]
    DeviceDeleted(EntityRef),
}

impl DomainEvent {
    /// The wire tag, e.g. `USER_CREATED`.
    pub fn tag(&self) -> &'static str {
        match self {
            DomainEvent::UserCreated(_) => "USER_CREATED",
            DomainEvent::UserUpdated(_) => "USER_UPDATED",
            DomainEvent::UserDeleted(_) => "USER_DELETED",
            DomainEvent::DeviceCreated(_) => "DEVICE_CREATED",
            DomainEvent::DeviceDeleted(_) => "DEVICE_DELETED",
        }
    }

    /// The entity family this event belongs to (the tag prefix).
    pub fn domain(&self) -> EventDomain {
        match self {
            DomainEvent::UserCreated(_)
            | DomainEvent::UserUpdated(_)
            | DomainEvent::UserDeleted(_) => EventDomain::User,
            DomainEvent::DeviceCreated(_) | DomainEvent::DeviceDeleted(_) => EventDomain::Device,
        }
    }

    /// Id of the entity the event describes.
    pub fn entity_id(&self) -> i64 {
        match self {
            DomainEvent::UserCreated(p) | DomainEvent::UserUpdated(p) => p.id,
            DomainEvent::DeviceCreated(p) => p.id,
            DomainEvent::UserDeleted(r) | DomainEvent::DeviceDeleted(r) => r.id,
        }
    }
}

/// Interest predicate used by consumers to filter broadcast events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDomain {
    User,
    Device,
}

/// Payload for `USER_CREATED` and `USER_UPDATED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    pub id: i64,
    pub role: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Payload for `DEVICE_CREATED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicePayload {
    pub id: i64,
    pub name: String,
    pub max_consumption: f64,
}

/// Bare-id payload used by deletion events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
}

/// Wire envelope: `{type, data, timestamp}`.
///
/// The timestamp records event creation time and is advisory only; it is
/// never used for ordering or conflict resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    #[serde(flatten)]
    pub event: DomainEvent,
    pub timestamp: DateTime<Utc>,
}

impl SyncEvent {
    pub fn new(event: DomainEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}

/// Raw measurement as published by device simulators onto the data queue.
///
/// `deviceId` is camel-cased on the wire; keep the rename in sync with
/// producers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    #[serde(rename = "deviceId")]
    pub device_id: i64,
    pub measurement_value: f64,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_created_wire_format() {
        let event = SyncEvent::new(DomainEvent::UserCreated(UserPayload {
            id: 42,
            role: "client".to_string(),
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            avatar_url: None,
        }));

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "USER_CREATED");
        assert_eq!(value["data"]["id"], 42);
        assert_eq!(value["data"]["role"], "client");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn device_deleted_round_trip() {
        let json = r#"{
            "type": "DEVICE_DELETED",
            "data": { "id": 7 },
            "timestamp": "2025-11-17T14:05:00Z"
        }"#;

        let event: SyncEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event, DomainEvent::DeviceDeleted(EntityRef { id: 7 }));
        assert_eq!(event.event.domain(), EventDomain::Device);
        assert_eq!(event.event.entity_id(), 7);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let json = r#"{
            "type": "USER_PROMOTED",
            "data": { "id": 1 },
            "timestamp": "2025-11-17T14:05:00Z"
        }"#;

        assert!(serde_json::from_str::<SyncEvent>(json).is_err());
    }

    #[test]
    fn measurement_uses_camel_case_device_id() {
        let json = r#"{
            "deviceId": 7,
            "measurement_value": 0.35,
            "timestamp": "2025-11-17T14:10:00Z"
        }"#;

        let measurement: Measurement = serde_json::from_str(json).unwrap();
        assert_eq!(measurement.device_id, 7);
        assert!((measurement.measurement_value - 0.35).abs() < f64::EPSILON);

        let back = serde_json::to_value(&measurement).unwrap();
        assert!(back.get("deviceId").is_some());
        assert!(back.get("device_id").is_none());
    }

    #[test]
    fn domains_partition_the_tag_set() {
        let user = DomainEvent::UserDeleted(EntityRef { id: 1 });
        let device = DomainEvent::DeviceCreated(DevicePayload {
            id: 2,
            name: "Heat pump".to_string(),
            max_consumption: 3.5,
        });

        assert_eq!(user.domain(), EventDomain::User);
        assert_eq!(device.domain(), EventDomain::Device);
        assert!(user.tag().starts_with("USER_"));
        assert!(device.tag().starts_with("DEVICE_"));
    }
}
