/// Stable identifier of a vocalist position (independent of its number).
pub type PositionId = uuid::Uuid;

/// Identifier of an event instance (one service / weekend).
pub type EventId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
