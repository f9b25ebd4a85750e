/// Project and membership primary keys are UUIDv7, so creation order is
/// recoverable from the id alone.
pub type DbId = uuid::Uuid;

/// User ids are issued by the external authentication service as opaque text.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh time-ordered primary key.
pub fn new_id() -> DbId {
    uuid::Uuid::now_v7()
}
