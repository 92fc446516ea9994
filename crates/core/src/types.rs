/// All database primary keys are UUIDs (user identities come from the
/// external auth provider, which keys on uuid).
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
