/// Document identifiers are opaque strings (`locker_1003`, `assignment_..._locker_1003`, UUIDs).
pub type DocId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The signed-in principal on whose behalf repository writes are issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable subject identifier (token `sub`).
    pub id: String,
    /// Role name carried by the token.
    pub role: String,
}
