/// Record identifiers are opaque strings (UUID v4 for newly created records,
/// but any non-empty string from a legacy blob is accepted).
pub type RequestId = String;

/// All machine timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
