use sqlx::FromRow;

/// One remembered dropdown value, keyed like the browser's localStorage entries
#[derive(Debug, FromRow, Clone, PartialEq, Eq)]
pub struct PreferenceRecord {
    pub key: String,
    pub value: String,
}
