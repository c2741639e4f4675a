//! Participant identities from the tab database.
//!
//! The store is read once, entirely, at startup; nothing touches it again
//! for the rest of the run.

use sqlx::sqlite::SqlitePoolOptions;

use crate::session::{IDENTITY_LEN, KEY_LEN};

/// One participant identity loaded from the tab database.
#[derive(Debug, Clone)]
pub struct Participant {
    /// 16-byte identity token.
    pub identity: [u8; IDENTITY_LEN],
    /// 32-byte registration key.
    pub registration_key: [u8; KEY_LEN],
}

/// Read every participant identity from the sqlite tab database.
///
/// Rows whose secret blobs do not have the fixed 16 + 32 byte layout are
/// skipped with a warning rather than failing the run.
pub async fn load_participants(database_path: &str) -> Result<Vec<Participant>, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&string_concat!("sqlite://", database_path))
        .await?;

    let rows: Vec<(Vec<u8>, Vec<u8>)> =
        sqlx::query_as("SELECT uuid, registration_key FROM participant")
            .fetch_all(&pool)
            .await?;
    pool.close().await;

    let mut participants = Vec::with_capacity(rows.len());
    for (uuid, key) in rows {
        match (uuid.as_slice().try_into(), key.as_slice().try_into()) {
            (Ok(identity), Ok(registration_key)) => participants.push(Participant {
                identity,
                registration_key,
            }),
            _ => log::warn!(
                "skipping participant row with malformed secret ({} + {} bytes)",
                uuid.len(),
                key.len()
            ),
        }
    }

    Ok(participants)
}
