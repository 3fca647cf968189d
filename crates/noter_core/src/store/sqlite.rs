//! SQLite-backed note store.
//!
//! # Responsibility
//! - Persist note documents with their modification counters.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - `revision` starts at 1 and is bumped by the same statement that
//!   replaces `content`.
//! - The connection must be migrated to the latest schema version.

use super::{NoteDocument, NoteKey, NoteStore, StoreError, StoreResult};
use crate::db::migrations::latest_version;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Note store over a migrated SQLite connection.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn revision(&self, key: &NoteKey) -> StoreResult<Option<u64>> {
        let revision: Option<i64> = self
            .conn
            .query_row(
                "SELECT revision FROM note_documents WHERE note_key = ?1;",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        revision.map(|value| parse_revision(value, key)).transpose()
    }

    fn load(&self, key: &NoteKey) -> StoreResult<Option<NoteDocument>> {
        let row: Option<(String, i64)> = self
            .conn
            .query_row(
                "SELECT content, revision FROM note_documents WHERE note_key = ?1;",
                [key.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        row.map(|(text, revision)| {
            Ok(NoteDocument {
                key: key.clone(),
                text,
                revision: parse_revision(revision, key)?,
            })
        })
        .transpose()
    }

    fn save(&self, key: &NoteKey, text: &str) -> StoreResult<u64> {
        let revision: i64 = self.conn.query_row(
            "INSERT INTO note_documents (note_key, content, revision)
             VALUES (?1, ?2, 1)
             ON CONFLICT(note_key) DO UPDATE SET
                 content = excluded.content,
                 revision = note_documents.revision + 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             RETURNING revision;",
            params![key.as_str(), text],
            |row| row.get(0),
        )?;
        debug!(
            "event=note_save module=store status=ok key={} revision={} bytes={}",
            key,
            revision,
            text.len()
        );
        parse_revision(revision, key)
    }
}

fn parse_revision(value: i64, key: &NoteKey) -> StoreResult<u64> {
    u64::try_from(value)
        .ok()
        .filter(|revision| *revision > 0)
        .ok_or_else(|| {
            StoreError::InvalidData(format!(
                "invalid revision `{value}` for note document `{key}`"
            ))
        })
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
